use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PostId, PostImage, UserRef};
use crate::error::DomainError;

/// Publication state. Both transitions are allowed at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("unknown post status '{other}'")),
        }
    }
}

/// Post entity - a blog post with its attached images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub images: Vec<PostImage>,
    pub author: UserRef,
    #[serde(default)]
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn image(&self, id: &super::ImageId) -> Option<&PostImage> {
        self.images.iter().find(|image| &image.id == id)
    }
}

/// Field rules applied before any create or update reaches the backend.
#[derive(Debug, Clone)]
pub struct PostRules {
    pub title_max_len: usize,
    pub description_max_len: usize,
    pub require_description: bool,
    pub require_content: bool,
}

impl Default for PostRules {
    fn default() -> Self {
        Self {
            title_max_len: 200,
            description_max_len: 500,
            require_description: false,
            require_content: false,
        }
    }
}

impl PostRules {
    fn check_title(&self, title: &str) -> Result<(), DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::Validation("Title must not be empty".to_string()));
        }
        if title.chars().count() > self.title_max_len {
            return Err(DomainError::Validation(format!(
                "Title must be at most {} characters",
                self.title_max_len
            )));
        }
        Ok(())
    }

    fn check_description(&self, description: &str) -> Result<(), DomainError> {
        if self.require_description && description.trim().is_empty() {
            return Err(DomainError::Validation(
                "Description must not be empty".to_string(),
            ));
        }
        if description.chars().count() > self.description_max_len {
            return Err(DomainError::Validation(format!(
                "Description must be at most {} characters",
                self.description_max_len
            )));
        }
        Ok(())
    }

    fn check_content(&self, content: &str) -> Result<(), DomainError> {
        if self.require_content && content.trim().is_empty() {
            return Err(DomainError::Validation("Content must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Fields for a post that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub content: String,
}

impl NewPost {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Trim every field.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            content: self.content.trim().to_string(),
        }
    }

    pub fn validate(&self, rules: &PostRules) -> Result<(), DomainError> {
        rules.check_title(&self.title)?;
        rules.check_description(&self.description)?;
        rules.check_content(&self.content)
    }
}

/// Partial update of a post. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
}

impl PostPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.content.is_none()
            && self.status.is_none()
    }

    /// Trim every present text field.
    pub fn normalized(self) -> Self {
        let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
        Self {
            title: trim(self.title),
            description: trim(self.description),
            content: trim(self.content),
            status: self.status,
        }
    }

    /// Validate each present field on its own.
    pub fn validate(&self, rules: &PostRules) -> Result<(), DomainError> {
        if let Some(title) = &self.title {
            rules.check_title(title)?;
        }
        if let Some(description) = &self.description {
            rules.check_description(description)?;
        }
        if let Some(content) = &self.content {
            rules.check_content(content)?;
        }
        Ok(())
    }

    /// Drop fields whose value already matches `post`.
    pub fn without_unchanged(self, post: &Post) -> Self {
        Self {
            title: self.title.filter(|t| *t != post.title),
            description: self.description.filter(|d| *d != post.description),
            content: self.content.filter(|c| *c != post.content),
            status: self.status.filter(|s| *s != post.status),
        }
    }

    /// Write every present field into `post`.
    pub fn apply_to(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(description) = &self.description {
            post.description = description.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        if let Some(status) = self.status {
            post.status = status;
        }
    }
}
