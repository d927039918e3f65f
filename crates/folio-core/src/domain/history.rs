use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HistoryId, PostId, PostImage, UserRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Created,
    Updated,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Created => "created",
            ChangeType::Updated => "updated",
        }
    }
}

/// Snapshot fields tracked by history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryField {
    Title,
    Description,
    Content,
    Images,
}

impl HistoryField {
    pub const ALL: [HistoryField; 4] = [
        HistoryField::Title,
        HistoryField::Description,
        HistoryField::Content,
        HistoryField::Images,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryField::Title => "title",
            HistoryField::Description => "description",
            HistoryField::Content => "content",
            HistoryField::Images => "images",
        }
    }
}

/// One immutable revision of a post: the full tracked state after a change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostHistory {
    #[serde(rename = "_id")]
    pub id: HistoryId,
    pub post_id: PostId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub images: Vec<PostImage>,
    pub changed_by: UserRef,
    pub changed_at: DateTime<Utc>,
    pub change_type: ChangeType,
}

impl PostHistory {
    /// Whether the snapshot carries a value for `field`.
    pub fn has(&self, field: HistoryField) -> bool {
        match field {
            HistoryField::Title => !self.title.trim().is_empty(),
            HistoryField::Description => !self.description.trim().is_empty(),
            HistoryField::Content => !self.content.trim().is_empty(),
            HistoryField::Images => !self.images.is_empty(),
        }
    }

    /// Fields with a value worth rendering, in display order.
    pub fn present_fields(&self) -> Vec<HistoryField> {
        HistoryField::ALL
            .into_iter()
            .filter(|field| self.has(*field))
            .collect()
    }

    /// Fields whose value differs from `previous`.
    pub fn changes_since(&self, previous: &PostHistory) -> Vec<HistoryField> {
        HistoryField::ALL
            .into_iter()
            .filter(|field| match field {
                HistoryField::Title => self.title != previous.title,
                HistoryField::Description => self.description != previous.description,
                HistoryField::Content => self.content != previous.content,
                HistoryField::Images => self.images != previous.images,
            })
            .collect()
    }
}
