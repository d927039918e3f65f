//! Data Transfer Objects - request/response bodies of the blog API.

use serde::{Deserialize, Serialize};

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Login/register result: the account and its bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload<U> {
    pub user: U,
    pub token: String,
}

/// Body of `POST /posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub description: String,
    pub content: String,
}

/// Body of `PUT /posts/{id}`. Absent fields are not changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body of `PUT /posts/{id}/images/{imageId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameImageRequest {
    pub name: String,
}

/// Query string of `GET /posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPostsParams {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// `data` of `GET /posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListPayload<T> {
    pub posts: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// `data` of `POST /posts/{id}/images`: either the new images or the whole post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadedImagesPayload<I> {
    Images(Vec<I>),
    Post { images: Vec<I> },
}

impl<I> UploadedImagesPayload<I> {
    /// The records created by a batch of `batch_len` files.
    pub fn into_new_images(self, batch_len: usize) -> Vec<I> {
        match self {
            UploadedImagesPayload::Images(images) => images,
            UploadedImagesPayload::Post { mut images } => {
                let start = images.len().saturating_sub(batch_len);
                images.split_off(start)
            }
        }
    }
}

/// Body of `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Body of `PUT /users/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Body of `POST /users/change-password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
