use async_trait::async_trait;

use crate::domain::{
    ImageId, NewPost, Page, PendingAttachment, Post, PostHistory, PostId, PostImage, PostPatch,
    PostQuery,
};
use crate::error::GatewayError;

/// Post gateway - the backend collaborator that stores posts and records history.
///
/// Implementations append exactly one history entry for every successful
/// `create_post` and `update_post`, snapshotting the post-update state.
#[async_trait]
pub trait PostGateway: Send + Sync {
    /// Fetch one page of the post collection.
    async fn list_posts(&self, query: &PostQuery) -> Result<Page<Post>, GatewayError>;

    async fn get_post(&self, id: &PostId) -> Result<Post, GatewayError>;

    /// Create a post authored by the caller, in `draft` state.
    async fn create_post(&self, draft: &NewPost) -> Result<Post, GatewayError>;

    /// Apply a partial update and return the stored result.
    async fn update_post(&self, id: &PostId, patch: &PostPatch) -> Result<Post, GatewayError>;

    async fn delete_post(&self, id: &PostId) -> Result<(), GatewayError>;

    /// Upload a batch of images in one request. All or nothing.
    async fn upload_images(
        &self,
        post_id: &PostId,
        batch: &[PendingAttachment],
    ) -> Result<Vec<PostImage>, GatewayError>;

    async fn rename_image(
        &self,
        post_id: &PostId,
        image_id: &ImageId,
        name: &str,
    ) -> Result<(), GatewayError>;

    async fn delete_image(&self, post_id: &PostId, image_id: &ImageId)
    -> Result<(), GatewayError>;

    /// History entries of a post, in the order the backend returns them.
    async fn post_history(&self, post_id: &PostId) -> Result<Vec<PostHistory>, GatewayError>;
}
