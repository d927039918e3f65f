//! Post aggregate: the validating owner of one post being edited.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, RwLock};

use super::attachments::{AttachmentLimits, ImageAttachments, StageOutcome};
use super::guard::InFlight;
use super::history::{HistoryLog, HistoryTimeline};
use crate::domain::{
    AttachmentId, ImageFile, ImageId, NewPost, PendingAttachment, Post, PostId, PostImage,
    PostPatch, PostRules, PostStatus, User,
};
use crate::error::DomainError;
use crate::ports::PostGateway;

/// Entry point for post operations. Cheap to clone.
#[derive(Clone)]
pub struct PostService {
    gateway: Arc<dyn PostGateway>,
    rules: PostRules,
    limits: AttachmentLimits,
}

impl PostService {
    pub fn new(gateway: Arc<dyn PostGateway>) -> Self {
        Self {
            gateway,
            rules: PostRules::default(),
            limits: AttachmentLimits::default(),
        }
    }

    pub fn with_rules(mut self, rules: PostRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_limits(mut self, limits: AttachmentLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn rules(&self) -> &PostRules {
        &self.rules
    }

    pub fn limits(&self) -> &AttachmentLimits {
        &self.limits
    }

    /// Create a draft authored by the current actor and open it for editing.
    pub async fn create(&self, draft: NewPost) -> Result<PostAggregate, DomainError> {
        let draft = draft.normalized();
        draft.validate(&self.rules)?;

        let post = self.gateway.create_post(&draft).await?;
        tracing::info!(post_id = %post.id, "Post created");
        Ok(self.aggregate(post))
    }

    /// Load an existing post for editing.
    pub async fn open(&self, id: &PostId) -> Result<PostAggregate, DomainError> {
        let post = self
            .gateway
            .get_post(id)
            .await
            .map_err(|e| e.for_entity("post", id))?;
        Ok(self.aggregate(post))
    }

    pub async fn get(&self, id: &PostId) -> Result<Post, DomainError> {
        self.gateway
            .get_post(id)
            .await
            .map_err(|e| e.for_entity("post", id))
    }

    /// Hard-delete a post. Only privileged actors may do this.
    pub async fn delete(&self, actor: &User, id: &PostId) -> Result<(), DomainError> {
        delete_post(self.gateway.as_ref(), actor, id).await
    }

    /// A staging area not yet bound to a post.
    pub fn attachments(&self) -> ImageAttachments {
        ImageAttachments::new(self.gateway.clone(), self.limits.clone())
    }

    pub fn history(&self) -> HistoryLog {
        HistoryLog::new(self.gateway.clone())
    }

    fn aggregate(&self, post: Post) -> PostAggregate {
        PostAggregate {
            id: post.id.clone(),
            gateway: self.gateway.clone(),
            rules: self.rules.clone(),
            post: RwLock::new(post),
            attachments: Mutex::new(self.attachments()),
            in_flight: InFlight::default(),
            closed: AtomicBool::new(false),
        }
    }
}

async fn delete_post(
    gateway: &dyn PostGateway,
    actor: &User,
    id: &PostId,
) -> Result<(), DomainError> {
    if !actor.role.can_delete_posts() {
        return Err(DomainError::Forbidden(
            "Only administrators can delete posts".to_string(),
        ));
    }
    gateway
        .delete_post(id)
        .await
        .map_err(|e| e.for_entity("post", id))?;
    tracing::info!(post_id = %id, actor = %actor.id, "Post deleted");
    Ok(())
}

/// One post being edited, with its staged images.
///
/// The cached post is only ever replaced by server-confirmed state. Mutations
/// are serialized: a second one while a request is in flight fails with
/// [`DomainError::Busy`]. After [`close`](Self::close), late responses are
/// no longer applied.
pub struct PostAggregate {
    id: PostId,
    gateway: Arc<dyn PostGateway>,
    rules: PostRules,
    post: RwLock<Post>,
    attachments: Mutex<ImageAttachments>,
    in_flight: InFlight,
    closed: AtomicBool,
}

impl PostAggregate {
    pub fn id(&self) -> &PostId {
        &self.id
    }

    /// Last server-confirmed state.
    pub async fn snapshot(&self) -> Post {
        self.post.read().await.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    /// Stop applying responses to this aggregate, e.g. when its view goes away.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Apply a partial update.
    ///
    /// The post is reloaded first and fields equal to the stored value are
    /// dropped; a patch left empty is not sent and records no history.
    pub async fn update(&self, patch: PostPatch) -> Result<Post, DomainError> {
        let patch = patch.normalized();
        patch.validate(&self.rules)?;
        let _guard = self.in_flight.begin("post update")?;

        let current = self.load().await?;
        let patch = patch.without_unchanged(&current);
        if patch.is_empty() {
            tracing::debug!(post_id = %self.id, "Update has no changes, not sent");
            return Ok(current);
        }

        let saved = self
            .gateway
            .update_post(&self.id, &patch)
            .await
            .map_err(|e| e.for_entity("post", &self.id))?;

        tracing::info!(post_id = %self.id, status = saved.status.as_str(), "Post updated");
        self.accept(saved.clone()).await;
        Ok(saved)
    }

    pub async fn set_status(&self, status: PostStatus) -> Result<Post, DomainError> {
        self.update(PostPatch::default().status(status)).await
    }

    pub async fn publish(&self) -> Result<Post, DomainError> {
        self.set_status(PostStatus::Published).await
    }

    pub async fn unpublish(&self) -> Result<Post, DomainError> {
        self.set_status(PostStatus::Draft).await
    }

    /// Reload from the backend.
    pub async fn refresh(&self) -> Result<Post, DomainError> {
        self.load().await
    }

    pub async fn delete(&self, actor: &User) -> Result<(), DomainError> {
        let _guard = self.in_flight.begin("post deletion")?;
        delete_post(self.gateway.as_ref(), actor, &self.id).await?;
        self.close();
        Ok(())
    }

    pub async fn stage_images(&self, files: Vec<ImageFile>) -> StageOutcome {
        self.attachments.lock().await.stage(files)
    }

    /// Take over images staged before this post existed.
    pub async fn adopt_staged(&self, mut staged: ImageAttachments) {
        self.attachments.lock().await.extend(staged.take_pending());
    }

    pub async fn staged(&self) -> Vec<PendingAttachment> {
        self.attachments.lock().await.pending().to_vec()
    }

    pub async fn rename_staged(
        &self,
        id: AttachmentId,
        name: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.attachments.lock().await.rename(id, name)
    }

    pub async fn unstage(&self, id: AttachmentId) -> Result<PendingAttachment, DomainError> {
        self.attachments.lock().await.unstage(id)
    }

    /// Upload staged images and append the stored records to the post.
    pub async fn commit_images(&self) -> Result<Vec<PostImage>, DomainError> {
        let _guard = self.in_flight.begin("image upload")?;
        let mut attachments = self.attachments.lock().await;
        let images = attachments.commit(&self.id).await?;

        if !images.is_empty() && !self.is_closed() {
            self.post.write().await.images.extend(images.iter().cloned());
        }
        Ok(images)
    }

    pub async fn rename_image(
        &self,
        image_id: &ImageId,
        name: impl Into<String>,
    ) -> Result<(), DomainError> {
        let _guard = self.in_flight.begin("image rename")?;
        let name = self
            .attachments
            .lock()
            .await
            .rename_persisted(&self.id, image_id, name)
            .await?;

        if !self.is_closed() {
            let mut post = self.post.write().await;
            if let Some(image) = post.images.iter_mut().find(|i| &i.id == image_id) {
                image.name = name;
            }
        }
        Ok(())
    }

    /// Detach and delete a persisted image. Irreversible.
    pub async fn remove_image(&self, image_id: &ImageId) -> Result<(), DomainError> {
        let _guard = self.in_flight.begin("image removal")?;
        self.attachments
            .lock()
            .await
            .remove_persisted(&self.id, image_id)
            .await?;

        if !self.is_closed() {
            self.post.write().await.images.retain(|i| &i.id != image_id);
        }
        Ok(())
    }

    pub async fn history(&self) -> Result<HistoryTimeline, DomainError> {
        HistoryLog::new(self.gateway.clone()).list(&self.id).await
    }

    async fn load(&self) -> Result<Post, DomainError> {
        let post = self
            .gateway
            .get_post(&self.id)
            .await
            .map_err(|e| e.for_entity("post", &self.id))?;
        self.accept(post.clone()).await;
        Ok(post)
    }

    async fn accept(&self, post: Post) {
        if self.is_closed() {
            tracing::debug!(post_id = %self.id, "Aggregate closed, response discarded");
            return;
        }
        *self.post.write().await = post;
    }
}
