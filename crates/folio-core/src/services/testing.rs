//! Single-post gateway double for service tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use crate::domain::{
    ImageId, NewPost, Page, PendingAttachment, Post, PostHistory, PostId, PostImage, PostPatch,
    PostQuery, PostStatus, UserId, UserRef,
};
use crate::error::GatewayError;
use crate::ports::PostGateway;

#[derive(Default)]
pub(crate) struct StubGateway {
    post: Mutex<Option<Post>>,
    uploads: AtomicUsize,
    updates: AtomicUsize,
    fail_uploads: AtomicBool,
    update_gate: Mutex<Option<Arc<Notify>>>,
}

impl StubGateway {
    pub(crate) fn upload_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub(crate) fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Make `update_post` wait until the returned notify fires.
    pub(crate) fn hold_updates(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.update_gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    fn stored(&self, id: &PostId) -> Result<Post, GatewayError> {
        self.post
            .lock()
            .unwrap()
            .clone()
            .filter(|p| &p.id == id)
            .ok_or(GatewayError::NotFound)
    }
}

#[async_trait]
impl PostGateway for StubGateway {
    async fn list_posts(&self, query: &PostQuery) -> Result<Page<Post>, GatewayError> {
        let items: Vec<Post> = self.post.lock().unwrap().iter().cloned().collect();
        Ok(Page {
            total: items.len() as u64,
            total_pages: items.len() as u32,
            items,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn get_post(&self, id: &PostId) -> Result<Post, GatewayError> {
        self.stored(id)
    }

    async fn create_post(&self, draft: &NewPost) -> Result<Post, GatewayError> {
        let now = Utc::now();
        let post = Post {
            id: PostId::new("stub-post"),
            title: draft.title.clone(),
            description: draft.description.clone(),
            content: draft.content.clone(),
            images: Vec::new(),
            author: UserRef::Id(UserId::new("stub-user")),
            status: PostStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        *self.post.lock().unwrap() = Some(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: &PostId, patch: &PostPatch) -> Result<Post, GatewayError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let gate = self.update_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut post = self.stored(id)?;
        patch.apply_to(&mut post);
        post.updated_at = Utc::now();
        *self.post.lock().unwrap() = Some(post.clone());
        Ok(post)
    }

    async fn delete_post(&self, id: &PostId) -> Result<(), GatewayError> {
        self.stored(id)?;
        *self.post.lock().unwrap() = None;
        Ok(())
    }

    async fn upload_images(
        &self,
        _post_id: &PostId,
        batch: &[PendingAttachment],
    ) -> Result<Vec<PostImage>, GatewayError> {
        let call = self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection reset".to_string()));
        }
        Ok(batch
            .iter()
            .enumerate()
            .map(|(i, p)| PostImage {
                id: ImageId::new(format!("img-{call}-{i}")),
                name: p.name.clone(),
                url: format!("https://cdn.test/{call}-{i}"),
                public_id: format!("folio/{call}-{i}"),
                width: 10,
                height: 10,
            })
            .collect())
    }

    async fn rename_image(
        &self,
        _post_id: &PostId,
        _image_id: &ImageId,
        _name: &str,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn delete_image(
        &self,
        _post_id: &PostId,
        _image_id: &ImageId,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn post_history(&self, _post_id: &PostId) -> Result<Vec<PostHistory>, GatewayError> {
        Ok(Vec::new())
    }
}
