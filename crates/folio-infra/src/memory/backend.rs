//! In-memory blog backend.
//!
//! Reproduces the backend's contract, history recording included, inside the
//! process. Used by tests and by the CLI when no API URL is configured.
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::{
    ChangeType, HistoryId, ImageId, ImageMediaType, NewPost, NewUser, Page, PendingAttachment,
    Post, PostHistory, PostId, PostImage, PostPatch, PostQuery, PostStatus, Role, User, UserId,
    UserPatch, UserRef, total_pages,
};
use folio_core::error::GatewayError;
use folio_core::ports::{CredentialProvider, PostGateway, UserDirectory};

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct BackendState {
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    posts: Vec<Post>,
    history: Vec<PostHistory>,
    last_stamp: Option<DateTime<Utc>>,
}

impl BackendState {
    /// Strictly increasing timestamps, so history has a total order.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn post_index(&self, id: &PostId) -> Result<usize, GatewayError> {
        self.posts
            .iter()
            .position(|p| &p.id == id)
            .ok_or(GatewayError::NotFound)
    }

    fn record(&mut self, post_index: usize, actor: &User, change_type: ChangeType) {
        let changed_at = self.next_stamp();
        let post = &self.posts[post_index];
        let entry = PostHistory {
            id: HistoryId::new(Uuid::new_v4().to_string()),
            post_id: post.id.clone(),
            title: post.title.clone(),
            description: post.description.clone(),
            content: post.content.clone(),
            images: post.images.clone(),
            changed_by: UserRef::Populated(actor.clone()),
            changed_at,
            change_type,
        };
        self.history.push(entry);
    }
}

/// Shared in-memory store. Clones see the same data.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<RwLock<BackendState>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account directly, bypassing authorization.
    pub async fn add_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> User {
        let mut state = self.state.write().await;
        let now = state.next_stamp();
        let user = User {
            id: UserId::new(Uuid::new_v4().to_string()),
            username: username.to_string(),
            email: email.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        state.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    /// Issue a bearer token for an existing account.
    pub async fn issue_token(&self, user_id: &UserId) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.state
            .write()
            .await
            .tokens
            .insert(token.clone(), user_id.clone());
        token
    }

    /// Exchange credentials for the account and a fresh token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), GatewayError> {
        let user = {
            let state = self.state.read().await;
            state
                .accounts
                .iter()
                .find(|a| a.user.email == email && a.password == password)
                .map(|a| a.user.clone())
                .ok_or(GatewayError::Unauthorized)?
        };
        let token = self.issue_token(&user.id).await;
        Ok((user, token))
    }

    /// Forget every token of an account, as an expired session would.
    pub async fn revoke_tokens(&self, user_id: &UserId) {
        self.state
            .write()
            .await
            .tokens
            .retain(|_, owner| owner != user_id);
    }

    /// A gateway acting with the given credential.
    pub fn gateway(&self, credentials: Arc<dyn CredentialProvider>) -> InMemoryGateway {
        InMemoryGateway {
            backend: self.clone(),
            credentials,
        }
    }
}

/// Gateway over [`InMemoryBackend`], authenticated like an HTTP client would be.
#[derive(Clone)]
pub struct InMemoryGateway {
    backend: InMemoryBackend,
    credentials: Arc<dyn CredentialProvider>,
}

impl InMemoryGateway {
    /// Resolve the caller from the bearer credential.
    async fn actor(&self) -> Result<User, GatewayError> {
        let resolved = match self.credentials.bearer_token() {
            Some(token) => {
                let state = self.backend.state.read().await;
                state.tokens.get(&token).and_then(|id| {
                    state
                        .accounts
                        .iter()
                        .find(|a| &a.user.id == id)
                        .map(|a| a.user.clone())
                })
            }
            None => None,
        };

        resolved.ok_or_else(|| {
            self.credentials.invalidate();
            GatewayError::Unauthorized
        })
    }

    async fn admin(&self) -> Result<User, GatewayError> {
        let actor = self.actor().await?;
        if actor.role.can_manage_users() {
            Ok(actor)
        } else {
            Err(GatewayError::Forbidden("Admin access required".to_string()))
        }
    }
}

fn bad_request(message: &str) -> GatewayError {
    GatewayError::Rejected {
        status: 400,
        message: message.to_string(),
    }
}

/// Pixel size read from PNG and GIF headers; other formats report 0x0.
fn dimensions(media_type: ImageMediaType, bytes: &[u8]) -> (u32, u32) {
    match media_type {
        ImageMediaType::Png if bytes.len() >= 24 && bytes.starts_with(b"\x89PNG") => {
            let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
            let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
            (width, height)
        }
        ImageMediaType::Gif if bytes.len() >= 10 && bytes.starts_with(b"GIF8") => {
            let width = u16::from_le_bytes([bytes[6], bytes[7]]);
            let height = u16::from_le_bytes([bytes[8], bytes[9]]);
            (u32::from(width), u32::from(height))
        }
        _ => (0, 0),
    }
}

#[async_trait]
impl PostGateway for InMemoryGateway {
    async fn list_posts(&self, query: &PostQuery) -> Result<Page<Post>, GatewayError> {
        self.actor().await?;
        if query.page == 0 || query.page_size == 0 {
            return Err(bad_request("Page and limit must be positive"));
        }

        let needle = query.search.as_deref().map(str::to_lowercase);
        let state = self.backend.state.read().await;
        let matching: Vec<&Post> = state
            .posts
            .iter()
            .rev()
            .filter(|p| query.status.matches(p.status))
            .filter(|p| match &needle {
                Some(needle) => {
                    p.title.to_lowercase().contains(needle)
                        || p.description.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect();

        let total = matching.len() as u64;
        let skip = (query.page as usize - 1) * query.page_size as usize;
        let items = matching
            .into_iter()
            .skip(skip)
            .take(query.page_size as usize)
            .cloned()
            .collect();

        Ok(Page {
            items,
            total,
            page: query.page,
            page_size: query.page_size,
            total_pages: total_pages(total, query.page_size),
        })
    }

    async fn get_post(&self, id: &PostId) -> Result<Post, GatewayError> {
        self.actor().await?;
        let state = self.backend.state.read().await;
        let index = state.post_index(id)?;
        Ok(state.posts[index].clone())
    }

    async fn create_post(&self, draft: &NewPost) -> Result<Post, GatewayError> {
        let actor = self.actor().await?;
        if draft.title.trim().is_empty() {
            return Err(bad_request("Title is required"));
        }

        let mut state = self.backend.state.write().await;
        let now = state.next_stamp();
        let post = Post {
            id: PostId::new(Uuid::new_v4().to_string()),
            title: draft.title.clone(),
            description: draft.description.clone(),
            content: draft.content.clone(),
            images: Vec::new(),
            author: UserRef::Populated(actor.clone()),
            status: PostStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(post.clone());
        let index = state.posts.len() - 1;
        state.record(index, &actor, ChangeType::Created);

        tracing::debug!(post_id = %post.id, "Post stored");
        Ok(post)
    }

    async fn update_post(&self, id: &PostId, patch: &PostPatch) -> Result<Post, GatewayError> {
        let actor = self.actor().await?;
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(bad_request("Title is required"));
        }

        let mut state = self.backend.state.write().await;
        let index = state.post_index(id)?;
        let stamp = state.next_stamp();
        let post = &mut state.posts[index];
        patch.apply_to(post);
        post.updated_at = stamp;
        let saved = post.clone();
        state.record(index, &actor, ChangeType::Updated);
        Ok(saved)
    }

    async fn delete_post(&self, id: &PostId) -> Result<(), GatewayError> {
        let actor = self.actor().await?;
        if !actor.role.can_delete_posts() {
            return Err(GatewayError::Forbidden("Admin access required".to_string()));
        }

        let mut state = self.backend.state.write().await;
        let index = state.post_index(id)?;
        state.posts.remove(index);
        Ok(())
    }

    async fn upload_images(
        &self,
        post_id: &PostId,
        batch: &[PendingAttachment],
    ) -> Result<Vec<PostImage>, GatewayError> {
        self.actor().await?;
        if batch.is_empty() {
            return Err(bad_request("No images provided"));
        }
        if let Some(empty) = batch.iter().find(|p| p.bytes.is_empty()) {
            return Err(bad_request(&format!("File {} is empty", empty.file_name)));
        }

        let mut state = self.backend.state.write().await;
        let index = state.post_index(post_id)?;
        let stamp = state.next_stamp();

        let images: Vec<PostImage> = batch
            .iter()
            .map(|pending| {
                let key = Uuid::new_v4().simple().to_string();
                let (width, height) = dimensions(pending.media_type, &pending.bytes);
                PostImage {
                    id: ImageId::new(Uuid::new_v4().to_string()),
                    name: pending.name.clone(),
                    url: format!("memory://images/{key}"),
                    public_id: format!("folio/{key}"),
                    width,
                    height,
                }
            })
            .collect();

        let post = &mut state.posts[index];
        post.images.extend(images.iter().cloned());
        post.updated_at = stamp;
        Ok(images)
    }

    async fn rename_image(
        &self,
        post_id: &PostId,
        image_id: &ImageId,
        name: &str,
    ) -> Result<(), GatewayError> {
        self.actor().await?;
        let mut state = self.backend.state.write().await;
        let index = state.post_index(post_id)?;
        let image = state.posts[index]
            .images
            .iter_mut()
            .find(|i| &i.id == image_id)
            .ok_or(GatewayError::NotFound)?;
        image.name = name.to_string();
        Ok(())
    }

    async fn delete_image(
        &self,
        post_id: &PostId,
        image_id: &ImageId,
    ) -> Result<(), GatewayError> {
        self.actor().await?;
        let mut state = self.backend.state.write().await;
        let index = state.post_index(post_id)?;
        let images = &mut state.posts[index].images;
        let position = images
            .iter()
            .position(|i| &i.id == image_id)
            .ok_or(GatewayError::NotFound)?;
        images.remove(position);
        Ok(())
    }

    async fn post_history(&self, post_id: &PostId) -> Result<Vec<PostHistory>, GatewayError> {
        self.actor().await?;
        let state = self.backend.state.read().await;
        Ok(state
            .history
            .iter()
            .filter(|entry| &entry.post_id == post_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserDirectory for InMemoryGateway {
    async fn current_user(&self) -> Result<User, GatewayError> {
        self.actor().await
    }

    async fn list_users(&self) -> Result<Vec<User>, GatewayError> {
        self.admin().await?;
        let state = self.backend.state.read().await;
        Ok(state.accounts.iter().map(|a| a.user.clone()).collect())
    }

    async fn get_user(&self, id: &UserId) -> Result<User, GatewayError> {
        let actor = self.actor().await?;
        if &actor.id != id && !actor.role.can_manage_users() {
            return Err(GatewayError::Forbidden("Admin access required".to_string()));
        }
        let state = self.backend.state.read().await;
        state
            .accounts
            .iter()
            .find(|a| &a.user.id == id)
            .map(|a| a.user.clone())
            .ok_or(GatewayError::NotFound)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, GatewayError> {
        self.admin().await?;
        {
            let state = self.backend.state.read().await;
            if state.accounts.iter().any(|a| a.user.email == user.email) {
                return Err(GatewayError::Rejected {
                    status: 409,
                    message: "Email already registered".to_string(),
                });
            }
        }
        Ok(self
            .backend
            .add_user(&user.username, &user.email, &user.password, user.role)
            .await)
    }

    async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<User, GatewayError> {
        self.admin().await?;
        let mut state = self.backend.state.write().await;
        let stamp = state.next_stamp();
        let account = state
            .accounts
            .iter_mut()
            .find(|a| &a.user.id == id)
            .ok_or(GatewayError::NotFound)?;

        if let Some(username) = &patch.username {
            account.user.username = username.clone();
        }
        if let Some(email) = &patch.email {
            account.user.email = email.clone();
        }
        if let Some(role) = patch.role {
            account.user.role = role;
        }
        account.user.updated_at = stamp;
        Ok(account.user.clone())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), GatewayError> {
        self.admin().await?;
        let mut state = self.backend.state.write().await;
        let position = state
            .accounts
            .iter()
            .position(|a| &a.user.id == id)
            .ok_or(GatewayError::NotFound)?;
        state.accounts.remove(position);
        state.tokens.retain(|_, owner| owner != id);
        Ok(())
    }

    async fn change_password(&self, current: &str, new: &str) -> Result<(), GatewayError> {
        let actor = self.actor().await?;
        let mut state = self.backend.state.write().await;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.user.id == actor.id)
            .ok_or(GatewayError::NotFound)?;
        if account.password != current {
            return Err(bad_request("Current password is incorrect"));
        }
        account.password = new.to_string();
        Ok(())
    }
}
