//! Application state - the backend and services every command works with.

use std::sync::Arc;

use tokio::sync::watch;

use folio_core::domain::{Role, User};
use folio_core::ports::{PostGateway, UserDirectory};
use folio_core::services::PostService;
use folio_core::{DomainError, GatewayError};
use folio_infra::{InMemoryBackend, SessionCredentials};

#[cfg(feature = "http")]
use folio_infra::{HttpBackend, HttpConfig};

use crate::config::AppConfig;

const DEV_ADMIN_EMAIL: &str = "admin@folio.local";
const DEV_ADMIN_PASSWORD: &str = "admin";

enum Backend {
    #[cfg(feature = "http")]
    Http(HttpBackend),
    Memory(InMemoryBackend),
}

/// Shared application state.
pub struct AppState {
    pub credentials: Arc<SessionCredentials>,
    pub gateway: Arc<dyn PostGateway>,
    pub directory: Arc<dyn UserDirectory>,
    pub posts: PostService,
    pub page_size: u32,
    backend: Backend,
    session: watch::Receiver<Option<String>>,
}

impl AppState {
    /// Build the application state with the configured backend.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let credentials = Arc::new(SessionCredentials::new(config.token.clone()));

        #[cfg(feature = "http")]
        let backend = match &config.api_url {
            Some(base_url) => {
                let http = HttpBackend::new(
                    &HttpConfig {
                        base_url: base_url.clone(),
                        timeout: config.http_timeout,
                    },
                    credentials.clone(),
                )?;
                if !credentials.is_signed_in() {
                    tracing::info!("FOLIO_TOKEN not set. Only login and register will succeed.");
                }
                Backend::Http(http)
            }
            None => {
                tracing::warn!("FOLIO_API_URL not set. Running against the in-memory backend.");
                Backend::Memory(dev_backend(&credentials).await)
            }
        };

        #[cfg(not(feature = "http"))]
        let backend = {
            tracing::info!("Running without http feature - using in-memory backend");
            Backend::Memory(dev_backend(&credentials).await)
        };

        let (gateway, directory): (Arc<dyn PostGateway>, Arc<dyn UserDirectory>) = match &backend {
            #[cfg(feature = "http")]
            Backend::Http(http) => {
                let gateway: Arc<dyn PostGateway> = Arc::new(http.clone());
                let directory: Arc<dyn UserDirectory> = Arc::new(http.clone());
                (gateway, directory)
            }
            Backend::Memory(memory) => {
                let shared = Arc::new(memory.gateway(credentials.clone()));
                let gateway: Arc<dyn PostGateway> = shared.clone();
                let directory: Arc<dyn UserDirectory> = shared;
                (gateway, directory)
            }
        };

        let posts = PostService::new(gateway.clone()).with_rules(config.rules.clone());
        let session = credentials.subscribe();

        tracing::debug!("Application state initialized");

        Ok(Self {
            credentials,
            gateway,
            directory,
            posts,
            page_size: config.page_size,
            backend,
            session,
        })
    }

    /// Sign in and keep the token for the rest of this process.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), DomainError> {
        let result = match &self.backend {
            #[cfg(feature = "http")]
            Backend::Http(http) => http.login(email, password).await,
            Backend::Memory(memory) => memory.login(email, password).await,
        };
        let (user, token) = result.map_err(login_error)?;
        self.credentials.sign_in(token.clone());
        Ok((user, token))
    }

    /// Create an account and sign in as it.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<(User, String), DomainError> {
        let (user, token) = match &self.backend {
            #[cfg(feature = "http")]
            Backend::Http(http) => http.register(username, email, password, role).await?,
            Backend::Memory(memory) => {
                let user = memory
                    .add_user(username, email, password, role.unwrap_or_default())
                    .await;
                let token = memory.issue_token(&user.id).await;
                (user, token)
            }
        };
        self.credentials.sign_in(token.clone());
        Ok((user, token))
    }

    /// Whether a backend rejected the credential during this run.
    pub fn session_expired(&self) -> bool {
        self.session.has_changed().unwrap_or(false) && self.session.borrow().is_none()
    }
}

/// A fresh in-memory backend with one administrator, already signed in.
async fn dev_backend(credentials: &SessionCredentials) -> InMemoryBackend {
    let backend = InMemoryBackend::new();
    let admin = backend
        .add_user("admin", DEV_ADMIN_EMAIL, DEV_ADMIN_PASSWORD, Role::Admin)
        .await;
    credentials.sign_in(backend.issue_token(&admin.id).await);
    backend
}

fn login_error(err: GatewayError) -> DomainError {
    match err {
        GatewayError::Unauthorized => {
            DomainError::Validation("Invalid email or password".to_string())
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::domain::NewPost;
    use folio_core::ports::CredentialProvider;

    fn memory_config() -> AppConfig {
        AppConfig {
            api_url: None,
            token: None,
            http_timeout: std::time::Duration::from_secs(1),
            rules: Default::default(),
            page_size: 10,
        }
    }

    #[tokio::test]
    async fn test_memory_backend_starts_signed_in_as_admin() {
        let state = AppState::new(&memory_config()).await.unwrap();

        let me = state.directory.current_user().await.unwrap();
        assert_eq!(me.role, Role::Admin);

        let post = state.posts.create(NewPost::new("Hello")).await.unwrap();
        assert_eq!(post.snapshot().await.author.id(), &me.id);
        assert!(!state.session_expired());
    }

    #[tokio::test]
    async fn test_wrong_password_is_a_validation_error() {
        let state = AppState::new(&memory_config()).await.unwrap();
        let err = state.login(DEV_ADMIN_EMAIL, "nope").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(state.credentials.bearer_token().is_some());
    }

    #[tokio::test]
    async fn test_register_switches_the_session() {
        let state = AppState::new(&memory_config()).await.unwrap();
        let (user, token) = state
            .register("writer", "writer@folio.local", "pw", None)
            .await
            .unwrap();

        assert_eq!(user.role, Role::Employee);
        assert_eq!(state.credentials.bearer_token(), Some(token));
        assert_eq!(state.directory.current_user().await.unwrap().id, user.id);
    }
}
