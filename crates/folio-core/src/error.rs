//! Domain-level error types.

use thiserror::Error;

/// Domain errors - what a caller's action boundary turns into a notification.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("Session is no longer valid, please sign in again")]
    Unauthenticated,

    #[error("Image upload failed: {0}")]
    Upload(String),

    #[error("Another {0} is already in progress")]
    Busy(&'static str),

    #[error("Request failed: {0}")]
    Network(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Whether the view showing this entity is stale and should be left.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }
}

/// Gateway-level errors - the outcome of one backend call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Resource not found")]
    NotFound,

    #[error("Credential rejected")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Map into the domain taxonomy, naming the entity a 404 refers to.
    pub fn for_entity(self, entity_type: &'static str, id: impl ToString) -> DomainError {
        match self {
            GatewayError::NotFound => DomainError::not_found(entity_type, id),
            other => other.into(),
        }
    }

    /// Map a failed image batch. Session and 404 outcomes keep their kind.
    pub fn for_upload(self, post_id: impl ToString) -> DomainError {
        match self {
            GatewayError::NotFound => DomainError::not_found("post", post_id),
            GatewayError::Unauthorized => DomainError::Unauthenticated,
            GatewayError::Forbidden(msg) => DomainError::Forbidden(msg),
            other => DomainError::Upload(other.to_string()),
        }
    }
}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound => DomainError::NotFound {
                entity_type: "resource",
                id: String::new(),
            },
            GatewayError::Unauthorized => DomainError::Unauthenticated,
            GatewayError::Forbidden(msg) => DomainError::Forbidden(msg),
            GatewayError::Rejected { status, message } if status == 400 || status == 422 => {
                DomainError::Validation(message)
            }
            GatewayError::Rejected { status, message } => {
                DomainError::Network(format!("{message} (status {status})"))
            }
            GatewayError::Transport(msg) => DomainError::Network(msg),
            GatewayError::Decode(msg) => DomainError::Network(msg),
        }
    }
}
