//! Account directory port.

use async_trait::async_trait;

use crate::domain::{NewUser, User, UserId, UserPatch};
use crate::error::GatewayError;

/// User directory trait - account operations exposed by the backend.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Profile of the account the current credential belongs to.
    async fn current_user(&self) -> Result<User, GatewayError>;

    async fn list_users(&self) -> Result<Vec<User>, GatewayError>;

    async fn get_user(&self, id: &UserId) -> Result<User, GatewayError>;

    async fn create_user(&self, user: &NewUser) -> Result<User, GatewayError>;

    async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<User, GatewayError>;

    async fn delete_user(&self, id: &UserId) -> Result<(), GatewayError>;

    /// Change the current account's password.
    async fn change_password(&self, current: &str, new: &str) -> Result<(), GatewayError>;
}
