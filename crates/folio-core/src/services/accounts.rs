//! Account administration, gated by the acting user's role.

use std::sync::Arc;

use crate::domain::{NewUser, User, UserId, UserPatch};
use crate::error::DomainError;
use crate::ports::UserDirectory;

pub struct AccountAdmin {
    directory: Arc<dyn UserDirectory>,
    actor: User,
}

impl AccountAdmin {
    pub fn new(directory: Arc<dyn UserDirectory>, actor: User) -> Self {
        Self { directory, actor }
    }

    /// Resolve the acting user from the current credential.
    pub async fn for_current_user(directory: Arc<dyn UserDirectory>) -> Result<Self, DomainError> {
        let actor = directory.current_user().await?;
        Ok(Self::new(directory, actor))
    }

    pub fn actor(&self) -> &User {
        &self.actor
    }

    fn require_admin(&self) -> Result<(), DomainError> {
        if self.actor.role.can_manage_users() {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "Only administrators can manage accounts".to_string(),
            ))
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.require_admin()?;
        Ok(self.directory.list_users().await?)
    }

    pub async fn create_user(&self, user: NewUser) -> Result<User, DomainError> {
        self.require_admin()?;
        let user = NewUser {
            username: user.username.trim().to_string(),
            email: user.email.trim().to_string(),
            ..user
        };
        if user.username.is_empty() || user.email.is_empty() || user.password.is_empty() {
            return Err(DomainError::Validation(
                "Username, email and password are required".to_string(),
            ));
        }
        check_email(&user.email)?;

        let created = self.directory.create_user(&user).await?;
        tracing::info!(user_id = %created.id, role = created.role.as_str(), "Account created");
        Ok(created)
    }

    pub async fn update_user(&self, id: &UserId, patch: UserPatch) -> Result<User, DomainError> {
        self.require_admin()?;
        if let Some(email) = &patch.email {
            check_email(email)?;
        }
        if patch.username.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(DomainError::Validation("Username must not be empty".to_string()));
        }
        self.directory
            .update_user(id, &patch)
            .await
            .map_err(|e| e.for_entity("user", id))
    }

    pub async fn delete_user(&self, id: &UserId) -> Result<(), DomainError> {
        self.require_admin()?;
        self.directory
            .delete_user(id)
            .await
            .map_err(|e| e.for_entity("user", id))?;
        tracing::info!(user_id = %id, "Account deleted");
        Ok(())
    }

    /// Any signed-in user may change their own password.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), DomainError> {
        if new.is_empty() {
            return Err(DomainError::Validation(
                "New password must not be empty".to_string(),
            ));
        }
        Ok(self.directory.change_password(current, new).await?)
    }
}

fn check_email(email: &str) -> Result<(), DomainError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(DomainError::Validation("Invalid email address".to_string()))
    }
}
