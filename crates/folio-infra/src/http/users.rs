//! Auth endpoints and `UserDirectory` over `/users`.

use async_trait::async_trait;
use reqwest::Method;

use folio_core::domain::{NewUser, Role, User, UserId, UserPatch};
use folio_core::error::GatewayError;
use folio_core::ports::UserDirectory;
use folio_shared::dto::{
    AuthPayload, ChangePasswordRequest, CreateUserRequest, LoginRequest, RegisterRequest,
    UpdateUserRequest,
};

use super::client::HttpBackend;

impl HttpBackend {
    /// Exchange credentials for the account and its bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), GatewayError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let payload: AuthPayload<User> = self
            .send(self.anonymous(Method::POST, "auth/login").json(&body))
            .await?;
        tracing::info!(user_id = %payload.user.id, "Signed in");
        Ok((payload.user, payload.token))
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<(User, String), GatewayError> {
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: role.map(|r| r.as_str().to_string()),
        };
        let payload: AuthPayload<User> = self
            .send(self.anonymous(Method::POST, "auth/register").json(&body))
            .await?;
        Ok((payload.user, payload.token))
    }
}

fn update_body(patch: &UserPatch) -> UpdateUserRequest {
    UpdateUserRequest {
        username: patch.username.clone(),
        email: patch.email.clone(),
        role: patch.role.map(|r| r.as_str().to_string()),
    }
}

#[async_trait]
impl UserDirectory for HttpBackend {
    async fn current_user(&self) -> Result<User, GatewayError> {
        self.send(self.request(Method::GET, "auth/profile")).await
    }

    async fn list_users(&self) -> Result<Vec<User>, GatewayError> {
        self.send(self.request(Method::GET, "users")).await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, GatewayError> {
        self.send(self.request(Method::GET, &format!("users/{id}")))
            .await
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, GatewayError> {
        let body = CreateUserRequest {
            username: user.username.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            role: user.role.as_str().to_string(),
        };
        self.send(self.request(Method::POST, "users").json(&body))
            .await
    }

    async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<User, GatewayError> {
        let request = self
            .request(Method::PUT, &format!("users/{id}"))
            .json(&update_body(patch));
        self.send(request).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), GatewayError> {
        self.send_empty(self.request(Method::DELETE, &format!("users/{id}")))
            .await
    }

    async fn change_password(&self, current: &str, new: &str) -> Result<(), GatewayError> {
        let body = ChangePasswordRequest {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        self.send_empty(self.request(Method::POST, "users/change-password").json(&body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_change_only() {
        let patch = UserPatch {
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(update_body(&patch)).unwrap(),
            serde_json::json!({"role": "admin"})
        );
    }
}
