use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Account role. Only `Admin` may delete posts or manage accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    pub fn can_delete_posts(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// User entity - owned by the account service, referenced by posts and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user reference as returned by the backend: populated or a bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Populated(User),
    Id(UserId),
}

impl UserRef {
    pub fn id(&self) -> &UserId {
        match self {
            UserRef::Populated(user) => &user.id,
            UserRef::Id(id) => id,
        }
    }

    /// Username when populated, otherwise the raw id.
    pub fn display_name(&self) -> &str {
        match self {
            UserRef::Populated(user) => &user.username,
            UserRef::Id(id) => id.as_str(),
        }
    }
}

impl From<User> for UserRef {
    fn from(user: User) -> Self {
        UserRef::Populated(user)
    }
}

/// Fields for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Partial account update.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.role.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_admin_is_privileged() {
        assert!(Role::Admin.can_delete_posts());
        assert!(Role::Admin.can_manage_users());
        assert!(!Role::Employee.can_delete_posts());
        assert!(!Role::Employee.can_manage_users());
    }

    #[test]
    fn test_user_ref_accepts_bare_id() {
        let reference: UserRef = serde_json::from_str("\"u-1\"").unwrap();
        assert_eq!(reference.id().as_str(), "u-1");
        assert_eq!(reference.display_name(), "u-1");
    }

    #[test]
    fn test_user_ref_accepts_populated_user() {
        let json = r#"{
            "_id": "u-2",
            "username": "lan",
            "email": "lan@example.com",
            "role": "admin",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }"#;
        let reference: UserRef = serde_json::from_str(json).unwrap();
        assert_eq!(reference.id().as_str(), "u-2");
        assert_eq!(reference.display_name(), "lan");
        match reference {
            UserRef::Populated(user) => assert_eq!(user.role, Role::Admin),
            UserRef::Id(_) => panic!("expected populated user"),
        }
    }
}
