//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod credentials;
mod posts;
mod users;

pub use credentials::CredentialProvider;
pub use posts::PostGateway;
pub use users::UserDirectory;
