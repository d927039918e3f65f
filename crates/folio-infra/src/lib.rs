//! # Folio Infrastructure
//!
//! Concrete implementations of the ports defined in `folio-core`.
//!
//! ## Feature Flags
//!
//! - `http` (default) - REST backend via reqwest. Without it only the
//!   in-memory backend is built.

pub mod credentials;
pub mod memory;

#[cfg(feature = "http")]
pub mod http;

// Re-exports - In-Memory
pub use credentials::SessionCredentials;
pub use memory::{InMemoryBackend, InMemoryGateway};

// Re-exports - HTTP
#[cfg(feature = "http")]
pub use http::{HttpBackend, HttpConfig};
