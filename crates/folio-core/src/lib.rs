//! # Folio Core
//!
//! The domain layer of the Folio client: posts, their images and their
//! revision history. Talks to the backend only through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, GatewayError};
