//! # Folio Shared
//!
//! Wire types exchanged with the blog backend.
//! Kept free of domain types so the same contract can be reused by a server.

pub mod dto;
pub mod response;

pub use response::ApiResponse;
