//! REST backend over `reqwest`.

mod client;
mod posts;
mod users;

pub use client::{HttpBackend, HttpConfig};
