//! In-process backend: the blog API's behavior without a server.

mod backend;

pub use backend::{InMemoryBackend, InMemoryGateway};

#[cfg(test)]
mod tests;
