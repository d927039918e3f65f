//! Session credential port.

/// Supplies the bearer credential for outbound calls.
///
/// Gateways call `invalidate` when the backend rejects the credential; the
/// provider then raises its own invalidation event for whoever owns the session.
pub trait CredentialProvider: Send + Sync {
    /// Current bearer token, if signed in.
    fn bearer_token(&self) -> Option<String>;

    /// Discard the current credential.
    fn invalidate(&self);
}
