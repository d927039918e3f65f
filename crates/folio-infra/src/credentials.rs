//! Session credential holder with an invalidation channel.

use tokio::sync::watch;

use folio_core::ports::CredentialProvider;

/// Bearer credential for the current session.
///
/// Session owners call [`subscribe`](Self::subscribe) and watch for the value
/// turning `None`, which happens when a gateway reports the credential as
/// rejected or the user signs out.
pub struct SessionCredentials {
    token: watch::Sender<Option<String>>,
}

impl SessionCredentials {
    pub fn new(token: Option<String>) -> Self {
        let (token, _) = watch::channel(token);
        Self { token }
    }

    pub fn signed_out() -> Self {
        Self::new(None)
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        self.token.send_replace(Some(token.into()));
        tracing::debug!("Session credential set");
    }

    pub fn sign_out(&self) {
        if self.token.send_replace(None).is_some() {
            tracing::info!("Signed out");
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }
}

impl Default for SessionCredentials {
    fn default() -> Self {
        Self::signed_out()
    }
}

impl CredentialProvider for SessionCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn invalidate(&self) {
        if self.token.send_replace(None).is_some() {
            tracing::warn!("Credential rejected by backend, session discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_and_out() {
        let credentials = SessionCredentials::signed_out();
        assert_eq!(credentials.bearer_token(), None);

        credentials.sign_in("abc");
        assert!(credentials.is_signed_in());
        assert_eq!(credentials.bearer_token().as_deref(), Some("abc"));

        credentials.sign_out();
        assert!(!credentials.is_signed_in());
    }

    #[tokio::test]
    async fn test_invalidate_notifies_subscribers() {
        let credentials = SessionCredentials::new(Some("abc".to_string()));
        let mut events = credentials.subscribe();

        credentials.invalidate();

        events.changed().await.unwrap();
        assert!(events.borrow().is_none());
        assert_eq!(credentials.bearer_token(), None);
    }
}
