//! Explicit session context carrying the API token.

use std::sync::Arc;

use parking_lot::RwLock;

/// Shared handle to the current authentication token.
///
/// The token is set on login, read on every request and cleared when the
/// backend rejects it. Clones share the same token.
///
/// # Example
///
/// ```rust
/// use pikawatch_client::Session;
///
/// let session = Session::with_token("secret");
/// let observer = session.clone();
///
/// session.clear();
/// assert!(!observer.is_authenticated());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    /// Create an anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with an existing token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(token);
        session
    }

    /// Replace the token.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        *self.token.write() = if token.is_empty() { None } else { Some(token) };
    }

    /// Current token, if any.
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Forget the token.
    pub fn clear(&self) {
        *self.token.write() = None;
    }

    /// Whether a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_anonymous() {
        let session = Session::with_token("");
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_clones_share_token() {
        let session = Session::new();
        let other = session.clone();
        session.set_token("abc");
        assert_eq!(other.token().as_deref(), Some("abc"));
        other.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_token_visible_across_threads() {
        let session = Session::new();
        let writer = session.clone();
        std::thread::spawn(move || writer.set_token("from-thread"))
            .join()
            .unwrap();
        assert_eq!(session.token().as_deref(), Some("from-thread"));
    }
}
