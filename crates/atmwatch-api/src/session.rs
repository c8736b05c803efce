// Session token context
//
// One shared cell holds the current bearer token. The application root
// constructs a `SessionContext` and hands clones to the client and any
// consumer that needs to observe login state -- there is no ambient
// global. Mutation is a single reference swap under the lock, so readers
// racing a write always see either the old or the new token, never a
// torn state.

use std::sync::{Arc, RwLock};

use secrecy::SecretString;
use tracing::debug;

/// Shared handle to the current session's bearer token.
///
/// Lifecycle: set on successful login, cleared on logout or on any
/// authentication rejection (401) from the backend. Absence means
/// logged out.
#[derive(Clone, Default)]
pub struct SessionContext {
    token: Arc<RwLock<Option<SecretString>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context pre-populated with a persisted token.
    pub fn with_token(token: SecretString) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token))),
        }
    }

    /// Store a new token (successful login).
    pub fn set(&self, token: SecretString) {
        debug!("session token stored");
        *self.token.write().expect("session lock poisoned") = Some(token);
    }

    /// Read the current token, if any.
    pub fn token(&self) -> Option<SecretString> {
        self.token.read().expect("session lock poisoned").clone()
    }

    /// Drop the token (logout or 401 rejection).
    pub fn clear(&self) {
        debug!("session token cleared");
        *self.token.write().expect("session lock poisoned") = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().expect("session lock poisoned").is_some()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_logged_out() {
        let session = SessionContext::new();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn set_and_clear_round_trip() {
        let session = SessionContext::new();
        session.set(SecretString::from("tok".to_string()));
        assert!(session.is_authenticated());

        session.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn clones_share_the_same_cell() {
        let session = SessionContext::new();
        let observer = session.clone();

        session.set(SecretString::from("tok".to_string()));
        assert!(observer.is_authenticated());

        observer.clear();
        assert!(!session.is_authenticated());
    }
}
