//! Shared authentication state.

use std::sync::Arc;

use super::session::SessionManager;

/// State needed by [`require_auth`](super::require_auth) and the session
/// endpoints.
#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<SessionManager>,
    /// Whether to add `Secure` to cookies (public origin is https)
    pub secure_cookies: bool,
}

impl AuthState {
    pub fn new(sessions: SessionManager, secure_cookies: bool) -> Self {
        Self {
            sessions: Arc::new(sessions),
            secure_cookies,
        }
    }
}
