//! Seam to the service that verifies credentials at login.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::jwt::Identity;

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// The provider could not answer (not a credential mismatch).
#[derive(Debug, thiserror::Error)]
#[error("identity provider failure: {0}")]
pub struct IdentityError(pub String);

/// Verifies login credentials and returns the identity to mint tokens for.
///
/// `Ok(None)` means the credentials did not match.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, request: &LoginRequest) -> Result<Option<Identity>, IdentityError>;
}
