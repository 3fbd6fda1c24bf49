//! Signed session tokens.
//!
//! Access and refresh tokens share one claims shape but are signed with
//! distinct secrets and carry different lifetimes. Issuance lives in
//! [`TokenIssuer`], verification in [`TokenValidator`].

mod claims;
mod error;
mod issuer;
mod validator;

use std::fmt;
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

pub use claims::{Claims, ISSUER, Identity};
pub use error::{SigningError, TokenError};
pub use issuer::{TokenIssuer, TokenPair};
pub use validator::{ACCEPTED_ALGORITHMS, TokenValidator, validate};

/// Access token lifetime: 24 hours
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 24 * 60 * 60;

/// Refresh token lifetime: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// The two token kinds. Each is signed with its own secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn lifetime_secs(self) -> u64 {
        match self {
            TokenKind::Access => ACCESS_TOKEN_DURATION_SECS,
            TokenKind::Refresh => REFRESH_TOKEN_DURATION_SECS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signing secrets for both token kinds, loaded once at startup.
#[derive(Clone)]
pub struct TokenSecrets {
    access: Vec<u8>,
    refresh: Vec<u8>,
}

impl TokenSecrets {
    pub fn new(access: impl Into<Vec<u8>>, refresh: impl Into<Vec<u8>>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    pub fn get(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// True when both secrets are set and differ from each other.
    pub fn are_distinct(&self) -> bool {
        !self.access.is_empty() && !self.refresh.is_empty() && self.access != self.refresh
    }
}

impl fmt::Debug for TokenSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSecrets")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Current Unix time in seconds.
pub(crate) fn now_secs() -> Result<u64, SystemTimeError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}
