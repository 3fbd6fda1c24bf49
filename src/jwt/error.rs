//! Token error taxonomy.

use super::TokenKind;

/// Reasons a token is rejected. All of them surface to clients as a uniform
/// "not authenticated"; the variant is only logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),
    /// Carries the raw `alg` header value, which may not be a known algorithm.
    #[error("unexpected signing algorithm {0}")]
    AlgorithmMismatch(String),
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token was not issued by this service")]
    InvalidIssuer,
    #[error("system clock error")]
    Clock,
}

/// Failure to mint a token. Never yields a partially signed pair.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("no {0} signing secret configured")]
    MissingSecret(TokenKind),
    #[error("failed to sign token: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("system clock error")]
    Clock,
}

impl SigningError {
    /// Configuration problems are fatal at startup; the rest are transient.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SigningError::MissingSecret(_))
    }
}
