//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::db::{StoreError, UserRole};
use crate::jwt::{SigningError, TokenError};

/// Everything that can stop a request at the auth layer.
///
/// Token, credential and revocation failures all answer with the same
/// body so a client cannot tell an expired token from a forged one. The
/// specific reason is only logged.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no credential presented")]
    MissingCredential,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("session is no longer current")]
    SessionRevoked,
    #[error("role {actual} does not satisfy required role {required}")]
    Forbidden {
        required: UserRole,
        actual: UserRole,
    },
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential | AuthError::Token(_) | AuthError::SessionRevoked => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::Signing(_) | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
    }

    fn message(&self) -> &'static str {
        match self {
            AuthError::MissingCredential | AuthError::Token(_) | AuthError::SessionRevoked => {
                "Not authenticated"
            }
            AuthError::Forbidden { .. } => "Insufficient permissions",
            AuthError::Signing(_) | AuthError::Store(_) => "Internal server error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        match &self {
            AuthError::Signing(_) | AuthError::Store(_) => {
                tracing::error!(error = %self, "Request aborted by auth failure");
            }
            AuthError::Forbidden { required, actual } => {
                tracing::debug!(%required, %actual, "Role check failed");
            }
            _ => tracing::debug!(reason = %self, "Authentication rejected"),
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_token_failures_are_uniform() {
        let errors = [
            AuthError::MissingCredential,
            AuthError::SessionRevoked,
            AuthError::Token(TokenError::Expired),
            AuthError::Token(TokenError::InvalidSignature),
            AuthError::Token(TokenError::Malformed("bad".to_string())),
            AuthError::Token(TokenError::AlgorithmMismatch("none".to_string())),
        ];

        for err in errors {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.message(), "Not authenticated");
        }
    }

    #[test]
    fn test_forbidden_is_distinct() {
        let err = AuthError::Forbidden {
            required: UserRole::User,
            actual: UserRole::Admin,
        };
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_store_failure_is_server_error() {
        let err = AuthError::from(StoreError::Timeout(Duration::from_secs(10)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
