//! Request identity context.

use crate::db::UserRole;
use crate::jwt::Claims;

/// Identity attached to a request after its access token was accepted.
///
/// Only [`require_auth`](super::require_auth) inserts this into request
/// extensions; handlers never see it for unauthenticated requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    pub user_id: String,
    pub role: UserRole,
    /// Full claims of the accepted access token
    pub claims: Claims,
}

impl From<Claims> for RequestIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id.clone(),
            role: claims.role,
            claims,
        }
    }
}
