//! Axum extractors for role-gated handlers.

use std::marker::PhantomData;
use std::ops::Deref;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::errors::AuthError;
use super::types::RequestIdentity;
use crate::db::UserRole;

/// Role requirement checked by [`Auth`].
pub trait RoleConstraint: Send + Sync + 'static {
    /// Exact role required, or `None` for any authenticated identity.
    const REQUIRED: Option<UserRole>;
}

/// Only `admin` identities.
pub struct AdminOnly;

impl RoleConstraint for AdminOnly {
    const REQUIRED: Option<UserRole> = Some(UserRole::Admin);
}

/// Only `user` identities. An admin does not satisfy this.
pub struct UserOnly;

impl RoleConstraint for UserOnly {
    const REQUIRED: Option<UserRole> = Some(UserRole::User);
}

/// Any authenticated identity.
pub struct AnyRole;

impl RoleConstraint for AnyRole {
    const REQUIRED: Option<UserRole> = None;
}

/// Check an identity's role against an exact requirement.
pub fn require_role(identity: &RequestIdentity, required: UserRole) -> Result<(), AuthError> {
    if identity.role == required {
        Ok(())
    } else {
        Err(AuthError::Forbidden {
            required,
            actual: identity.role,
        })
    }
}

/// The request identity, gated by role `R`.
///
/// Must run behind [`require_auth`](super::require_auth). Without it the
/// extractor rejects with 401 because no identity was ever attached.
pub struct Auth<R: RoleConstraint = AnyRole>(pub RequestIdentity, PhantomData<R>);

impl<R: RoleConstraint> Auth<R> {
    pub fn into_inner(self) -> RequestIdentity {
        self.0
    }
}

impl<R: RoleConstraint> Deref for Auth<R> {
    type Target = RequestIdentity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, R> FromRequestParts<S> for Auth<R>
where
    S: Send + Sync,
    R: RoleConstraint,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<RequestIdentity>()
            .cloned()
            .ok_or(AuthError::MissingCredential)?;

        if let Some(required) = R::REQUIRED {
            require_role(&identity, required)?;
        }

        Ok(Auth(identity, PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{Claims, Identity};
    use axum::http::Request;

    fn request_identity(role: UserRole) -> RequestIdentity {
        let identity = Identity {
            email: "u1@example.com".to_string(),
            first_name: "Una".to_string(),
            last_name: "One".to_string(),
            role,
            user_id: "u1".to_string(),
        };
        RequestIdentity::from(Claims::new(&identity, 1_700_000_000, 60))
    }

    fn parts_with(identity: Option<RequestIdentity>) -> Parts {
        let mut request = Request::builder().uri("/").body(()).unwrap();
        if let Some(identity) = identity {
            request.extensions_mut().insert(identity);
        }
        request.into_parts().0
    }

    #[test]
    fn test_require_role_is_exact() {
        let admin = request_identity(UserRole::Admin);
        assert!(require_role(&admin, UserRole::Admin).is_ok());
        assert!(matches!(
            require_role(&admin, UserRole::User),
            Err(AuthError::Forbidden {
                required: UserRole::User,
                actual: UserRole::Admin
            })
        ));
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let mut parts = parts_with(None);
        let result = Auth::<AnyRole>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingCredential)));
    }

    #[tokio::test]
    async fn test_admin_only() {
        let mut parts = parts_with(Some(request_identity(UserRole::Admin)));
        let auth = Auth::<AdminOnly>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(auth.user_id, "u1");

        let mut parts = parts_with(Some(request_identity(UserRole::User)));
        let result = Auth::<AdminOnly>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_user_only_rejects_admin() {
        let mut parts = parts_with(Some(request_identity(UserRole::Admin)));
        let result = Auth::<UserOnly>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_any_role() {
        for role in [UserRole::User, UserRole::Admin] {
            let mut parts = parts_with(Some(request_identity(role)));
            let auth = Auth::<AnyRole>::from_request_parts(&mut parts, &())
                .await
                .unwrap();
            assert_eq!(auth.role, role);
        }
    }
}
