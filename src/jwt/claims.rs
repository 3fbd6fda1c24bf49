use serde::{Deserialize, Serialize};

use crate::db::{User, UserRole};

/// Value of the `iss` claim for every token minted here.
pub const ISSUER: &str = "catalog-auth";

/// A verified identity, as handed over by the login collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    /// Opaque stable user identifier
    pub user_id: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            user_id: user.user_id.clone(),
        }
    }
}

/// JWT claims shared by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub user_id: String,
    /// JWT ID, unique per minted token
    pub jti: String,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    pub(crate) fn new(identity: &Identity, issued_at: u64, lifetime_secs: u64) -> Self {
        Self {
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            role: identity.role,
            user_id: identity.user_id.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            iss: ISSUER.to_string(),
            iat: issued_at,
            exp: issued_at + lifetime_secs,
        }
    }

    /// The identity fields, without the registered claims.
    pub fn identity(&self) -> Identity {
        Identity {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
            user_id: self.user_id.clone(),
        }
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        self.exp < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: UserRole::Admin,
            user_id: "u1".to_string(),
        }
    }

    #[test]
    fn test_new_claims_carry_identity() {
        let claims = Claims::new(&identity(), 1_000, 60);
        assert_eq!(claims.identity(), identity());
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 1_060);
    }

    #[test]
    fn test_jti_is_unique() {
        let a = Claims::new(&identity(), 1_000, 60);
        let b = Claims::new(&identity(), 1_000, 60);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expiry_boundary() {
        let claims = Claims::new(&identity(), 1_000, 60);
        assert!(!claims.is_expired_at(1_060));
        assert!(claims.is_expired_at(1_061));
    }
}
