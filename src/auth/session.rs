//! Session lifecycle: establish, refresh, authenticate, end.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::errors::AuthError;
use super::types::RequestIdentity;
use crate::db::{SessionRecord, SessionStore};
use crate::jwt::{Identity, TokenIssuer, TokenPair, TokenSecrets, TokenValidator};

/// How much weight the session store carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SessionPolicy {
    /// The store is an audit mirror. Any correctly signed, unexpired token is
    /// accepted and a failed store write never blocks a refresh.
    #[default]
    Advisory,
    /// Presented tokens must match the stored pair for their user, so a
    /// newer pair or a deleted record revokes older tokens.
    Authoritative,
}

impl SessionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPolicy::Advisory => "advisory",
            SessionPolicy::Authoritative => "authoritative",
        }
    }
}

pub struct SessionManager {
    issuer: TokenIssuer,
    validator: TokenValidator,
    store: Arc<dyn SessionStore>,
    policy: SessionPolicy,
}

impl SessionManager {
    pub fn new(secrets: &TokenSecrets, store: Arc<dyn SessionStore>, policy: SessionPolicy) -> Self {
        Self {
            issuer: TokenIssuer::new(secrets),
            validator: TokenValidator::new(secrets),
            store,
            policy,
        }
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Mint and persist a pair for a freshly verified identity.
    ///
    /// Unlike refresh, a store failure here fails the login.
    pub async fn establish(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        let pair = self.issuer.issue_pair(identity)?;
        self.store
            .persist_pair(&identity.user_id, &pair.access_token, &pair.refresh_token)
            .await?;

        info!(user_id = %identity.user_id, role = %identity.role, "Session established");
        Ok(pair)
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// Validation failures are returned as is, before anything is minted or
    /// written. Rotation is unconditional.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.validator.validate_refresh(refresh_token)?;

        if self.policy == SessionPolicy::Authoritative {
            self.ensure_current(&claims.user_id, |record| {
                record.refresh_token == refresh_token
            })
            .await?;
        }

        let identity = claims.identity();
        let pair = self.issuer.issue_pair(&identity)?;

        if let Err(e) = self
            .store
            .persist_pair(&identity.user_id, &pair.access_token, &pair.refresh_token)
            .await
        {
            match self.policy {
                SessionPolicy::Advisory => {
                    warn!(
                        user_id = %identity.user_id,
                        error = %e,
                        "Failed to persist refreshed session, returning new tokens anyway"
                    );
                }
                SessionPolicy::Authoritative => return Err(e.into()),
            }
        }

        debug!(user_id = %identity.user_id, "Session refreshed");
        Ok(pair)
    }

    /// Accept or reject an access token presented on a request.
    pub async fn authenticate(&self, access_token: &str) -> Result<RequestIdentity, AuthError> {
        let claims = self.validator.validate_access(access_token)?;

        if self.policy == SessionPolicy::Authoritative {
            self.ensure_current(&claims.user_id, |record| record.token == access_token)
                .await?;
        }

        Ok(RequestIdentity::from(claims))
    }

    /// Delete the session record for `user_id`. Returns whether one existed.
    pub async fn end(&self, user_id: &str) -> Result<bool, AuthError> {
        let removed = self.store.remove(user_id).await?;
        info!(user_id = %user_id, removed, "Session ended");
        Ok(removed)
    }

    pub async fn record(&self, user_id: &str) -> Result<Option<SessionRecord>, AuthError> {
        Ok(self.store.get(user_id).await?)
    }

    async fn ensure_current(
        &self,
        user_id: &str,
        matches: impl FnOnce(&SessionRecord) -> bool,
    ) -> Result<(), AuthError> {
        match self.store.get(user_id).await? {
            Some(record) if matches(&record) => Ok(()),
            _ => Err(AuthError::SessionRevoked),
        }
    }
}
