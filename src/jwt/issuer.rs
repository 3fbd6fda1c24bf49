use jsonwebtoken::{Algorithm, EncodingKey, Header};

use super::{Claims, Identity, SigningError, TokenKind, TokenSecrets, now_secs};

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Issued at timestamp shared by both tokens (Unix seconds)
    pub issued_at: u64,
}

impl TokenPair {
    pub fn access_expires_at(&self) -> u64 {
        self.issued_at + TokenKind::Access.lifetime_secs()
    }

    pub fn refresh_expires_at(&self) -> u64 {
        self.issued_at + TokenKind::Refresh.lifetime_secs()
    }
}

/// Mints HS256-signed token pairs.
#[derive(Clone)]
pub struct TokenIssuer {
    access: Option<EncodingKey>,
    refresh: Option<EncodingKey>,
}

impl TokenIssuer {
    /// Create an issuer. Empty secrets are accepted here and reported as
    /// [`SigningError::MissingSecret`] on first use.
    pub fn new(secrets: &TokenSecrets) -> Self {
        Self {
            access: signing_key(secrets.get(TokenKind::Access)),
            refresh: signing_key(secrets.get(TokenKind::Refresh)),
        }
    }

    /// Mint an access token (24h) and a refresh token (7d) for `identity`.
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, SigningError> {
        let now = now_secs().map_err(|_| SigningError::Clock)?;
        self.issue_pair_at(identity, now)
    }

    pub(crate) fn issue_pair_at(
        &self,
        identity: &Identity,
        now: u64,
    ) -> Result<TokenPair, SigningError> {
        let access_key = self.key(TokenKind::Access)?;
        let refresh_key = self.key(TokenKind::Refresh)?;

        let access_claims = Claims::new(identity, now, TokenKind::Access.lifetime_secs());
        let refresh_claims = Claims::new(identity, now, TokenKind::Refresh.lifetime_secs());

        Ok(TokenPair {
            access_token: sign(&access_claims, access_key)?,
            refresh_token: sign(&refresh_claims, refresh_key)?,
            issued_at: now,
        })
    }

    fn key(&self, kind: TokenKind) -> Result<&EncodingKey, SigningError> {
        let key = match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        };
        key.as_ref().ok_or(SigningError::MissingSecret(kind))
    }
}

fn signing_key(secret: &[u8]) -> Option<EncodingKey> {
    (!secret.is_empty()).then(|| EncodingKey::from_secret(secret))
}

fn sign(claims: &Claims, key: &EncodingKey) -> Result<String, SigningError> {
    Ok(jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        key,
    )?)
}
