use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};

use super::{Claims, ISSUER, TokenError, TokenKind, TokenSecrets, now_secs};

/// Signing algorithms accepted on incoming tokens (HMAC family only).
pub const ACCEPTED_ALGORITHMS: [Algorithm; 3] =
    [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Verifies tokens against the secret of their kind.
///
/// Access and refresh keys are fixed at construction, so an access token can
/// never be checked against the refresh secret or the other way round.
#[derive(Clone)]
pub struct TokenValidator {
    access: DecodingKey,
    refresh: DecodingKey,
}

impl TokenValidator {
    pub fn new(secrets: &TokenSecrets) -> Self {
        Self {
            access: DecodingKey::from_secret(secrets.get(TokenKind::Access)),
            refresh: DecodingKey::from_secret(secrets.get(TokenKind::Refresh)),
        }
    }

    /// Validate and decode an access token.
    pub fn validate_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(TokenKind::Access, token)
    }

    /// Validate and decode a refresh token.
    pub fn validate_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(TokenKind::Refresh, token)
    }

    pub fn validate(&self, kind: TokenKind, token: &str) -> Result<Claims, TokenError> {
        let now = now_secs().map_err(|_| TokenError::Clock)?;
        validate_at(token, self.key(kind), now)
    }

    fn key(&self, kind: TokenKind) -> &DecodingKey {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

/// Validate `token` against a raw secret.
pub fn validate(token: &str, secret: &[u8]) -> Result<Claims, TokenError> {
    let now = now_secs().map_err(|_| TokenError::Clock)?;
    validate_at(token, &DecodingKey::from_secret(secret), now)
}

/// Checks run in order: structure, algorithm, signature, registered claims,
/// then expiry again against `now` and the `exp > iat` invariant.
pub(crate) fn validate_at(
    token: &str,
    key: &DecodingKey,
    now: u64,
) -> Result<Claims, TokenError> {
    let header = jsonwebtoken::decode_header(token).map_err(|e| header_error(token, e))?;

    if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
        return Err(TokenError::AlgorithmMismatch(alg_name(header.alg)));
    }

    let mut validation = Validation::new(header.alg);
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iat", "iss"]);

    let claims = jsonwebtoken::decode::<Claims>(token, key, &validation)
        .map_err(|e| classify(e, header.alg))?
        .claims;

    // Do not rely on the library's expiry check alone.
    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }

    if claims.exp <= claims.iat {
        return Err(TokenError::Malformed(
            "expiry does not follow issue time".to_string(),
        ));
    }

    Ok(claims)
}

/// `decode_header` only knows the algorithms jsonwebtoken implements, so
/// `"none"` or an unknown name fails there. Read the raw `alg` to tell those
/// apart from a header that is simply broken.
fn header_error(token: &str, err: jsonwebtoken::errors::Error) -> TokenError {
    match raw_alg(token) {
        Some(alg) if !accepted_name(&alg) => TokenError::AlgorithmMismatch(alg),
        _ => TokenError::Malformed(err.to_string()),
    }
}

fn raw_alg(token: &str) -> Option<String> {
    let segment = token.split('.').next()?;
    let bytes = URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).ok()?;
    let header: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    header.get("alg")?.as_str().map(str::to_string)
}

fn accepted_name(alg: &str) -> bool {
    alg.parse::<Algorithm>()
        .is_ok_and(|alg| ACCEPTED_ALGORITHMS.contains(&alg))
}

fn alg_name(alg: Algorithm) -> String {
    format!("{:?}", alg)
}

fn classify(err: jsonwebtoken::errors::Error, alg: Algorithm) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
        ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
            TokenError::AlgorithmMismatch(alg_name(alg))
        }
        _ => TokenError::Malformed(err.to_string()),
    }
}
