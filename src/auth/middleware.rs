//! Per-request authentication gate.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::cookie::{ACCESS_COOKIE_NAME, get_token_cookie};
use super::errors::AuthError;
use super::state::AuthState;

/// Reject the request unless it carries an acceptable access token.
///
/// On success the [`RequestIdentity`](super::RequestIdentity) is inserted
/// into request extensions and the downstream handler runs. On failure the
/// handler never runs. Role checks are left to the handlers.
///
/// ```ignore
/// Router::new()
///     .route("/reviews/{id}", delete(delete_review))
///     .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
/// ```
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token =
        get_token_cookie(request.headers(), ACCESS_COOKIE_NAME).ok_or(AuthError::MissingCredential)?;

    let identity = state.sessions.authenticate(token).await?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
