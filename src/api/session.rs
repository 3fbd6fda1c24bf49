//! Session API endpoints.
//!
//! - POST `/refresh` - Exchange the refresh cookie for a new pair
//! - POST `/logout` - End the session and clear both cookies
//! - GET `/session` - Identity of the current access token (protected)

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{
    ACCESS_COOKIE_NAME, Auth, AuthError, AuthState, REFRESH_COOKIE_NAME, cleared_cookies,
    get_token_cookie, pair_cookies,
};
use crate::db::UserRole;

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
pub(super) struct SessionResponse {
    user_id: String,
    role: UserRole,
}

/// Rotate both tokens. Every failure is a uniform 401.
pub(super) async fn refresh(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let refresh_token =
        get_token_cookie(&headers, REFRESH_COOKIE_NAME).ok_or(AuthError::MissingCredential)?;

    let pair = state.sessions.refresh(refresh_token).await?;

    let [access_cookie, refresh_cookie] = pair_cookies(&pair, state.secure_cookies);
    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(MessageResponse {
            message: "Tokens refreshed",
        }),
    ))
}

/// Always succeeds. The session record is deleted when either cookie
/// still identifies the user.
pub(super) async fn logout(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(user_id) = identify(&state, &headers) {
        if let Err(e) = state.sessions.end(&user_id).await {
            warn!(user_id = %user_id, error = %e, "Failed to delete session on logout");
        }
    }

    let [clear_access, clear_refresh] = cleared_cookies(state.secure_cookies);
    (
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, clear_access), (SET_COOKIE, clear_refresh)]),
        Json(MessageResponse {
            message: "Logged out",
        }),
    )
}

pub(super) async fn current_session(auth: Auth) -> Json<SessionResponse> {
    let identity = auth.into_inner();
    Json(SessionResponse {
        user_id: identity.user_id,
        role: identity.role,
    })
}

fn identify(state: &AuthState, headers: &HeaderMap) -> Option<String> {
    let validator = state.sessions.validator();

    let from_access = get_token_cookie(headers, ACCESS_COOKIE_NAME)
        .and_then(|token| validator.validate_access(token).ok());
    let claims = match from_access {
        Some(claims) => claims,
        None => {
            let token = get_token_cookie(headers, REFRESH_COOKIE_NAME)?;
            match validator.validate_refresh(token) {
                Ok(claims) => claims,
                Err(e) => {
                    debug!(reason = %e, "Logout without a valid credential");
                    return None;
                }
            }
        }
    };
    Some(claims.user_id)
}
