//! Login endpoint, mounted only when an identity provider is configured.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use tracing::{error, info};

use super::error::ApiError;
use crate::auth::{AuthState, IdentityProvider, LoginRequest, pair_cookies};
use crate::jwt::Identity;

#[derive(Clone)]
pub struct LoginState {
    pub auth: AuthState,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Verify credentials with the provider, then establish a session.
pub(super) async fn login(
    State(state): State<LoginState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let identity: Identity = state
        .identity
        .authenticate(&payload)
        .await
        .map_err(|e| {
            error!(error = %e, "Identity provider failed");
            ApiError::internal("Login failed")
        })?
        .ok_or_else(|| {
            info!(email = %payload.email, "Login rejected");
            ApiError::unauthorized("Invalid email or password")
        })?;

    let pair = state.auth.sessions.establish(&identity).await?;

    let [access_cookie, refresh_cookie] = pair_cookies(&pair, state.auth.secure_cookies);
    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(identity),
    ))
}
