//! Admin API endpoints.
//!
//! All endpoints require admin role.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use tracing::info;

use super::error::{ApiError, ResultExt};
use crate::auth::{AdminOnly, Auth, AuthState};

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/sessions/{user_id}", get(get_session).delete(revoke_session))
        .with_state(state)
}

#[derive(Serialize)]
struct SessionSummary {
    user_id: String,
    updated_at: String,
}

#[derive(Serialize)]
struct RevokeResponse {
    revoked: bool,
}

/// When the user's session was last written. Tokens are never exposed.
async fn get_session(
    State(state): State<AuthState>,
    _auth: Auth<AdminOnly>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .sessions
        .record(&user_id)
        .await
        .store_err("Failed to get session")?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;

    Ok(Json(SessionSummary {
        user_id: record.user_id,
        updated_at: record.updated_at,
    }))
}

async fn revoke_session(
    State(state): State<AuthState>,
    auth: Auth<AdminOnly>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let revoked = state
        .sessions
        .end(&user_id)
        .await
        .store_err("Failed to revoke session")?;

    info!(admin = %auth.user_id, user_id = %user_id, revoked, "Session revoked by admin");
    Ok(Json(RevokeResponse { revoked }))
}
