mod admin;
mod error;
mod login;
mod session;

use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde::Serialize;

use crate::auth::{AuthState, IdentityProvider, require_auth};

pub use error::{ApiError, ResultExt};
pub use login::LoginState;

/// Create the API router.
///
/// `/login` is only mounted when an identity provider is given.
pub fn create_api_router(
    state: AuthState,
    identity: Option<Arc<dyn IdentityProvider>>,
) -> Router {
    let protected = Router::new()
        .route("/session", get(session::current_session))
        .nest("/admin", admin::router(state.clone()))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/refresh", post(session::refresh))
        .route("/logout", post(session::logout))
        .with_state(state.clone())
        .merge(protected);

    if let Some(identity) = identity {
        let login_state = LoginState {
            auth: state,
            identity,
        };
        router = router.route("/login", post(login::login).with_state(login_state));
    }

    router
}

#[derive(Serialize)]
struct HealthResponse {
    message: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Session service is running",
    })
}
