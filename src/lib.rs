pub mod api;
pub mod auth;
pub mod cleanup;
pub mod cli;
pub mod db;
pub mod jwt;

use std::net::SocketAddr;
use std::sync::Arc;

use api::create_api_router;
use auth::{AuthState, IdentityProvider, SessionManager, SessionPolicy};
use axum::Router;
use db::Database;
use jwt::TokenSecrets;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Access and refresh signing secrets
    pub secrets: TokenSecrets,
    /// Whether to set Secure flag on cookies (should be true in production with HTTPS)
    pub secure_cookies: bool,
    /// Whether the session store can revoke tokens
    pub session_policy: SessionPolicy,
    /// Credential check for `/api/login`. Without one the route is not mounted.
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
}

impl ServerConfig {
    /// A session manager backed by this config's SQLite session store.
    pub fn session_manager(&self) -> SessionManager {
        SessionManager::new(
            &self.secrets,
            Arc::new(self.db.sessions()),
            self.session_policy,
        )
    }

    /// State for [`auth::require_auth`], for services that mount their own
    /// protected routes next to [`create_app`].
    pub fn auth_state(&self) -> AuthState {
        AuthState::new(self.session_manager(), self.secure_cookies)
    }
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    Router::new().nest(
        "/api",
        create_api_router(config.auth_state(), config.identity_provider.clone()),
    )
}

/// Run cleanup tasks and spawn background scheduler.
/// Call this before starting the server.
pub async fn init_cleanup(db: &Database) {
    cleanup::run_cleanup(db).await;
    cleanup::spawn_cleanup_scheduler(db.clone());
}

/// Run the server on the given listener. This function blocks until the server exits.
/// Call `init_cleanup` before this to run cleanup on startup.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
