#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{Router, body::Body, http::Response};
use catalog_auth::{
    ServerConfig,
    auth::{IdentityError, IdentityProvider, LoginRequest, SessionManager, SessionPolicy},
    create_app,
    db::{Database, SessionRecord, SessionStore, StoreError, UserRole},
    jwt::{Identity, TokenSecrets},
};

pub const ACCESS_SECRET: &str = "test-access-secret-0123456789abcdef";
pub const REFRESH_SECRET: &str = "test-refresh-secret-0123456789abcdef";

pub fn secrets() -> TokenSecrets {
    TokenSecrets::new(ACCESS_SECRET, REFRESH_SECRET)
}

pub fn identity(user_id: &str, role: UserRole) -> Identity {
    Identity {
        email: format!("{}@example.com", user_id),
        first_name: "Test".to_string(),
        last_name: user_id.to_string(),
        role,
        user_id: user_id.to_string(),
    }
}

/// A running app plus direct handles on what it is built from.
pub struct TestApp {
    pub app: Router,
    pub db: Database,
    /// Shares the app's session store
    pub sessions: SessionManager,
}

pub async fn test_config(
    policy: SessionPolicy,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
) -> ServerConfig {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    ServerConfig {
        db,
        secrets: secrets(),
        secure_cookies: false,
        session_policy: policy,
        identity_provider,
    }
}

pub async fn create_test_app(policy: SessionPolicy) -> TestApp {
    build(test_config(policy, None).await)
}

pub async fn create_test_app_with_login(provider: StaticIdentityProvider) -> TestApp {
    build(test_config(SessionPolicy::Advisory, Some(Arc::new(provider))).await)
}

fn build(config: ServerConfig) -> TestApp {
    TestApp {
        app: create_app(&config),
        sessions: config.session_manager(),
        db: config.db,
    }
}

/// Accepts exactly one email/password pair.
pub struct StaticIdentityProvider {
    pub email: String,
    pub password: String,
    pub identity: Identity,
}

impl StaticIdentityProvider {
    pub fn new(password: &str, identity: Identity) -> Self {
        Self {
            email: identity.email.clone(),
            password: password.to_string(),
            identity,
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(
        &self,
        request: &LoginRequest,
    ) -> Result<Option<Identity>, IdentityError> {
        if request.email.eq_ignore_ascii_case(&self.email) && request.password == self.password {
            Ok(Some(self.identity.clone()))
        } else {
            Ok(None)
        }
    }
}

/// Every operation times out.
pub struct FailingSessionStore;

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn persist_pair(&self, _: &str, _: &str, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Timeout(Duration::from_secs(10)))
    }

    async fn get(&self, _: &str) -> Result<Option<SessionRecord>, StoreError> {
        Err(StoreError::Timeout(Duration::from_secs(10)))
    }

    async fn remove(&self, _: &str) -> Result<bool, StoreError> {
        Err(StoreError::Timeout(Duration::from_secs(10)))
    }
}

pub fn auth_cookies(access_token: &str, refresh_token: &str) -> String {
    format!(
        "access_token={}; refresh_token={}",
        access_token, refresh_token
    )
}

pub fn access_cookie_only(access_token: &str) -> String {
    format!("access_token={}", access_token)
}

pub fn refresh_cookie_only(refresh_token: &str) -> String {
    format!("refresh_token={}", refresh_token)
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Value of a cookie set by the response, if any.
pub fn set_cookie_value(cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    cookies.iter().find_map(|c| {
        let rest = c.strip_prefix(&prefix)?;
        Some(rest.split(';').next().unwrap_or("").to_string())
    })
}

/// Check if cookies contain a token being cleared (Max-Age=0)
pub fn has_cleared_cookie(cookies: &[String], cookie_name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=;", cookie_name)) && c.contains("Max-Age=0"))
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
