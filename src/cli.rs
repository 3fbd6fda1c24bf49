//! CLI argument parsing, validation, and startup helpers.

use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use url::Url;
use uuid::Uuid;

use crate::ServerConfig;
use crate::auth::SessionPolicy;
use crate::db::{Database, NewUser, UserRole};
use crate::jwt::{Identity, TokenSecrets};

const MIN_SECRET_LENGTH: usize = 32;

pub const ACCESS_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";
pub const REFRESH_SECRET_ENV: &str = "REFRESH_TOKEN_SECRET";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "catalog-auth",
    about = "Session tokens and refresh for the catalog API"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "sessions.db")]
    pub database: String,

    /// Public origin of the service (e.g., "https://catalog.example.com")
    #[arg(long, default_value = "http://localhost:8080")]
    pub origin: String,

    /// Path to file containing the access token secret. Prefer ACCESS_TOKEN_SECRET instead
    #[arg(long)]
    pub access_secret_file: Option<String>,

    /// Path to file containing the refresh token secret. Prefer REFRESH_TOKEN_SECRET instead
    #[arg(long)]
    pub refresh_secret_file: Option<String>,

    /// Seconds before a session store operation is abandoned
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub store_timeout_secs: u64,

    /// Whether the session store can revoke tokens
    #[arg(long, value_enum, default_value = "advisory")]
    pub session_policy: SessionPolicy,

    /// Create (or reuse) an admin with this email, start a session and print its refresh token
    #[arg(long, value_name = "EMAIL")]
    pub create_admin: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load one signing secret from an environment variable or a file.
/// Returns None and logs an error if the secret cannot be loaded.
///
/// Must run before any other thread exists, since it removes the variable
/// from the process environment.
pub fn load_secret(env_var: &str, secret_file: Option<&str>) -> Option<Vec<u8>> {
    let secret = if let Ok(secret) = std::env::var(env_var) {
        // Clear the environment variable to prevent leaking
        // SAFETY: only called from `main` before the tokio runtime is built,
        // so no other thread can read or write the environment concurrently.
        unsafe { std::env::remove_var(env_var) };
        secret
    } else if let Some(path) = secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read secret file");
                return None;
            }
        }
    } else {
        error!(
            env = env_var,
            "Signing secret is required. Set the environment variable (recommended) or pass a secret file"
        );
        return None;
    };

    check_secret_length(env_var, secret)
}

fn check_secret_length(name: &str, secret: String) -> Option<Vec<u8>> {
    if secret.len() < MIN_SECRET_LENGTH {
        error!(
            secret = name,
            "Secret is shorter than {} bytes. Use a longer secret", MIN_SECRET_LENGTH
        );
        return None;
    }
    Some(secret.into_bytes())
}

/// Load both signing secrets. They must be present, long enough and distinct.
pub fn load_secrets(args: &Args) -> Option<TokenSecrets> {
    let access = load_secret(ACCESS_SECRET_ENV, args.access_secret_file.as_deref())?;
    let refresh = load_secret(REFRESH_SECRET_ENV, args.refresh_secret_file.as_deref())?;
    distinct_secrets(access, refresh)
}

fn distinct_secrets(access: Vec<u8>, refresh: Vec<u8>) -> Option<TokenSecrets> {
    let secrets = TokenSecrets::new(access, refresh);
    if !secrets.are_distinct() {
        error!("Access and refresh secrets must differ");
        return None;
    }
    Some(secrets)
}

/// Parse and validate the public origin.
/// Returns None and logs an error if validation fails.
pub fn validate_origin(origin: &str) -> Option<Url> {
    let url = match Url::parse(origin) {
        Ok(url) => url,
        Err(e) => {
            error!(origin = %origin, error = %e, "Invalid origin URL");
            return None;
        }
    };

    let is_https = url.scheme() == "https";
    let is_localhost = url.host_str() == Some("localhost");

    if !is_https && !is_localhost {
        error!("origin must use HTTPS for non-localhost deployments");
        return None;
    }

    Some(url)
}

/// Handle the --create-admin flag: make sure an admin with `email` exists,
/// start a session for it and print the refresh token once.
pub async fn handle_create_admin(config: &ServerConfig, email: &str) {
    let users = config.db.users();

    let user = match users.get_by_email(email).await {
        Ok(Some(existing)) if existing.role == UserRole::Admin => existing,
        Ok(Some(existing)) => {
            error!(email = %existing.email, role = %existing.role, "User exists but is not an admin");
            std::process::exit(1);
        }
        Ok(None) => {
            let user_id = Uuid::new_v4().to_string();
            let new_user = NewUser {
                user_id: &user_id,
                email,
                first_name: "Admin",
                last_name: "",
                role: UserRole::Admin,
            };
            if let Err(e) = users.create(&new_user).await {
                error!(error = %e, "Failed to create admin user");
                std::process::exit(1);
            }
            match users.get_by_user_id(&user_id).await {
                Ok(Some(user)) => {
                    info!(email = %email, "Admin user created");
                    user
                }
                Ok(None) => {
                    error!("Admin user vanished after creation");
                    std::process::exit(1);
                }
                Err(e) => {
                    error!(error = %e, "Failed to load admin user");
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to check for existing admin");
            std::process::exit(1);
        }
    };

    match config.session_manager().establish(&Identity::from(&user)).await {
        Ok(pair) => {
            println!();
            println!("Admin session for {} ({})", user.email, user.user_id);
            println!("Refresh token: {}", pair.refresh_token);
            println!();
        }
        Err(e) => {
            error!(error = %e, "Failed to start admin session");
            std::process::exit(1);
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    origin: Url,
    secrets: TokenSecrets,
    session_policy: SessionPolicy,
) -> ServerConfig {
    let secure_cookies = origin.scheme() == "https";

    ServerConfig {
        db,
        secrets,
        secure_cookies,
        session_policy,
        identity_provider: None,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str, store_timeout: Duration) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db.with_store_timeout(store_timeout))
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const LONG_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["catalog-auth"]);
        assert_eq!(args.port, 8080);
        assert_eq!(args.database, "sessions.db");
        assert_eq!(args.store_timeout_secs, 10);
        assert_eq!(args.session_policy, SessionPolicy::Advisory);
        assert!(args.create_admin.is_none());
    }

    #[test]
    fn test_session_policy_flag() {
        let args = Args::parse_from(["catalog-auth", "--session-policy", "authoritative"]);
        assert_eq!(args.session_policy, SessionPolicy::Authoritative);
    }

    #[test]
    fn test_zero_store_timeout_rejected() {
        assert!(Args::try_parse_from(["catalog-auth", "--store-timeout-secs", "0"]).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(check_secret_length("TEST", "short".to_string()).is_none());
        assert_eq!(
            check_secret_length("TEST", LONG_A.to_string()),
            Some(LONG_A.as_bytes().to_vec())
        );
    }

    #[test]
    fn test_identical_secrets_rejected() {
        assert!(distinct_secrets(LONG_A.into(), LONG_A.into()).is_none());
        assert!(distinct_secrets(LONG_A.into(), LONG_B.into()).is_some());
    }

    #[test]
    fn test_secret_from_file_is_trimmed() {
        let path = std::env::temp_dir().join(format!("catalog-auth-secret-{}", Uuid::new_v4()));
        std::fs::write(&path, format!("{}\n", LONG_B)).unwrap();

        let secret = load_secret("CATALOG_AUTH_UNSET_TEST_VAR", path.to_str());
        std::fs::remove_file(&path).ok();

        assert_eq!(secret, Some(LONG_B.as_bytes().to_vec()));
    }

    #[test]
    fn test_missing_secret_file() {
        assert!(load_secret("CATALOG_AUTH_UNSET_TEST_VAR", Some("/nonexistent/secret")).is_none());
        assert!(load_secret("CATALOG_AUTH_UNSET_TEST_VAR", None).is_none());
    }

    #[test]
    fn test_origin_validation() {
        assert!(validate_origin("http://localhost:8080").is_some());
        assert!(validate_origin("https://catalog.example.com").is_some());
        assert!(validate_origin("http://catalog.example.com").is_none());
        assert!(validate_origin("not a url").is_none());
    }
}
