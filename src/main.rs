use std::time::Duration;

use catalog_auth::cli::{
    Args, build_config, handle_create_admin, init_logging, load_secrets, open_database,
    validate_origin,
};
use catalog_auth::jwt::TokenSecrets;
use catalog_auth::{init_cleanup, run_server};
use clap::Parser;
use tracing::{error, info};
use url::Url;

fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    // Secrets are read and cleared from the environment before the runtime
    // spawns any worker threads.
    let Some(secrets) = load_secrets(&args) else {
        std::process::exit(1);
    };

    let Some(origin) = validate_origin(&args.origin) else {
        std::process::exit(1);
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            error!(error = %e, "Failed to start async runtime");
            std::process::exit(1);
        });

    runtime.block_on(serve(args, secrets, origin));
}

async fn serve(args: Args, secrets: TokenSecrets, origin: Url) {
    let store_timeout = Duration::from_secs(args.store_timeout_secs);
    let Some(db) = open_database(&args.database, store_timeout).await else {
        std::process::exit(1);
    };

    let config = build_config(db, origin, secrets, args.session_policy);

    if let Some(email) = args.create_admin.as_deref() {
        handle_create_admin(&config, email).await;
    }

    init_cleanup(&config.db).await;

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = listener.local_addr().unwrap_or_else(|e| {
        error!(error = %e, "Failed to read local address");
        std::process::exit(1);
    });

    info!(
        address = %local_addr,
        session_policy = config.session_policy.as_str(),
        "Listening"
    );

    if let Err(e) = run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
