//! Session Service entry point.

use anyhow::Context;
use rust_common::{init_tracing, TracingConfig};
use session_service::events::LogPublisher;
use session_service::http::{router, AppState};
use session_service::jwt::TokenCodec;
use session_service::password::BcryptVerifier;
use session_service::store::InMemoryCredentialStore;
use session_service::{AuthService, Config};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    init_tracing(
        &TracingConfig::default()
            .with_service_name("session-service")
            .with_log_level(config.log_level.clone())
            .with_format(config.log_format),
    );

    info!("Starting Session Service");
    if config.jwt_secret.is_weak() {
        warn!("JWT_SECRET is shorter than 32 bytes");
    }

    let store = InMemoryCredentialStore::new().with_publisher(Arc::new(LogPublisher));
    if let Some(path) = &config.principals_file {
        store
            .load_json(path)
            .await
            .with_context(|| format!("failed to load principals from {}", path.display()))?;
    }

    let auth = AuthService::new(
        Arc::new(store),
        Arc::new(BcryptVerifier),
        TokenCodec::new(&config.jwt_secret),
        config.token_policy,
    )
    .with_store_timeout(config.store_timeout);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        address = %addr,
        access_ttl_secs = config.token_policy.access_ttl().as_secs(),
        refresh_ttl_secs = config.token_policy.refresh_ttl().as_secs(),
        "Session Service listening"
    );

    axum::serve(listener, router(AppState::new(auth)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Session Service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
