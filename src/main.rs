//! Destinos Gateway - an offline-first HTTP caching gateway
//!
//! Mediates outbound requests through per-route caching strategies over
//! versioned in-memory stores.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use destinos_gateway::api::create_router;
use destinos_gateway::fetch::{FetchController, HttpUpstream};
use destinos_gateway::{AppState, Config};

/// Main entry point for the gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the fetch controller over a shared HTTP client
/// 4. Install: precache the critical assets (fatal on failure)
/// 5. Activate: purge stale cache generations, start intercepting
/// 6. Start HTTP server on the configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "destinos_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Destinos Gateway");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: version={}, app_origin={}, port={}",
        config.cache_version, config.app_origin, config.server_port
    );

    let app_origin = Url::parse(&config.app_origin)
        .with_context(|| format!("invalid APP_ORIGIN: {}", config.app_origin))?;

    // Build the controller over the shared upstream client
    let controller = Arc::new(FetchController::new(
        config.cache_version.clone(),
        app_origin,
        Arc::new(HttpUpstream::new()),
    ));

    // Install is all-or-nothing: a missing critical asset must keep the
    // gateway from serving at all
    controller
        .install()
        .await
        .context("install-time precache failed")?;
    controller.activate().await;

    // Create router with all endpoints
    let state = AppState::new(controller);
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Gateway listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Gateway shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
