//! Telegram Bridge server.
//!
//! Relays Telegram webhooks to the downstream app and proxies the app's Bot
//! API calls back to Telegram.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tgbridge::{router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("bridge_starting");

    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        port = config.port,
        app_url = %config.app_url,
        api_base = %config.api_base,
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );

    let port = config.port;
    let state = AppState::new(config).context("Failed to build HTTP clients")?;
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "bridge_listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("bridge_shutdown_complete");

    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
///
/// A signal listener that cannot be installed is logged and never fires, so
/// the server keeps running instead of shutting down at once.
async fn shutdown_signal() {
    let sigint = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "sigint_listener_unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{signal as unix_signal, SignalKind};

        match unix_signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "sigterm_listener_unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    let received = tokio::select! {
        _ = sigint => "SIGINT",
        _ = sigterm => "SIGTERM",
    };

    info!(signal = received, "bridge_shutting_down");
}
