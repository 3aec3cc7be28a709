//! PDF Service
//!
//! Accepts HTML over HTTP and returns a PDF rendered by headless Chromium.
//!
//! ## Architecture
//!
//! - **HTTP**: axum router (`GET /health`, `POST /convert`)
//! - **Converter**: render-slot semaphore, per-request staged files
//! - **Renderer**: one `chromium-browser --headless --print-to-pdf` process per request
//! - **Telemetry**: tracing logs, optional OpenTelemetry OTLP export
//!
//! ## Configuration
//!
//! See [`pdf_service::config::ServiceConfig::from_env`] for the environment
//! variables. `RUST_LOG` sets the log level (default: info).

use anyhow::{Context, Result};
use pdf_service::config::ServiceConfig;
use pdf_service::converter::Converter;
use pdf_service::http::{self, AppState};
use pdf_service::telemetry;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::from_env();

    telemetry::init_logging(config.log_format);

    if let Err(e) = telemetry::init_telemetry(&config) {
        warn!("Failed to initialize telemetry: {}", e);
    }

    info!("Starting PDF service");
    info!(
        "Configuration: listen_addr={}, staging_dir={}, chromium_bin={}, concurrency={}, render_timeout={:?}",
        config.listen_addr,
        config.staging_dir.display(),
        config.chromium_bin,
        config.max_concurrent_renders,
        config.render_timeout
    );

    let converter = Converter::from_config(&config);
    let app = http::router(AppState::new(converter), &config);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    info!("PDF service listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    telemetry::shutdown_telemetry();
    info!("PDF service shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal, draining in-flight conversions...");
}
