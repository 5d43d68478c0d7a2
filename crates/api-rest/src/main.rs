//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the cathlab REST API on its own.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `cathlab-run` binary
//! does the same after loading a `.env` file.

use api_rest::{router, AppState};
use cathlab_core::CoreConfig;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the cathlab REST API server
///
/// # Environment Variables
/// - `CATHLAB_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `CATHLAB_*`: see `cathlab_core::config`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration, catalog, procedure book or font cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("cathlab_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CATHLAB_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::from_env()?);
    let state = AppState::load(cfg)?;

    tracing::info!("-- Starting cathlab REST API on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
