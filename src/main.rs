use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use cathlab_core::CoreConfig;

/// Main entry point for the cathlab application
///
/// Loads `.env`, resolves configuration once, loads the equipment catalog and
/// procedure book, then serves the REST API.
///
/// # Environment Variables
/// - `CATHLAB_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CATHLAB_CATALOG_PATH`: equipment catalog CSV (default: bundled catalog)
/// - `CATHLAB_PROCEDURES_PATH`: procedure book YAML (default: built-in presets)
/// - `CATHLAB_CURRENCY`: currency label on amounts (default: "THB")
/// - `CATHLAB_RECEIPT_FONT`: TrueType font for receipts (default: Helvetica)
/// - `CATHLAB_SESSION_TTL_MINUTES`: idle session lifetime (default: 120)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, data loading or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cathlab_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("cathlab_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CATHLAB_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::from_env()?);
    let state = AppState::load(cfg.clone())?;

    tracing::info!("++ Starting cathlab REST on {}", rest_addr);
    tracing::info!(
        "++ Catalog {}, currency {}, sessions expire after {} min",
        cfg.catalog_path().display(),
        cfg.currency(),
        cfg.session_ttl_minutes()
    );

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
