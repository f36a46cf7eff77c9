mod config;
mod errors;
mod routes;
mod state;
mod sticker;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::sticker::jobs::JobRegistry;
use crate::sticker::output::ensure_output_dir;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sticker API v{}", env!("CARGO_PKG_VERSION"));

    // Output directory is re-checked on every run; failing here is only a warning.
    match ensure_output_dir(&config.output_dir) {
        Ok(()) => info!("Output directory: {}", config.output_dir.display()),
        Err(e) => warn!("{e}"),
    }

    if !config.settings.default_sticker_path.is_file() {
        warn!(
            "Default sticker image not found: {}",
            config.settings.default_sticker_path.display()
        );
    }
    info!(
        "Host settings: start_from_zero={} show_product_label={}",
        config.settings.start_from_zero, config.settings.show_product_label
    );

    let state = AppState {
        config: config.clone(),
        jobs: JobRegistry::default(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
