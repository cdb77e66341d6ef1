mod config;
mod errors;
mod extraction;
mod profile;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::DocumentExtractor;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talent API v{}", env!("CARGO_PKG_VERSION"));

    let extractor = DocumentExtractor::from_config(config.extractor.clone());
    info!(
        ocr_dpi = config.extractor.ocr_dpi,
        image_dpi = config.extractor.image_dpi,
        tesseract = %config.extractor.tesseract_cmd,
        pdftoppm = %config.extractor.pdftoppm_cmd,
        "Document extractor initialized"
    );

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("Upload directory: {}", config.upload_dir.display());

    let state = AppState {
        config: config.clone(),
        extractor: Arc::new(extractor),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
