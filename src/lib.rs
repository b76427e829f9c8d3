//! Castfolio — exposé generator for garden-makeover casting.
//!
//! Casting teams collect application sheets, e-mails and family photos in
//! whatever form the applicants manage to send. Castfolio takes those
//! uploads, runs them through a local vision model and produces a short
//! exposé the editorial team can review, correct and export as a PDF.
//!
//! The binary serves a single-page UI on loopback; everything runs
//! locally, nothing leaves the machine.

pub mod api;
pub mod config;
pub mod expose;
pub mod extract;
pub mod ingest;
pub mod session;
pub mod state;

use tracing_subscriber::EnvFilter;

use config::Settings;

/// Initialize logging, read settings and serve until shutdown.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::from_env()?;
    tracing::info!(
        ollama = %settings.ollama_url,
        model = %settings.vision_model,
        "Starting {}", config::APP_NAME
    );

    api::server::serve(settings).await?;
    Ok(())
}
