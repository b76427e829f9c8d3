//! Server lifecycle: bind, serve, sweep idle sessions, shut down on
//! Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use super::router::build_router;
use crate::config::{Settings, APP_NAME, APP_VERSION};
use crate::extract::ollama::{OllamaClient, VisionClient};
use crate::ingest::staging;
use crate::state::AppState;

/// How often idle sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Vision calls can run for minutes on CPU-only machines.
const OLLAMA_TIMEOUT_SECS: u64 = 300;

/// Run the server until Ctrl-C.
pub async fn serve(settings: Settings) -> std::io::Result<()> {
    let client: Arc<dyn VisionClient> =
        Arc::new(OllamaClient::new(&settings.ollama_url, OLLAMA_TIMEOUT_SECS));
    check_model(client.clone(), settings.vision_model.clone()).await;

    let state = Arc::new(AppState::new(settings, client));
    std::fs::create_dir_all(&state.staging_dir)?;
    std::fs::create_dir_all(&state.exports_dir)?;

    tokio::spawn(sweep_loop(state.clone()));

    let listener = TcpListener::bind(state.settings.bind_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        version = APP_VERSION,
        model = %state.settings.vision_model,
        "{APP_NAME} listening — open the address in a browser"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Startup probe: a missing model is only a warning — the user may pull
/// it while the server is already running.
async fn check_model(client: Arc<dyn VisionClient>, model: String) {
    let result = tokio::task::spawn_blocking(move || {
        let available = client.list_models()?;
        Ok::<_, crate::extract::ExtractError>(available.iter().any(|m| m.starts_with(&model)))
    })
    .await;

    match result {
        Ok(Ok(true)) => {}
        Ok(Ok(false)) => {
            tracing::warn!("Configured vision model is not pulled on the Ollama backend yet")
        }
        Ok(Err(e)) => tracing::warn!("Cannot reach Ollama at startup: {e}"),
        Err(e) => tracing::error!("Model probe panicked: {e}"),
    }
}

/// Periodically drop idle sessions and their staged files.
async fn sweep_loop(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    interval.tick().await; // first tick fires immediately
    loop {
        interval.tick().await;
        let expired = state.sessions().sweep_expired();
        if expired.is_empty() {
            continue;
        }
        tracing::info!(count = expired.len(), "Swept idle sessions");
        for session_id in expired {
            staging::remove_session_dir(&state.staging_dir, session_id);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("Shutting down");
}
