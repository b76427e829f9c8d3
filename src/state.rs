//! Shared application state handed to every request handler.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Settings;
use crate::extract::ollama::VisionClient;
use crate::extract::orchestrator::ExposeExtractor;
use crate::session::SessionStore;

pub struct AppState {
    pub settings: Settings,
    pub staging_dir: PathBuf,
    pub exports_dir: PathBuf,
    pub extractor: Arc<ExposeExtractor>,
    sessions: Mutex<SessionStore>,
}

impl AppState {
    pub fn new(settings: Settings, client: Arc<dyn VisionClient>) -> Self {
        let extractor = Arc::new(ExposeExtractor::new(client, settings.vision_model.clone()));
        Self {
            settings,
            staging_dir: crate::config::staging_dir(),
            exports_dir: crate::config::exports_dir(),
            extractor,
            sessions: Mutex::new(SessionStore::new()),
        }
    }

    /// Test constructor with directories under a sandbox root.
    pub fn with_dirs(
        settings: Settings,
        client: Arc<dyn VisionClient>,
        staging_dir: PathBuf,
        exports_dir: PathBuf,
    ) -> Self {
        let extractor = Arc::new(ExposeExtractor::new(client, settings.vision_model.clone()));
        Self {
            settings,
            staging_dir,
            exports_dir,
            extractor,
            sessions: Mutex::new(SessionStore::new()),
        }
    }

    /// Lock the session store. Never hold this across an await point —
    /// extraction runs outside the lock on the blocking pool.
    pub fn sessions(&self) -> MutexGuard<'_, SessionStore> {
        self.sessions.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Session store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
