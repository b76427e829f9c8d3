use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Castfolio";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default address the HTTP server binds to (loopback only).
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7420";

/// Default Ollama instance and vision model for extraction.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_VISION_MODEL: &str = "qwen2.5vl:7b";

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "castfolio=info,tower_http=info".to_string()
}

/// Get the application data directory
/// ~/Castfolio/ on all platforms (user-visible, exports land next to staging)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Castfolio")
}

/// Get the staging directory for uploaded files
pub fn staging_dir() -> PathBuf {
    app_data_dir().join("staging")
}

/// Get the exports directory for generated exposé PDFs
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Runtime settings, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub ollama_url: String,
    pub vision_model: String,
}

impl Settings {
    /// Read settings from `CASTFOLIO_BIND`, `CASTFOLIO_OLLAMA_URL` and
    /// `CASTFOLIO_MODEL`, falling back to the defaults above.
    pub fn from_env() -> Result<Self, String> {
        let bind_raw =
            std::env::var("CASTFOLIO_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw
            .parse()
            .map_err(|e| format!("Invalid CASTFOLIO_BIND '{bind_raw}': {e}"))?;

        let ollama_url = std::env::var("CASTFOLIO_OLLAMA_URL")
            .unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let vision_model =
            std::env::var("CASTFOLIO_MODEL").unwrap_or_else(|_| DEFAULT_VISION_MODEL.to_string());

        Ok(Self {
            bind_addr,
            ollama_url,
            vision_model,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.parse().expect("default bind addr"),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
        }
    }
}
