use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the REST API binds to
    pub bind: String,

    /// Port for the REST API server
    pub port: u16,

    /// Directory used when an export request names no destination
    pub export_dir: PathBuf,

    /// File extensions enabled in the initial file-type filter
    pub file_types: Vec<String>,

    /// Capacity of the action queue feeding the session thread
    pub queue_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            export_dir: PathBuf::from("exports"),
            file_types: crate::models::filter::DEFAULT_FILE_TYPES
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            queue_size: 64,
        }
    }
}
