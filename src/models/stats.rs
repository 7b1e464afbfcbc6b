use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use chrono::{DateTime, Utc};

use crate::models::filter::FilterConfig;

/// Snapshot of the session for status endpoints and push events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Number of exchanges in the capture list
    pub captured: usize,

    /// Number of exchanges in the filtered view
    pub visible: usize,

    /// Exchanges dropped on the last recompute because extraction failed
    pub dropped: usize,

    /// Selected row, if any
    pub selected: Option<usize>,

    /// Filter currently stored in the session
    pub filter: FilterConfig,

    /// Session start time
    pub started_at: DateTime<Utc>,

    /// Files written by exports during this session
    pub exported_files: usize,

    /// Files that failed to write during this session
    pub export_errors: usize,
}

/// Outcome of a batch export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    /// Destination directory
    pub directory: PathBuf,

    /// Files written
    pub saved: usize,

    /// Exchanges that could not be written
    pub errors: usize,

    /// Paths of written files, in view order
    pub files: Vec<PathBuf>,
}

impl ExportReport {
    pub fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            ..Self::default()
        }
    }
}
