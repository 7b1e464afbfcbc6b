use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from I/O operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON serialization/deserialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Raw message bytes were not valid base64
    #[error("Base64 decode error: {0}")]
    DecodeError(#[from] base64::DecodeError),

    /// A captured exchange is missing a field the filter needs
    #[error("Field extraction error for exchange {id}: {reason}")]
    ExtractionError { id: u64, reason: String },

    /// Error from filter configuration
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Error from export operations
    #[error("Export error: {0}")]
    ExportError(String),

    /// An action needs a selected row but none is selected
    #[error("No exchange is selected")]
    NoSelection,

    /// Row index outside the filtered view
    #[error("Row {row} is out of range (view has {len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    /// The session thread is gone or replied with something unexpected
    #[error("Session error: {0}")]
    SessionError(String),
}

impl AppError {
    /// Whether the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::JsonError(_) | AppError::DecodeError(_) | AppError::FilterError(_)
        )
    }

    /// Whether the error refers to something that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NoSelection | AppError::RowOutOfRange { .. })
    }
}

/// Result type for application
pub type AppResult<T> = Result<T, AppError>;
