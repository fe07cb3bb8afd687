//! Error types for ocr-indexer
//!
//! This module defines the error hierarchy covering:
//! - Configuration and CLI errors (fatal, abort before any traversal)
//! - Result store errors (fatal when a flush cannot be completed)
//! - Per-file OCR collaborator errors (recoverable, recorded and skipped)
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include the path or value that caused them
//! - Per-file failures must never abort a run; only configuration and
//!   persistent flush failures are fatal

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the ocr-indexer application
#[derive(Error, Debug)]
pub enum IndexerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Result store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// OCR engine errors that escaped per-file handling
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Root path does not exist
    #[error("Root path not found: '{path}'")]
    RootNotFound { path: PathBuf },

    /// Root path exists but is not a directory
    #[error("Root path is not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// Invalid flush interval
    #[error("Invalid flush interval {interval}: must be at least 1")]
    InvalidFlushInterval { interval: usize },

    /// No OCR languages given
    #[error("At least one OCR language is required")]
    NoLanguages,

    /// Invalid exclude pattern
    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },

    /// Output destination cannot be written
    #[error("Output destination '{path}' is not writable: {reason}")]
    OutputNotWritable { path: PathBuf, reason: String },
}

/// Result store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create or open the backing destination
    #[error("Failed to open store at '{path}': {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    /// Serializing the result mapping failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Writing the backing file failed
    #[error("Failed to flush store to '{path}': {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-file OCR collaborator errors
#[derive(Error, Debug)]
pub enum OcrError {
    /// File vanished or could not be read between enumeration and processing
    #[error("Cannot access '{path}': {reason}")]
    FileAccess { path: PathBuf, reason: String },

    /// The OCR backend could not be launched at all
    #[error("Failed to launch OCR backend '{backend}': {reason}")]
    Launch { backend: String, reason: String },

    /// The OCR backend failed for a given file
    #[error("OCR backend failed for '{path}': {reason}")]
    Backend { path: PathBuf, reason: String },

    /// Every requested language failed for a given file
    #[error("All {languages} requested languages failed for '{path}'")]
    AllLanguagesFailed { path: PathBuf, languages: usize },
}

impl OcrError {
    /// Check if this error is recoverable (record an error entry and skip)
    ///
    /// All per-file failures are recoverable; a launch failure is recoverable
    /// too, since a missing backend binary degrades each file to a recorded
    /// error entry rather than aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OcrError::FileAccess { .. }
                | OcrError::Launch { .. }
                | OcrError::Backend { .. }
                | OcrError::AllLanguagesFailed { .. }
        )
    }
}

/// Result type alias for IndexerError
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Result type alias for StoreError
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for OcrError
pub type OcrResult<T> = std::result::Result<T, OcrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocr_error_recoverable() {
        let missing = OcrError::FileAccess {
            path: "/missing.png".into(),
            reason: "No such file".into(),
        };
        assert!(missing.is_recoverable());

        let launch = OcrError::Launch {
            backend: "tesseract".into(),
            reason: "not found in PATH".into(),
        };
        assert!(launch.is_recoverable());
    }

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::InvalidFlushInterval { interval: 0 };
        let err: IndexerError = config_err.into();
        assert!(matches!(err, IndexerError::Config(_)));

        let store_err = StoreError::OpenFailed {
            path: "/tmp/out.json".into(),
            reason: "permission denied".into(),
        };
        let err: IndexerError = store_err.into();
        assert!(matches!(err, IndexerError::Store(_)));
    }

    #[test]
    fn test_error_display_includes_path() {
        let err = OcrError::Backend {
            path: "/data/shot.png".into(),
            reason: "exit code 1".into(),
        };
        assert!(err.to_string().contains("/data/shot.png"));
    }
}
