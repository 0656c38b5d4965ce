//! Error types for Docket

use std::io;
use thiserror::Error;

/// Result type for Docket operations
pub type Result<T> = std::result::Result<T, DocketError>;

/// Errors that can occur in Docket
#[derive(Debug, Error)]
pub enum DocketError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No description was given and none could be derived from the call site
    #[error(
        "No description derivable from function `{function}`: \
         pass a description or call from a function named `test ...`"
    )]
    DescriptionUndeterminable {
        /// Function name found at the call site
        function: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Frame could not be decoded into a message envelope
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Channel transport rejected a message
    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    /// Recorder reached its record limit
    #[error("Recorder full: limit of {limit} records reached")]
    RecorderFull {
        /// Record limit
        limit: usize,
    },

    /// Request/response body too large
    #[error("Data too large: {size} bytes exceeds limit of {limit} bytes")]
    DataTooLarge {
        /// Actual size
        size: usize,
        /// Size limit
        limit: usize,
    },
}

impl DocketError {
    /// Whether this error is the missing-description failure
    #[must_use]
    pub fn is_undeterminable_description(&self) -> bool {
        matches!(self, Self::DescriptionUndeterminable { .. })
    }
}
