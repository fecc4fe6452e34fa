//! Error types for frame reassembly sessions.
//!
//! Decoding a single field event never fails: out-of-order and abandoned
//! frames degrade to "no frame". Errors come from the edges of the crate:
//!
//! ## Error Categories
//!
//! - **Configuration Errors**: Notched mode without a usable period
//! - **File Errors**: Problems reading configuration or capture files
//! - **Parse Errors**: YAML that does not match the expected format
//! - **Event Errors**: Capture records whose kind lacks its payload
//! - **Channel Errors**: The session driver or its consumer went away
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use can_concat::CaptureError;
//!
//! let error = CaptureError::invalid_configuration("notched mode requires period_ms");
//! assert!(!error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::FieldKind;

/// Result type alias for capture operations.
pub type Result<T, E = CaptureError> = std::result::Result<T, E>;

/// Main error type for capture operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CaptureError {
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Malformed {kind} event at index {index}: {reason}")]
    MalformedEvent { index: usize, kind: FieldKind, reason: String },

    #[error("Channel closed: {context}")]
    ChannelClosed { context: String },
}

impl CaptureError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            CaptureError::InvalidConfiguration { .. } => false,
            CaptureError::File { .. } => true,
            CaptureError::Parse { .. } => false,
            CaptureError::MalformedEvent { .. } => false,
            CaptureError::ChannelClosed { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            CaptureError::InvalidConfiguration { .. } => vec![
                "Set period_ms when mode is notched",
                "Use a finite, non-negative period in milliseconds",
                "Switch to normal mode to disable rate limiting",
            ],
            CaptureError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
            CaptureError::Parse { .. } => vec![
                "Check the YAML syntax",
                "Compare field names against the documented format",
            ],
            CaptureError::MalformedEvent { .. } => vec![
                "Identifier records need an identifier value",
                "Data records need a data byte list",
                "Crc records need a crc value",
            ],
            CaptureError::ChannelClosed { .. } => vec![
                "Keep the session alive while consuming frames",
                "Check the upstream producer for errors",
            ],
        }
    }

    /// Helper constructor for configuration errors.
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        CaptureError::InvalidConfiguration { reason: reason.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        CaptureError::File { path, source }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        CaptureError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for capture records missing their payload.
    pub fn malformed_event(index: usize, kind: FieldKind, reason: impl Into<String>) -> Self {
        CaptureError::MalformedEvent { index, kind, reason: reason.into() }
    }

    /// Helper constructor for closed channels.
    pub fn channel_closed(context: impl Into<String>) -> Self {
        CaptureError::ChannelClosed { context: context.into() }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for CaptureError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        CaptureError::Parse { context: "YAML deserialization".to_string(), details: err.to_string() }
    }
}
