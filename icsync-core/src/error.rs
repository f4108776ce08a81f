//! Error types for the icsync ecosystem.

use thiserror::Error;

/// Errors that can occur while reading, resolving or reconciling matches.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar parse error: {0}")]
    Calendar(String),

    #[error("Event {uid} has no usable DTSTART")]
    MissingStartTime { uid: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Remote read failed: {0}")]
    RemoteRead(String),

    /// `maybe_applied` is set when the store may have committed the write
    /// even though no success response arrived (timeouts, 5xx).
    #[error("Remote write failed: {message}")]
    RemoteWrite {
        message: String,
        retryable: bool,
        maybe_applied: bool,
    },
}

impl SyncError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::RemoteWrite { retryable: true, .. })
    }

    /// Whether a failed write may still have taken effect remotely.
    pub fn may_have_applied(&self) -> bool {
        matches!(self, SyncError::RemoteWrite { maybe_applied: true, .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, SyncError::Config(_))
    }
}

/// Result type alias for icsync operations.
pub type SyncResult<T> = Result<T, SyncError>;
