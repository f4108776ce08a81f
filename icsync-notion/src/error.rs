use icsync_core::SyncError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notion API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl NotionError {
    /// Rate limiting, conflicts, server errors and transport failures.
    pub fn is_retryable(&self) -> bool {
        match self {
            NotionError::Http(e) => e.is_timeout() || e.is_connect(),
            NotionError::Api { status, .. } => is_retryable_status(*status),
            NotionError::InvalidResponse(_) => false,
        }
    }

    /// Whether the request may have reached Notion and been committed.
    /// Only a refused connection or a 4xx proves it was not.
    pub fn may_have_applied(&self) -> bool {
        match self {
            NotionError::Http(e) => !e.is_connect(),
            NotionError::Api { status, .. } => *status >= 500,
            NotionError::InvalidResponse(_) => true,
        }
    }

    pub fn into_read_error(self) -> SyncError {
        SyncError::RemoteRead(self.to_string())
    }

    pub fn into_write_error(self) -> SyncError {
        SyncError::RemoteWrite {
            retryable: self.is_retryable(),
            maybe_applied: self.may_have_applied(),
            message: self.to_string(),
        }
    }
}

pub(crate) fn is_retryable_status(status: u16) -> bool {
    status == 429 || status == 409 || (500..600).contains(&status)
}
