//! Error types for the reconciliation engine
//!
//! The command layer wraps these in `anyhow` with context; everything below
//! the CLI returns [`SyncError`] so callers can match on the failure kind.

use std::path::PathBuf;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// A failed call to the remote document store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", describe_transport_failure(.status_code, .message))]
pub struct TransportError {
    /// HTTP status, when the server answered at all
    pub status_code: Option<u16>,
    pub message: String,
}

fn describe_transport_failure(status_code: &Option<u16>, message: &str) -> String {
    match status_code {
        Some(code) => format!("remote returned HTTP {code}: {message}"),
        None => format!("remote request failed: {message}"),
    }
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        TransportError {
            status_code: None,
            message: message.into(),
        }
    }

    pub fn with_status(status_code: u16, message: impl Into<String>) -> Self {
        TransportError {
            status_code: Some(status_code),
            message: message.into(),
        }
    }
}

/// Errors raised by the reconciler, manifest store and sync session
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Network or remote failure; the action was aborted and nothing changed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The persisted manifest could not be parsed
    #[error("Manifest at {path} is corrupt: {reason}")]
    ManifestCorrupt { path: PathBuf, reason: String },

    /// The manifest could not be serialized
    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Delete requested for a file that has no remote identity
    #[error("Cannot delete {path}: it has no remote copy")]
    InvalidDelete { path: String },

    /// Reading the local copy or sending it to the remote failed
    #[error("Failed to upload {path}: {cause}")]
    Upload { path: String, cause: String },

    /// Overwrite removed the remote copy but could not upload the local one
    #[error(
        "Overwrite of {path} only partially completed: remote copy {removed_id} was deleted \
         but the upload failed ({cause}); the file is now local only, upload it again to finish"
    )]
    PartialCompletion {
        path: String,
        removed_id: String,
        cause: String,
    },

    /// An action was attempted before a full fetch
    #[error("Remote files have not been fetched yet")]
    NotFetched,

    /// No file with this key in the current state
    #[error("No tracked file matches {key}")]
    UnknownFile { key: String },

    /// Local filesystem failure outside of an upload
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}
