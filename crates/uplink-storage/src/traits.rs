//! Remote storage abstraction trait and error taxonomy.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Remote storage operation errors.
///
/// Retryable variants reflect conditions that are expected to be transient
/// under concurrent uploads (network hiccups, remote-side contention, partial
/// responses). Local preconditions and cancellation are permanent for the
/// attempt in progress.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend rejected request with status {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Local file not found: {0}")]
    MissingLocalFile(PathBuf),

    #[error("Invalid remote path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

impl StorageError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            StorageError::Transport(_)
            | StorageError::Backend { .. }
            | StorageError::MalformedResponse(_) => true,
            StorageError::MissingLocalFile(_)
            | StorageError::InvalidPath(_)
            | StorageError::Io(_)
            | StorageError::Cancelled => false,
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of an upload negotiation.
///
/// `AlreadyExists` is the idempotent-duplicate case: a previous attempt
/// (possibly one whose response was lost) already stored the file at the
/// remote path. Callers proceed straight to publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    AlreadyExists,
}

/// Capability interface the upload orchestrator depends on.
///
/// Kept narrow so a test double can simulate conflict and idempotency
/// responses without a real network.
#[async_trait]
pub trait RemoteStorage: Send + Sync {
    /// Make `remote_path` and all of its ancestor segments exist.
    async fn ensure_folder_exists(&self, remote_path: &str) -> StorageResult<()>;

    /// Upload a local file to `remote_path`, overwriting an interrupted
    /// previous write where the backend allows it.
    async fn upload(&self, local_path: &Path, remote_path: &str) -> StorageResult<UploadOutcome>;

    /// Make the remote resource publicly accessible and return its stable
    /// direct-download link.
    async fn publish(&self, remote_path: &str) -> StorageResult<String>;
}
