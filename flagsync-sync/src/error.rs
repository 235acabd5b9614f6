//! Error types for flagsync-sync.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from backup and write operations.
///
/// Snapshot building never fails — unhealthy keys degrade to empty strings.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
