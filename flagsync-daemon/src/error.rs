use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the daemon runtime and the file-backed flag source.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sync error: {0}")]
    Sync(#[from] flagsync_sync::SyncError),

    /// The first build→backup→write cycle failed. Fatal: an unwritable
    /// target at startup is unrecoverable without operator intervention.
    #[error("initial sync failed: {0}")]
    InitialSync(#[source] flagsync_sync::SyncError),

    #[error("invalid flag source {path}: {message}")]
    InvalidSource { path: PathBuf, message: String },

    #[error("daemon runtime error: {0}")]
    Runtime(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
