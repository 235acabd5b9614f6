//! Timestamped backups of the target file.
//!
//! Backups are siblings of the original named `<path>.<YYYYMMDD-HHMMSS>`.
//! They are never overwritten and never deleted by this daemon — retention is
//! an external concern.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::{io_err, SyncError};

/// Outcome of a backup attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// The existing file was copied to `path`.
    Created { path: PathBuf },
    /// Nothing to protect — the target file does not exist yet.
    NoExistingFile,
}

/// Copy `path` to a timestamped sibling before it gets rewritten.
///
/// `fs::copy` carries the permission bits over, so the backup follows the
/// same permission policy as the original.
pub fn backup_file(path: &Path) -> Result<BackupOutcome, SyncError> {
    if !path.exists() {
        return Ok(BackupOutcome::NoExistingFile);
    }

    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let backup_path = available_backup_path(path, &timestamp.to_string());
    std::fs::copy(path, &backup_path).map_err(|e| io_err(&backup_path, e))?;

    tracing::info!(
        "backed up {} to {}",
        path.display(),
        backup_path.display()
    );
    Ok(BackupOutcome::Created { path: backup_path })
}

/// First free backup path for `timestamp`.
///
/// Two writes inside the same second would collide at second resolution; a
/// numeric suffix keeps the earlier backup intact.
fn available_backup_path(path: &Path, timestamp: &str) -> PathBuf {
    let candidate = PathBuf::from(format!("{}.{timestamp}", path.display()));
    if !candidate.exists() {
        return candidate;
    }
    let mut n = 1u32;
    loop {
        let candidate = PathBuf::from(format!("{}.{timestamp}.{n}", path.display()));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
