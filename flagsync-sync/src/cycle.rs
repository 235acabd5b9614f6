//! Shared sync cycle entrypoint used by the initial sync and every resync.
//!
//! Ordering inside a cycle is strict: build → backup → write. The write never
//! runs before the backup step has been attempted (subject to the disabled /
//! no-existing-file short-circuits).

use std::path::{Path, PathBuf};

use flagsync_core::{EvaluationClient, EvaluationContext, FlagKey, Snapshot};

use crate::backup::{self, BackupOutcome};
use crate::error::SyncError;
use crate::{snapshot, writer};

/// Outcome of one completed build→backup→write cycle.
#[derive(Debug)]
pub struct CycleOutcome {
    /// The snapshot that was written.
    pub snapshot: Snapshot,
    /// Path of the backup created this cycle, if one was.
    pub backup_path: Option<PathBuf>,
}

/// Run one full sync cycle: evaluate all keys, back up the existing target
/// file, atomically rewrite it.
///
/// A backup failure is logged as a warning and never blocks the write —
/// losing a backup is preferable to losing the ability to converge the file
/// forward. Only the write itself can fail the cycle.
pub fn run(
    keys: &[FlagKey],
    client: &dyn EvaluationClient,
    context: &EvaluationContext,
    target: &Path,
    backup_enabled: bool,
) -> Result<CycleOutcome, SyncError> {
    let snapshot = snapshot::build(keys, client, context);

    let backup_path = if backup_enabled {
        match backup::backup_file(target) {
            Ok(BackupOutcome::Created { path }) => Some(path),
            Ok(BackupOutcome::NoExistingFile) => None,
            Err(err) => {
                tracing::warn!("backup of {} failed, writing anyway: {err}", target.display());
                None
            }
        }
    } else {
        None
    };

    writer::write_env_file(target, &snapshot)?;

    Ok(CycleOutcome {
        snapshot,
        backup_path,
    })
}
