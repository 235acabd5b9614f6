//! # flagsync-sync
//!
//! Snapshot building, timestamped backups, and atomic env-file writes.
//!
//! Call [`cycle::run`] to execute one full build→backup→write cycle — the
//! canonical entrypoint used by the daemon's initial sync and every
//! debounced resync.

pub mod backup;
pub mod cycle;
pub mod error;
pub mod snapshot;
pub mod writer;

pub use backup::BackupOutcome;
pub use cycle::CycleOutcome;
pub use error::SyncError;
