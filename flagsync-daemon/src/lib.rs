//! Daemon runtime: debouncer + sync orchestrator + bundled file-backed
//! evaluation source.

mod debounce;
mod error;
pub mod file_source;
mod runtime;

pub use debounce::Debouncer;
pub use error::DaemonError;
pub use file_source::FileSource;
pub use runtime::{init_tracing, run, spawn_signal_handler, start_blocking};
