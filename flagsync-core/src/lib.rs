//! Flagsync core library — domain types, configuration, the evaluation seam.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`config`] — [`DaemonConfig`] and env loading
//! - [`client`] — the [`EvaluationClient`] trait and evaluation results
//! - [`error`] — [`ConfigError`]

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{ChangeHandler, Evaluation, EvaluationClient};
pub use config::DaemonConfig;
pub use error::ConfigError;
pub use types::{ChangeNotification, EvaluationContext, FlagKey, Snapshot};
