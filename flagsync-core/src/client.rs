//! The evaluation seam — everything the daemon needs from the remote flag
//! platform, behind one trait.
//!
//! Connecting is constructor territory of each implementation: it needs
//! credentials or paths the trait cannot know about, and must block until the
//! platform confirms an initial full dataset (or fail within its connection
//! timeout).

use crate::types::{ChangeNotification, EvaluationContext, FlagKey};

/// Result of evaluating a single flag.
///
/// Modeled as a tagged variant rather than a sentinel so callers handle every
/// case. A `Failed` evaluation degrades that one key; it never aborts a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The flag evaluated to a string value.
    Value(String),
    /// The flag is missing, not string-typed, or evaluation failed.
    Failed { reason: String },
}

/// Handler invoked once per upstream change notification.
///
/// Called asynchronously from the client's own delivery thread for the
/// lifetime of the connection.
pub type ChangeHandler = Box<dyn Fn(ChangeNotification) + Send + Sync + 'static>;

/// Abstract client for the remote flag-management platform.
pub trait EvaluationClient: Send + Sync {
    /// Evaluate `key` to its current string value for `context`.
    ///
    /// Must never panic or error for a single bad key: a missing flag, a
    /// non-string variation, or an evaluation failure yields
    /// [`Evaluation::Failed`] so one misconfigured flag cannot block
    /// synchronization of the others.
    fn evaluate(&self, key: &FlagKey, context: &EvaluationContext) -> Evaluation;

    /// Register `on_change` to receive upstream change notifications.
    ///
    /// Notifications for the same key in quick succession are NOT deduplicated
    /// here — coalescing is the debouncer's job.
    fn subscribe(&self, on_change: ChangeHandler);

    /// Release the session. Idempotent; safe during shutdown even if the
    /// client never successfully connected.
    fn close(&self);
}
