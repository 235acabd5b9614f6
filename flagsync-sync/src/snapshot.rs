//! Snapshot builder — evaluates the configured key set into an ordered
//! key→value mapping.

use flagsync_core::{Evaluation, EvaluationClient, EvaluationContext, FlagKey, Snapshot};

/// Evaluate every configured key, in configured order, into a [`Snapshot`].
///
/// Never fails outright: a key that is missing, not string-typed, or
/// otherwise unhealthy contributes an empty-string entry and a warning log,
/// so the snapshot always covers exactly the configured key set.
pub fn build(
    keys: &[FlagKey],
    client: &dyn EvaluationClient,
    context: &EvaluationContext,
) -> Snapshot {
    let entries = keys
        .iter()
        .map(|key| {
            let value = match client.evaluate(key, context) {
                Evaluation::Value(value) => value,
                Evaluation::Failed { reason } => {
                    tracing::warn!("failed to evaluate flag '{key}': {reason}");
                    String::new()
                }
            };
            (key.clone(), value)
        })
        .collect();
    Snapshot::from_entries(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
