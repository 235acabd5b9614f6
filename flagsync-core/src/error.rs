//! Error types for flagsync-core.

use thiserror::Error;

/// All errors that can arise from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `CREDENTIAL` was unset or blank. The daemon cannot start without it.
    #[error("CREDENTIAL is required; set it in the environment and retry")]
    MissingCredential,

    /// `DEBOUNCE_MS` did not parse as a non-negative integer.
    #[error("DEBOUNCE_MS must be a non-negative integer, got '{value}'")]
    InvalidDebounce { value: String },

    /// `FLAG_KEYS` was set but contained no usable keys.
    #[error("FLAG_KEYS must name at least one flag key")]
    NoFlagKeys,
}
