//! Process configuration — read once from the environment at startup,
//! immutable thereafter.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::types::{EvaluationContext, FlagKey};

/// Flag keys managed when `FLAG_KEYS` is unset.
pub const DEFAULT_FLAG_KEYS: [&str; 3] = ["SAMPLE_API_URL", "SAMPLE_SERVICE_URL", "SAMPLE_APP_URL"];

/// Default debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

/// Immutable daemon configuration.
///
/// Constructed from the process environment at startup; never reloaded
/// without a process restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Credential for the remote flag platform session.
    pub credential: String,
    /// Flag keys to keep synchronized, in output order.
    pub flag_keys: Vec<FlagKey>,
    /// Path of the env file kept in sync.
    pub target_path: PathBuf,
    /// Whether to back up the target file before each write.
    pub backup_enabled: bool,
    /// Log verbosity (seeds the tracing filter; `RUST_LOG` still wins).
    pub log_level: String,
    /// Quiet window before a burst of notifications triggers one resync.
    pub debounce_window: Duration,
    /// Evaluation context used for every evaluation call.
    pub context: EvaluationContext,
    /// Path of the flag definition file consumed by the bundled file source.
    pub source_path: PathBuf,
}

impl DaemonConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an injected lookup.
    ///
    /// Tests supply a closure over a map instead of mutating process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let credential = lookup("CREDENTIAL").unwrap_or_default().trim().to_string();
        if credential.is_empty() {
            return Err(ConfigError::MissingCredential);
        }

        let flag_keys = match lookup("FLAG_KEYS") {
            Some(raw) => parse_flag_keys(&raw)?,
            None => DEFAULT_FLAG_KEYS.iter().map(|k| FlagKey::from(*k)).collect(),
        };

        let target_path = PathBuf::from(lookup("TARGET_FILE_PATH").unwrap_or_else(|| ".env".into()));
        let backup_enabled = lookup("BACKUP_ENABLED")
            .map(|raw| parse_bool(&raw))
            .unwrap_or(true);
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "INFO".into());

        let debounce_window = match lookup("DEBOUNCE_MS") {
            Some(raw) => {
                let ms: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidDebounce { value: raw.clone() })?;
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        };

        let context = EvaluationContext::new(
            lookup("CONTEXT_KEY").unwrap_or_else(|| "sample-daemon".into()),
            lookup("CONTEXT_NAME").unwrap_or_else(|| "Daemon".into()),
        );
        let source_path =
            PathBuf::from(lookup("FLAG_SOURCE_PATH").unwrap_or_else(|| "flags.json".into()));

        Ok(Self {
            credential,
            flag_keys,
            target_path,
            backup_enabled,
            log_level,
            debounce_window,
            context,
            source_path,
        })
    }
}

fn parse_flag_keys(raw: &str) -> Result<Vec<FlagKey>, ConfigError> {
    let keys: Vec<FlagKey> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(FlagKey::from)
        .collect();
    if keys.is_empty() {
        return Err(ConfigError::NoFlagKeys);
    }
    Ok(keys)
}

/// Truthy values accepted for boolean env vars: `1`, `true`, `yes`, `y`.
fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
