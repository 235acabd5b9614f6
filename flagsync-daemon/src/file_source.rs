//! File-backed evaluation source.
//!
//! Implements [`EvaluationClient`] on top of a local JSON object file
//! (`{"FLAG_KEY": "value", ...}`) watched with `notify`. Rewriting the file
//! reloads it, diffs old against new values, and delivers one change
//! notification per changed key — the same push-then-reevaluate shape a
//! remote flag platform provides. A networked client is a drop-in trait
//! implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::Value;

use flagsync_core::{
    ChangeHandler, ChangeNotification, Evaluation, EvaluationClient, EvaluationContext, FlagKey,
};

use crate::error::{io_err, DaemonError};

type FlagValues = HashMap<String, Value>;

/// Local JSON file standing in for the remote flag platform.
pub struct FileSource {
    path: PathBuf,
    values: Arc<RwLock<FlagValues>>,
    handlers: Arc<RwLock<Vec<ChangeHandler>>>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl FileSource {
    /// Connect to the flag file: load the initial dataset and start watching
    /// for changes.
    ///
    /// Fails if the file is missing or not a JSON object — the local analog
    /// of a connection that never confirms its initial data.
    pub fn connect(path: &Path) -> Result<Self, DaemonError> {
        let initial = load_values(path)?;
        let values = Arc::new(RwLock::new(initial));
        let handlers: Arc<RwLock<Vec<ChangeHandler>>> = Arc::new(RwLock::new(Vec::new()));

        let watcher = spawn_watcher(path, values.clone(), handlers.clone())?;

        tracing::info!(path = %path.display(), "flag source connected");
        Ok(Self {
            path: path.to_path_buf(),
            values,
            handlers,
            watcher: Mutex::new(Some(watcher)),
        })
    }
}

impl EvaluationClient for FileSource {
    fn evaluate(&self, key: &FlagKey, _context: &EvaluationContext) -> Evaluation {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        match values.get(key.as_str()) {
            Some(Value::String(value)) => Evaluation::Value(value.clone()),
            Some(other) => Evaluation::Failed {
                reason: format!("flag is not string-typed (got {})", json_kind(other)),
            },
            None => Evaluation::Failed {
                reason: "flag not found".to_string(),
            },
        }
    }

    fn subscribe(&self, on_change: ChangeHandler) {
        self.handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(on_change);
    }

    fn close(&self) {
        let mut watcher = self.watcher.lock().unwrap_or_else(|e| e.into_inner());
        if watcher.take().is_some() {
            tracing::info!(path = %self.path.display(), "flag source closed");
        }
    }
}

fn spawn_watcher(
    path: &Path,
    values: Arc<RwLock<FlagValues>>,
    handlers: Arc<RwLock<Vec<ChangeHandler>>>,
) -> Result<RecommendedWatcher, DaemonError> {
    let source_path = path.to_path_buf();
    let file_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| DaemonError::InvalidSource {
            path: path.to_path_buf(),
            message: "path has no file name".to_string(),
        })?;

    let mut watcher = recommended_watcher(move |event: notify::Result<Event>| {
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(error = %err, "flag source watcher event error");
                return;
            }
        };
        if !is_relevant_event_kind(&event.kind) {
            return;
        }
        if !event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
        {
            return;
        }
        reload_and_notify(&source_path, &values, &handlers);
    })?;

    // Watch the containing directory so rename-into-place replacements are
    // observed, not just in-place modifications.
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

fn is_relevant_event_kind(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

fn reload_and_notify(
    path: &Path,
    values: &RwLock<FlagValues>,
    handlers: &RwLock<Vec<ChangeHandler>>,
) {
    // A transient failure (partial write, momentary removal) keeps the
    // previous values; the next successful reload catches us up.
    let fresh = match load_values(path) {
        Ok(fresh) => fresh,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "flag source reload failed, keeping previous values");
            return;
        }
    };

    let changed = {
        let mut current = values.write().unwrap_or_else(|e| e.into_inner());
        let changed = changed_keys(&current, &fresh);
        *current = fresh;
        changed
    };

    if changed.is_empty() {
        return;
    }
    tracing::debug!(path = %path.display(), changed = changed.len(), "flag source changed");

    let handlers = handlers.read().unwrap_or_else(|e| e.into_inner());
    for key in changed {
        for handler in handlers.iter() {
            handler(ChangeNotification::new(key.as_str()));
        }
    }
}

/// Keys whose value differs between `old` and `new` (added, removed, or
/// changed), in sorted order for deterministic delivery.
fn changed_keys(old: &FlagValues, new: &FlagValues) -> Vec<String> {
    let mut changed: Vec<String> = old
        .keys()
        .chain(new.keys())
        .filter(|key| old.get(*key) != new.get(*key))
        .cloned()
        .collect();
    changed.sort();
    changed.dedup();
    changed
}

fn load_values(path: &Path) -> Result<FlagValues, DaemonError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let parsed: Value = serde_json::from_str(&contents)?;
    match parsed {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(DaemonError::InvalidSource {
            path: path.to_path_buf(),
            message: "flag source must be a JSON object of key/value pairs".to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
