//! Domain types for the flagsync daemon.
//!
//! All types are serializable/deserializable via serde.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed key naming one remotely-managed flag.
///
/// Keys are expected to be non-empty; the config layer trims entries and
/// drops blanks before any `FlagKey` is constructed, so downstream code never
/// sees an empty key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagKey(pub String);

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FlagKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FlagKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl FlagKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Evaluation context
// ---------------------------------------------------------------------------

/// The identity used for every evaluation call.
///
/// Constant for the process lifetime; it selects which targeting rules apply
/// but never affects flag identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub key: String,
    pub name: String,
}

impl EvaluationContext {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Change notification
// ---------------------------------------------------------------------------

/// One upstream "this flag may have changed" event.
///
/// Carries only the key — the new value is obtained by re-evaluation, since
/// evaluation depends on context and targeting rules not encoded in the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub key: FlagKey,
}

impl ChangeNotification {
    pub fn new(key: impl Into<FlagKey>) -> Self {
        Self { key: key.into() }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An ordered mapping from flag key to evaluated string value.
///
/// Covers exactly the configured key set: a failed evaluation yields an empty
/// string entry, never a missing one. Built fresh on every resync and replaced
/// wholesale, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    entries: Vec<(FlagKey, String)>,
}

impl Snapshot {
    /// Build a snapshot from already-ordered entries.
    pub fn from_entries(entries: Vec<(FlagKey, String)>) -> Self {
        Self { entries }
    }

    /// Value for `key`, if the key is part of this snapshot.
    pub fn get(&self, key: &FlagKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Entries in configured order.
    pub fn iter(&self) -> impl Iterator<Item = (&FlagKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Keys in configured order.
    pub fn keys(&self) -> impl Iterator<Item = &FlagKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
