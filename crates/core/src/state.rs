use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Raw value of a backend state.  The backend stores arbitrary JSON.
pub type StateValue = Value;

/// One entry of the home-automation state store.
///
/// Only `val` is interpreted by the widgets; the bookkeeping fields are kept
/// so a snapshot can be written back without losing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    #[serde(default)]
    pub val: StateValue,
    /// Last-change timestamp (ms since epoch), as reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
    /// `true` once the backend acknowledged the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<bool>,
}

impl StateEntry {
    pub fn new(val: impl Into<StateValue>) -> Self {
        Self {
            val: val.into(),
            ts: None,
            ack: None,
        }
    }
}

/// Read side of the state store.
///
/// Implementations are snapshots kept current by someone else; reads never
/// block on the backend.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Option<StateEntry>;
}

/// Write side of the state store.  Fire-and-forget: no acknowledgement is
/// observed by the caller, the new value arrives through the next snapshot.
pub trait CommandSink: Send + Sync {
    fn send_command(&self, key: &str, value: StateValue);
}

/// Look up `key` and return its value.
///
/// An empty key id, a missing entry and a `null` value all mean "no data".
pub fn read_value<S: StateStore + ?Sized>(store: &S, key: &str) -> Option<StateValue> {
    if key.is_empty() {
        return None;
    }
    match store.get(key)?.val {
        Value::Null => None,
        val => Some(val),
    }
}

/// Truthiness as the dashboard backend's scripting side understands it.
pub fn is_truthy(value: &StateValue) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric view of a value.  Numeric strings and booleans coerce; anything
/// else (including the empty string) yields `None`.
pub fn as_number(value: &StateValue) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Display string of a value.
pub fn as_text(value: &StateValue) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

// ── In-memory snapshot ────────────────────────────────────────────────────────

/// Shared, cheaply clonable in-memory copy of the backend's states.
///
/// Clones share the same map, so a loader can swap contents while widgets
/// keep reading through their own handle.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    inner: Arc<RwLock<HashMap<String, StateEntry>>>,
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, entry: StateEntry) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), entry);
    }

    /// Shorthand for inserting a bare value.
    pub fn set(&self, key: impl Into<String>, val: impl Into<StateValue>) {
        self.insert(key, StateEntry::new(val));
    }

    pub fn remove(&self, key: &str) -> Option<StateEntry> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Replace every entry at once; readers never observe a half-applied load.
    pub fn replace_all(&self, entries: HashMap<String, StateEntry>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = entries;
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for StateSnapshot {
    fn get(&self, key: &str) -> Option<StateEntry> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}
