//! File-backed state store.
//!
//! The home-automation backend exports its states as one JSON object:
//!
//! ```json
//! {
//!   "0_userdata.0.Klima.Aussenfeuchte": { "val": 71, "ts": 1718000000000, "ack": true },
//!   "0_userdata.0.vis.trash.Tonne_draussen": false
//! }
//! ```
//!
//! Entries may be full state objects or bare values.  The file is loaded into
//! a [`StateSnapshot`] which widgets read; the app reloads it whenever the
//! file changes.  Commands are written back into the same file, so their
//! effect only becomes visible after the next reload.

use serde_json::{Map, Value};
use sidebar_core::{
    state::{CommandSink, StateEntry, StateSnapshot, StateStore, StateValue},
    Result, SidebarError,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// State store backed by a JSON snapshot file.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path:     PathBuf,
    snapshot: StateSnapshot,
}

impl FileStateStore {
    /// Open `path` and load it.  A missing or unreadable file yields an empty
    /// store; every widget then shows its "no data" rendering.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let store = Self {
            path:     path.as_ref().to_path_buf(),
            snapshot: StateSnapshot::new(),
        };
        if let Err(e) = store.reload() {
            warn!("Starting with empty states: {e}");
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handle to the shared in-memory snapshot.
    pub fn snapshot(&self) -> StateSnapshot {
        self.snapshot.clone()
    }

    /// Re-read the file and swap the snapshot.  On error the previous
    /// snapshot stays in place.  Returns the number of loaded entries.
    pub fn reload(&self) -> Result<usize> {
        if !self.path.exists() {
            return Err(SidebarError::State(format!(
                "state file '{}' not found",
                self.path.display()
            )));
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let entries = parse_snapshot(&raw)?;
        let count = entries.len();
        self.snapshot.replace_all(entries);
        debug!("Loaded {count} states from '{}'", self.path.display());
        Ok(count)
    }

    /// Persist `value` for `key` in the snapshot file.
    ///
    /// Other entries and the bookkeeping fields of `key` are preserved; the
    /// entry is marked unacknowledged.
    pub fn write_value(&self, key: &str, value: StateValue) -> Result<()> {
        let mut root = if self.path.exists() {
            match serde_json::from_str::<Value>(&std::fs::read_to_string(&self.path)?) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(SidebarError::State(
                        "state file root is not an object".into(),
                    ))
                }
                Err(e) => return Err(SidebarError::State(format!("parse states: {e}"))),
            }
        } else {
            Map::new()
        };

        let ts = Value::from(chrono::Utc::now().timestamp_millis());
        match root.get_mut(key) {
            Some(Value::Object(entry)) => {
                entry.insert("val".into(), value);
                entry.insert("ts".into(), ts);
                entry.insert("ack".into(), Value::Bool(false));
            }
            _ => {
                let mut entry = Map::new();
                entry.insert("val".into(), value);
                entry.insert("ts".into(), ts);
                entry.insert("ack".into(), Value::Bool(false));
                root.insert(key.to_string(), Value::Object(entry));
            }
        }

        let pretty = serde_json::to_string_pretty(&Value::Object(root))
            .map_err(|e| SidebarError::State(format!("serialize states: {e}")))?;

        // Write-then-rename so the watcher never reloads a truncated file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, pretty)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn get(&self, key: &str) -> Option<StateEntry> {
        self.snapshot.get(key)
    }
}

impl CommandSink for FileStateStore {
    fn send_command(&self, key: &str, value: StateValue) {
        info!("Command: {key} = {value}");
        if let Err(e) = self.write_value(key, value) {
            warn!("Command for '{key}' not written: {e}");
        }
    }
}

/// Parse a snapshot document into state entries.
pub fn parse_snapshot(raw: &str) -> Result<HashMap<String, StateEntry>> {
    let root: Value =
        serde_json::from_str(raw).map_err(|e| SidebarError::State(format!("parse states: {e}")))?;
    let Value::Object(map) = root else {
        return Err(SidebarError::State("state file root is not an object".into()));
    };

    Ok(map
        .into_iter()
        .map(|(key, value)| {
            let entry = if value.get("val").is_some() {
                serde_json::from_value(value.clone()).unwrap_or_else(|_| StateEntry::new(value))
            } else {
                StateEntry::new(value)
            };
            (key, entry)
        })
        .collect())
}
