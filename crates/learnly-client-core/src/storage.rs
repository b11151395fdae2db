//! Durable key-value persistence for the session (the browser localStorage
//! analog). Values are JSON, reads that fail to parse are treated as absent
//! so a corrupt entry cannot poison startup.

use std::{collections::HashMap, fmt::Debug, path::PathBuf};

use serde_json::Value;
use tracing::warn;

/// Synchronous key-value persistence with JSON-serialized values.
///
/// The session store is the sole writer of its keys; other subsystems may
/// read but must not write them.
pub trait DurableStore: Debug + Send {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);
}

/// Reads `key` and parses it into `T`, treating parse failures as absent
pub fn get_parsed<T: serde::de::DeserializeOwned>(
    store: &dyn DurableStore,
    key: &str,
) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("stored value for {key:?} failed to parse, treating as absent: {e}");
            None
        }
    }
}

/// Serializes `value` and writes it under `key`. Serialization failures are
/// logged, not surfaced, matching the write-through-but-never-block contract
pub fn set_serialized<T: serde::Serialize>(store: &mut dyn DurableStore, key: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(serialized) => store.set(key, serialized),
        Err(e) => warn!("failed to serialize value for {key:?}: {e}"),
    }
}

/// Single JSON object file on disk, read once at open and rewritten on every
/// mutation
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: serde_json::Map<String, Value>,
}

impl FileStore {
    #[tracing::instrument]
    pub fn open(path: impl Into<PathBuf> + Debug) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    warn!("store file {path:?} did not hold an object, starting empty");
                    serde_json::Map::new()
                }
                Err(e) => {
                    warn!("store file {path:?} was corrupt, starting empty: {e}");
                    serde_json::Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => serde_json::Map::new(),
            Err(e) => {
                warn!("failed to read store file {path:?}, starting empty: {e}");
                serde_json::Map::new()
            }
        };
        Self { path, entries }
    }

    fn write_out(&self) {
        let contents = Value::Object(self.entries.clone()).to_string();
        if let Err(e) = std::fs::write(&self.path, contents) {
            warn!("failed to write store file {:?}: {e}", self.path);
        }
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
        self.write_out();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.write_out();
        }
    }
}

/// HashMap-backed store for tests and sessions that should not outlive the
/// process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
