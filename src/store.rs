//! Key/value state storage
//!
//! A flat string map kept in memory and, when file-backed, rewritten in
//! full as a JSON object on every write. The fleet lives under a single
//! key as one serialized array.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::Server;
use crate::Result;

/// Key the fleet is stored under
pub const STORAGE_KEY: &str = "vps-fleet.servers";

/// File name used inside a data directory
pub const STORE_FILE: &str = "fleet-store.json";

#[derive(Clone)]
pub struct Store {
    path: Option<PathBuf>,
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl Store {
    /// Open or create a file-backed store. A malformed file opens empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed store file");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: Some(path),
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.into());
        self.flush(&entries)
    }

    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.lock();
        let removed = entries.remove(key).is_some();
        if removed {
            self.flush(&entries)?;
        }
        Ok(removed)
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Load the persisted fleet. Absent or malformed data yields `None`.
pub fn load_servers(store: &Store) -> Option<Vec<Server>> {
    let raw = store.get(STORAGE_KEY)?;
    match serde_json::from_str::<Vec<Server>>(&raw) {
        Ok(servers) => Some(servers),
        Err(e) => {
            tracing::warn!(key = STORAGE_KEY, error = %e, "Discarding malformed fleet data");
            None
        }
    }
}

/// Rewrite the persisted fleet in full
pub fn save_servers(store: &Store, servers: &[Server]) -> Result<()> {
    store.set(STORAGE_KEY, serde_json::to_string(servers)?)
}
