//! Key-value persistence for configuration text and run state

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::Mutex,
};
use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// Key holding the raw configuration text
pub const CONFIG_KEY: &str = "proctor_config";
/// Key holding the serialized run state
pub const RUN_STATE_KEY: &str = "proctor_state";

/// Synchronous, last-write-wins string storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One file per key inside a state directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the state directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create state directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.tmp", key));
        fs::write(&tmp, value)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        debug!("Persisted {} ({} bytes)", key, value.len());
        Ok(())
    }
}

/// In-process store for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing entries
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.entries.lock() {
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self
            .entries
            .lock()
            .map_err(|e| anyhow!("Failed to lock memory store: {}", e))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self
            .entries
            .lock()
            .map_err(|e| anyhow!("Failed to lock memory store: {}", e))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();

        assert_eq!(store.get(CONFIG_KEY).unwrap(), None);
        store.set(CONFIG_KEY, "30, 15").unwrap();
        store.set(CONFIG_KEY, "10, 5").unwrap();
        assert_eq!(store.get(CONFIG_KEY).unwrap().as_deref(), Some("10, 5"));

        // A second handle on the same directory sees the same data
        let reopened = FileStore::open(dir.path().join("nested")).unwrap();
        assert_eq!(reopened.get(CONFIG_KEY).unwrap().as_deref(), Some("10, 5"));
    }

    #[test]
    fn memory_store_seeds_entries() {
        let store = MemoryStore::with_entries([(RUN_STATE_KEY, "{}")]);
        assert_eq!(store.get(RUN_STATE_KEY).unwrap().as_deref(), Some("{}"));
        assert_eq!(store.get(CONFIG_KEY).unwrap(), None);
    }
}
