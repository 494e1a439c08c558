//! Key-value string storage for session state.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use thiserror::Error;
use tracing::warn;

/// Store failures. Callers recover locally; these are never shown to the
/// reader.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Flat string-to-string storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String) -> Result<(), PersistenceError>;

    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

// ─── In-memory ───────────────────────────────────────────────────────

/// Volatile store; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

// ─── JSON file ───────────────────────────────────────────────────────

/// Store backed by a single JSON object on disk.
///
/// The file is read once on open. Every write rewrites it through a
/// temporary file while holding an exclusive lock on `<file>.lock`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing or unreadable file opens empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = read_values(&path);
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), PersistenceError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;

        let lock_path = self.path.with_extension("json.lock");
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| self.io_err(e))?;
        lock.lock_exclusive().map_err(|e| self.io_err(e))?;

        let content = serde_json::to_string_pretty(values).map_err(|source| PersistenceError::Encode {
            key: "*".to_string(),
            source,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
        tmp.write_all(content.as_bytes()).map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;

        // Lock is released when `lock` is dropped
        Ok(())
    }
}

fn read_values(path: &Path) -> BTreeMap<String, String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Session store unreadable, starting empty");
            return BTreeMap::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(values) => values,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Session store corrupt, starting empty");
            BTreeMap::new()
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.get("a").is_none());
        store.set("a", "1".to_string()).unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_json_store_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("session.json");

        let store = JsonFileStore::open(&path);
        store.set("settings", "{}".to_string()).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get("settings").as_deref(), Some("{}"));
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert!(store.get("settings").is_none());

        // First write replaces the corrupt file
        store.set("settings", "{}".to_string()).unwrap();
        assert_eq!(JsonFileStore::open(&path).get("settings").as_deref(), Some("{}"));
    }
}
