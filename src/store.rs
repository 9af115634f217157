//! Key/document storage for dashboard state.
//!
//! Tickets, notifications and availability flags are kept as JSON documents
//! under short keys. Components receive a store explicitly; there is no
//! process-wide instance.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;

/// Storage for JSON documents addressed by key.
pub trait DocumentStore: Send + Sync {
    /// Load the document stored under `key`, if present.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `value` under `key`, replacing any previous document.
    fn put(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove the document under `key`. Returns whether one existed.
    fn remove(&self, key: &str) -> Result<bool, StoreError>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Read, edit and write back the document under `key` as one step.
    ///
    /// `edit` sees the current document and returns the replacement, or
    /// `None` to leave the stored document untouched. No other `put` or
    /// `update` on the same store interleaves with it.
    fn update(
        &self,
        key: &str,
        edit: &mut dyn FnMut(Option<Value>) -> Result<Option<Value>, StoreError>,
    ) -> Result<(), StoreError>;
}

/// Load and deserialize a document.
pub fn load<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serialize and store a document.
pub fn save<T: Serialize>(
    store: &dyn DocumentStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    store.put(key, serde_json::to_value(value)?)
}

/// Atomically edit a typed document, starting from `T::default()` when the
/// key is absent.
///
/// The document is written back only when `edit` returns `Ok`; an `Err`
/// from `edit` leaves the store unchanged and is returned as-is.
pub fn modify<T, R, E, F>(store: &dyn DocumentStore, key: &str, edit: F) -> Result<R, E>
where
    T: Serialize + DeserializeOwned + Default,
    E: From<StoreError>,
    F: FnOnce(&mut T) -> Result<R, E>,
{
    let mut edit = Some(edit);
    let mut outcome: Option<Result<R, E>> = None;
    store.update(key, &mut |current| {
        let mut document: T = match current {
            Some(value) => serde_json::from_value(value)?,
            None => T::default(),
        };
        let Some(apply) = edit.take() else {
            return Ok(None);
        };
        match apply(&mut document) {
            Ok(result) => {
                outcome = Some(Ok(result));
                Ok(Some(serde_json::to_value(&document)?))
            }
            Err(e) => {
                outcome = Some(Err(e));
                Ok(None)
            }
        }
    })?;
    outcome.unwrap_or_else(|| Err(StoreError::EditNotApplied(key.to_string()).into()))
}

/// Keys are used as file names, so only a safe alphabet is allowed.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// In-process store, used by tests and by the CLI when no data dir is set.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        validate_key(key)?;
        let documents = self.documents.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(documents.get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut documents = self.documents.lock().map_err(|_| StoreError::Poisoned)?;
        documents.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        validate_key(key)?;
        let mut documents = self.documents.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(documents.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let documents = self.documents.lock().map_err(|_| StoreError::Poisoned)?;
        let mut keys: Vec<String> = documents.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn update(
        &self,
        key: &str,
        edit: &mut dyn FnMut(Option<Value>) -> Result<Option<Value>, StoreError>,
    ) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut documents = self.documents.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(value) = edit(documents.get(key).cloned())? {
            documents.insert(key.to_string(), value);
        }
        Ok(())
    }
}

/// One `<key>.json` file per document inside a directory.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    // Held for every file access, and across the whole of `update`. Only
    // orders callers sharing this instance; other processes are not excluded.
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(JsonFileStore {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }

    // Callers hold `lock`.
    fn read(path: &Path) -> Result<Option<Value>, StoreError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // Callers hold `lock`.
    fn write(path: &Path, value: &Value) -> Result<(), StoreError> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key)?;
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Self::read(&path)
    }

    fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Self::write(&path, &value)?;
        debug!("Saved document {} to {}", key, path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key)?;
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn update(
        &self,
        key: &str,
        edit: &mut dyn FnMut(Option<Value>) -> Result<Option<Value>, StoreError>,
    ) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(value) = edit(Self::read(&path)?)? {
            Self::write(&path, &value)?;
            debug!("Updated document {} in {}", key, path.display());
        }
        Ok(())
    }
}
