//! Durable key-value storage and the single-record weather cache on top of it.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::warn;

use crate::{
    config::{Config, project_dirs},
    error::StorageError,
    model::WeatherRecord,
};

/// Local key-value storage surviving process restarts (or not, for [`MemoryStore`]).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// One file per key: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The platform data directory, e.g. `~/.local/share/weather` on Linux.
    pub fn default_location() -> anyhow::Result<Self> {
        Ok(Self::new(project_dirs()?.data_dir()))
    }

    /// The configured `data_dir`, else [`FileStore::default_location`].
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        match &config.data_dir {
            Some(dir) => Ok(Self::new(dir)),
            None => Self::default_location(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)
            .map_err(|source| StorageError::Io { path: self.dir.clone(), source })?;

        let path = self.key_path(key);
        fs::write(&path, value).map_err(|source| StorageError::Io { path, source })
    }
}

/// In-process store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // Values are plain strings, a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Mirrors the current [`WeatherRecord`] into a [`KeyValueStore`] under one key.
#[derive(Debug)]
pub struct WeatherCache<S> {
    store: S,
}

impl<S: KeyValueStore> WeatherCache<S> {
    pub const KEY: &'static str = "weather";

    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The stored record, if present and parseable. Anything else counts as absent.
    pub fn restore(&self) -> Option<WeatherRecord> {
        let raw = match self.store.get(Self::KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Could not read stored weather record");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Ignoring unparseable stored weather record");
                None
            }
        }
    }

    pub fn persist(&self, record: &WeatherRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string(record)?;
        self.store.set(Self::KEY, &json)
    }
}
