//! Persisted key-value configuration store.
//!
//! The audit log's enabled-flag outlives the process, so it is held in a
//! small external store rather than in memory. The trait keeps the storage
//! backend swappable; the shipped implementations are a TOML file store and
//! an in-memory store for tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::DefenseError;

/// A persisted string key-value store for runtime toggles.
///
/// Implementations must be safe to share across threads. Writes are expected
/// to be rare (operator actions); reads happen at component construction.
pub trait ConfigStore: Send + Sync {
    /// Get the value for a key, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Set a key to a value and persist it.
    fn set(&self, key: &str, value: &str) -> Result<(), DefenseError>;
}

/// File-backed store persisting values as a flat TOML table.
///
/// Values are loaded once at open; `set` rewrites the whole file. The file
/// is small (a handful of toggles), so read-modify-write is acceptable here,
/// unlike on the append-only log files.
pub struct TomlConfigStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl TomlConfigStore {
    /// Open a store at the given path, loading existing values.
    ///
    /// A missing file is not an error; it is created on the first `set`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DefenseError> {
        let path = path.as_ref().to_path_buf();

        let values = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let table: BTreeMap<String, String> =
                    toml::from_str(&content).map_err(|e| DefenseError::Config {
                        message: format!(
                            "Failed to parse config store '{}': {}",
                            path.display(),
                            e
                        ),
                    })?;
                table
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config store not found, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                return Err(DefenseError::Config {
                    message: format!("Failed to read config store '{}': {}", path.display(), e),
                })
            }
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), DefenseError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string(values).map_err(|e| DefenseError::Config {
            message: format!("Failed to serialize config store: {}", e),
        })?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl ConfigStore for TomlConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DefenseError> {
        let mut values = match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }
}

/// In-memory store for tests and embedders that manage persistence
/// themselves.
#[derive(Default)]
pub struct MemoryConfigStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DefenseError> {
        let mut values = match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
