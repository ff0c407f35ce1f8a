//! Persistence backends for the dataset store.
//!
//! A backend holds exactly one serialized payload under the fixed key
//! [`STATE_KEY`]. The store decides when to write; backends only move bytes.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::StoreError;

/// Key under which the dataset state is persisted.
pub const STATE_KEY: &str = "dataset-state";

pub trait Storage {
    /// Prepare the backend (create directories, open handles).
    fn init(&mut self) -> Result<(), StoreError>;

    /// Read the persisted payload, `None` if nothing has been written.
    fn read(&self) -> Result<Option<String>, StoreError>;

    fn write(&mut self, payload: &str) -> Result<(), StoreError>;

    /// Remove the persisted payload. Clearing an empty backend is not an error.
    fn clear(&mut self) -> Result<(), StoreError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn init(&mut self) -> Result<(), StoreError> {
        (**self).init()
    }

    fn read(&self) -> Result<Option<String>, StoreError> {
        (**self).read()
    }

    fn write(&mut self, payload: &str) -> Result<(), StoreError> {
        (**self).write(payload)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

// ============================================================================
// JSON file
// ============================================================================

/// Stores the state as `<dir>/dataset-state.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STATE_KEY}.json")),
        }
    }

    /// Per-user data directory (e.g. `~/.local/share/taskgrid`).
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskgrid")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonFileStorage {
    fn init(&mut self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, payload: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a crash never leaves a truncated state file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Shared in-memory slot. Clones see the same payload, which lets a test
/// "restart" a store by opening a second one over a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(payload.into()))),
        }
    }

    pub fn payload(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl Storage for MemoryStorage {
    fn init(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.lock().clone())
    }

    fn write(&mut self, payload: &str) -> Result<(), StoreError> {
        *self.slot.lock() = Some(payload.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        *self.slot.lock() = None;
        Ok(())
    }
}
