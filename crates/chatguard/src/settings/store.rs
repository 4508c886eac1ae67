//! Settings persistence.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::Settings;
use crate::error::Result;

/// Backing storage for [`Settings`].
///
/// `load` returns `Ok(None)` when nothing has ever been stored, which is
/// how first run is recognized.
pub trait SettingsStore: Send + Sync {
    /// Load the stored settings, if any.
    fn load(&self) -> Result<Option<Settings>>;

    /// Persist settings.
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// In-memory store, used by tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: Mutex<Option<Settings>>,
}

impl MemoryStore {
    /// Create an empty store (first run).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds settings.
    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            value: Mutex::new(Some(settings)),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<Settings>> {
        let value = self.value.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(value.clone())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let mut value = self.value.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *value = Some(settings.clone());
        Ok(())
    }
}

/// JSON file store holding the flat settings map.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileStore {
    fn load(&self) -> Result<Option<Settings>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
