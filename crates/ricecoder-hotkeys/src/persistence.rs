//! Key/value storage for user binding overrides
//!
//! # Storage Location
//!
//! [`FileStore::with_default_location`] keeps one file per key under the
//! platform config directory:
//!
//! ```text
//! ~/.config/ricecoder/hotkeys/
//! └── hotkeys.overrides      # JSON object: action id -> pattern or null
//! ```
//!
//! # File Format
//!
//! ```json
//! {
//!   "editor.save": "ctrl+s",
//!   "editor.close": null
//! }
//! ```
//!
//! A `null` pattern disables every binding of the action.
//!
//! # Usage
//!
//! ```no_run
//! use ricecoder_hotkeys::{FileStore, UserOverrides};
//!
//! let store = FileStore::with_default_location()?;
//! let overrides = UserOverrides::load(&store)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StoreError;
use crate::keymap::Keymap;

/// Key under which overrides are stored
pub const OVERRIDES_KEY: &str = "hotkeys.overrides";

/// String key/value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// File-backed store, one file per key
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| map_io(e, &dir))?;
        }
        Ok(FileStore { dir })
    }

    /// Store under `<config dir>/ricecoder/hotkeys`
    pub fn with_default_location() -> Result<Self, StoreError> {
        let base = dirs::config_dir()
            .ok_or_else(|| StoreError::Unavailable("no config directory on this platform".to_string()))?;
        Self::new(base.join("ricecoder").join("hotkeys"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StoreError::Unavailable(format!("invalid key: {}", key)));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io(e, &path)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        fs::write(&path, value).map_err(|e| map_io(e, &path))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io(e, &path)),
        }
    }
}

fn map_io(e: std::io::Error, path: &Path) -> StoreError {
    if e.kind() == ErrorKind::PermissionDenied {
        StoreError::PermissionDenied(path.to_string_lossy().to_string())
    } else {
        StoreError::Io(e)
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.values
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// User changes layered over the declared keymap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserOverrides {
    overrides: BTreeMap<String, Option<String>>,
}

impl UserOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from a store; a missing key gives an empty set
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        match store.get(OVERRIDES_KEY)? {
            Some(content) => serde_json::from_str(&content)
                .map_err(|e| StoreError::Serialization(format!("Failed to parse overrides: {}", e))),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        if self.overrides.is_empty() {
            return store.remove(OVERRIDES_KEY);
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| StoreError::Serialization(format!("Failed to serialize overrides: {}", e)))?;
        store.set(OVERRIDES_KEY, &json)
    }

    /// Record a new pattern for an action, `None` to disable it
    pub fn set(&mut self, action: impl Into<String>, pattern: Option<String>) {
        self.overrides.insert(action.into(), pattern);
    }

    /// Forget the override for an action
    pub fn reset(&mut self, action: &str) -> bool {
        self.overrides.remove(action).is_some()
    }

    pub fn get(&self, action: &str) -> Option<Option<&str>> {
        self.overrides.get(action).map(Option::as_deref)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Rebind every overridden action in `keymap`. Invalid patterns are skipped.
    pub fn apply(&self, keymap: &mut Keymap) {
        for (action, pattern) in &self.overrides {
            if let Err(e) = keymap.rebind_action(action, pattern.as_deref()) {
                tracing::warn!(%action, "ignoring hotkey override: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_overrides_apply() {
        let mut keymap = Keymap::from_pairs([("ctrl+s", "save"), ("ctrl+w", "close")]);
        let mut overrides = UserOverrides::new();
        overrides.set("save", Some("g s".to_string()));
        overrides.set("close", None);
        overrides.apply(&mut keymap);

        assert_eq!(keymap.patterns_for_action("save"), vec!["g s"]);
        assert!(keymap.patterns_for_action("close").is_empty());
    }

    #[test]
    fn test_overrides_null_survives_serialization() {
        let store = MemoryStore::new();
        let mut overrides = UserOverrides::new();
        overrides.set("close", None);
        overrides.save(&store).unwrap();

        let loaded = UserOverrides::load(&store).unwrap();
        assert_eq!(loaded.get("close"), Some(None));
    }
}
