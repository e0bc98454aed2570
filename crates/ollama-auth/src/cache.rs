// ABOUTME: Opt-in cache of loaded signing keys keyed by file path.
// ABOUTME: Entries stay until explicitly invalidated; never refreshed behind the caller's back.

use crate::error::Result;
use crate::key::{load_key, KeyMaterial};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Loaded keys shared across signing calls.
///
/// Keys are indexed by the path they were loaded from. A key file that
/// changes on disk keeps serving the cached key until [`KeyCache::invalidate`]
/// or [`KeyCache::clear`] is called.
#[derive(Debug, Default)]
pub struct KeyCache {
    keys: RwLock<HashMap<PathBuf, KeyMaterial>>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached key for `path`, loading it on first use.
    ///
    /// Load failures are not cached.
    pub fn get_or_load(&self, path: &Path, passphrase: Option<&[u8]>) -> Result<KeyMaterial> {
        if let Some(key) = self.read().get(path) {
            tracing::debug!(path = %path.display(), "signing key cache hit");
            return Ok(key.clone());
        }

        let key = load_key(path, passphrase)?;
        self.write().insert(path.to_path_buf(), key.clone());
        Ok(key)
    }

    /// Drop the entry for `path`. Returns whether one was present.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.write().remove(path).is_some()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A poisoned lock only means another thread panicked mid-insert of a
    // fully built value; the map itself is still consistent.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<PathBuf, KeyMaterial>> {
        self.keys.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<PathBuf, KeyMaterial>> {
        self.keys.write().unwrap_or_else(|e| e.into_inner())
    }
}
