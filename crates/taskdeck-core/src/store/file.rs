use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::KeyValueStore;

/// Store file name in cache directory
const STORE_FILE: &str = "store.json";

/// JSON-file backed store.
///
/// The file is re-read on every access so values written by another process
/// (or a previous run) are always visible.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store rooted in `cache_dir`, using the default file name
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self::at_path(cache_dir.as_ref().join(STORE_FILE))
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry. A file that does not parse is treated as empty so
    /// the next write replaces it; I/O errors are still returned.
    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store file: {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Store file is corrupt, starting empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    /// Write to a sibling temp file and rename it over the store, so a crash
    /// never leaves a half-written store behind.
    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, contents)
            .with_context(|| format!("Failed to write store file: {}", tmp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))
                .context("Failed to restrict store file permissions")?;
        }

        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace store file: {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)?;
        debug!(key = key, path = %self.path.display(), "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        // Always rewrite, so a corrupt file is replaced even when the key
        // could not be read out of it
        let mut entries = self.read_all()?;
        entries.remove(key);
        self.write_all(&entries)?;
        debug!(key = key, "Removed value");
        Ok(())
    }
}
