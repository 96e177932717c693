//! File-backed local fallback store: one file per key under a directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bloodbank_core::{LocalStore, StoreError, StoreResult};

/// Persists each key as `<dir>/<key>`; values survive restarts.
#[derive(Debug, Clone)]
pub struct FileLocalStore {
    dir: PathBuf,
}

impl FileLocalStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StoreError::backend(format!("failed to create local store directory {dir:?}: {e}"))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StoreError::InvalidIdentifier(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl LocalStore for FileLocalStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::backend(format!("failed to read {path:?}: {e}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        // Write-then-rename so a crash never leaves a half-written value.
        let tmp = self.dir.join(format!(".{key}.tmp"));
        std::fs::write(&tmp, value)
            .map_err(|e| StoreError::backend(format!("failed to write {tmp:?}: {e}")))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| StoreError::backend(format!("failed to replace {path:?}: {e}")))?;
        tracing::debug!(key, bytes = value.len(), "local value written");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::backend(format!("failed to remove {path:?}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileLocalStore::open(tmp.path().join("nested/dir")).unwrap();
        assert_eq!(store.get("donation_requests").unwrap(), None);

        store.set("donation_requests", "[1,2]").unwrap();
        store.set("donation_requests", "[1,2,3]").unwrap();

        let reopened = FileLocalStore::open(store.dir()).unwrap();
        assert_eq!(reopened.get("donation_requests").unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn remove_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileLocalStore::open(tmp.path()).unwrap();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn path_escaping_keys_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileLocalStore::open(tmp.path()).unwrap();
        for bad in ["", "../x", "a/b", ".hidden", "a b"] {
            assert!(
                matches!(store.set(bad, "v"), Err(StoreError::InvalidIdentifier(_))),
                "{bad:?}"
            );
        }
    }
}
