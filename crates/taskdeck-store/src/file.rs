use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{BlobStore, Result};

/// Blob stored in a single file on disk.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    path: PathBuf,
}

impl FileBlobStore {
    /// Use `path` as the blob file. Nothing is touched until the first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the blob file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the blob file with `.tmp` appended to the full name.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl BlobStore for FileBlobStore {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, blob: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Readers see either the old blob or the new one, never a partial write.
        let temp_path = self.temp_path();
        let written = write_and_rename(&temp_path, &self.path, blob);
        if written.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        written?;

        debug!(path = %self.path.display(), "Wrote task blob");
        Ok(())
    }
}

fn write_and_rename(temp_path: &Path, path: &Path, blob: &[u8]) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(blob)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_dir() -> TempDir {
        TempDir::with_prefix("taskdeck-store-").unwrap_or_else(|err| panic!("create temp dir: {err}"))
    }

    #[test]
    fn missing_file_is_nothing_saved() {
        let dir = temp_dir();
        let store = FileBlobStore::new(dir.path().join("tasks.json"));
        let loaded = store.load().unwrap_or_else(|err| panic!("load: {err}"));
        assert!(loaded.is_none());
    }

    #[test]
    fn save_creates_parent_dirs_and_overwrites() {
        let dir = temp_dir();
        let path = dir.path().join("nested").join("deeper").join("tasks.json");
        let store = FileBlobStore::new(&path);

        store.save(b"[1]").unwrap_or_else(|err| panic!("first save: {err}"));
        store.save(b"[]").unwrap_or_else(|err| panic!("second save: {err}"));

        let loaded = store.load().unwrap_or_else(|err| panic!("load: {err}"));
        assert_eq!(loaded.as_deref(), Some(&b"[]"[..]));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn temp_file_is_a_distinct_sibling() {
        let dir = temp_dir();
        let path = dir.path().join("tasks.tmp");
        let store = FileBlobStore::new(&path);
        assert_eq!(store.temp_path(), dir.path().join("tasks.tmp.tmp"));

        store.save(b"[]").unwrap_or_else(|err| panic!("save: {err}"));
        let loaded = store.load().unwrap_or_else(|err| panic!("load: {err}"));
        assert_eq!(loaded.as_deref(), Some(&b"[]"[..]));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = temp_dir();
        let target = dir.path().join("tasks.json");
        // A non-empty directory at the target makes the rename fail.
        fs::create_dir_all(target.join("occupied")).unwrap_or_else(|err| panic!("mkdir: {err}"));
        let store = FileBlobStore::new(&target);

        assert!(store.save(b"[]").is_err());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn directory_in_place_of_file_is_an_error() {
        let dir = temp_dir();
        let store = FileBlobStore::new(dir.path());
        assert!(store.load().is_err());
    }
}
