//! File-system backend: one file per key.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{Backend, StorageError};

/// Stores each key as a file named after the key inside one directory.
///
/// Values survive process restarts, which makes this the closest thing
/// to browser `localStorage` for a native client.
///
/// Every write goes to its own uniquely named temporary file in the same
/// directory, is synced to disk, and is then renamed over the key's file.
/// A reader never sees a half-written token, and concurrent writers
/// (two processes sharing the directory) never trip over each other's
/// temporary file: the last rename wins.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Opens (and creates if needed) the storage directory.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] if the directory can't be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// The directory values are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !is_safe_key(key) {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(key))
    }
}

/// Keys become file names, so only allow a conservative character set
/// and nothing that could climb out of the directory.
fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn io_err(key: &str) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_owned(),
        source,
    }
}

impl Backend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(key)(e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        // new_in picks a random name with O_EXCL, so it can't collide
        // with another writer's temp file. Same directory keeps the
        // rename on one filesystem.
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err(key))?;
        tmp.as_file_mut()
            .write_all(value.as_bytes())
            .map_err(io_err(key))?;
        tmp.as_file().sync_all().map_err(io_err(key))?;
        tmp.persist(&path).map_err(|e| io_err(key)(e.error))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(key)(e)),
        }
    }
}
