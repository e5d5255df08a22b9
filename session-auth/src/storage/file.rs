//! File-backed storage: one file per key inside a directory.

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::encryption::StorageCipher;
use super::Storage;
use crate::error::{storage_error, Error, StorageErrorKind};

/// Stores each key as `<dir>/<key>.json`, optionally encrypted at rest.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    cipher: Option<StorageCipher>,
}

impl FileStorage {
    /// Create a storage rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            cipher: None,
        })
    }

    /// Encrypt every value with AES-256-GCM using a 64 character hex key.
    pub fn with_encryption_key(mut self, key_hex: &str) -> Result<Self, Error> {
        self.cipher = Some(StorageCipher::from_hex(key_hex)?);
        Ok(self)
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, Error> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(storage_error(
                StorageErrorKind::Io,
                &format!("Invalid storage key: {key:?}"),
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let path = self.path_for(key)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match &self.cipher {
            Some(cipher) => cipher.open(key, &contents).map(Some),
            None => Ok(Some(contents)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let path = self.path_for(key)?;
        let contents = match &self.cipher {
            Some(cipher) => cipher.seal(key, value)?,
            None => value.to_string(),
        };

        // Write next to the target and rename so readers never see a partial file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;
        debug!("Persisted storage key {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
