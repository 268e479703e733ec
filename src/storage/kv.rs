//! String key-value storage backed by files in a directory.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::PathBuf,
};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::Error;

/// The largest value, in bytes, that [FileKeyValueStore] will accept.
pub const DEFAULT_QUOTA: usize = 5 * 1024 * 1024;

/// Characters that are escaped when turning a key into a file name.
const FILE_NAME_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-');

/// Escaped keys longer than this are stored under a digest of the key, so
/// file names stay within the file system's name length limit.
const MAX_FILE_NAME_LENGTH: usize = 200;

/// Prefix of digest file names. Escaped keys never start with a dot.
const HASHED_KEY_PREFIX: &str = ".key-sha256-";

/// A store of string values keyed by string keys.
pub trait KeyValueStore: Send + Sync {
    /// Get the value for `key`, or `None` if it has not been set.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Set the value for `key`, replacing any previous value.
    ///
    /// A failed write leaves the previous value in place.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove the value for `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

/// A [KeyValueStore] that keeps one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    directory: PathBuf,
    quota: usize,
}

impl FileKeyValueStore {
    /// Open the store in `directory`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Io] if the directory cannot be created.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self, Error> {
        Self::with_quota(directory, DEFAULT_QUOTA)
    }

    /// Open the store with a custom value size limit.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Io] if the directory cannot be created.
    pub fn with_quota(directory: impl Into<PathBuf>, quota: usize) -> Result<Self, Error> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;

        Ok(Self { directory, quota })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(file_name_for(key))
    }
}

fn file_name_for(key: &str) -> String {
    let escaped = utf8_percent_encode(key, FILE_NAME_ESCAPES).to_string();

    if escaped.len() <= MAX_FILE_NAME_LENGTH {
        return escaped;
    }

    let digest = Sha256::digest(key.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();

    format!("{HASHED_KEY_PREFIX}{digest}")
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        if value.len() > self.quota {
            return Err(Error::StorageQuotaExceeded {
                size: value.len(),
                limit: self.quota,
            });
        }

        let path = self.path_for(key);
        let temp_path = self
            .directory
            .join(format!(".tmp-{}", Uuid::new_v4().simple()));

        let write_result = fs::File::create(&temp_path).and_then(|mut file| {
            file.write_all(value.as_bytes())?;
            file.sync_all()
        });

        if let Err(error) = write_result.and_then(|_| fs::rename(&temp_path, &path)) {
            if let Err(cleanup_error) = fs::remove_file(&temp_path) {
                tracing::warn!("could not remove temporary file {temp_path:?}: {cleanup_error}");
            }

            return Err(error.into());
        }

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
