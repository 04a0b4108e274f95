//! File-backed token storage.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use fs2::FileExt;

use securecloud_core::TokenStore;
use securecloud_core::error::StorageError;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Get the session file path.
fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "securecloud").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// [`TokenStore`] persisting values as a JSON object in one file.
///
/// Every read goes to disk, so separate invocations of the binary see each
/// other's writes. Access is serialized across processes with an advisory
/// lock on a sibling `.lock` file, and writes land through a temp file and
/// a rename so readers never see a partial document. The file is removed
/// once the last key is.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the store at the default session path.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(session_path()?))
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Run `f` while holding the lock file, shared for reads and
    /// exclusive for read-modify-write.
    fn locked<T>(
        &self,
        operation: &'static str,
        key: &str,
        exclusive: bool,
        f: impl FnOnce() -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| StorageError::new(operation, key, e))?;

        let acquired = if exclusive {
            lock_file.lock_exclusive()
        } else {
            FileExt::lock_shared(&lock_file)
        };
        acquired.map_err(|e| StorageError::new(operation, key, e))?;

        let result = f();

        FileExt::unlock(&lock_file).map_err(|e| StorageError::new(operation, key, e))?;

        result
    }

    fn load(&self, key: &str) -> Result<BTreeMap<String, String>, StorageError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StorageError::new("read", key, e)),
        };
        serde_json::from_str(&json).map_err(|e| StorageError::new("read", key, e))
    }

    fn save(&self, key: &str, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if values.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != ErrorKind::NotFound => {
                    Err(StorageError::new("remove", key, e))
                }
                _ => Ok(()),
            };
        }

        let json =
            serde_json::to_string_pretty(values).map_err(|e| StorageError::new("write", key, e))?;

        let temp_path = self.temp_path();
        let mut file = open_private(&temp_path).map_err(|e| StorageError::new("write", key, e))?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.sync_data())
            .map_err(|e| StorageError::new("write", key, e))?;

        fs::rename(&temp_path, &self.path).map_err(|e| StorageError::new("write", key, e))
    }
}

/// Tokens are credentials; the file is created readable by the owner only
/// (Unix only).
fn open_private(path: &std::path::Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    options.open(path)
}

impl TokenStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.locked("read", key, false, || Ok(self.load(key)?.remove(key)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.locked("write", key, true, || {
            let mut values = self.load(key)?;
            values.insert(key.to_string(), value.to_string());
            self.save(key, &values)
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.locked("remove", key, true, || {
            let mut values = self.load(key)?;
            if values.remove(key).is_none() {
                return Ok(());
            }
            self.save(key, &values)
        })
    }
}
