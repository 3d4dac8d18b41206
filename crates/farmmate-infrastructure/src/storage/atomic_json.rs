//! Atomic JSON file operations.
//!
//! Writes go to a sibling tmp file, are fsynced, then renamed over the
//! target. Read-modify-write cycles run under an exclusive `fs2` lock.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Errors that can occur during atomic JSON operations.
#[derive(Debug)]
pub enum AtomicJsonError {
    /// File I/O error.
    IoError(std::io::Error),
    /// The file exists but is not the expected JSON document.
    JsonError(serde_json::Error),
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for AtomicJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicJsonError::IoError(e) => write!(f, "I/O error: {}", e),
            AtomicJsonError::JsonError(e) => write!(f, "JSON error: {}", e),
            AtomicJsonError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for AtomicJsonError {}

impl From<std::io::Error> for AtomicJsonError {
    fn from(e: std::io::Error) -> Self {
        AtomicJsonError::IoError(e)
    }
}

impl From<serde_json::Error> for AtomicJsonError {
    fn from(e: serde_json::Error) -> Self {
        AtomicJsonError::JsonError(e)
    }
}

impl From<AtomicJsonError> for farmmate_core::FarmmateError {
    fn from(err: AtomicJsonError) -> Self {
        use farmmate_core::FarmmateError;
        match err {
            AtomicJsonError::IoError(e) => e.into(),
            AtomicJsonError::JsonError(e) => {
                FarmmateError::cache(format!("corrupt local storage: {}", e))
            }
            AtomicJsonError::LockError(e) => FarmmateError::cache(e),
        }
    }
}

/// A handle to a JSON file that is always replaced as a whole.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicJsonError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Saves data atomically (tmp file + fsync + rename).
    pub fn save(&self, data: &T) -> Result<(), AtomicJsonError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Read-modify-write under an exclusive file lock.
    ///
    /// The current content (or `default_value` when there is none) is handed
    /// to `f`. The result is written back only when `f` succeeds.
    pub fn update<F, R, E>(&self, default_value: T, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
        E: From<AtomicJsonError>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        let outcome = f(&mut data)?;
        self.save(&data)?;

        Ok(outcome)
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicJsonError> {
        let invalid = |msg: &str| {
            AtomicJsonError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidInput, msg))
        };
        let parent = self
            .path
            .parent()
            .ok_or_else(|| invalid("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| invalid("Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive lock on `<file>.lock`, released when dropped.
///
/// The lock file itself is left in place: removing it on drop would let a
/// waiter and a newcomer lock two different inodes.
/// `<file>.lock` beside the guarded file, e.g. `local_storage.json.lock`.
fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicJsonError> {
        use fs2::FileExt;

        let lock_path = lock_path(path);
        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        file.lock_exclusive()
            .map_err(|e| AtomicJsonError::LockError(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        use fs2::FileExt;
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        name: String,
        count: u32,
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Counter>::new(temp_dir.path().join("state.json"));

        let counter = Counter {
            name: "crops".to_string(),
            count: 3,
        };
        file.save(&counter).unwrap();

        assert_eq!(file.load().unwrap(), Some(counter));
        assert!(!temp_dir.path().join(".state.json.tmp").exists());
    }

    #[test]
    fn test_missing_and_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        let file = AtomicJsonFile::<Counter>::new(path.clone());
        assert!(file.load().unwrap().is_none());

        fs::write(&path, "  \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let file = AtomicJsonFile::<Counter>::new(path);
        assert!(matches!(file.load(), Err(AtomicJsonError::JsonError(_))));
    }

    #[test]
    fn test_update_writes_only_on_success() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Counter>::new(temp_dir.path().join("nested/state.json"));

        let count = file
            .update(Counter::default(), |c| {
                c.count += 10;
                Ok::<_, AtomicJsonError>(c.count)
            })
            .unwrap();
        assert_eq!(count, 10);

        let failed: Result<(), AtomicJsonError> = file.update(Counter::default(), |c| {
            c.count = 99;
            Err(AtomicJsonError::LockError("rejected".into()))
        });
        assert!(failed.is_err());
        assert_eq!(file.load().unwrap().unwrap().count, 10);
    }

    #[test]
    fn test_lock_file_sits_beside_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("local_storage.json");
        let file = AtomicJsonFile::<Counter>::new(path.clone());
        file.update(Counter::default(), |c| {
            c.count += 1;
            Ok::<_, AtomicJsonError>(())
        })
        .unwrap();

        assert_eq!(lock_path(&path), temp_dir.path().join("local_storage.json.lock"));
        assert!(temp_dir.path().join("local_storage.json.lock").exists());
        assert!(!temp_dir.path().join("local_storage.lock").exists());
    }
}
