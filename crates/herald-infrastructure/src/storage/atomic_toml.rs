//! Atomic TOML file operations.
//!
//! Writes go through a temporary sibling file that is fsynced and renamed
//! over the target, so readers see either the old or the new content.
//! Read-modify-write cycles hold an exclusive lock file.

use herald_core::HeraldError;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a single file operation.
#[derive(Debug, Error)]
pub enum AtomicTomlError {
    #[error("file access failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot encode TOML: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("lock unavailable: {0}")]
    Lock(String),
}

impl From<AtomicTomlError> for HeraldError {
    fn from(e: AtomicTomlError) -> Self {
        match e {
            AtomicTomlError::Io(io) => io.into(),
            AtomicTomlError::Parse(de) => de.into(),
            AtomicTomlError::Encode(ser) => ser.into(),
            AtomicTomlError::Lock(message) => HeraldError::data_access(message),
        }
    }
}

/// Handle to a TOML file holding one `T`.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    /// Restrict the file to its owner (Unix mode 600).
    private: bool,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            private: false,
            _phantom: PhantomData,
        }
    }

    /// Same as [`new`](Self::new), but every write leaves the file readable by its owner only.
    pub fn private(path: PathBuf) -> Self {
        Self {
            path,
            private: true,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file. A missing or blank file yields `Ok(None)`.
    pub fn load(&self) -> Result<Option<T>, AtomicTomlError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)?;
        match raw.trim() {
            "" => Ok(None),
            _ => Ok(Some(toml::from_str(&raw)?)),
        }
    }

    /// Serializes `data` and atomically replaces the file.
    pub fn save(&self, data: &T) -> Result<(), AtomicTomlError> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let encoded = toml::to_string_pretty(data)?;
        let staging = self.temp_path()?;
        {
            let mut out = File::create(&staging)?;
            if self.private {
                restrict_permissions(&out)?;
            }
            out.write_all(encoded.as_bytes())?;
            out.sync_all()?;
        }
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    /// Read-modify-write under an exclusive lock.
    ///
    /// `f` receives the current content (or `default_value` if the file is
    /// missing). The result is written back only if `f` returns `Ok`.
    pub fn update<F, R>(&self, default_value: T, f: F) -> Result<R, AtomicTomlError>
    where
        F: FnOnce(&mut T) -> Result<R, AtomicTomlError>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut current = match self.load()? {
            Some(existing) => existing,
            None => default_value,
        };
        let outcome = f(&mut current)?;
        self.save(&current)?;
        Ok(outcome)
    }

    /// Deletes the file. A missing file is not an error.
    pub fn remove(&self) -> Result<(), AtomicTomlError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicTomlError> {
        let invalid = |what: &str| {
            AtomicTomlError::Io(std::io::Error::other(format!(
                "{} has no {}",
                self.path.display(),
                what
            )))
        };

        let parent = self.path.parent().ok_or_else(|| invalid("parent directory"))?;
        let file_name = self.path.file_name().ok_or_else(|| invalid("file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> Result<(), AtomicTomlError> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> Result<(), AtomicTomlError> {
    Ok(())
}

/// Exclusive lock held for the duration of an update; released on drop.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicTomlError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        fs2::FileExt::lock_exclusive(&file)
            .map_err(|e| AtomicTomlError::Lock(format!("{}: {}", lock_path.display(), e)))?;
        Ok(Self { file })
    }
}

impl Drop for FileLock {
    // The lock file stays in place. Unlinking it while locked would let a
    // new opener lock a fresh inode alongside a waiter on the old one.
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}
