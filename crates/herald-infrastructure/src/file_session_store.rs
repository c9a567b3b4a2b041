//! File-backed session store.
//!
//! Keeps every session key in a single flat TOML table at
//! `~/.config/herald/session.toml`. The file is written atomically and is
//! readable by its owner only, since it holds the access token.

use crate::paths::{HeraldPaths, ServiceType};
use crate::storage::AtomicTomlFile;
use herald_core::Result;
use herald_core::session::SessionStore;
use std::collections::BTreeMap;
use std::path::Path;

type Entries = BTreeMap<String, String>;

/// [`SessionStore`] backed by an [`AtomicTomlFile`].
///
/// Every write is a locked read-modify-write, so `set_many` and
/// `remove_many` reach disk as one replacement of the file.
pub struct FileSessionStore {
    file: AtomicTomlFile<Entries>,
}

impl FileSessionStore {
    /// Opens the store under the default (or overridden) Herald directory.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let path = HeraldPaths::new(base_path).get_path(ServiceType::Session)?;
        Ok(Self::at(&path))
    }

    /// Opens a store at an explicit file path.
    pub fn at(path: &Path) -> Self {
        Self {
            file: AtomicTomlFile::private(path.to_path_buf()),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn read_all(&self) -> Result<Entries> {
        Ok(self.file.load()?.unwrap_or_default())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.remove_many(&[key])
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.file.update(Entries::new(), |map| {
            for (key, value) in entries {
                map.insert((*key).to_string(), (*value).to_string());
            }
            Ok(())
        })?;
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        // Nothing stored means nothing to remove; avoid creating the file.
        if self.file.load()?.is_none() {
            return Ok(());
        }
        self.file.update(Entries::new(), |map| {
            for key in keys {
                map.remove(*key);
            }
            Ok(())
        })?;
        Ok(())
    }
}
