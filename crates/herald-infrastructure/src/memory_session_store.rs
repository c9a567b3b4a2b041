//! In-memory session store.

use herald_core::Result;
use herald_core::session::SessionStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// [`SessionStore`] that lives only as long as the process.
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the session manager persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(map)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.remove_many(&[key])
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let store = InMemorySessionStore::with_entries([("a", "1")]);
        let handle = store.clone();

        store.set("b", "2").unwrap();
        handle.remove("a").unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(handle.get("b").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }
}
