//! Session store trait.
//!
//! Defines the durable key-value persistence used for the authenticated session.

use crate::error::Result;

/// Store key holding the raw access token.
pub const TOKEN_KEY: &str = "access_token";

/// Store key holding the JSON-encoded [`Profile`](super::Profile).
pub const PROFILE_KEY: &str = "user_profile";

/// Durable key-value storage for the session.
///
/// Access has synchronous semantics: a call returns once the write is
/// durable. There is exactly one writer (the session manager), so
/// implementations only need last-write-wins behavior.
///
/// # Implementation Notes
///
/// `set_many` and `remove_many` must be applied as one unit from the
/// caller's point of view. The default implementations loop over the
/// single-key operations and are only suitable for stores where each call is
/// already visible atomically (e.g. in-memory maps behind one lock).
pub trait SessionStore: Send + Sync {
    /// Returns the stored value, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}
