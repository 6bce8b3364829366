//! Persistence collaborator trait.

use crate::Result;

/// A string key-value store used to persist the token pair across restarts.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, returning `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any existing one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
