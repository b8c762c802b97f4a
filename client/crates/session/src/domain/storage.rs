//! Key-value storage trait
//!
//! Stand-in for the browser's local storage: string keys, string
//! values, shared by every tab of one profile.

use crate::error::StorageError;

pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
