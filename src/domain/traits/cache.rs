use std::time::Duration;

use crate::application::errors::StorageError;

/// Cache trait - key-value store with per-entry expiry
///
/// Expired entries behave exactly like missing ones.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError>;
    fn has(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}
