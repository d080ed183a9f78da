//! In-memory cache implementation

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::application::errors::StorageError;
use crate::domain::traits::Cache;

struct Entry {
    value: String,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Process-local cache with per-entry expiry
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> Result<usize, StorageError> {
        let mut entries = self.entries.write()
            .map_err(|_| StorageError::Unavailable("Lock poisoned".to_string()))?;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, e| e.is_live(now));
        Ok(before - entries.len())
    }

    /// Live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read()
            .map(|e| e.values().filter(|e| e.is_live(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read()
            .map_err(|_| StorageError::Unavailable("Lock poisoned".to_string()))?;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(Instant::now()))
            .map(|e| e.value.clone()))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError> {
        let mut entries = self.entries.write()
            .map_err(|_| StorageError::Unavailable("Lock poisoned".to_string()))?;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now().checked_add(ttl),
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write()
            .map_err(|_| StorageError::Unavailable("Lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}
