//! SQLite-backed cache, for conversations that must survive a restart

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::application::errors::StorageError;
use crate::domain::traits::Cache;

pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cache_expires ON cache(expires_at)",
            [],
        )?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock()
            .map_err(|_| StorageError::Unavailable("Lock poisoned".to_string()))
    }

    fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Delete expired rows
    pub fn purge_expired(&self) -> Result<usize, StorageError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM cache WHERE expires_at <= ?1",
            params![Self::now_millis()],
        )?;
        Ok(removed)
    }
}

impl Cache for SqliteCache {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM cache WHERE key = ?1 AND expires_at > ?2",
                params![key, Self::now_millis()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError> {
        let now = Self::now_millis();
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl_millis);

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO cache (key, value, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
            params![key, value, expires_at],
        )?;
        conn.execute("DELETE FROM cache WHERE expires_at <= ?1", params![now])?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM cache WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_and_overwrite() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set("conversation:U-C", "one", Duration::from_secs(60)).unwrap();
        cache.set("conversation:U-C", "two", Duration::from_secs(60)).unwrap();

        assert_eq!(cache.get("conversation:U-C").unwrap().as_deref(), Some("two"));

        cache.delete("conversation:U-C").unwrap();
        assert!(!cache.has("conversation:U-C").unwrap());
    }

    #[test]
    fn test_expired_rows_are_invisible() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set("k", "v", Duration::ZERO).unwrap();
        assert!(cache.get("k").unwrap().is_none());
    }

    #[test]
    fn test_file_backed_cache_persists() {
        let path = std::env::temp_dir().join(format!("hearken-cache-{}.db", std::process::id()));
        {
            let cache = SqliteCache::open(&path).unwrap();
            cache.set("k", "v", Duration::from_secs(60)).unwrap();
        }
        let cache = SqliteCache::open(&path).unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v"));
        let _ = std::fs::remove_file(&path);
    }
}
