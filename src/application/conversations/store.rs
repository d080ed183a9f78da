//! Conversation store - Persists suspended conversations in the cache

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConversationState, Continuation};
use crate::application::errors::StorageError;
use crate::domain::traits::Cache;

/// Cached `{conversation, next}` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConversation {
    pub conversation: ConversationState,
    pub next: Continuation,
    pub stored_at: DateTime<Utc>,
}

/// Stores at most one suspended conversation per (user, channel)
///
/// No locking: a later store for the same key overwrites an earlier one.
#[derive(Clone)]
pub struct ConversationStore {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl ConversationStore {
    /// 30 minutes
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self {
            cache,
            ttl: Self::DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key(user: &str, channel: &str) -> String {
        format!("conversation:{}-{}", user, channel)
    }

    /// Write the entry, refreshing its TTL
    pub fn store(
        &self,
        user: &str,
        channel: &str,
        conversation: ConversationState,
        next: Continuation,
    ) -> Result<(), StorageError> {
        let entry = StoredConversation {
            conversation,
            next,
            stored_at: Utc::now(),
        };
        let value = serde_json::to_string(&entry)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let key = Self::key(user, channel);
        self.cache.set(&key, &value, self.ttl)?;
        tracing::debug!("Stored {} -> {}::{}", key, entry.conversation.kind, entry.next.step);
        Ok(())
    }

    /// Miss or expiry is `Ok(None)`
    pub fn retrieve(&self, user: &str, channel: &str) -> Result<Option<StoredConversation>, StorageError> {
        let Some(raw) = self.cache.get(&Self::key(user, channel))? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    pub fn has(&self, user: &str, channel: &str) -> Result<bool, StorageError> {
        self.cache.has(&Self::key(user, channel))
    }

    pub fn clear(&self, user: &str, channel: &str) -> Result<(), StorageError> {
        self.cache.delete(&Self::key(user, channel))
    }
}
