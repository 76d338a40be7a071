/**
 * Lease Store
 *
 * This module defines the `LeaseStore` trait, a thin wrapper over an external
 * key-value store with atomic set-if-absent and TTL expiry, and an in-memory
 * implementation used by tests and database-less deployments.
 *
 * # Contract
 *
 * - `set_if_absent` succeeds only when no live entry exists for the key
 * - `get` never returns an expired entry
 * - `expire` refreshes the TTL of a live entry and reports whether one existed
 * - `delete_if_owned_by` removes the entry only when its value still matches
 *
 * Expired entries behave exactly like absent ones. Implementations may purge
 * them lazily; `purge_expired` lets a background task reclaim storage.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Errors raised by a lease store backend
#[derive(Debug, Error)]
pub enum LeaseError {
    /// Database error from the PostgreSQL backend
    #[error("Lease store database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be decoded into a holder id
    #[error("Corrupt lease value for key '{key}': {value}")]
    CorruptValue {
        key: String,
        value: String,
    },
}

/// Atomic key-value operations the plan lock is built on
#[async_trait]
pub trait LeaseStore: Send + Sync {
    /// Store `value` under `key` for `ttl` unless a live entry exists
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, LeaseError>;

    /// Current value of a live entry
    async fn get(&self, key: &str) -> Result<Option<String>, LeaseError>;

    /// Reset the TTL of a live entry; `false` when there is none
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, LeaseError>;

    /// Delete the entry only if it still holds `value`
    async fn delete_if_owned_by(&self, key: &str, value: &str) -> Result<bool, LeaseError>;

    /// Drop expired entries, returning how many were removed
    async fn purge_expired(&self) -> Result<u64, LeaseError>;
}

#[derive(Debug, Clone)]
struct LeaseEntry {
    value: String,
    expires_at: Instant,
}

impl LeaseEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-memory lease store
///
/// All operations take one mutex, which makes each of them atomic in the same
/// way single commands are atomic on an external store. Uses tokio's clock so
/// tests can drive expiry with `tokio::time::advance`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLeaseStore {
    entries: Arc<Mutex<HashMap<String, LeaseEntry>>>,
}

impl InMemoryLeaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, live or not (for debugging)
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl LeaseStore for InMemoryLeaseStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, LeaseError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        if entries.get(key).is_some_and(|entry| entry.is_live(now)) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            LeaseEntry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, LeaseError> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, LeaseError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get_mut(key) {
            Some(entry) if entry.is_live(now) => {
                entry.expires_at = now + ttl;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_if_owned_by(&self, key: &str, value: &str) -> Result<bool, LeaseError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let owned = entries
            .get(key)
            .is_some_and(|entry| entry.is_live(now) && entry.value == value);
        if owned {
            entries.remove(key);
        }
        Ok(owned)
    }

    async fn purge_expired(&self) -> Result<u64, LeaseError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        Ok((before - entries.len()) as u64)
    }
}
