//! In-memory [`ScoreStore`] backend.
//!
//! Used for development and tests: concurrent maps for the authoritative
//! record space and the TTL-checked score cache, plus a disconnect switch so
//! tests can exercise degraded-mode behavior without a network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use octoscore_storage::{ScoreStore, StorageError};

/// A cached score with TTL support.
#[derive(Debug, Clone)]
struct CachedScore {
    value: f64,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedScore {
    fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// In-memory store with a simulated connection switch.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, String>,
    scores: DashMap<String, CachedScore>,
    disconnected: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the authoritative record space.
    pub fn with_records<I, K, V>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        for (key, value) in records {
            store.records.insert(key.into(), value.into());
        }
        store
    }

    pub fn insert_record(&self, key: impl Into<String>, value: impl Into<String>) {
        self.records.insert(key.into(), value.into());
    }

    /// Simulates losing the store connection.
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }

    /// Restores the simulated connection.
    pub fn reconnect(&self) {
        self.disconnected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        !self.disconnected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<String, StorageError> {
        if !self.is_connected() {
            return Err(StorageError::unavailable("memory store disconnected"));
        }
        self.records
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found(key))
    }

    async fn cache_get(&self, key: &str) -> Option<f64> {
        if !self.is_connected() {
            return None;
        }
        if let Some(entry) = self.scores.get(key) {
            if !entry.is_expired() {
                return Some(entry.value);
            }
            drop(entry);
            self.scores.remove(key);
        }
        None
    }

    async fn cache_set(&self, key: &str, value: f64, ttl: Duration) -> Option<f64> {
        if !self.is_connected() {
            tracing::warn!(key = %key, "score cache write skipped, store disconnected");
            return None;
        }
        self.scores.insert(
            key.to_string(),
            CachedScore {
                value,
                cached_at: Instant::now(),
                ttl,
            },
        );
        // Confirming re-read, as the store contract specifies.
        self.cache_get(key).await
    }

    async fn cache_delete(&self, key: &str) -> Result<(), StorageError> {
        if !self.is_connected() {
            return Ok(());
        }
        self.scores.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_returns_seeded_records() {
        let store = MemoryStore::with_records([("i:1", r#"["travel", "books"]"#)]);
        assert_eq!(store.get("i:1").await.unwrap(), r#"["travel", "books"]"#);
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("i:-1").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn get_disconnected_is_unavailable() {
        let store = MemoryStore::with_records([("i:1", "[]")]);
        store.disconnect();
        let err = store.get("i:1").await.unwrap_err();
        assert!(err.is_unavailable());
        store.reconnect();
        assert!(store.get("i:1").await.is_ok());
    }

    #[tokio::test]
    async fn cache_roundtrip_with_confirming_read() {
        let store = MemoryStore::new();
        let written = store
            .cache_set("uid:abc", 5.0, Duration::from_secs(3600))
            .await;
        assert_eq!(written, Some(5.0));
        assert_eq!(store.cache_get("uid:abc").await, Some(5.0));
    }

    #[tokio::test]
    async fn cache_get_misses_are_none() {
        let store = MemoryStore::new();
        assert_eq!(store.cache_get("uid:-1").await, None);
    }

    #[tokio::test]
    async fn cache_honors_ttl() {
        let store = MemoryStore::new();
        store.cache_set("uid:abc", 5.0, Duration::ZERO).await;
        // A zero TTL expires as soon as any time has elapsed.
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(store.cache_get("uid:abc").await, None);
    }

    #[tokio::test]
    async fn cache_degrades_when_disconnected() {
        let store = MemoryStore::new();
        store.cache_set("uid:abc", 5.0, Duration::from_secs(3600)).await;
        store.disconnect();
        assert_eq!(store.cache_get("uid:abc").await, None);
        assert_eq!(
            store.cache_set("uid:abc", 6.0, Duration::from_secs(3600)).await,
            None
        );
        assert!(store.cache_delete("uid:abc").await.is_ok());
    }

    #[tokio::test]
    async fn cache_delete_removes_entry() {
        let store = MemoryStore::new();
        store.cache_set("uid:abc", 5.0, Duration::from_secs(3600)).await;
        store.cache_delete("uid:abc").await.unwrap();
        assert_eq!(store.cache_get("uid:abc").await, None);
    }
}
