//! The store trait every backend implements.
//!
//! Operations come in two explicitly named classes:
//!
//! - **Authoritative** (`get`): callers must see a failure when the store is
//!   down, because the result is data, not an optimization.
//! - **Best-effort cache** (`cache_get`, `cache_set`): a store outage
//!   degrades to "no value" and must never turn into a caller-visible error.
//!
//! `cache_delete` sits apart: it is best-effort cleanup, but remote-call
//! failures propagate unchanged.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageError;

/// A key-value store holding client interests and a score cache.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Authoritative lookup of a serialized record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` when no usable connection exists
    /// after the bounded reconnect attempts, and `StorageError::NotFound`
    /// when the key has no record. Both must reach the caller.
    async fn get(&self, key: &str) -> Result<String, StorageError>;

    /// Best-effort cached score lookup.
    ///
    /// Any failure (no connection, remote error, malformed answer) is a
    /// cache miss, never an error.
    async fn cache_get(&self, key: &str) -> Option<f64>;

    /// Best-effort cached score write with a TTL.
    ///
    /// Returns the confirming re-read of the written value. On any failure
    /// a warning is logged and `None` is returned.
    async fn cache_set(&self, key: &str, value: f64, ttl: Duration) -> Option<f64>;

    /// Deletes a record from the score space.
    ///
    /// With no connection this is a no-op; remote-call errors propagate.
    async fn cache_delete(&self, key: &str) -> Result<(), StorageError>;

    /// Name of this backend for logging.
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that ScoreStore is object-safe
    fn _assert_store_object_safe(_: &dyn ScoreStore) {}
}
