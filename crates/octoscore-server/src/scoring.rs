//! Scoring collaborators: the cached score computation and the interests
//! lookup.
//!
//! `get_score` treats the store purely as a cache and therefore never fails.
//! `get_interests` reads authoritative records, so store and decode failures
//! reach the caller.

use std::time::Duration;

use octoscore_core::OnlineScoreArgs;
use octoscore_storage::{ScoreStore, StorageError};
use sha2::{Digest, Sha256};
use time::macros::format_description;

const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

const DAY_STAMP: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]");

/// Computes the score for the given arguments, consulting the score cache
/// first and writing the result back best-effort.
pub async fn get_score(store: &dyn ScoreStore, args: &OnlineScoreArgs) -> f64 {
    let key = cache_key(args);
    if let Some(cached) = store.cache_get(&key).await {
        tracing::debug!(key = %key, score = cached, "score cache hit");
        return cached;
    }

    let mut score = 0.0;
    if args.phone.is_some() {
        score += 1.5;
    }
    if args.email.is_some() {
        score += 1.5;
    }
    if args.birthday.is_some() && args.gender.is_some() {
        score += 1.5;
    }
    if args.first_name.is_some() && args.last_name.is_some() {
        score += 0.5;
    }

    store.cache_set(&key, score, CACHE_TTL).await;
    score
}

/// Fetches the interests list for a client id from the authoritative store.
///
/// # Errors
///
/// Store failures propagate unchanged; a record that does not decode as a
/// JSON string list is a `Protocol` error.
pub async fn get_interests(
    store: &dyn ScoreStore,
    client_id: i64,
) -> Result<Vec<String>, StorageError> {
    let record = store.get(&format!("i:{client_id}")).await?;
    serde_json::from_str(&record).map_err(|e| {
        StorageError::protocol(format!(
            "interests record for client {client_id} is not a JSON string list: {e}"
        ))
    })
}

/// Cache key over the identifying argument fields. Absent fields contribute
/// an empty segment so equal argument sets share an entry.
fn cache_key(args: &OnlineScoreArgs) -> String {
    let birthday = args
        .birthday
        .and_then(|d| d.format(DAY_STAMP).ok())
        .unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(args.first_name.as_deref().unwrap_or_default());
    hasher.update(args.last_name.as_deref().unwrap_or_default());
    hasher.update(args.phone.as_deref().unwrap_or_default());
    hasher.update(&birthday);
    format!("uid:{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use octoscore_db_memory::MemoryStore;
    use serde_json::json;

    fn canonical_args() -> OnlineScoreArgs {
        OnlineScoreArgs::from_arguments(
            json!({
                "phone": "79991234567",
                "email": "user@domain.ru",
                "gender": 1,
                "first_name": "a",
                "last_name": "b",
            })
            .as_object()
            .unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn canonical_arguments_score() {
        let store = MemoryStore::new();
        assert_eq!(get_score(&store, &canonical_args()).await, 3.5);
    }

    #[tokio::test]
    async fn full_arguments_score() {
        let store = MemoryStore::new();
        let args = OnlineScoreArgs::from_arguments(
            json!({
                "phone": 79991234567_i64,
                "email": "user@domain.ru",
                "gender": 2,
                "birthday": "01.01.1990",
                "first_name": "a",
                "last_name": "b",
            })
            .as_object()
            .unwrap(),
        )
        .unwrap();
        assert_eq!(get_score(&store, &args).await, 5.0);
    }

    #[tokio::test]
    async fn score_survives_a_dead_store() {
        let store = MemoryStore::new();
        store.disconnect();
        assert_eq!(get_score(&store, &canonical_args()).await, 3.5);
    }

    #[tokio::test]
    async fn cached_value_wins() {
        let store = MemoryStore::new();
        let args = canonical_args();
        // First call computes and caches, a poisoned entry proves the hit.
        assert_eq!(get_score(&store, &args).await, 3.5);
        let key = cache_key(&args);
        store.cache_set(&key, 41.0, CACHE_TTL).await;
        assert_eq!(get_score(&store, &args).await, 41.0);
    }

    #[tokio::test]
    async fn equal_argument_sets_share_a_cache_key() {
        let a = canonical_args();
        let b = canonical_args();
        assert_eq!(cache_key(&a), cache_key(&b));

        let other = OnlineScoreArgs::from_arguments(
            json!({"first_name": "x", "last_name": "b", "phone": "79991234567",
                   "email": "user@domain.ru"})
            .as_object()
            .unwrap(),
        )
        .unwrap();
        assert_ne!(cache_key(&a), cache_key(&other));
    }

    #[tokio::test]
    async fn interests_decode() {
        let store = MemoryStore::with_records([("i:1", r#"["books", "travel"]"#)]);
        assert_eq!(
            get_interests(&store, 1).await.unwrap(),
            vec!["books".to_string(), "travel".to_string()]
        );
    }

    #[tokio::test]
    async fn interests_missing_and_malformed() {
        let store = MemoryStore::with_records([("i:2", "not json")]);
        assert!(matches!(
            get_interests(&store, 1).await,
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            get_interests(&store, 2).await,
            Err(StorageError::Protocol { .. })
        ));
    }

    #[tokio::test]
    async fn interests_unavailable_store_propagates() {
        let store = MemoryStore::with_records([("i:1", r#"["books"]"#)]);
        store.disconnect();
        let err = get_interests(&store, 1).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
