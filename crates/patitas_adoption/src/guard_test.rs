#[cfg(test)]
mod tests {
    use crate::guard::SubmissionGuard;
    use crate::models::{COUNTERS, REQUESTS};
    use chrono::{Duration, Utc};
    use patitas_common::memory::MemoryStore;
    use patitas_common::services::{BoxedError, BoxedStore, DocumentStore};
    use serde_json::json;
    use std::sync::Arc;

    fn guard_over(
        store: Arc<dyn DocumentStore<Error = BoxedError>>,
    ) -> SubmissionGuard {
        SubmissionGuard::new(store, REQUESTS, COUNTERS, "applicantId")
    }

    fn new_store() -> Arc<dyn DocumentStore<Error = BoxedError>> {
        Arc::new(BoxedStore(MemoryStore::new()))
    }

    async fn seed_counter(
        store: &Arc<dyn DocumentStore<Error = BoxedError>>,
        user: &str,
        count: u32,
        last_update: chrono::DateTime<Utc>,
    ) {
        store
            .set(
                COUNTERS,
                user,
                [
                    ("count".to_string(), json!(count)),
                    ("lastUpdate".to_string(), json!(last_update.to_rfc3339())),
                ]
                .into_iter()
                .collect(),
                vec![],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_check_misses_on_empty_store() {
        let store = new_store();
        let guard = guard_over(store);
        assert!(!guard.check_duplicate("u1", "petId", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_check_hits_on_same_pair_only() {
        let store = new_store();
        store
            .create(
                REQUESTS,
                [
                    ("applicantId".to_string(), json!("u1")),
                    ("petId".to_string(), json!("p1")),
                ]
                .into_iter()
                .collect(),
                vec![],
            )
            .await
            .unwrap();

        let guard = guard_over(store);
        assert!(guard.check_duplicate("u1", "petId", "p1").await.unwrap());
        // A different pet or a different user is not a duplicate.
        assert!(!guard.check_duplicate("u1", "petId", "p2").await.unwrap());
        assert!(!guard.check_duplicate("u2", "petId", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_counter_allows_and_starts_a_day() {
        let store = new_store();
        let guard = guard_over(store);

        let decision = guard.check_daily_limit("u1", 5).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.current_count, 0);
        assert!(decision.is_new_day);
    }

    #[tokio::test]
    async fn test_same_day_counter_blocks_at_the_cap() {
        let store = new_store();
        seed_counter(&store, "u1", 4, Utc::now()).await;
        let guard = guard_over(store.clone());

        let decision = guard.check_daily_limit("u1", 5).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.current_count, 4);
        assert!(!decision.is_new_day);

        seed_counter(&store, "u1", 5, Utc::now()).await;
        let decision = guard.check_daily_limit("u1", 5).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.current_count, 5);
    }

    #[tokio::test]
    async fn test_stale_counter_reads_as_zero() {
        let store = new_store();
        seed_counter(&store, "u1", 5, Utc::now() - Duration::days(1)).await;
        let guard = guard_over(store);

        let decision = guard.check_daily_limit("u1", 5).await.unwrap();
        assert!(decision.allowed, "yesterday's count must never block today");
        assert_eq!(decision.current_count, 0);
        assert!(decision.is_new_day);
    }

    #[tokio::test]
    async fn test_record_resets_on_new_day_and_increments_within_one() {
        let store = new_store();
        seed_counter(&store, "u1", 5, Utc::now() - Duration::days(1)).await;
        let guard = guard_over(store.clone());

        guard.record_submission("u1", true).await.unwrap();
        let doc = store.get(COUNTERS, "u1").await.unwrap().unwrap();
        assert_eq!(doc.fields.get("count"), Some(&json!(1)));

        guard.record_submission("u1", false).await.unwrap();
        guard.record_submission("u1", false).await.unwrap();
        let doc = store.get(COUNTERS, "u1").await.unwrap().unwrap();
        assert_eq!(doc.fields.get("count"), Some(&json!(3)));

        // lastUpdate moved to a fresh server timestamp.
        let last_update = doc.fields.get("lastUpdate").unwrap().as_str().unwrap();
        let parsed = chrono::DateTime::parse_from_rfc3339(last_update).unwrap();
        assert_eq!(parsed.date_naive(), Utc::now().date_naive());
    }
}
