#[cfg(test)]
mod tests {
    use crate::logic::{AdoptionError, AdoptionWorkflow, SubmitAdoptionRequest};
    use crate::models::{ApplicantProfile, COUNTERS, REQUESTS};
    use chrono::{Duration, Utc};
    use patitas_common::memory::MemoryStore;
    use patitas_common::services::{
        BoxFuture, BoxedError, BoxedStore, Document, DocumentFields, DocumentStore, FieldOp,
        Filter, PushSender, WriteOp,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn profile(name: &str) -> ApplicantProfile {
        ApplicantProfile {
            name: name.to_string(),
            phone: Some("+56 9 1234 5678".to_string()),
            email: None,
            housing: "house with yard".to_string(),
            motivation: "We lost our old dog last year".to_string(),
        }
    }

    fn submission(pet_id: &str) -> SubmitAdoptionRequest {
        SubmitAdoptionRequest {
            pet_id: pet_id.to_string(),
            owner_id: "owner1".to_string(),
            profile: profile("Ana"),
        }
    }

    fn new_store() -> Arc<dyn DocumentStore<Error = BoxedError>> {
        Arc::new(BoxedStore(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_submit_persists_a_pending_request() {
        let store = new_store();
        let workflow = AdoptionWorkflow::new(store.clone(), None, 5);

        let receipt = workflow.submit("u1", submission("p1")).await.unwrap();
        assert!(receipt.counter_warning.is_none());

        let doc = store.get(REQUESTS, &receipt.request_id).await.unwrap().unwrap();
        assert_eq!(doc.fields.get("status"), Some(&json!("pending")));
        assert_eq!(doc.fields.get("applicantId"), Some(&json!("u1")));
        assert!(doc.fields.contains_key("createdAt"), "server timestamp set");

        let counter = store.get(COUNTERS, "u1").await.unwrap().unwrap();
        assert_eq!(counter.fields.get("count"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_second_submission_for_same_pet_is_a_duplicate() {
        // Scenario: u1 submits for p1, then again five minutes later.
        let store = new_store();
        let workflow = AdoptionWorkflow::new(store.clone(), None, 5);

        workflow.submit("u1", submission("p1")).await.unwrap();
        let err = workflow.submit("u1", submission("p1")).await.unwrap_err();
        assert!(matches!(err, AdoptionError::DuplicateRequest));

        // The refused call performed no writes: still one request, counter 1.
        let requests = store
            .query(REQUESTS, vec![Filter::equal("applicantId", "u1")])
            .await
            .unwrap();
        assert_eq!(requests.len(), 1);
        let counter = store.get(COUNTERS, "u1").await.unwrap().unwrap();
        assert_eq!(counter.fields.get("count"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_sixth_submission_of_the_day_is_rate_limited() {
        // Scenario: five distinct pets succeed, the sixth pet is refused.
        let store = new_store();
        let workflow = AdoptionWorkflow::new(store.clone(), None, 5);

        for pet in ["p2", "p3", "p4", "p5", "p6"] {
            workflow.submit("u2", submission(pet)).await.unwrap();
        }
        let counter = store.get(COUNTERS, "u2").await.unwrap().unwrap();
        assert_eq!(counter.fields.get("count"), Some(&json!(5)));

        let err = workflow.submit("u2", submission("p7")).await.unwrap_err();
        match err {
            AdoptionError::RateLimited {
                limit,
                submitted_today,
            } => {
                assert_eq!(limit, 5);
                assert_eq!(submitted_today, 5);
            }
            other => panic!("expected RateLimited, got {other}"),
        }

        // No request document was written for the refused pet.
        let requests = store
            .query(REQUESTS, vec![Filter::equal("petId", "p7")])
            .await
            .unwrap();
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn test_stale_counter_resets_to_one_on_todays_submission() {
        let store = new_store();
        store
            .set(
                COUNTERS,
                "u3",
                [
                    ("count".to_string(), json!(5)),
                    (
                        "lastUpdate".to_string(),
                        json!((Utc::now() - Duration::days(1)).to_rfc3339()),
                    ),
                ]
                .into_iter()
                .collect(),
                vec![],
            )
            .await
            .unwrap();

        let workflow = AdoptionWorkflow::new(store.clone(), None, 5);
        workflow.submit("u3", submission("p1")).await.unwrap();

        let counter = store.get(COUNTERS, "u3").await.unwrap().unwrap();
        assert_eq!(counter.fields.get("count"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_unauthenticated_and_invalid_profiles_are_refused() {
        let workflow = AdoptionWorkflow::new(new_store(), None, 5);

        let err = workflow.submit("", submission("p1")).await.unwrap_err();
        assert!(matches!(err, AdoptionError::Unauthenticated));

        let mut nameless = submission("p1");
        nameless.profile.name = "  ".to_string();
        let err = workflow.submit("u1", nameless).await.unwrap_err();
        assert!(matches!(err, AdoptionError::Validation(_)));

        let mut uncontactable = submission("p1");
        uncontactable.profile.phone = None;
        uncontactable.profile.email = None;
        let err = workflow.submit("u1", uncontactable).await.unwrap_err();
        assert!(matches!(err, AdoptionError::Validation(_)));
    }

    #[tokio::test]
    async fn test_owner_inbox_lists_only_their_requests() {
        let store = new_store();
        let workflow = AdoptionWorkflow::new(store, None, 5);

        workflow.submit("u1", submission("p1")).await.unwrap();
        let mut other_owner = submission("p9");
        other_owner.owner_id = "owner2".to_string();
        workflow.submit("u2", other_owner).await.unwrap();

        let inbox = workflow.list_owned_requests("owner1").await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].pet_id, "p1");
        assert_eq!(inbox[0].applicant_id, "u1");
    }

    #[tokio::test]
    async fn test_deleted_request_frees_the_pair_for_resubmission() {
        let store = new_store();
        let workflow = AdoptionWorkflow::new(store, None, 5);

        let receipt = workflow.submit("u1", submission("p1")).await.unwrap();
        workflow.delete_request(&receipt.request_id).await.unwrap();

        // With the previous request retracted, the pair is admissible again.
        workflow.submit("u1", submission("p1")).await.unwrap();
    }

    /// Store double whose counter writes fail after the request persists.
    struct CounterOutageStore {
        inner: BoxedStore<MemoryStore>,
    }

    fn outage() -> BoxedError {
        BoxedError(Box::new(std::io::Error::other("counter write refused")))
    }

    impl DocumentStore for CounterOutageStore {
        type Error = BoxedError;

        fn get(&self, collection: &str, key: &str) -> BoxFuture<'_, Option<Document>, BoxedError> {
            self.inner.get(collection, key)
        }

        fn query(
            &self,
            collection: &str,
            filters: Vec<Filter>,
        ) -> BoxFuture<'_, Vec<Document>, BoxedError> {
            self.inner.query(collection, filters)
        }

        fn create(
            &self,
            collection: &str,
            fields: DocumentFields,
            server_time_fields: Vec<String>,
        ) -> BoxFuture<'_, String, BoxedError> {
            self.inner.create(collection, fields, server_time_fields)
        }

        fn set(
            &self,
            collection: &str,
            _key: &str,
            _fields: DocumentFields,
            _server_time_fields: Vec<String>,
        ) -> BoxFuture<'_, (), BoxedError> {
            assert_eq!(collection, COUNTERS);
            Box::pin(async move { Err(outage()) })
        }

        fn update_fields(
            &self,
            collection: &str,
            _key: &str,
            _ops: Vec<FieldOp>,
        ) -> BoxFuture<'_, (), BoxedError> {
            assert_eq!(collection, COUNTERS);
            Box::pin(async move { Err(outage()) })
        }

        fn delete_document(&self, collection: &str, key: &str) -> BoxFuture<'_, (), BoxedError> {
            self.inner.delete_document(collection, key)
        }

        fn atomic_batch(&self, ops: Vec<WriteOp>) -> BoxFuture<'_, (), BoxedError> {
            self.inner.atomic_batch(ops)
        }
    }

    #[tokio::test]
    async fn test_counter_failure_after_persist_is_a_warning_not_an_error() {
        let store: Arc<dyn DocumentStore<Error = BoxedError>> = Arc::new(CounterOutageStore {
            inner: BoxedStore(MemoryStore::new()),
        });
        let workflow = AdoptionWorkflow::new(store.clone(), None, 5);

        let receipt = workflow.submit("u1", submission("p1")).await.unwrap();
        assert!(receipt.counter_warning.is_some());

        // The request itself was stored.
        assert!(store
            .get(REQUESTS, &receipt.request_id)
            .await
            .unwrap()
            .is_some());
    }

    /// Push double that records deliveries and can refuse them.
    struct RecordingPush {
        sent: AtomicUsize,
        fail: bool,
    }

    impl PushSender for RecordingPush {
        type Error = BoxedError;

        fn send_to_user(
            &self,
            _user_id: &str,
            _title: &str,
            _body: &str,
            _data: Option<std::collections::HashMap<String, String>>,
        ) -> BoxFuture<'_, Vec<String>, BoxedError> {
            let fail = self.fail;
            self.sent.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if fail {
                    Err(BoxedError(Box::new(std::io::Error::other("fcm down"))))
                } else {
                    Ok(vec!["message-1".to_string()])
                }
            })
        }
    }

    #[tokio::test]
    async fn test_owner_is_notified_and_push_failure_is_tolerated() {
        let push = Arc::new(RecordingPush {
            sent: AtomicUsize::new(0),
            fail: false,
        });
        let workflow = AdoptionWorkflow::new(new_store(), Some(push.clone()), 5);
        workflow.submit("u1", submission("p1")).await.unwrap();
        assert_eq!(push.sent.load(Ordering::SeqCst), 1);

        let failing = Arc::new(RecordingPush {
            sent: AtomicUsize::new(0),
            fail: true,
        });
        let workflow = AdoptionWorkflow::new(new_store(), Some(failing.clone()), 5);
        // A down push service never fails the submission.
        workflow.submit("u1", submission("p1")).await.unwrap();
        assert_eq!(failing.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_stored_request_is_refused_at_the_boundary() {
        let store = new_store();
        store
            .create(
                REQUESTS,
                [
                    ("applicantId".to_string(), json!("u1")),
                    ("ownerId".to_string(), json!("owner1")),
                    // petId, status and profile are missing
                ]
                .into_iter()
                .collect(),
                vec![],
            )
            .await
            .unwrap();

        let workflow = AdoptionWorkflow::new(store, None, 5);
        let err = workflow.list_owned_requests("owner1").await.unwrap_err();
        assert!(matches!(err, AdoptionError::Malformed(_)));
    }
}
