#[cfg(test)]
mod tests {
    use crate::logic::{PinError, PinImages, PinWorkflow};
    use crate::models::{PinCategory, PinDraft, PinLocation, PINS};
    use chrono::{Duration, Utc};
    use patitas_common::memory::MemoryStore;
    use patitas_common::services::{
        BoxFuture, BoxedError, BoxedStore, DocumentStore, Filter, ObjectStorage, StoredObject,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn draft() -> PinDraft {
        PinDraft {
            category: PinCategory::Perdido,
            animal: "perro mestizo café".to_string(),
            trait_note: "collar rojo".to_string(),
            description: "Se perdió cerca de la plaza el martes".to_string(),
            location: PinLocation {
                lat: -33.4489,
                lng: -70.6693,
                address: "Plaza de Armas, Santiago".to_string(),
            },
        }
    }

    fn images() -> PinImages {
        PinImages {
            marker: vec![0x89, 0x50, 0x4e, 0x47],
            photo: vec![0xff, 0xd8, 0xff, 0xe0],
        }
    }

    /// Object storage double: keeps uploads in memory and can refuse paths
    /// by suffix.
    #[derive(Default)]
    struct MemoryStorage {
        uploads: Mutex<Vec<String>>,
        fail_suffix: Option<&'static str>,
    }

    impl ObjectStorage for MemoryStorage {
        type Error = BoxedError;

        fn upload(
            &self,
            path: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> BoxFuture<'_, StoredObject, BoxedError> {
            let path = path.to_string();
            let refused = self
                .fail_suffix
                .is_some_and(|suffix| path.ends_with(suffix));
            if !refused {
                self.uploads.lock().unwrap().push(path.clone());
            }
            let public_url = self.public_url(&path);
            Box::pin(async move {
                if refused {
                    Err(BoxedError(Box::new(std::io::Error::other(
                        "upload refused",
                    ))))
                } else {
                    Ok(StoredObject { path, public_url })
                }
            })
        }

        fn public_url(&self, path: &str) -> String {
            format!("https://storage.example/{path}")
        }
    }

    fn new_store() -> Arc<dyn DocumentStore<Error = BoxedError>> {
        Arc::new(BoxedStore(MemoryStore::new()))
    }

    fn workflow_with(
        store: &Arc<dyn DocumentStore<Error = BoxedError>>,
        storage: MemoryStorage,
    ) -> PinWorkflow {
        PinWorkflow::new(store.clone(), Arc::new(storage), 1)
    }

    #[tokio::test]
    async fn test_create_pin_persists_document_with_both_urls() {
        let store = new_store();
        let workflow = workflow_with(&store, MemoryStorage::default());

        let pin_id = workflow
            .create_pin("u1", draft(), images())
            .await
            .unwrap();

        let doc = store.get(PINS, &pin_id).await.unwrap().unwrap();
        assert_eq!(doc.fields.get("category"), Some(&json!("PERDIDO")));
        assert_eq!(doc.fields.get("creatorId"), Some(&json!("u1")));
        assert_eq!(doc.fields.get("reportCount"), Some(&json!(0)));
        assert_eq!(doc.fields.get("isActive"), Some(&json!(true)));
        assert!(doc.fields.contains_key("createdAt"));

        let marker_url = doc.fields.get("markerImageUrl").unwrap().as_str().unwrap();
        let photo_url = doc.fields.get("photoUrl").unwrap().as_str().unwrap();
        assert!(marker_url.ends_with("marker.png"));
        assert!(photo_url.ends_with("photo.jpg"));
        // Both live under the same provisional prefix.
        let prefix = marker_url.rsplit_once('/').unwrap().0;
        assert_eq!(photo_url.rsplit_once('/').unwrap().0, prefix);
    }

    #[tokio::test]
    async fn test_second_pin_same_day_is_blocked() {
        // Scenario: a pin at 09:00 today blocks a later pin the same day.
        let store = new_store();
        let workflow = workflow_with(&store, MemoryStorage::default());

        workflow.create_pin("u4", draft(), images()).await.unwrap();
        let err = workflow
            .create_pin("u4", draft(), images())
            .await
            .unwrap_err();
        assert!(matches!(err, PinError::DailyPinExists));

        let pins = store
            .query(PINS, vec![Filter::equal("creatorId", "u4")])
            .await
            .unwrap();
        assert_eq!(pins.len(), 1);
    }

    #[tokio::test]
    async fn test_yesterdays_pin_does_not_block_today() {
        let store = new_store();
        store
            .set(
                PINS,
                "old",
                [
                    ("creatorId".to_string(), json!("u1")),
                    (
                        "createdAt".to_string(),
                        json!((Utc::now() - Duration::days(1)).to_rfc3339()),
                    ),
                ]
                .into_iter()
                .collect(),
                vec![],
            )
            .await
            .unwrap();

        let workflow = workflow_with(&store, MemoryStorage::default());
        workflow.create_pin("u1", draft(), images()).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_upload_aborts_before_the_document_write() {
        let store = new_store();
        let storage = MemoryStorage {
            uploads: Mutex::new(Vec::new()),
            fail_suffix: Some("photo.jpg"),
        };
        let workflow = PinWorkflow::new(store.clone(), Arc::new(storage), 1);

        let err = workflow
            .create_pin("u1", draft(), images())
            .await
            .unwrap_err();
        assert!(matches!(err, PinError::Infrastructure(_)));

        // No partial pin document exists.
        let pins = store.query(PINS, vec![]).await.unwrap();
        assert!(pins.is_empty());
    }

    #[tokio::test]
    async fn test_list_active_pins_skips_deactivated_ones() {
        let store = new_store();
        let workflow = workflow_with(&store, MemoryStorage::default());
        let pin_id = workflow.create_pin("u1", draft(), images()).await.unwrap();

        // A moderated-out pin stays stored but leaves the map.
        store
            .set(
                PINS,
                "hidden",
                [
                    ("category".to_string(), json!("AVISTADO")),
                    ("animal".to_string(), json!("gato")),
                    ("trait".to_string(), json!("")),
                    ("description".to_string(), json!("")),
                    (
                        "location".to_string(),
                        json!({"lat": 0.0, "lng": 0.0, "address": ""}),
                    ),
                    ("markerImageUrl".to_string(), json!("m")),
                    ("photoUrl".to_string(), json!("p")),
                    ("creatorId".to_string(), json!("u2")),
                    ("reportCount".to_string(), json!(7)),
                    ("isActive".to_string(), json!(false)),
                ]
                .into_iter()
                .collect(),
                vec![],
            )
            .await
            .unwrap();

        let pins = workflow.list_active_pins().await.unwrap();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].id, pin_id);
        assert_eq!(pins[0].category, PinCategory::Perdido);
    }

    #[tokio::test]
    async fn test_report_pin_bumps_the_counter() {
        let store = new_store();
        let workflow = workflow_with(&store, MemoryStorage::default());
        let pin_id = workflow.create_pin("u1", draft(), images()).await.unwrap();

        workflow.report_pin(&pin_id).await.unwrap();
        workflow.report_pin(&pin_id).await.unwrap();

        let doc = store.get(PINS, &pin_id).await.unwrap().unwrap();
        assert_eq!(doc.fields.get("reportCount"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_anonymous_creation_is_refused() {
        let workflow = workflow_with(&new_store(), MemoryStorage::default());
        let err = workflow
            .create_pin("", draft(), images())
            .await
            .unwrap_err();
        assert!(matches!(err, PinError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_decoded_pin_round_trips_location() {
        let store = new_store();
        let workflow = workflow_with(&store, MemoryStorage::default());
        workflow.create_pin("u1", draft(), images()).await.unwrap();

        let pins = workflow.list_active_pins().await.unwrap();
        assert_eq!(pins[0].location.address, "Plaza de Armas, Santiago");
        assert!((pins[0].location.lat - -33.4489).abs() < f64::EPSILON);
        assert_eq!(pins[0].trait_note, "collar rojo");
        assert!(pins[0].created_at.is_some());
    }
}
