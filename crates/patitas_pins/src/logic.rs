// --- File: crates/patitas_pins/src/logic.rs ---

use std::sync::Arc;

use chrono::Utc;
use patitas_common::error::HttpStatusCode;
use patitas_common::services::{
    BoxedError, DocumentStore, FieldOp, Filter, ObjectStorage,
};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{MapPin, PinDraft, PinModelError, PINS};

#[derive(Error, Debug)]
pub enum PinError {
    #[error("No authenticated user for this call.")]
    Unauthenticated,
    #[error("Only one report per day is allowed; today's report already exists.")]
    DailyPinExists,
    #[error(transparent)]
    Malformed(#[from] PinModelError),
    #[error("Storage backend unavailable: {0}")]
    Infrastructure(#[from] BoxedError),
}

impl HttpStatusCode for PinError {
    fn status_code(&self) -> u16 {
        match self {
            PinError::Unauthenticated => 401,
            PinError::DailyPinExists => 429,
            PinError::Malformed(_) => 500,
            PinError::Infrastructure(_) => 502,
        }
    }
}

/// Image payloads attached to a new pin.
pub struct PinImages {
    /// Rendered circular map marker, PNG.
    pub marker: Vec<u8>,
    /// The unmodified photo, JPEG.
    pub photo: Vec<u8>,
}

/// Lost/found/sighted report workflow.
///
/// Creation is upload-first: both images must land in object storage before
/// the pin document is written, so a failed upload never leaves a pin that
/// points at missing media. The reverse gap is accepted: an upload that
/// succeeded before a later failure stays behind under its provisional
/// prefix until an external sweep reclaims it.
pub struct PinWorkflow {
    store: Arc<dyn DocumentStore<Error = BoxedError>>,
    storage: Arc<dyn ObjectStorage<Error = BoxedError>>,
    max_per_day: u32,
}

impl PinWorkflow {
    pub fn new(
        store: Arc<dyn DocumentStore<Error = BoxedError>>,
        storage: Arc<dyn ObjectStorage<Error = BoxedError>>,
        max_per_day: u32,
    ) -> Self {
        Self {
            store,
            storage,
            max_per_day,
        }
    }

    /// Create a geotagged report for `creator_id`.
    ///
    /// At most `max_per_day` pins per creator per UTC calendar day (one, by
    /// default): the cap query runs first and blocks the call with
    /// [`PinError::DailyPinExists`]. The two uploads run concurrently; the
    /// document write starts only after both succeed. Returns the new pin's
    /// id.
    pub async fn create_pin(
        &self,
        creator_id: &str,
        draft: PinDraft,
        images: PinImages,
    ) -> Result<String, PinError> {
        if creator_id.is_empty() {
            return Err(PinError::Unauthenticated);
        }

        let start_of_today = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            .and_utc()
            .to_rfc3339();
        let todays = self
            .store
            .query(
                PINS,
                vec![
                    Filter::equal("creatorId", creator_id),
                    Filter::at_least("createdAt", start_of_today),
                ],
            )
            .await?;
        if todays.len() >= self.max_per_day as usize {
            return Err(PinError::DailyPinExists);
        }

        // Provisional id namespaces the storage paths only; the document
        // gets its own store-assigned key below.
        let provisional = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let marker_path = format!("pins/{creator_id}/{provisional}/marker.png");
        let photo_path = format!("pins/{creator_id}/{provisional}/photo.jpg");

        let (marker, photo) = tokio::join!(
            self.storage.upload(&marker_path, images.marker, "image/png"),
            self.storage.upload(&photo_path, images.photo, "image/jpeg"),
        );
        // A failure here may orphan the sibling upload; that is reclaimed
        // out-of-band, never by leaving a partial document.
        let marker = marker?;
        let photo = photo?;

        let fields = MapPin::new_fields(creator_id, &draft, &marker.public_url, &photo.public_url);
        let pin_id = self
            .store
            .create(
                PINS,
                fields,
                vec!["createdAt".to_string(), "updatedAt".to_string()],
            )
            .await?;
        info!("Pin {} created by {}", pin_id, creator_id);
        Ok(pin_id)
    }

    /// All active pins, for the map screen.
    pub async fn list_active_pins(&self) -> Result<Vec<MapPin>, PinError> {
        let documents = self
            .store
            .query(PINS, vec![Filter::equal("isActive", true)])
            .await?;
        documents
            .iter()
            .map(|doc| MapPin::from_document(doc).map_err(PinError::from))
            .collect()
    }

    /// Count one abuse/outdated report against a pin.
    ///
    /// Deactivation thresholds are a moderation concern outside this
    /// workflow; this only bumps the counter.
    pub async fn report_pin(&self, pin_id: &str) -> Result<(), PinError> {
        self.store
            .update_fields(
                PINS,
                pin_id,
                vec![
                    FieldOp::increment("reportCount", 1),
                    FieldOp::server_time("updatedAt"),
                ],
            )
            .await
            .map_err(|err| {
                warn!("Report on pin {} not counted: {}", pin_id, err);
                PinError::from(err)
            })
    }
}
