// --- File: crates/patitas_pins/src/models.rs ---
//! Map-pin document shape.

use chrono::{DateTime, Utc};
use patitas_common::services::{Document, DocumentFields};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Collection holding the map pins.
pub const PINS: &str = "marcadores";

/// A stored pin did not have the shape this crate writes.
#[derive(Error, Debug)]
#[error("Malformed pin document: {0}")]
pub struct PinModelError(pub String);

/// Report category of a map pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum PinCategory {
    /// The reporter's own pet is lost
    Perdido,
    /// A stray animal was sighted
    Avistado,
    /// A stray animal was taken in
    Encontrado,
}

impl PinCategory {
    fn as_str(self) -> &'static str {
        match self {
            PinCategory::Perdido => "PERDIDO",
            PinCategory::Avistado => "AVISTADO",
            PinCategory::Encontrado => "ENCONTRADO",
        }
    }

    fn parse(raw: &str) -> Result<Self, PinModelError> {
        match raw {
            "PERDIDO" => Ok(PinCategory::Perdido),
            "AVISTADO" => Ok(PinCategory::Avistado),
            "ENCONTRADO" => Ok(PinCategory::Encontrado),
            other => Err(PinModelError(format!("unknown category {other}"))),
        }
    }
}

/// Geographic position of a pin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PinLocation {
    pub lat: f64,
    pub lng: f64,
    /// Reverse-geocoded street address, as the map client resolved it.
    pub address: String,
}

/// The report content a client submits; images travel separately as bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PinDraft {
    pub category: PinCategory,
    /// Free-text animal descriptor ("perro mestizo café").
    pub animal: String,
    /// Short distinguishing trait ("collar rojo").
    pub trait_note: String,
    pub description: String,
    pub location: PinLocation,
}

/// A stored map pin.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MapPin {
    pub id: String,
    pub category: PinCategory,
    pub animal: String,
    pub trait_note: String,
    pub description: String,
    pub location: PinLocation,
    /// Circular marker rendered for the map.
    pub marker_image_url: String,
    /// The unmodified photo.
    pub photo_url: String,
    pub creator_id: String,
    pub report_count: u32,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MapPin {
    /// Fields for a brand-new pin. `createdAt`/`updatedAt` are written by
    /// the store as server timestamps.
    pub(crate) fn new_fields(
        creator_id: &str,
        draft: &PinDraft,
        marker_image_url: &str,
        photo_url: &str,
    ) -> DocumentFields {
        [
            ("category".to_string(), json!(draft.category.as_str())),
            ("animal".to_string(), json!(draft.animal)),
            ("trait".to_string(), json!(draft.trait_note)),
            ("description".to_string(), json!(draft.description)),
            (
                "location".to_string(),
                json!({
                    "lat": draft.location.lat,
                    "lng": draft.location.lng,
                    "address": draft.location.address,
                }),
            ),
            ("markerImageUrl".to_string(), json!(marker_image_url)),
            ("photoUrl".to_string(), json!(photo_url)),
            ("creatorId".to_string(), json!(creator_id)),
            ("reportCount".to_string(), json!(0)),
            ("isActive".to_string(), json!(true)),
        ]
        .into_iter()
        .collect()
    }

    pub fn from_document(doc: &Document) -> Result<Self, PinModelError> {
        let text = |name: &str| -> Result<String, PinModelError> {
            doc.fields
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| PinModelError(format!("missing field {name}")))
        };
        let timestamp = |name: &str| -> Result<Option<DateTime<Utc>>, PinModelError> {
            match doc.fields.get(name).and_then(Value::as_str) {
                None => Ok(None),
                Some(raw) => DateTime::parse_from_rfc3339(raw)
                    .map(|parsed| Some(parsed.with_timezone(&Utc)))
                    .map_err(|_| PinModelError(format!("bad timestamp in {name}: {raw}"))),
            }
        };

        let location = doc
            .fields
            .get("location")
            .and_then(Value::as_object)
            .ok_or_else(|| PinModelError("missing field location".to_string()))?;
        let coordinate = |name: &str| -> Result<f64, PinModelError> {
            location
                .get(name)
                .and_then(Value::as_f64)
                .ok_or_else(|| PinModelError(format!("missing location field {name}")))
        };

        let report_count = doc
            .fields
            .get("reportCount")
            .and_then(Value::as_i64)
            .and_then(|count| u32::try_from(count).ok())
            .ok_or_else(|| PinModelError("missing field reportCount".to_string()))?;

        Ok(Self {
            id: doc.id.clone(),
            category: PinCategory::parse(&text("category")?)?,
            animal: text("animal")?,
            trait_note: text("trait")?,
            description: text("description")?,
            location: PinLocation {
                lat: coordinate("lat")?,
                lng: coordinate("lng")?,
                address: location
                    .get("address")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            marker_image_url: text("markerImageUrl")?,
            photo_url: text("photoUrl")?,
            creator_id: text("creatorId")?,
            report_count,
            is_active: doc
                .fields
                .get("isActive")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            created_at: timestamp("createdAt")?,
            updated_at: timestamp("updatedAt")?,
        })
    }
}
