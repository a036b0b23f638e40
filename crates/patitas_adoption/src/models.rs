// --- File: crates/patitas_adoption/src/models.rs ---
//! Persistence documents for adoption requests.
//!
//! The store hands back loosely-typed field maps; everything here converts
//! those maps into validated structs at the boundary, so workflow logic never
//! touches raw documents. Field names mirror the mobile clients' camelCase.

use chrono::{DateTime, Utc};
use patitas_common::services::{Document, DocumentFields};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Collection holding adoption requests.
pub const REQUESTS: &str = "solicitudes";
/// Collection holding one daily submission counter per user.
pub const COUNTERS: &str = "contadoresSolicitudes";

/// A stored document did not have the shape this crate writes.
#[derive(Error, Debug)]
#[error("Malformed document in {collection}: {detail}")]
pub struct ModelError {
    pub collection: &'static str,
    pub detail: String,
}

impl ModelError {
    fn new(collection: &'static str, detail: impl Into<String>) -> Self {
        Self {
            collection,
            detail: detail.into(),
        }
    }
}

fn require_str(
    collection: &'static str,
    fields: &DocumentFields,
    name: &str,
) -> Result<String, ModelError> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ModelError::new(collection, format!("missing field {name}")))
}

fn optional_timestamp(
    collection: &'static str,
    fields: &DocumentFields,
    name: &str,
) -> Result<Option<DateTime<Utc>>, ModelError> {
    match fields.get(name).and_then(Value::as_str) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|_| ModelError::new(collection, format!("bad timestamp in {name}: {raw}"))),
    }
}

/// Lifecycle status of an adoption request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    fn parse(raw: &str) -> Result<Self, ModelError> {
        match raw {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(ModelError::new(REQUESTS, format!("unknown status {other}"))),
        }
    }
}

/// Free-form applicant profile attached to a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApplicantProfile {
    /// The applicant's display name.
    pub name: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Contact email address.
    pub email: Option<String>,
    /// Housing situation ("house with yard", "apartment", ...).
    pub housing: String,
    /// Why the applicant wants to adopt this pet.
    pub motivation: String,
}

impl ApplicantProfile {
    pub(crate) fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "phone": self.phone,
            "email": self.email,
            "housing": self.housing,
            "motivation": self.motivation,
        })
    }

    fn from_value(value: &Value) -> Result<Self, ModelError> {
        let object = value
            .as_object()
            .ok_or_else(|| ModelError::new(REQUESTS, "profile is not a map"))?;
        let text = |name: &str| -> Result<String, ModelError> {
            object
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ModelError::new(REQUESTS, format!("missing profile field {name}")))
        };
        let optional = |name: &str| {
            object
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Ok(Self {
            name: text("name")?,
            phone: optional("phone"),
            email: optional("email"),
            housing: text("housing")?,
            motivation: text("motivation")?,
        })
    }
}

/// An adoption request as stored in the `solicitudes` collection.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdoptionRequest {
    /// Store-assigned document key.
    pub id: String,
    /// The applying user.
    pub applicant_id: String,
    /// The pet the request targets.
    pub pet_id: String,
    /// The pet's current owner, denormalized for the owner's inbox query.
    pub owner_id: String,
    pub status: RequestStatus,
    pub profile: ApplicantProfile,
    /// Server-assigned submission time; absent only until the server echo
    /// is first read back.
    pub created_at: Option<DateTime<Utc>>,
}

impl AdoptionRequest {
    /// Fields for a brand-new pending request. `createdAt` is written by the
    /// store as a server timestamp, so it is not part of the map.
    pub(crate) fn new_fields(
        applicant_id: &str,
        pet_id: &str,
        owner_id: &str,
        profile: &ApplicantProfile,
    ) -> DocumentFields {
        [
            ("applicantId".to_string(), json!(applicant_id)),
            ("petId".to_string(), json!(pet_id)),
            ("ownerId".to_string(), json!(owner_id)),
            (
                "status".to_string(),
                json!(RequestStatus::Pending.as_str()),
            ),
            ("profile".to_string(), profile.to_value()),
        ]
        .into_iter()
        .collect()
    }

    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let status = RequestStatus::parse(&require_str(REQUESTS, &doc.fields, "status")?)?;
        let profile = ApplicantProfile::from_value(
            doc.fields
                .get("profile")
                .ok_or_else(|| ModelError::new(REQUESTS, "missing field profile"))?,
        )?;
        Ok(Self {
            id: doc.id.clone(),
            applicant_id: require_str(REQUESTS, &doc.fields, "applicantId")?,
            pet_id: require_str(REQUESTS, &doc.fields, "petId")?,
            owner_id: require_str(REQUESTS, &doc.fields, "ownerId")?,
            status,
            profile,
            created_at: optional_timestamp(REQUESTS, &doc.fields, "createdAt")?,
        })
    }
}

/// Per-user daily submission counter.
///
/// A counter whose `last_update` falls on an earlier UTC calendar day is
/// logically stale and reads as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyCounter {
    pub count: u32,
    pub last_update: DateTime<Utc>,
}

impl DailyCounter {
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let count = doc
            .fields
            .get("count")
            .and_then(Value::as_i64)
            .ok_or_else(|| ModelError::new(COUNTERS, "missing field count"))?;
        let count = u32::try_from(count)
            .map_err(|_| ModelError::new(COUNTERS, format!("negative count {count}")))?;
        let last_update = optional_timestamp(COUNTERS, &doc.fields, "lastUpdate")?
            .ok_or_else(|| ModelError::new(COUNTERS, "missing field lastUpdate"))?;
        Ok(Self { count, last_update })
    }
}
