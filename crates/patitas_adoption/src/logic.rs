// --- File: crates/patitas_adoption/src/logic.rs ---

use std::sync::Arc;

use patitas_common::error::HttpStatusCode;
use patitas_common::services::{BoxedError, DocumentStore, Filter, PushSender};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::guard::{GuardError, SubmissionGuard};
use crate::models::{AdoptionRequest, ApplicantProfile, ModelError, COUNTERS, REQUESTS};

#[derive(Error, Debug)]
pub enum AdoptionError {
    #[error("No authenticated user for this call.")]
    Unauthenticated,
    #[error("An adoption request for this pet already exists.")]
    DuplicateRequest,
    #[error("Daily submission limit reached ({submitted_today} of {limit}).")]
    RateLimited { limit: u32, submitted_today: u32 },
    #[error("Invalid profile: {0}")]
    Validation(String),
    #[error(transparent)]
    Malformed(#[from] ModelError),
    #[error("Store unavailable: {0}")]
    Infrastructure(#[from] BoxedError),
}

impl From<GuardError> for AdoptionError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Store(e) => AdoptionError::Infrastructure(e),
            GuardError::Malformed(e) => AdoptionError::Malformed(e),
        }
    }
}

impl HttpStatusCode for AdoptionError {
    fn status_code(&self) -> u16 {
        match self {
            AdoptionError::Unauthenticated => 401,
            AdoptionError::DuplicateRequest => 409,
            AdoptionError::RateLimited { .. } => 429,
            AdoptionError::Validation(_) => 400,
            AdoptionError::Malformed(_) => 500,
            AdoptionError::Infrastructure(_) => 502,
        }
    }
}

// --- Data Structures ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubmitAdoptionRequest {
    /// The pet the applicant wants to adopt.
    pub pet_id: String,
    /// The pet's current owner.
    pub owner_id: String,
    pub profile: ApplicantProfile,
}

/// Confirmation of a persisted submission.
///
/// `counter_warning` carries the one tolerated partial failure: the request
/// was stored but the daily counter could not be updated afterwards.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubmissionReceipt {
    pub request_id: String,
    pub counter_warning: Option<String>,
}

/// Adoption-request submission workflow.
///
/// Linear, no backtracking: duplicate check, then daily-limit check, then
/// persist, then counter update. No step is retried here; infrastructure
/// failures propagate to the caller.
pub struct AdoptionWorkflow {
    store: Arc<dyn DocumentStore<Error = BoxedError>>,
    push: Option<Arc<dyn PushSender<Error = BoxedError>>>,
    guard: SubmissionGuard,
    max_per_day: u32,
}

impl AdoptionWorkflow {
    pub fn new(
        store: Arc<dyn DocumentStore<Error = BoxedError>>,
        push: Option<Arc<dyn PushSender<Error = BoxedError>>>,
        max_per_day: u32,
    ) -> Self {
        let guard = SubmissionGuard::new(store.clone(), REQUESTS, COUNTERS, "applicantId");
        Self {
            store,
            push,
            guard,
            max_per_day,
        }
    }

    /// Submit an adoption request for `applicant_id`.
    ///
    /// Fails without writing anything on an unauthenticated caller, an
    /// invalid profile, a duplicate `(applicant, pet)` pair, or a reached
    /// daily cap. After the request document is persisted, a counter-update
    /// failure is reported as a warning on the receipt rather than undoing
    /// the submission.
    pub async fn submit(
        &self,
        applicant_id: &str,
        request: SubmitAdoptionRequest,
    ) -> Result<SubmissionReceipt, AdoptionError> {
        if applicant_id.is_empty() {
            return Err(AdoptionError::Unauthenticated);
        }
        validate_profile(&request.profile)?;

        if self
            .guard
            .check_duplicate(applicant_id, "petId", &request.pet_id)
            .await?
        {
            return Err(AdoptionError::DuplicateRequest);
        }

        let decision = self
            .guard
            .check_daily_limit(applicant_id, self.max_per_day)
            .await?;
        if !decision.allowed {
            return Err(AdoptionError::RateLimited {
                limit: self.max_per_day,
                submitted_today: decision.current_count,
            });
        }

        let fields = AdoptionRequest::new_fields(
            applicant_id,
            &request.pet_id,
            &request.owner_id,
            &request.profile,
        );
        let request_id = self
            .store
            .create(REQUESTS, fields, vec!["createdAt".to_string()])
            .await?;
        info!(
            "Adoption request {} submitted by {} for pet {}",
            request_id, applicant_id, request.pet_id
        );

        let counter_warning = match self
            .guard
            .record_submission(applicant_id, decision.is_new_day)
            .await
        {
            Ok(()) => None,
            Err(err) => {
                // The request is already stored; counter drift is tolerated.
                warn!(
                    "Counter update failed after persisting request {}: {}",
                    request_id, err
                );
                Some("The request was stored but its daily counter lagged behind.".to_string())
            }
        };

        self.notify_owner(&request.owner_id, &request.profile.name)
            .await;

        Ok(SubmissionReceipt {
            request_id,
            counter_warning,
        })
    }

    /// Push a new-request notification to the pet owner, best effort.
    async fn notify_owner(&self, owner_id: &str, applicant_name: &str) {
        let Some(push) = &self.push else { return };
        let body = format!("{} quiere adoptar a tu mascota", applicant_name);
        if let Err(err) = push
            .send_to_user(owner_id, "Nueva solicitud de adopción", &body, None)
            .await
        {
            warn!("Push to owner {} failed: {}", owner_id, err);
        }
    }

    /// All requests targeting pets owned by `owner_id`, for the owner's
    /// inbox. No pagination; result sets are small.
    pub async fn list_owned_requests(
        &self,
        owner_id: &str,
    ) -> Result<Vec<AdoptionRequest>, AdoptionError> {
        if owner_id.is_empty() {
            return Err(AdoptionError::Unauthenticated);
        }
        let documents = self
            .store
            .query(REQUESTS, vec![Filter::equal("ownerId", owner_id)])
            .await?;
        documents
            .iter()
            .map(|doc| AdoptionRequest::from_document(doc).map_err(AdoptionError::from))
            .collect()
    }

    /// Unconditional delete by id. Ownership is enforced by the store's
    /// access rules, not here.
    pub async fn delete_request(&self, request_id: &str) -> Result<(), AdoptionError> {
        self.store.delete_document(REQUESTS, request_id).await?;
        Ok(())
    }
}

fn validate_profile(profile: &ApplicantProfile) -> Result<(), AdoptionError> {
    if profile.name.trim().is_empty() {
        return Err(AdoptionError::Validation("name is required".to_string()));
    }
    let has_contact = profile
        .phone
        .as_deref()
        .is_some_and(|phone| !phone.trim().is_empty())
        || profile
            .email
            .as_deref()
            .is_some_and(|email| !email.trim().is_empty());
    if !has_contact {
        return Err(AdoptionError::Validation(
            "a phone number or email address is required".to_string(),
        ));
    }
    Ok(())
}
