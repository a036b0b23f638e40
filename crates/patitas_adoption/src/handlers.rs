//! HTTP handlers for the adoption-request workflow.
//!
//! Handlers translate workflow errors into status codes through the shared
//! `HttpStatusCode` mapping, so duplicate, rate-limit, and validation
//! failures each produce a distinct, actionable response while
//! infrastructure failures stay generic.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

use patitas_common::error::HttpStatusCode;
use patitas_common::http::caller_id;

use crate::logic::{AdoptionError, AdoptionWorkflow, SubmitAdoptionRequest};
use crate::models::AdoptionRequest;

/// Shared state for adoption handlers.
#[derive(Clone)]
pub struct AdoptionState {
    pub workflow: Arc<AdoptionWorkflow>,
}

/// Response body for the submit endpoint.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubmitResponse {
    /// Whether the request was stored
    pub success: bool,

    /// The stored request's id on success
    pub request_id: Option<String>,

    /// Set when the request was stored but the daily counter lagged behind
    pub warning: Option<String>,

    /// Error message when the submission was refused
    pub error: Option<String>,
}

/// Response body for the owner inbox endpoint.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OwnedRequestsResponse {
    pub success: bool,
    pub requests: Vec<AdoptionRequest>,
    pub error: Option<String>,
}

/// Response body for the delete endpoint.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeleteResponse {
    pub success: bool,
    pub error: Option<String>,
}

fn status_for(err: &AdoptionError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/adoption/requests",
    request_body = SubmitAdoptionRequest,
    responses(
        (status = 200, description = "Request stored", body = SubmitResponse),
        (status = 400, description = "Invalid profile"),
        (status = 401, description = "Not signed in"),
        (status = 409, description = "Duplicate request for this pet"),
        (status = 429, description = "Daily submission limit reached"),
        (status = 502, description = "Store unavailable")
    ),
    tag = "Adoption"
))]
pub async fn submit_request_handler(
    State(state): State<Arc<AdoptionState>>,
    headers: HeaderMap,
    Json(payload): Json<SubmitAdoptionRequest>,
) -> Response {
    let applicant = caller_id(&headers).unwrap_or_default();
    debug!("Submitting adoption request for pet {}", payload.pet_id);

    match state.workflow.submit(&applicant, payload).await {
        Ok(receipt) => Json(SubmitResponse {
            success: true,
            request_id: Some(receipt.request_id),
            warning: receipt.counter_warning,
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Adoption submission refused: {}", err);
            (
                status_for(&err),
                Json(SubmitResponse {
                    success: false,
                    request_id: None,
                    warning: None,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/adoption/requests/owned",
    responses(
        (status = 200, description = "Requests for the caller's pets", body = OwnedRequestsResponse),
        (status = 401, description = "Not signed in"),
        (status = 502, description = "Store unavailable")
    ),
    tag = "Adoption"
))]
pub async fn list_owned_requests_handler(
    State(state): State<Arc<AdoptionState>>,
    headers: HeaderMap,
) -> Response {
    let owner = caller_id(&headers).unwrap_or_default();

    match state.workflow.list_owned_requests(&owner).await {
        Ok(requests) => Json(OwnedRequestsResponse {
            success: true,
            requests,
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Listing owned requests failed: {}", err);
            (
                status_for(&err),
                Json(OwnedRequestsResponse {
                    success: false,
                    requests: Vec::new(),
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/adoption/requests/{request_id}",
    params(("request_id" = String, Path, description = "The request to delete")),
    responses(
        (status = 200, description = "Request deleted", body = DeleteResponse),
        (status = 502, description = "Store unavailable")
    ),
    tag = "Adoption"
))]
pub async fn delete_request_handler(
    State(state): State<Arc<AdoptionState>>,
    Path(request_id): Path<String>,
) -> Response {
    match state.workflow.delete_request(&request_id).await {
        Ok(()) => Json(DeleteResponse {
            success: true,
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Deleting request {} failed: {}", request_id, err);
            (
                status_for(&err),
                Json(DeleteResponse {
                    success: false,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}
