//! HTTP handlers for the pin workflow.
//!
//! Clients send the two images base64-encoded in the JSON body, the way the
//! mobile app ships them after rendering the circular marker locally.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use patitas_common::error::HttpStatusCode;
use patitas_common::http::caller_id;

use crate::logic::{PinError, PinImages, PinWorkflow};
use crate::models::{MapPin, PinDraft};

/// Shared state for pin handlers.
#[derive(Clone)]
pub struct PinState {
    pub workflow: Arc<PinWorkflow>,
}

/// Request body for the create endpoint.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatePinRequest {
    #[serde(flatten)]
    pub draft: PinDraft,

    /// Rendered circular marker, base64-encoded PNG
    pub marker_image: String,

    /// The unmodified photo, base64-encoded JPEG
    pub photo: String,
}

/// Response body for the create endpoint.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatePinResponse {
    pub success: bool,
    pub pin_id: Option<String>,
    pub error: Option<String>,
}

/// Response body for the map listing endpoint.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ActivePinsResponse {
    pub success: bool,
    pub pins: Vec<MapPin>,
    pub error: Option<String>,
}

/// Response body for the report endpoint.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReportPinResponse {
    pub success: bool,
    pub error: Option<String>,
}

fn status_for(err: &PinError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/pins",
    request_body = CreatePinRequest,
    responses(
        (status = 200, description = "Pin created", body = CreatePinResponse),
        (status = 400, description = "Undecodable image payload"),
        (status = 401, description = "Not signed in"),
        (status = 429, description = "Today's report already exists"),
        (status = 502, description = "Store or storage unavailable")
    ),
    tag = "Pins"
))]
pub async fn create_pin_handler(
    State(state): State<Arc<PinState>>,
    headers: HeaderMap,
    Json(payload): Json<CreatePinRequest>,
) -> Response {
    let creator = caller_id(&headers).unwrap_or_default();

    let images = match (
        BASE64.decode(&payload.marker_image),
        BASE64.decode(&payload.photo),
    ) {
        (Ok(marker), Ok(photo)) => PinImages { marker, photo },
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(CreatePinResponse {
                    success: false,
                    pin_id: None,
                    error: Some("images must be base64-encoded".to_string()),
                }),
            )
                .into_response();
        }
    };

    match state.workflow.create_pin(&creator, payload.draft, images).await {
        Ok(pin_id) => Json(CreatePinResponse {
            success: true,
            pin_id: Some(pin_id),
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Pin creation refused: {}", err);
            (
                status_for(&err),
                Json(CreatePinResponse {
                    success: false,
                    pin_id: None,
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
    path = "/pins",
    responses(
        (status = 200, description = "Active pins for the map", body = ActivePinsResponse),
        (status = 502, description = "Store unavailable")
    ),
    tag = "Pins"
))]
pub async fn list_active_pins_handler(State(state): State<Arc<PinState>>) -> Response {
    match state.workflow.list_active_pins().await {
        Ok(pins) => Json(ActivePinsResponse {
            success: true,
            pins,
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Listing pins failed: {}", err);
            (
                status_for(&err),
                Json(ActivePinsResponse {
                    success: false,
                    pins: Vec::new(),
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/pins/{pin_id}/report",
    params(("pin_id" = String, Path, description = "The pin being reported")),
    responses(
        (status = 200, description = "Report counted", body = ReportPinResponse),
        (status = 502, description = "Store unavailable")
    ),
    tag = "Pins"
))]
pub async fn report_pin_handler(
    State(state): State<Arc<PinState>>,
    Path(pin_id): Path<String>,
) -> Response {
    match state.workflow.report_pin(&pin_id).await {
        Ok(()) => Json(ReportPinResponse {
            success: true,
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Reporting pin {} failed: {}", pin_id, err);
            (
                status_for(&err),
                Json(ReportPinResponse {
                    success: false,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}
