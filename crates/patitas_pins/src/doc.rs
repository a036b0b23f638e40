// File: crates/patitas_pins/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    create_pin_handler, list_active_pins_handler, report_pin_handler, ActivePinsResponse,
    CreatePinRequest, CreatePinResponse, ReportPinResponse,
};
use crate::models::{MapPin, PinCategory, PinDraft, PinLocation};

#[derive(OpenApi)]
#[openapi(
    paths(create_pin_handler, list_active_pins_handler, report_pin_handler),
    components(schemas(
        CreatePinRequest,
        CreatePinResponse,
        ActivePinsResponse,
        ReportPinResponse,
        MapPin,
        PinDraft,
        PinLocation,
        PinCategory,
    )),
    tags((name = "Pins", description = "Lost/found/sighted map reports"))
)]
pub struct PinsApiDoc;
