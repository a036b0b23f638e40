// File: crates/patitas_adoption/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    delete_request_handler, list_owned_requests_handler, submit_request_handler, DeleteResponse,
    OwnedRequestsResponse, SubmitResponse,
};
use crate::logic::{SubmitAdoptionRequest, SubmissionReceipt};
use crate::models::{AdoptionRequest, ApplicantProfile, RequestStatus};

#[derive(OpenApi)]
#[openapi(
    paths(
        submit_request_handler,
        list_owned_requests_handler,
        delete_request_handler,
    ),
    components(schemas(
        SubmitAdoptionRequest,
        SubmissionReceipt,
        SubmitResponse,
        OwnedRequestsResponse,
        DeleteResponse,
        AdoptionRequest,
        ApplicantProfile,
        RequestStatus,
    )),
    tags((name = "Adoption", description = "Adoption request submission and inbox"))
)]
pub struct AdoptionApiDoc;
