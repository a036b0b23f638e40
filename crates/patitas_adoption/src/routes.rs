use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::{
    delete_request_handler, list_owned_requests_handler, submit_request_handler, AdoptionState,
};
use crate::logic::AdoptionWorkflow;

/// Create adoption routes for the API.
///
/// # Arguments
///
/// * `workflow` - The adoption workflow, already wired to its collaborators
///
/// # Returns
///
/// An Axum router with the adoption endpoints
pub fn routes(workflow: Arc<AdoptionWorkflow>) -> Router {
    info!("Adoption routes initialized");

    let state = Arc::new(AdoptionState { workflow });

    Router::new()
        .route("/adoption/requests", post(submit_request_handler))
        .route(
            "/adoption/requests/owned",
            get(list_owned_requests_handler),
        )
        .route(
            "/adoption/requests/{request_id}",
            delete(delete_request_handler),
        )
        .with_state(state)
}
