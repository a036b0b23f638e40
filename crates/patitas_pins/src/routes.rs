use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::{
    create_pin_handler, list_active_pins_handler, report_pin_handler, PinState,
};
use crate::logic::PinWorkflow;

/// Create pin routes for the API.
pub fn routes(workflow: Arc<PinWorkflow>) -> Router {
    info!("Pin routes initialized");

    let state = Arc::new(PinState { workflow });

    Router::new()
        .route("/pins", post(create_pin_handler).get(list_active_pins_handler))
        .route("/pins/{pin_id}/report", post(report_pin_handler))
        .with_state(state)
}
