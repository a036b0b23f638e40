use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::{is_liked_handler, liked_posts_handler, toggle_like_handler, SocialState};
use crate::logic::LikeWorkflow;

/// Create social routes for the API.
pub fn routes(workflow: Arc<LikeWorkflow>) -> Router {
    info!("Social routes initialized");

    let state = Arc::new(SocialState { workflow });

    Router::new()
        .route("/social/likes/toggle", post(toggle_like_handler))
        .route("/social/likes", get(liked_posts_handler))
        .route("/social/likes/{post_id}", get(is_liked_handler))
        .with_state(state)
}
