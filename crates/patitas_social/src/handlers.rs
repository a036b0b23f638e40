//! HTTP handlers for the like workflow.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::error;

use patitas_common::error::HttpStatusCode;
use patitas_common::http::caller_id;

use crate::logic::{LikeWorkflow, SocialError};

/// Shared state for social handlers.
#[derive(Clone)]
pub struct SocialState {
    pub workflow: Arc<LikeWorkflow>,
}

/// Request body for the toggle endpoint.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ToggleLikeRequest {
    /// The post whose like state is being flipped
    pub post_id: String,

    /// The caller's current view of the like state; `true` means the call
    /// removes a like
    pub currently_liked: bool,
}

/// Response body for the toggle endpoint.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ToggleLikeResponse {
    /// False only for the defensive no-op, when an unlike found no like on
    /// record
    pub success: bool,

    pub error: Option<String>,
}

/// Response body for the liked-posts endpoint.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LikedPostsResponse {
    pub success: bool,
    pub post_ids: BTreeSet<String>,
    pub error: Option<String>,
}

fn status_for(err: &SocialError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/social/likes/toggle",
    request_body = ToggleLikeRequest,
    responses(
        (status = 200, description = "Toggle applied (or defensively skipped)", body = ToggleLikeResponse),
        (status = 401, description = "Not signed in"),
        (status = 502, description = "Store unavailable")
    ),
    tag = "Social"
))]
pub async fn toggle_like_handler(
    State(state): State<Arc<SocialState>>,
    headers: HeaderMap,
    Json(payload): Json<ToggleLikeRequest>,
) -> Response {
    let user = caller_id(&headers).unwrap_or_default();

    match state
        .workflow
        .toggle_like(&user, &payload.post_id, payload.currently_liked)
        .await
    {
        Ok(applied) => Json(ToggleLikeResponse {
            success: applied,
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Like toggle failed: {}", err);
            (
                status_for(&err),
                Json(ToggleLikeResponse {
                    success: false,
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
    path = "/social/likes",
    responses(
        (status = 200, description = "Posts the caller likes", body = LikedPostsResponse),
        (status = 401, description = "Not signed in"),
        (status = 502, description = "Store unavailable")
    ),
    tag = "Social"
))]
pub async fn liked_posts_handler(
    State(state): State<Arc<SocialState>>,
    headers: HeaderMap,
) -> Response {
    let user = caller_id(&headers).unwrap_or_default();
    if user.is_empty() {
        let err = SocialError::Unauthenticated;
        return (
            status_for(&err),
            Json(LikedPostsResponse {
                success: false,
                post_ids: BTreeSet::new(),
                error: Some(err.to_string()),
            }),
        )
            .into_response();
    }

    match state.workflow.liked_post_ids(&user).await {
        Ok(post_ids) => Json(LikedPostsResponse {
            success: true,
            post_ids,
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Listing liked posts failed: {}", err);
            (
                status_for(&err),
                Json(LikedPostsResponse {
                    success: false,
                    post_ids: BTreeSet::new(),
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Response body for the single-post like-state endpoint.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IsLikedResponse {
    pub success: bool,
    pub liked: bool,
    pub error: Option<String>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/social/likes/{post_id}",
    params(("post_id" = String, Path, description = "The post to check")),
    responses(
        (status = 200, description = "Like state for one post", body = IsLikedResponse),
        (status = 502, description = "Store unavailable")
    ),
    tag = "Social"
))]
pub async fn is_liked_handler(
    State(state): State<Arc<SocialState>>,
    headers: HeaderMap,
    Path(post_id): Path<String>,
) -> Response {
    let user = caller_id(&headers).unwrap_or_default();

    match state.workflow.is_liked(&user, &post_id).await {
        Ok(liked) => Json(IsLikedResponse {
            success: true,
            liked,
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Like lookup failed: {}", err);
            (
                status_for(&err),
                Json(IsLikedResponse {
                    success: false,
                    liked: false,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}
