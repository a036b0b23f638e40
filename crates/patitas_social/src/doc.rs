// File: crates/patitas_social/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    is_liked_handler, liked_posts_handler, toggle_like_handler, IsLikedResponse,
    LikedPostsResponse, ToggleLikeRequest, ToggleLikeResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(toggle_like_handler, liked_posts_handler, is_liked_handler),
    components(schemas(
        ToggleLikeRequest,
        ToggleLikeResponse,
        LikedPostsResponse,
        IsLikedResponse,
    )),
    tags((name = "Social", description = "Likes on feed posts"))
)]
pub struct SocialApiDoc;
