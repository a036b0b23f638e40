//! End-to-end flows through the assembled router, backed by the in-memory
//! document store.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use patitas_backend::{build_router, PatitasServiceFactory};
use patitas_common::services::ServiceFactory;
use patitas_config::AppConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn memory_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        use_memory_store: true,
        ..AppConfig::default()
    })
}

fn submit_body(pet_id: &str) -> Value {
    json!({
        "pet_id": pet_id,
        "owner_id": "owner1",
        "profile": {
            "name": "Ana",
            "phone": "+56 9 1234 5678",
            "email": null,
            "housing": "house with yard",
            "motivation": "We have wanted a dog for years"
        }
    })
}

fn post(uri: &str, user: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_adoption_submission_flow_over_http() {
    let config = memory_config();
    let factory = PatitasServiceFactory::new(&config).unwrap();
    let app = build_router(&config, &factory);

    // First submission goes through.
    let response = app
        .clone()
        .oneshot(post("/api/adoption/requests", Some("u1"), submit_body("p1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert!(body["request_id"].is_string());

    // The same pair five minutes later is a conflict.
    let response = app
        .clone()
        .oneshot(post("/api/adoption/requests", Some("u1"), submit_body("p1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));

    // The owner sees the request in their inbox.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/adoption/requests/owned")
                .header("x-user-id", "owner1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["requests"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_anonymous_submission_is_401() {
    let config = memory_config();
    let factory = PatitasServiceFactory::new(&config).unwrap();
    let app = build_router(&config, &factory);

    let response = app
        .oneshot(post("/api/adoption/requests", None, submit_body("p1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sixth_submission_is_429_with_quota_context() {
    let config = memory_config();
    let factory = PatitasServiceFactory::new(&config).unwrap();
    let app = build_router(&config, &factory);

    for pet in ["p1", "p2", "p3", "p4", "p5"] {
        let response = app
            .clone()
            .oneshot(post("/api/adoption/requests", Some("u2"), submit_body(pet)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(post("/api/adoption/requests", Some("u2"), submit_body("p6")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("5 of 5"));
}

#[tokio::test]
async fn test_like_toggle_flow_over_http() {
    let config = memory_config();
    let factory = PatitasServiceFactory::new(&config).unwrap();

    // Seed one feed post the mobile app would have created.
    factory
        .document_store()
        .set(
            patitas_social::models::POSTS,
            "post1",
            [("likes".to_string(), json!(10))].into_iter().collect(),
            vec![],
        )
        .await
        .unwrap();

    let app = build_router(&config, &factory);

    let response = app
        .clone()
        .oneshot(post(
            "/api/social/likes/toggle",
            Some("u3"),
            json!({ "post_id": "post1", "currently_liked": false }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], json!(true));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/social/likes/post1")
                .header("x-user-id", "u3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["liked"], json!(true));

    // Unliking twice: the second is the defensive no-op.
    for expected in [true, false] {
        let response = app
            .clone()
            .oneshot(post(
                "/api/social/likes/toggle",
                Some("u3"),
                json!({ "post_id": "post1", "currently_liked": true }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], json!(expected));
    }
}
