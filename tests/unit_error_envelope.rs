mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
};
use common::spawn_app_in;
use edvisa::middleware::errors::{handle_panic, normalize_errors};
use edvisa_config::AppEnvironment;
use edvisa_core::ErrorEnvelope;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;

#[allow(unreachable_code)]
async fn explode() -> &'static str {
    panic!("database handle poisoned");
    "unreachable"
}

fn panicking_app(environment: AppEnvironment) -> Router {
    Router::new()
        .route("/explode", get(explode))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(environment, normalize_errors))
}

async fn envelope(router: Router, uri: &str) -> (StatusCode, ErrorEnvelope) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_unauthorized_has_no_stack_in_development() {
    let app = spawn_app_in(AppEnvironment::Development);

    let (status, body) = envelope(app.router.clone(), "/api/users/me").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.status_code, 401);
    assert_eq!(body.code, "token_missing");
    assert_eq!(body.message, "Missing authorization header");
    assert!(body.stack.is_none());

    let request = Request::builder()
        .uri("/api/users/me")
        .header("authorization", "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: ErrorEnvelope = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.code, "token_invalid");
    assert!(body.stack.is_none());
}

#[tokio::test]
async fn test_validation_error_carries_stack_in_development() {
    let app = spawn_app_in(AppEnvironment::Development);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"email":"nope","password":"x"}"#))
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: ErrorEnvelope = serde_json::from_slice(&bytes).unwrap();
    assert!(body.stack.is_some());
}

#[tokio::test]
async fn test_unauthorized_has_no_stack_in_production() {
    let app = spawn_app_in(AppEnvironment::Production);

    let (status, body) = envelope(app.router, "/api/users/me").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.message, "Missing authorization header");
    assert_eq!(body.code, "token_missing");
    assert!(body.stack.is_none());
}

#[tokio::test]
async fn test_panic_renders_internal_error_in_production() {
    let (status, body) = envelope(panicking_app(AppEnvironment::Production), "/explode").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.status, "error");
    assert_eq!(body.code, "internal_error");
    assert_eq!(body.message, "Internal server error");
    assert!(body.stack.is_none());
}

#[tokio::test]
async fn test_panic_details_visible_in_development() {
    let (status, body) = envelope(panicking_app(AppEnvironment::Development), "/explode").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.message.contains("database handle poisoned"));
    assert!(body.stack.is_some());
}

#[tokio::test]
async fn test_unknown_route_in_production() {
    let app = spawn_app_in(AppEnvironment::Production);

    let (status, body) = envelope(app.router, "/does/not/exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.message, "Route not found");
    assert!(body.stack.is_none());
}
