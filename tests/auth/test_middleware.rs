use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::json;
use service_guard::config::Locale;
use tower::ServiceExt;
use tracing_test::traced_test;

use crate::support::{build_app, get_with_auth, now, read_json, sign};

#[tokio::test]
async fn valid_token_attaches_exact_claims() {
    let app = build_app(Some("s3cr3t\n"), Locale::En);
    let claims = json!({ "sub": "user-1", "role": "reader", "exp": now() + 300 });
    let token = sign(&claims, "s3cr3t");

    let response =
        app.router.clone().oneshot(get_with_auth(Some(&format!("Bearer {token}")))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.handler_calls(), 1);
    let body = read_json(response).await;
    assert_eq!(body, claims.as_object().unwrap().clone());
}

#[tokio::test]
async fn trimmed_secret_file_verifies_token_without_exp() {
    let app = build_app(Some("s3cr3t\n"), Locale::En);
    let token = sign(&json!({ "sub": "user-1" }), "s3cr3t");

    let response =
        app.router.clone().oneshot(get_with_auth(Some(&format!("Bearer {token}")))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body.get("sub"), Some(&json!("user-1")));
}

#[tokio::test]
async fn missing_header_is_rejected_before_handler() {
    let app = build_app(Some("s3cr3t"), Locale::En);

    let response = app.router.clone().oneshot(get_with_auth(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.handler_calls(), 0);
    assert_eq!(app.lookups(), 0);
    let body = read_json(response).await;
    assert_eq!(body, json!({ "message": "Missing token" }).as_object().unwrap().clone());
}

#[tokio::test]
async fn header_without_token_skips_verification() {
    let app = build_app(Some("s3cr3t"), Locale::En);

    let response = app.router.clone().oneshot(get_with_auth(Some("Bearer"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.lookups(), 0);
    assert_eq!(app.handler_calls(), 0);
    let body = read_json(response).await;
    assert_eq!(body.get("message"), Some(&json!("Malformed token")));
}

#[tokio::test]
async fn token_signed_with_other_secret_is_invalid() {
    let app = build_app(Some("s3cr3t"), Locale::En);
    let token = sign(&json!({ "sub": "user-1" }), "not-the-secret");

    let response =
        app.router.clone().oneshot(get_with_auth(Some(&format!("Bearer {token}")))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.lookups(), 1);
    assert_eq!(app.handler_calls(), 0);
    let body = read_json(response).await;
    assert_eq!(body.get("message"), Some(&json!("Invalid token")));
}

#[tokio::test]
async fn expired_token_is_invalid() {
    let app = build_app(Some("s3cr3t"), Locale::En);
    let token = sign(&json!({ "sub": "user-1", "exp": now() - 600 }), "s3cr3t");

    let response =
        app.router.clone().oneshot(get_with_auth(Some(&format!("Bearer {token}")))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.handler_calls(), 0);
    let body = read_json(response).await;
    assert_eq!(body.get("message"), Some(&json!("Invalid token")));
}

#[tokio::test]
#[traced_test]
async fn missing_signing_secret_looks_like_invalid_token() {
    let app = build_app(None, Locale::En);
    let token = sign(&json!({ "sub": "user-1" }), "s3cr3t");

    let response =
        app.router.clone().oneshot(get_with_auth(Some(&format!("Bearer {token}")))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.handler_calls(), 0);
    let body = read_json(response).await;
    assert_eq!(body, json!({ "message": "Invalid token" }).as_object().unwrap().clone());
    assert!(logs_contain("signing_secret_unavailable"));
}

#[tokio::test]
async fn rejection_messages_follow_locale() {
    let app = build_app(Some("s3cr3t"), Locale::Fr);

    let missing = app.router.clone().oneshot(get_with_auth(None)).await.unwrap();
    assert_eq!(read_json(missing).await.get("message"), Some(&json!("Token manquant")));

    let malformed = app.router.clone().oneshot(get_with_auth(Some("Bearer"))).await.unwrap();
    assert_eq!(read_json(malformed).await.get("message"), Some(&json!("Token malformé")));

    let invalid = app.router.clone().oneshot(get_with_auth(Some("Bearer a.b.c"))).await.unwrap();
    assert_eq!(read_json(invalid).await.get("message"), Some(&json!("Token invalide")));
}

#[tokio::test]
async fn options_request_without_header_is_rejected() {
    let app = build_app(Some("s3cr3t"), Locale::En);
    let request =
        Request::builder().method(Method::OPTIONS).uri("/protected").body(Body::empty()).unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.handler_calls(), 0);
    assert_eq!(app.lookups(), 0);
    let body = read_json(response).await;
    assert_eq!(body.get("message"), Some(&json!("Missing token")));
}

#[tokio::test]
async fn signing_secret_is_resolved_per_request() {
    let app = build_app(Some("first"), Locale::En);

    let token = sign(&json!({ "sub": "user-1" }), "first");
    let response =
        app.router.clone().oneshot(get_with_auth(Some(&format!("Bearer {token}")))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.lookups(), 1);

    let response =
        app.router.clone().oneshot(get_with_auth(Some(&format!("Bearer {token}")))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.lookups(), 2);
}
