//! Integration tests for signup, login and the authentication gate

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::Duration;
use common::{TestContext, TEST_SECRET};
use serde_json::json;
use taskdeck_shared::auth::TokenCodec;
use uuid::Uuid;

#[tokio::test]
async fn test_signup_returns_token_and_user() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({
                "username": "ada",
                "email": "ada@example.com",
                "password": "analytical engine"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["username"], "ada");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(!body.to_string().contains("analytical engine"));

    let user_id: Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();
    let claims = ctx.state.tokens.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.user_id, user_id);
}

#[tokio::test]
async fn test_duplicate_signup_is_conflict() {
    let ctx = TestContext::new();
    let body = json!({ "username": "bob", "email": "bob@example.com", "password": "pw" });

    let (first, _) = ctx.send(Method::POST, "/auth/signup", None, Some(body.clone())).await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, err) = ctx.send(Method::POST, "/auth/signup", None, Some(body)).await;
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "CONFLICT");
}

#[tokio::test]
async fn test_signup_missing_fields() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({ "email": "carol@example.com", "password": "" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"username"));
    assert!(fields.contains(&"password"));
    assert!(!fields.contains(&"email"));
}

#[tokio::test]
async fn test_invalid_json_body() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = ctx.send_raw(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_round_trip() {
    let ctx = TestContext::new();
    let signup = json!({ "username": "dave", "email": "dave@example.com", "password": "s3cret" });
    ctx.send(Method::POST, "/auth/signup", None, Some(signup)).await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "dave@example.com", "password": "s3cret" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["username"], "dave");

    // The login token opens the task routes
    let tasks = ctx.list_tasks(body["token"].as_str().unwrap()).await;
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn test_login_bad_credentials_look_alike() {
    let ctx = TestContext::new();
    let signup = json!({ "username": "erin", "email": "erin@example.com", "password": "right" });
    ctx.send(Method::POST, "/auth/signup", None, Some(signup)).await;

    let (wrong_pw_status, wrong_pw) = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "erin@example.com", "password": "wrong" })),
        )
        .await;
    let (unknown_status, unknown) = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "right" })),
        )
        .await;

    assert_eq!(wrong_pw_status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_pw["error"], "INVALID_CREDENTIALS");
    assert_eq!(wrong_pw, unknown);
}

#[tokio::test]
async fn test_task_routes_require_token() {
    let ctx = TestContext::new();
    let id = Uuid::new_v4();

    for (method, uri) in [
        (Method::GET, "/tasks".to_string()),
        (Method::POST, "/tasks".to_string()),
        (Method::PUT, format!("/tasks/{id}")),
        (Method::DELETE, format!("/tasks/{id}")),
    ] {
        let (status, body) = ctx
            .send(method.clone(), &uri, None, Some(json!({ "title": "t" })))
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"], "UNAUTHENTICATED_NO_TOKEN");
    }

    assert_eq!(ctx.tasks.calls(), 0);
}

#[tokio::test]
async fn test_garbage_token_never_reaches_store() {
    let ctx = TestContext::new();
    let id = Uuid::new_v4();

    for (method, uri) in [
        (Method::GET, "/tasks".to_string()),
        (Method::POST, "/tasks".to_string()),
        (Method::PUT, format!("/tasks/{id}")),
        (Method::DELETE, format!("/tasks/{id}")),
    ] {
        let (status, body) = ctx
            .send(method.clone(), &uri, Some("garbage"), Some(json!({ "title": "t" })))
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"], "UNAUTHENTICATED_INVALID_TOKEN");
    }

    assert_eq!(ctx.tasks.calls(), 0);
}

#[tokio::test]
async fn test_non_bearer_scheme_is_no_token() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .uri("/tasks")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let (status, body) = ctx.send_raw(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHENTICATED_NO_TOKEN");
}

#[tokio::test]
async fn test_expired_and_foreign_tokens_are_rejected() {
    let ctx = TestContext::new();
    let (_, user_id) = ctx.signup("frank").await;

    let expired = TokenCodec::new(TEST_SECRET, Duration::seconds(-5))
        .unwrap()
        .issue(user_id)
        .unwrap();
    let foreign = TokenCodec::with_default_ttl("some-other-secret-that-is-32-bytes-long")
        .unwrap()
        .issue(user_id)
        .unwrap();

    for token in [expired, foreign] {
        let (status, body) = ctx.send(Method::GET, "/tasks", Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHENTICATED_INVALID_TOKEN");
    }

    assert_eq!(ctx.tasks.calls(), 0);
}

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
    assert!(body["version"].is_string());
}
