//! Registration, login, refresh and bearer-auth behaviour through the real router

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::spawn().await;
    let (user_id, access, refresh) = app.register("alice@x.com", "Alice").await;
    assert!(!refresh.is_empty());

    let me = app.get("/api/auth/me", &access).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["id"], user_id.as_str());
    assert_eq!(me.body["user"]["email"], "alice@x.com");
    assert_eq!(me.body["user"]["role"], "MEMBER");
    assert!(me.body["user"].get("passwordHash").is_none());
    assert!(me.body["user"].get("password_hash").is_none());

    let login = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@x.com", "password": "password123" })),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["user"]["id"], user_id.as_str());
    assert!(login.body["accessToken"].is_string());
    assert!(login.body["refreshToken"].is_string());
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let app = TestApp::spawn().await;
    app.register("alice@x.com", "Alice").await;

    let wrong = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@x.com", "password": "wrong-password" })),
        )
        .await;
    let unknown = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@x.com", "password": "password123" })),
        )
        .await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.code(), Some("INVALID_CREDENTIALS"));
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, unknown.body);
}

#[tokio::test]
async fn test_duplicate_registration() {
    let app = TestApp::spawn().await;
    app.register("alice@x.com", "Alice").await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "alice@x.com", "name": "Other", "password": "pw" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), Some("EMAIL_EXISTS"));
}

#[tokio::test]
async fn test_missing_fields() {
    let app = TestApp::spawn().await;

    let register = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "alice@x.com", "password": "pw" })),
        )
        .await;
    assert_eq!(register.status, StatusCode::BAD_REQUEST);
    assert_eq!(register.body["error"], "Email, name, and password are required");

    let login = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@x.com" })),
        )
        .await;
    assert_eq!(login.status, StatusCode::BAD_REQUEST);
    assert_eq!(login.body["error"], "Email and password are required");

    let refresh = app
        .request(Method::POST, "/api/auth/refresh", None, Some(json!({})))
        .await;
    assert_eq!(refresh.status, StatusCode::BAD_REQUEST);
    assert_eq!(refresh.body["error"], "Refresh token is required");
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!("not an object")),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_refresh_issues_working_access_token() {
    let app = TestApp::spawn().await;
    let (user_id, _, refresh) = app.register("alice@x.com", "Alice").await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refreshToken": refresh })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let access = response.body["accessToken"].as_str().unwrap();
    let me = app.get("/api/auth/me", access).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["id"], user_id.as_str());
}

#[tokio::test]
async fn test_token_families_are_not_interchangeable() {
    let app = TestApp::spawn().await;
    let (_, access, refresh) = app.register("alice@x.com", "Alice").await;

    // Access token presented as a refresh token
    let response = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refreshToken": access })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), Some("INVALID_REFRESH_TOKEN"));

    // Refresh token presented as a bearer token
    let response = app.get("/api/auth/me", &refresh).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), Some("INVALID_TOKEN"));
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let app = TestApp::spawn().await;

    let response = app.request(Method::GET, "/api/teams", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), Some("MISSING_AUTH"));

    let response = app.get("/api/teams", "garbage").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), Some("INVALID_TOKEN"));
}

#[tokio::test]
async fn test_logout() {
    let app = TestApp::spawn().await;
    let (_, access, _) = app.register("alice@x.com", "Alice").await;

    let response = app
        .request(Method::POST, "/api/auth/logout", Some(&access), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Logged out successfully");
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let app = TestApp::spawn().await;

    let health = app.request(Method::GET, "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "OK");
    assert_eq!(health.body["message"], "TaskFlow Lite API is running");

    let missing = app.request(Method::GET, "/api/nope", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "Not found - /api/nope");
    assert_eq!(missing.code(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::spawn().await;

    let response = app
        .request(Method::GET, "/api/openapi.json", None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["info"]["title"], "TaskFlow Lite API");
    assert!(response.body["paths"]["/api/teams"].is_object());
}
