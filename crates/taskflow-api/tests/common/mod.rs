//! Shared harness for router-level tests
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::{json, Value};
use taskflow_api::{ApiServer, ApiServerConfig};
use taskflow_auth::TokenConfig;
use tower::ServiceExt; // For oneshot()

pub struct TestApp {
    pub router: Router,
}

pub struct Response {
    pub status: StatusCode,
    pub body: Value,
}

impl Response {
    pub fn code(&self) -> Option<&str> {
        self.body["code"].as_str()
    }
}

pub fn test_config() -> ApiServerConfig {
    ApiServerConfig {
        cors_origin: "http://localhost:5173".to_string(),
        tokens: TokenConfig {
            access_secret: "access-test-secret".to_string(),
            access_ttl: Duration::hours(1),
            refresh_secret: "refresh-test-secret".to_string(),
            refresh_ttl: Duration::days(7),
        },
        hash_rounds: 1,
        ..Default::default()
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db = taskflow_db::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        taskflow_db::migrate(&db)
            .await
            .expect("Failed to run migrations");

        let server = ApiServer::new(test_config(), db).expect("Failed to build server");

        Self {
            router: server.build_router(),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        Response { status, body }
    }

    pub async fn get(&self, uri: &str, token: &str) -> Response {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Response {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Response {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Register an account and return (user id, access token, refresh token)
    pub async fn register(&self, email: &str, name: &str) -> (String, String, String) {
        let response = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "name": name, "password": "password123" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        (
            response.body["user"]["id"].as_str().unwrap().to_string(),
            response.body["accessToken"].as_str().unwrap().to_string(),
            response.body["refreshToken"].as_str().unwrap().to_string(),
        )
    }

    /// Create a team and return its id
    pub async fn create_team(&self, token: &str, name: &str) -> String {
        let response = self.post("/api/teams", token, json!({ "name": name })).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["team"]["id"].as_str().unwrap().to_string()
    }

    pub async fn add_member(&self, token: &str, team_id: &str, user_id: &str) {
        let response = self
            .post(
                &format!("/api/teams/{}/members", team_id),
                token,
                json!({ "userId": user_id }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    }

    /// Create a task and return it
    pub async fn create_task(&self, token: &str, team_id: &str, body: Value) -> Value {
        let response = self
            .post(&format!("/api/teams/{}/tasks", team_id), token, body)
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["task"].clone()
    }
}
