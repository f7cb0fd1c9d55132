//! Bearer-token authentication for protected endpoints
//!
//! Reads `Authorization: Bearer <token>`, verifies it as an access token and makes the
//! caller available to handlers through Axum's `Extension`.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskflow_auth::TokenIssuer;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

/// Caller identity taken from a verified access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    /// System role at issue time (`MEMBER` or `ADMIN`)
    pub role: String,
}

/// Reject the request with 401 unless it carries a valid access token
///
/// # Errors
/// - `MISSING_AUTH` when there is no `Authorization` header
/// - `INVALID_AUTH_FORMAT` when the header is not `Bearer <token>`
/// - `INVALID_TOKEN` when the signature is wrong, the token expired, or it is a refresh token
pub async fn require_auth(
    State(tokens): State<Arc<TokenIssuer>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("No token provided", "MISSING_AUTH"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ApiError::unauthorized(
                "Invalid Authorization header format. Expected 'Bearer <token>'",
                "INVALID_AUTH_FORMAT",
            )
        })?;

    let claims = tokens.verify_access(token).map_err(|e| {
        debug!("Rejected access token: {}", e);
        ApiError::unauthorized("Invalid or expired token", "INVALID_TOKEN")
    })?;

    request.extensions_mut().insert(AuthUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorResponse;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Extension, Json, Router};
    use chrono::Duration;
    use taskflow_auth::{AccessClaims, JwtValidator, TokenConfig};
    use tower::ServiceExt; // For oneshot()

    async fn protected_handler(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
        Json(user)
    }

    fn test_tokens() -> Arc<TokenIssuer> {
        Arc::new(TokenIssuer::new(TokenConfig {
            access_secret: "access-test".to_string(),
            access_ttl: Duration::hours(1),
            refresh_secret: "refresh-test".to_string(),
            refresh_ttl: Duration::days(7),
        }))
    }

    fn create_test_app(tokens: Arc<TokenIssuer>) -> Router {
        Router::new()
            .route("/protected", get(protected_handler))
            .layer(middleware::from_fn_with_state(tokens, require_auth))
    }

    async fn call(app: Router, auth: Option<String>) -> (StatusCode, Vec<u8>) {
        let mut builder = axum::http::Request::builder().uri("/protected");
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn error_code(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ErrorResponse>(body).unwrap().code
    }

    #[tokio::test]
    async fn test_valid_access_token() {
        let tokens = test_tokens();
        let user_id = Uuid::new_v4();
        let token = tokens
            .issue_access(user_id, "alice@x.com", "MEMBER")
            .unwrap();

        let (status, body) = call(create_test_app(tokens), Some(format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        let user: AuthUser = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            user,
            AuthUser {
                id: user_id,
                email: "alice@x.com".to_string(),
                role: "MEMBER".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let (status, body) = call(create_test_app(test_tokens()), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&body).as_deref(), Some("MISSING_AUTH"));
    }

    #[tokio::test]
    async fn test_wrong_scheme() {
        let (status, body) = call(
            create_test_app(test_tokens()),
            Some("Basic dXNlcjpwYXNz".to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&body).as_deref(), Some("INVALID_AUTH_FORMAT"));
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let tokens = test_tokens();
        let refresh = tokens.issue_refresh(Uuid::new_v4()).unwrap();

        let (status, body) = call(create_test_app(tokens), Some(format!("Bearer {}", refresh))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&body).as_deref(), Some("INVALID_TOKEN"));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let claims = AccessClaims::new(
            Uuid::new_v4(),
            "alice@x.com".to_string(),
            "MEMBER".to_string(),
            Duration::seconds(-60),
        )
        .unwrap();
        let token = JwtValidator::encode(b"access-test", &claims).unwrap();

        let (status, body) = call(
            create_test_app(test_tokens()),
            Some(format!("Bearer {}", token)),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&body).as_deref(), Some("INVALID_TOKEN"));
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let (status, body) = call(
            create_test_app(test_tokens()),
            Some("Bearer not.a.jwt".to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&body).as_deref(), Some("INVALID_TOKEN"));
    }
}
