//! Account endpoints: register, login, refresh, current user, logout

use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::models::{
    AuthResponse, ErrorResponse, LoginRequest, MessageResponse, RefreshRequest, RefreshResponse,
    RegisterRequest, User, UserResponse,
};
use crate::services::CredentialService;
use crate::AppState;

/// Treat empty strings the same as absent fields
fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

fn issue_session(state: &AppState, user: User) -> Result<AuthResponse, ApiError> {
    let access_token = state
        .tokens
        .issue_access(user.id, &user.email, user.role.as_str())?;
    let refresh_token = state.tokens.issue_refresh(user.id)?;

    Ok(AuthResponse {
        user,
        access_token,
        refresh_token,
    })
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields or email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (Some(email), Some(name), Some(password)) =
        (present(req.email), present(req.name), present(req.password))
    else {
        return Err(ApiError::validation("Email, name, and password are required"));
    };

    let user = CredentialService::new(&state.db, state.hash_rounds)
        .register(&email, &name, &password)
        .await?;

    let session = issue_session(&state, user.into())?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (Some(email), Some(password)) = (present(req.email), present(req.password)) else {
        return Err(ApiError::validation("Email and password are required"));
    };

    let user = CredentialService::new(&state.db, state.hash_rounds)
        .login(&email, &password)
        .await?;

    Ok(Json(issue_session(&state, user.into())?))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 400, description = "Missing refresh token", body = ErrorResponse),
        (status = 401, description = "Invalid refresh token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let Some(refresh_token) = present(req.refresh_token) else {
        return Err(ApiError::validation("Refresh token is required"));
    };

    let claims = state.tokens.verify_refresh(&refresh_token).map_err(|e| {
        debug!("Rejected refresh token: {}", e);
        ApiError::unauthorized("Invalid refresh token", "INVALID_REFRESH_TOKEN")
    })?;

    let user = CredentialService::new(&state.db, state.hash_rounds)
        .get_user_by_id(claims.sub)
        .await?;

    let access_token = state
        .tokens
        .issue_access(user.id, &user.email, user.role.as_str())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = CredentialService::new(&state.db, state.hash_rounds)
        .get_user_by_id(auth_user.id)
        .await?;

    Ok(Json(UserResponse { user: user.into() }))
}

/// Log out
///
/// Tokens are stateless; the client discards them.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(Extension(auth_user): Extension<AuthUser>) -> Json<MessageResponse> {
    debug!("User {} logged out", auth_user.id);

    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}
