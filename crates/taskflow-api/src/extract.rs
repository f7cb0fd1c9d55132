//! Request extractors that reject with `ApiError` (`VALIDATION_ERROR` unless noted)

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::error::ApiError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Team id from a `/api/teams/{team_id}/...` route
///
/// A segment that is not a UUID names no team, so the caller cannot be a member of it:
/// the request is rejected with `NOT_MEMBER` like any unknown team id.
#[derive(Debug, Clone, Copy)]
pub struct TeamPath(pub Uuid);

impl<S> FromRequestParts<S> for TeamPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ApiPath(raw) = ApiPath::<String>::from_request_parts(parts, state).await?;

        Uuid::parse_str(&raw)
            .map(TeamPath)
            .map_err(|_| ApiError::NotMember)
    }
}
