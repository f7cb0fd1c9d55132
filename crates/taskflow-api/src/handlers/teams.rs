//! Team endpoints

use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, TeamPath};
use crate::middleware::AuthUser;
use crate::models::{
    AddMemberRequest, CreateTeamRequest, ErrorResponse, MembershipResponse, TeamList,
    TeamResponse,
};
use crate::services::TeamService;
use crate::AppState;

/// Create a team; the caller becomes its leader
#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Missing name or slug already taken", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let Some(name) = req.name.filter(|n| !n.trim().is_empty()) else {
        return Err(ApiError::validation("Team name is required"));
    };

    let team = TeamService::new(&state.db)
        .create_team(auth_user.id, &name, req.description)
        .await?;

    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

/// List the caller's teams
#[utoipa::path(
    get,
    path = "/api/teams",
    responses(
        (status = 200, description = "Teams the caller belongs to", body = TeamList),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<TeamList>, ApiError> {
    let teams = TeamService::new(&state.db)
        .get_user_teams(auth_user.id)
        .await?;

    Ok(Json(TeamList { teams }))
}

/// Get one team with its members
#[utoipa::path(
    get,
    path = "/api/teams/{team_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team details", body = TeamResponse),
        (status = 403, description = "Caller is not a member", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(team_id): ApiPath<String>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team_id = Uuid::parse_str(&team_id).map_err(|_| ApiError::TeamNotFound)?;
    let team = TeamService::new(&state.db)
        .get_team_by_id(team_id, auth_user.id)
        .await?;

    Ok(Json(TeamResponse { team }))
}

/// Add a user to the team (leaders only)
#[utoipa::path(
    post,
    path = "/api/teams/{team_id}/members",
    params(
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MembershipResponse),
        (status = 400, description = "Missing user ID or already a member", body = ErrorResponse),
        (status = 403, description = "Caller is not a leader of the team", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    TeamPath(team_id): TeamPath,
    ApiJson(req): ApiJson<AddMemberRequest>,
) -> Result<(StatusCode, Json<MembershipResponse>), ApiError> {
    let Some(user_id) = req.user_id else {
        return Err(ApiError::validation("User ID is required"));
    };

    let membership = TeamService::new(&state.db)
        .add_team_member(team_id, auth_user.id, user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(MembershipResponse { membership })))
}
