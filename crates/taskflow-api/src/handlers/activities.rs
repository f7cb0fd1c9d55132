//! Activity feed endpoints

use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ApiPath, TeamPath};
use crate::middleware::AuthUser;
use crate::models::{ActivityList, ErrorResponse};
use crate::services::ActivityService;
use crate::AppState;

/// The team's 100 most recent activity records
#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/activities/team",
    params(
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Recent team activity, newest first", body = ActivityList),
        (status = 403, description = "Caller is not a member", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "activities"
)]
pub async fn team_activities(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    TeamPath(team_id): TeamPath,
) -> Result<Json<ActivityList>, ApiError> {
    let activities = ActivityService::new(&state.db)
        .get_team_activities(team_id, auth_user.id)
        .await?;

    Ok(Json(ActivityList { activities }))
}

/// Full history of one task
#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/activities/task/{task_id}",
    params(
        ("team_id" = String, Path, description = "Team ID (not checked; `-` is accepted)"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task activity, newest first", body = ActivityList),
        (status = 403, description = "Caller is not a member", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "activities"
)]
pub async fn task_activities(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((_team, task_id)): ApiPath<(String, Uuid)>,
) -> Result<Json<ActivityList>, ApiError> {
    let activities = ActivityService::new(&state.db)
        .get_task_activities(task_id, auth_user.id)
        .await?;

    Ok(Json(ActivityList { activities }))
}
