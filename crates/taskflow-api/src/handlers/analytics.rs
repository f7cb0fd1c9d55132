//! Team analytics endpoints

use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::TeamPath;
use crate::middleware::AuthUser;
use crate::models::{ErrorResponse, OverdueTasks, Overview, TasksPerUser};
use crate::services::AnalyticsService;
use crate::AppState;

/// Task counts and completion rate
#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/analytics/overview",
    params(
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team overview", body = Overview),
        (status = 403, description = "Caller is not a member", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "analytics"
)]
pub async fn overview(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    TeamPath(team_id): TeamPath,
) -> Result<Json<Overview>, ApiError> {
    let overview = AnalyticsService::new(&state.db)
        .get_overview(team_id, auth_user.id)
        .await?;

    Ok(Json(overview))
}

/// Assignment counts per member
#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/analytics/tasks-per-user",
    params(
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Per-member task counts", body = TasksPerUser),
        (status = 403, description = "Caller is not a member", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "analytics"
)]
pub async fn tasks_per_user(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    TeamPath(team_id): TeamPath,
) -> Result<Json<TasksPerUser>, ApiError> {
    let stats = AnalyticsService::new(&state.db)
        .get_tasks_per_user(team_id, auth_user.id)
        .await?;

    Ok(Json(TasksPerUser { stats }))
}

/// Open tasks past their due date
#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/analytics/overdue",
    params(
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Overdue tasks, earliest due first", body = OverdueTasks),
        (status = 403, description = "Caller is not a member", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "analytics"
)]
pub async fn overdue(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    TeamPath(team_id): TeamPath,
) -> Result<Json<OverdueTasks>, ApiError> {
    let overdue_tasks = AnalyticsService::new(&state.db)
        .get_overdue_tasks(team_id, auth_user.id)
        .await?;

    Ok(Json(OverdueTasks { overdue_tasks }))
}
