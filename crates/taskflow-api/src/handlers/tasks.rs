//! Task endpoints, nested under a team
//!
//! Single-task routes carry the team segment for symmetry only. It is not parsed (clients
//! send `-` when they do not know it); the task row decides which team's membership is
//! checked.

use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, TeamPath};
use crate::middleware::AuthUser;
use crate::models::{
    CreateTaskRequest, ErrorResponse, MessageResponse, TaskPage, TaskQuery, TaskResponse,
    UpdateTaskRequest,
};
use crate::pagination::Pagination;
use crate::services::{TaskFilters, TaskService};
use crate::AppState;

/// Create a task in the team
#[utoipa::path(
    post,
    path = "/api/teams/{team_id}/tasks",
    params(
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Missing title, bad due date or assignee outside the team", body = ErrorResponse),
        (status = 403, description = "Caller is not a member", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    TeamPath(team_id): TeamPath,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let task = TaskService::new(&state.db)
        .create_task(team_id, auth_user.id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(TaskResponse { task })))
}

/// List the team's tasks, newest first
#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/tasks",
    params(
        ("team_id" = Uuid, Path, description = "Team ID"),
        ("status" = Option<String>, Query, description = "TODO, IN_PROGRESS or DONE"),
        ("assignedToId" = Option<Uuid>, Query, description = "Assignee user ID"),
        ("priority" = Option<String>, Query, description = "LOW, MEDIUM, HIGH or URGENT"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Page size (default: 10, max: 100)")
    ),
    responses(
        (status = 200, description = "One page of tasks", body = TaskPage),
        (status = 403, description = "Caller is not a member", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    TeamPath(team_id): TeamPath,
    ApiQuery(query): ApiQuery<TaskQuery>,
) -> Result<Json<TaskPage>, ApiError> {
    let pagination = Pagination::from_query(query.page.as_deref(), query.limit.as_deref());
    let filters = TaskFilters {
        status: query.status,
        assigned_to_id: query.assigned_to_id,
        priority: query.priority,
    };

    let page = TaskService::new(&state.db)
        .get_team_tasks(team_id, auth_user.id, filters, pagination)
        .await?;

    Ok(Json(page))
}

/// Get a task with its activity history
#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/tasks/{task_id}",
    params(
        ("team_id" = String, Path, description = "Team ID (not checked; `-` is accepted)"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task details", body = TaskResponse),
        (status = 403, description = "Caller is not a member", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((_team, task_id)): ApiPath<(String, Uuid)>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = TaskService::new(&state.db)
        .get_task_by_id(task_id, auth_user.id)
        .await?;

    Ok(Json(TaskResponse { task }))
}

/// Partially update a task
#[utoipa::path(
    put,
    path = "/api/teams/{team_id}/tasks/{task_id}",
    params(
        ("team_id" = String, Path, description = "Team ID (not checked; `-` is accepted)"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 400, description = "Bad due date or assignee outside the team", body = ErrorResponse),
        (status = 403, description = "Caller is not a member", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((_team, task_id)): ApiPath<(String, Uuid)>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = TaskService::new(&state.db)
        .update_task(task_id, auth_user.id, req)
        .await?;

    Ok(Json(TaskResponse { task }))
}

/// Delete a task (creator or team leader)
#[utoipa::path(
    delete,
    path = "/api/teams/{team_id}/tasks/{task_id}",
    params(
        ("team_id" = String, Path, description = "Team ID (not checked; `-` is accepted)"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 403, description = "Caller may not delete this task", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((_team, task_id)): ApiPath<(String, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    TaskService::new(&state.db)
        .delete_task(task_id, auth_user.id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}
