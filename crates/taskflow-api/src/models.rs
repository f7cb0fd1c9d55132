use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskflow_db::entities::{
    activity_log,
    prelude::{TaskPriority, TaskStatus, TeamRole, UserRole},
    task, team_member, user,
};
use utoipa::ToSchema;
use uuid::Uuid;

// ============================================================================
// Common Models
// ============================================================================

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Plain confirmation message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Human-readable status line
    pub message: String,
    /// Service version
    pub version: String,
}

// ============================================================================
// Authentication Models
// ============================================================================

/// Public projection of a user (never includes the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// System role (MEMBER or ADMIN)
    #[schema(value_type = String, example = "MEMBER")]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role: model.role,
            created_at: model.created_at,
        }
    }
}

/// Minimal user reference embedded in teams, tasks and activities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<user::Model> for UserSummary {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

/// User registration request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Email address (must be unique)
    pub email: Option<String>,
    /// Display name
    pub name: Option<String>,
    pub password: Option<String>,
}

/// User login request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Register/login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    /// Short-lived access token (send as `Authorization: Bearer <token>`)
    pub access_token: String,
    /// Long-lived refresh token for `/api/auth/refresh`
    pub refresh_token: String,
}

/// Access token refresh request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Access token refresh response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Current user response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user: User,
}

// ============================================================================
// Team Models
// ============================================================================

/// Team creation request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    /// Team name; the slug is derived from it
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Team membership row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub team_id: Uuid,
    pub user_id: Uuid,
    /// Team role (LEADER or MEMBER)
    #[schema(value_type = String, example = "MEMBER")]
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
}

impl From<team_member::Model> for Membership {
    fn from(model: team_member::Model) -> Self {
        Self {
            team_id: model.team_id,
            user_id: model.user_id,
            role: model.role,
            joined_at: model.joined_at,
        }
    }
}

/// Team member with user details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub team_id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String, example = "LEADER")]
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
    pub user: UserSummary,
}

/// Team with its members and task count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    /// Unique URL-safe identifier derived from the name
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub members: Vec<TeamMember>,
    /// Number of tasks owned by the team
    pub task_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    pub team: Team,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamList {
    pub teams: Vec<Team>,
}

/// Add member request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembershipResponse {
    pub membership: Membership,
}

// ============================================================================
// Task Models
// ============================================================================

/// Task creation request
///
/// Any `status` sent by the caller is ignored; new tasks always start as `TODO`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Defaults to MEDIUM
    #[schema(value_type = Option<String>, example = "HIGH")]
    pub priority: Option<TaskPriority>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub due_date: Option<String>,
    /// Must be a member of the team
    pub assigned_to_id: Option<Uuid>,
}

/// Partial task update; omitted or null fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "IN_PROGRESS")]
    pub status: Option<TaskStatus>,
    #[schema(value_type = Option<String>, example = "URGENT")]
    pub priority: Option<TaskPriority>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub due_date: Option<String>,
    pub assigned_to_id: Option<Uuid>,
}

/// Query parameters for listing team tasks
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    #[schema(value_type = Option<String>)]
    pub status: Option<TaskStatus>,
    pub assigned_to_id: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub priority: Option<TaskPriority>,
    /// Page number (default: 1)
    pub page: Option<String>,
    /// Page size (default: 10, max: 100)
    pub limit: Option<String>,
}

/// Task with creator, assignee and (on detail reads) its activity history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "TODO")]
    pub status: TaskStatus,
    #[schema(value_type = String, example = "MEDIUM")]
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub team_id: Uuid,
    pub created_by_id: Uuid,
    pub assigned_to_id: Option<Uuid>,
    /// Set while the task is DONE
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<UserSummary>,
    pub assigned_to: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<Activity>>,
}

impl Task {
    pub fn from_model(
        model: task::Model,
        created_by: Option<UserSummary>,
        assigned_to: Option<UserSummary>,
    ) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status,
            priority: model.priority,
            due_date: model.due_date,
            team_id: model.team_id,
            created_by_id: model.created_by_id,
            assigned_to_id: model.assigned_to_id,
            completed_at: model.completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
            created_by,
            assigned_to,
            activities: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    pub task: Task,
}

/// One page of tasks
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskPage {
    pub data: Vec<Task>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    /// ceil(total / limit)
    pub pages: u64,
}

// ============================================================================
// Activity Models
// ============================================================================

/// Minimal task reference embedded in team activity feeds
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskSummary {
    pub id: Uuid,
    pub title: String,
}

/// Audit record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    /// `task_created` or `status_changed`
    pub action: String,
    /// Free-form payload, e.g. `{"oldStatus":"TODO","newStatus":"DONE"}`
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub user_id: Uuid,
    pub task_id: Option<Uuid>,
    pub team_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskSummary>,
}

impl From<activity_log::Model> for Activity {
    fn from(model: activity_log::Model) -> Self {
        let details = model.details_json();
        Self {
            id: model.id,
            action: model.action,
            details,
            user_id: model.user_id,
            task_id: model.task_id,
            team_id: model.team_id,
            created_at: model.created_at,
            user: None,
            task: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityList {
    pub activities: Vec<Activity>,
}

// ============================================================================
// Analytics Models
// ============================================================================

/// Team task counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub in_progress_tasks: u64,
    pub todo_tasks: u64,
    pub overdue_tasks: u64,
    /// Percentage of completed tasks, rounded; 0 for an empty team
    pub completion_rate: u64,
}

/// Per-member assignment counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserTaskStats {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub total: u64,
    pub completed: u64,
    pub in_progress: u64,
    pub todo: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TasksPerUser {
    pub stats: Vec<UserTaskStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverdueTasks {
    pub overdue_tasks: Vec<Task>,
}
