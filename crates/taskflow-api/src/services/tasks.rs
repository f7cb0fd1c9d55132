//! Task lifecycle: creation, listing, partial updates and deletion
//!
//! Writes that change task state append to the activity log inside the same transaction.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use taskflow_db::entities::{
    activity_log,
    prelude::{TaskPriority, TaskStatus},
    task, ActivityLog, Task as TaskEntity,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::{user_summaries, MembershipGuard};
use crate::error::ApiError;
use crate::models::{Activity, CreateTaskRequest, Task, TaskPage, UpdateTaskRequest};
use crate::pagination::Pagination;

/// Equality filters for task listings; all present filters must match
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub assigned_to_id: Option<Uuid>,
    pub priority: Option<TaskPriority>,
}

/// Parse a due date given as RFC 3339 or as a bare `YYYY-MM-DD` (midnight UTC)
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| ApiError::validation(format!("Invalid due date '{}'", raw)))
}

pub struct TaskService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TaskService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a task in `team_id`; new tasks always start as `TODO`
    pub async fn create_task(
        &self,
        team_id: Uuid,
        caller_id: Uuid,
        request: CreateTaskRequest,
    ) -> Result<Task, ApiError> {
        let title = request
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::validation("Task title is required"))?;

        let guard = MembershipGuard::new(self.db);
        guard.require_membership(team_id, caller_id).await?;

        if let Some(assignee_id) = request.assigned_to_id {
            if guard.find(team_id, assignee_id).await?.is_none() {
                return Err(ApiError::InvalidAssignee);
            }
        }

        let due_date = request.due_date.as_deref().map(parse_due_date).transpose()?;
        let priority = request.priority.unwrap_or_default();
        let now = Utc::now();

        let txn = self.db.begin().await?;

        let created = task::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            description: Set(request.description),
            status: Set(TaskStatus::Todo),
            priority: Set(priority),
            due_date: Set(due_date),
            team_id: Set(team_id),
            created_by_id: Set(caller_id),
            assigned_to_id: Set(request.assigned_to_id),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        record_activity(
            &txn,
            activity_log::TASK_CREATED,
            json!({ "title": created.title, "priority": created.priority.as_str() }),
            caller_id,
            &created,
        )
        .await?;

        txn.commit().await?;

        info!("Task {} created in team {} by {}", created.id, team_id, caller_id);

        expand(self.db, created).await
    }

    /// Newest-first page of a team's tasks
    pub async fn get_team_tasks(
        &self,
        team_id: Uuid,
        caller_id: Uuid,
        filters: TaskFilters,
        pagination: Pagination,
    ) -> Result<TaskPage, ApiError> {
        MembershipGuard::new(self.db)
            .require_membership(team_id, caller_id)
            .await?;

        let mut condition = Condition::all().add(task::Column::TeamId.eq(team_id));
        if let Some(status) = filters.status {
            condition = condition.add(task::Column::Status.eq(status));
        }
        if let Some(assignee) = filters.assigned_to_id {
            condition = condition.add(task::Column::AssignedToId.eq(assignee));
        }
        if let Some(priority) = filters.priority {
            condition = condition.add(task::Column::Priority.eq(priority));
        }

        let total = TaskEntity::find()
            .filter(condition.clone())
            .count(self.db)
            .await?;

        let rows = TaskEntity::find()
            .filter(condition)
            .order_by_desc(task::Column::CreatedAt)
            .offset(pagination.offset())
            .limit(pagination.limit)
            .all(self.db)
            .await?;

        debug!(
            "Listing tasks for team {}: {} of {} (page {})",
            team_id,
            rows.len(),
            total,
            pagination.page
        );

        Ok(TaskPage {
            data: expand_all(self.db, rows).await?,
            total,
            page: pagination.page,
            limit: pagination.limit,
            pages: pagination.pages(total),
        })
    }

    /// Task with creator, assignee and full activity history
    pub async fn get_task_by_id(&self, task_id: Uuid, caller_id: Uuid) -> Result<Task, ApiError> {
        let model = self.find_task(task_id).await?;

        MembershipGuard::new(self.db)
            .require_membership(model.team_id, caller_id)
            .await?;

        let activities: Vec<Activity> = model
            .find_related(ActivityLog)
            .order_by_desc(activity_log::Column::CreatedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(Activity::from)
            .collect();

        let mut task = expand(self.db, model).await?;
        task.activities = Some(activities);

        Ok(task)
    }

    /// Merge `request` into the task
    ///
    /// Omitted fields keep their value. `completedAt` is stamped with the current time
    /// whenever the resulting status is `DONE` and cleared otherwise, even if the status
    /// did not change. A `status_changed` record is written only when it did.
    pub async fn update_task(
        &self,
        task_id: Uuid,
        caller_id: Uuid,
        request: UpdateTaskRequest,
    ) -> Result<Task, ApiError> {
        let current = self.find_task(task_id).await?;

        let guard = MembershipGuard::new(self.db);
        guard.require_membership(current.team_id, caller_id).await?;

        if let Some(assignee_id) = request.assigned_to_id {
            if guard.find(current.team_id, assignee_id).await?.is_none() {
                return Err(ApiError::InvalidAssignee);
            }
        }

        let due_date = request.due_date.as_deref().map(parse_due_date).transpose()?;

        let old_status = current.status;
        let new_status = request.status.unwrap_or(old_status);
        let now = Utc::now();

        let mut active: task::ActiveModel = current.clone().into();
        if let Some(title) = request.title {
            active.title = Set(title);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(priority) = request.priority {
            active.priority = Set(priority);
        }
        if let Some(due) = due_date {
            active.due_date = Set(Some(due));
        }
        if let Some(assignee_id) = request.assigned_to_id {
            active.assigned_to_id = Set(Some(assignee_id));
        }
        active.status = Set(new_status);
        active.completed_at = Set((new_status == TaskStatus::Done).then_some(now));
        active.updated_at = Set(now);

        let txn = self.db.begin().await?;
        let updated = active.update(&txn).await?;

        if old_status != new_status {
            record_activity(
                &txn,
                activity_log::STATUS_CHANGED,
                json!({ "oldStatus": old_status.as_str(), "newStatus": new_status.as_str() }),
                caller_id,
                &updated,
            )
            .await?;
            info!("Task {} moved {} -> {}", task_id, old_status, new_status);
        }

        txn.commit().await?;

        expand(self.db, updated).await
    }

    /// Delete a task; only its creator or a team leader may do this
    pub async fn delete_task(&self, task_id: Uuid, caller_id: Uuid) -> Result<(), ApiError> {
        let model = self.find_task(task_id).await?;

        let membership = MembershipGuard::new(self.db)
            .require_membership(model.team_id, caller_id)
            .await?;

        if model.created_by_id != caller_id && !membership.is_leader() {
            return Err(ApiError::forbidden(
                "Only creator or team leader can delete task",
            ));
        }

        model.delete(self.db).await?;
        info!("Task {} deleted by {}", task_id, caller_id);

        Ok(())
    }

    async fn find_task(&self, task_id: Uuid) -> Result<task::Model, ApiError> {
        TaskEntity::find_by_id(task_id)
            .one(self.db)
            .await?
            .ok_or(ApiError::TaskNotFound)
    }
}

async fn record_activity<C: ConnectionTrait>(
    db: &C,
    action: &str,
    details: serde_json::Value,
    user_id: Uuid,
    task: &task::Model,
) -> Result<activity_log::Model, ApiError> {
    Ok(activity_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        action: Set(action.to_string()),
        details: Set(details.to_string()),
        user_id: Set(user_id),
        task_id: Set(Some(task.id)),
        team_id: Set(task.team_id),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?)
}

/// Attach creator and assignee projections
pub(crate) async fn expand_all<C: ConnectionTrait>(
    db: &C,
    tasks: Vec<task::Model>,
) -> Result<Vec<Task>, ApiError> {
    let ids = tasks
        .iter()
        .flat_map(|t| std::iter::once(t.created_by_id).chain(t.assigned_to_id));
    let users = user_summaries(db, ids).await?;

    Ok(tasks
        .into_iter()
        .map(|t| {
            let created_by = users.get(&t.created_by_id).cloned();
            let assigned_to = t.assigned_to_id.and_then(|id| users.get(&id).cloned());
            Task::from_model(t, created_by, assigned_to)
        })
        .collect())
}

async fn expand<C: ConnectionTrait>(db: &C, task: task::Model) -> Result<Task, ApiError> {
    expand_all(db, vec![task])
        .await?
        .pop()
        .ok_or_else(|| ApiError::Internal("Task expansion returned nothing".to_string()))
}
