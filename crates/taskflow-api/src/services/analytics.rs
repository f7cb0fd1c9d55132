//! Read-only aggregations over a team's tasks
//!
//! Everything is computed from the task table at call time.

use chrono::Utc;
use futures::try_join;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use std::collections::HashMap;
use taskflow_db::entities::{prelude::TaskStatus, task, team_member, Task as TaskEntity, TeamMember};
use uuid::Uuid;

use super::{tasks::expand_all, user_summaries, MembershipGuard};
use crate::error::ApiError;
use crate::models::{Overview, Task, UserTaskStats};

/// `round(completed / total * 100)`, 0 for an empty team
pub fn completion_rate(completed: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (completed * 200 + total) / (total * 2)
}

fn overdue_condition(team_id: Uuid) -> Condition {
    Condition::all()
        .add(task::Column::TeamId.eq(team_id))
        .add(task::Column::Status.ne(TaskStatus::Done))
        .add(task::Column::DueDate.is_not_null())
        .add(task::Column::DueDate.lt(Utc::now()))
}

pub struct AnalyticsService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AnalyticsService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_overview(&self, team_id: Uuid, caller_id: Uuid) -> Result<Overview, ApiError> {
        MembershipGuard::new(self.db)
            .require_membership(team_id, caller_id)
            .await?;

        let in_team = || TaskEntity::find().filter(task::Column::TeamId.eq(team_id));
        let with_status =
            |status: TaskStatus| in_team().filter(task::Column::Status.eq(status));

        let (total, completed, in_progress, todo, overdue) = try_join!(
            in_team().count(self.db),
            with_status(TaskStatus::Done).count(self.db),
            with_status(TaskStatus::InProgress).count(self.db),
            with_status(TaskStatus::Todo).count(self.db),
            TaskEntity::find()
                .filter(overdue_condition(team_id))
                .count(self.db),
        )?;

        Ok(Overview {
            total_tasks: total,
            completed_tasks: completed,
            in_progress_tasks: in_progress,
            todo_tasks: todo,
            overdue_tasks: overdue,
            completion_rate: completion_rate(completed, total),
        })
    }

    /// Assignment counts for every member, including members with no tasks
    pub async fn get_tasks_per_user(
        &self,
        team_id: Uuid,
        caller_id: Uuid,
    ) -> Result<Vec<UserTaskStats>, ApiError> {
        MembershipGuard::new(self.db)
            .require_membership(team_id, caller_id)
            .await?;

        let members = TeamMember::find()
            .filter(team_member::Column::TeamId.eq(team_id))
            .order_by_asc(team_member::Column::JoinedAt)
            .all(self.db)
            .await?;
        let users = user_summaries(self.db, members.iter().map(|m| m.user_id)).await?;

        let assignments: Vec<(Option<Uuid>, TaskStatus)> = TaskEntity::find()
            .select_only()
            .column(task::Column::AssignedToId)
            .column(task::Column::Status)
            .filter(task::Column::TeamId.eq(team_id))
            .filter(task::Column::AssignedToId.is_not_null())
            .into_tuple()
            .all(self.db)
            .await?;

        let mut counts: HashMap<Uuid, [u64; 3]> = HashMap::new();
        for (assignee, status) in assignments {
            let Some(assignee) = assignee else { continue };
            let slot = match status {
                TaskStatus::Done => 0,
                TaskStatus::InProgress => 1,
                TaskStatus::Todo => 2,
            };
            counts.entry(assignee).or_default()[slot] += 1;
        }

        Ok(members
            .into_iter()
            .filter_map(|m| users.get(&m.user_id))
            .map(|user| {
                let [completed, in_progress, todo] =
                    counts.get(&user.id).copied().unwrap_or_default();
                UserTaskStats {
                    user_id: user.id,
                    name: user.name.clone(),
                    email: user.email.clone(),
                    total: completed + in_progress + todo,
                    completed,
                    in_progress,
                    todo,
                }
            })
            .collect())
    }

    /// Tasks past their due date and not done, earliest due first
    pub async fn get_overdue_tasks(
        &self,
        team_id: Uuid,
        caller_id: Uuid,
    ) -> Result<Vec<Task>, ApiError> {
        MembershipGuard::new(self.db)
            .require_membership(team_id, caller_id)
            .await?;

        let rows = TaskEntity::find()
            .filter(overdue_condition(team_id))
            .order_by_asc(task::Column::DueDate)
            .all(self.db)
            .await?;

        expand_all(self.db, rows).await
    }
}
