//! Read access to the activity log

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;
use taskflow_db::entities::{activity_log, task, ActivityLog, Task as TaskEntity};
use uuid::Uuid;

use super::{user_summaries, MembershipGuard};
use crate::error::ApiError;
use crate::models::{Activity, TaskSummary};

/// Most records returned by a team feed
pub const TEAM_FEED_LIMIT: u64 = 100;

pub struct ActivityService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ActivityService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// The 100 most recent records for a team, newest first, with actor and task title
    pub async fn get_team_activities(
        &self,
        team_id: Uuid,
        caller_id: Uuid,
    ) -> Result<Vec<Activity>, ApiError> {
        MembershipGuard::new(self.db)
            .require_membership(team_id, caller_id)
            .await?;

        let records = ActivityLog::find()
            .filter(activity_log::Column::TeamId.eq(team_id))
            .order_by_desc(activity_log::Column::CreatedAt)
            .limit(TEAM_FEED_LIMIT)
            .all(self.db)
            .await?;

        let task_ids: Vec<Uuid> = records.iter().filter_map(|r| r.task_id).collect();
        let tasks: HashMap<Uuid, TaskSummary> = if task_ids.is_empty() {
            HashMap::new()
        } else {
            TaskEntity::find()
                .filter(task::Column::Id.is_in(task_ids))
                .all(self.db)
                .await?
                .into_iter()
                .map(|t| {
                    (
                        t.id,
                        TaskSummary {
                            id: t.id,
                            title: t.title,
                        },
                    )
                })
                .collect()
        };

        let mut activities = self.with_users(records).await?;
        for activity in &mut activities {
            activity.task = activity.task_id.and_then(|id| tasks.get(&id).cloned());
        }

        Ok(activities)
    }

    /// Complete history of one task, newest first, with actor
    pub async fn get_task_activities(
        &self,
        task_id: Uuid,
        caller_id: Uuid,
    ) -> Result<Vec<Activity>, ApiError> {
        let task = TaskEntity::find_by_id(task_id)
            .one(self.db)
            .await?
            .ok_or(ApiError::TaskNotFound)?;

        MembershipGuard::new(self.db)
            .require_membership(task.team_id, caller_id)
            .await?;

        let records = ActivityLog::find()
            .filter(activity_log::Column::TaskId.eq(task_id))
            .order_by_desc(activity_log::Column::CreatedAt)
            .all(self.db)
            .await?;

        self.with_users(records).await
    }

    async fn with_users(
        &self,
        records: Vec<activity_log::Model>,
    ) -> Result<Vec<Activity>, ApiError> {
        let users = user_summaries(self.db, records.iter().map(|r| r.user_id)).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let user = users.get(&record.user_id).cloned();
                Activity {
                    user,
                    ..Activity::from(record)
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateTaskRequest, UpdateTaskRequest};
    use crate::services::TaskService;
    use crate::test_support::{create_team, create_user, setup_db};
    use taskflow_db::entities::prelude::TaskStatus;

    #[tokio::test]
    async fn test_team_feed_includes_user_and_task() {
        let db = setup_db().await;
        let alice = create_user(&db, "alice@x.com").await;
        let team = create_team(&db, "core", alice.id).await;
        let tasks = TaskService::new(&db);

        let task = tasks
            .create_task(
                team.id,
                alice.id,
                CreateTaskRequest {
                    title: Some("Docs".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        tasks
            .update_task(
                task.id,
                alice.id,
                UpdateTaskRequest {
                    status: Some(TaskStatus::Done),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let feed = ActivityService::new(&db)
            .get_team_activities(team.id, alice.id)
            .await
            .unwrap();

        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].action, activity_log::STATUS_CHANGED);
        assert_eq!(feed[0].details["newStatus"], "DONE");
        assert_eq!(feed[0].user.as_ref().unwrap().email, "alice@x.com");
        assert_eq!(feed[0].task.as_ref().unwrap().title, "Docs");
    }

    #[tokio::test]
    async fn test_team_feed_is_capped() {
        let db = setup_db().await;
        let alice = create_user(&db, "alice@x.com").await;
        let team = create_team(&db, "core", alice.id).await;
        let tasks = TaskService::new(&db);

        for i in 0..105 {
            tasks
                .create_task(
                    team.id,
                    alice.id,
                    CreateTaskRequest {
                        title: Some(format!("Task {}", i)),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let feed = ActivityService::new(&db)
            .get_team_activities(team.id, alice.id)
            .await
            .unwrap();
        assert_eq!(feed.len(), TEAM_FEED_LIMIT as usize);
        assert_eq!(feed[0].details["title"], "Task 104");
    }

    #[tokio::test]
    async fn test_feeds_require_membership() {
        let db = setup_db().await;
        let alice = create_user(&db, "alice@x.com").await;
        let bob = create_user(&db, "bob@x.com").await;
        let team = create_team(&db, "core", alice.id).await;
        let task = TaskService::new(&db)
            .create_task(
                team.id,
                alice.id,
                CreateTaskRequest {
                    title: Some("Private".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let service = ActivityService::new(&db);

        assert!(matches!(
            service.get_team_activities(team.id, bob.id).await,
            Err(ApiError::NotMember)
        ));
        assert!(matches!(
            service.get_task_activities(task.id, bob.id).await,
            Err(ApiError::NotMember)
        ));
        assert!(matches!(
            service.get_task_activities(Uuid::new_v4(), alice.id).await,
            Err(ApiError::TaskNotFound)
        ));

        let history = service.get_task_activities(task.id, alice.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].task.is_none());
    }
}
