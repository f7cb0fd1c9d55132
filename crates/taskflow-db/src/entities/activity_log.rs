//! Append-only audit trail of task events

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Action tag for a freshly created task
pub const TASK_CREATED: &str = "task_created";

/// Action tag for a status transition
pub const STATUS_CHANGED: &str = "status_changed";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Action tag, e.g. `task_created` or `status_changed`
    pub action: String,

    /// JSON-encoded details payload
    #[sea_orm(column_type = "Text")]
    pub details: String,

    /// Acting user
    pub user_id: Uuid,

    /// Task the record concerns; cleared if the task is deleted
    pub task_id: Option<Uuid>,

    pub team_id: Uuid,

    pub created_at: ChronoDateTimeUtc,
}

impl Model {
    /// Decoded details payload (`null` if the stored text is not valid JSON)
    pub fn details_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.details).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::task::Entity",
        from = "Column::TaskId",
        to = "super::task::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Task,

    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
