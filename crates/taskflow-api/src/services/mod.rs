//! Service layer
//!
//! Each service borrows the database connection for the duration of one request. Every
//! team-scoped operation goes through [`MembershipGuard`] before touching data.

pub mod activities;
pub mod analytics;
pub mod credentials;
pub mod membership;
pub mod tasks;
pub mod teams;

pub use activities::ActivityService;
pub use analytics::AnalyticsService;
pub use credentials::CredentialService;
pub use membership::MembershipGuard;
pub use tasks::{parse_due_date, TaskFilters, TaskService};
pub use teams::{slugify, TeamService};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use std::collections::HashMap;
use taskflow_db::entities::{user, User};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::UserSummary;

/// Load id/name/email projections for a set of users
pub(crate) async fn user_summaries<C, I>(
    db: &C,
    ids: I,
) -> Result<HashMap<Uuid, UserSummary>, ApiError>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = Uuid>,
{
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = User::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(users
        .into_iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect())
}
