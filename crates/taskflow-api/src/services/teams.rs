//! Team creation, listing and membership management

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use taskflow_db::entities::{
    prelude::TeamRole, task, team, team_member, Task, Team as TeamEntity, TeamMember, User,
};
use tracing::info;
use uuid::Uuid;

use super::{user_summaries, MembershipGuard};
use crate::error::ApiError;
use crate::models::{Membership, Team, TeamMember as TeamMemberView};

/// Longest slug we keep
pub const MAX_SLUG_LEN: usize = 50;

/// Derive the URL-safe slug for a team name
///
/// Lowercases, turns each whitespace run into a single `-`, drops everything that is not
/// an ASCII letter, digit, `_` or `-`, and keeps the first 50 characters.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            slug.push(c);
        }
    }

    slug.chars().take(MAX_SLUG_LEN).collect()
}

pub struct TeamService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TeamService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a team led by `user_id`
    ///
    /// The team row and the creator's `LEADER` membership are written in one transaction.
    pub async fn create_team(
        &self,
        user_id: Uuid,
        name: &str,
        description: Option<String>,
    ) -> Result<Team, ApiError> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(ApiError::validation(
                "Team name must contain at least one letter or digit",
            ));
        }

        let existing = TeamEntity::find()
            .filter(team::Column::Slug.eq(&slug))
            .one(self.db)
            .await?;
        if existing.is_some() {
            return Err(ApiError::TeamExists);
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let created = team::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            slug: Set(slug),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::TeamExists,
            _ => ApiError::Database(e),
        })?;

        team_member::ActiveModel {
            team_id: Set(created.id),
            user_id: Set(user_id),
            role: Set(TeamRole::Leader),
            joined_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!("Team {} ({}) created by {}", created.slug, created.id, user_id);

        let mut teams = hydrate(self.db, vec![created]).await?;
        teams
            .pop()
            .ok_or_else(|| ApiError::Internal("Created team vanished".to_string()))
    }

    /// Every team the user belongs to, oldest first
    pub async fn get_user_teams(&self, user_id: Uuid) -> Result<Vec<Team>, ApiError> {
        let team_ids: Vec<Uuid> = TeamMember::find()
            .filter(team_member::Column::UserId.eq(user_id))
            .all(self.db)
            .await?
            .into_iter()
            .map(|m| m.team_id)
            .collect();

        if team_ids.is_empty() {
            return Ok(Vec::new());
        }

        let teams = TeamEntity::find()
            .filter(team::Column::Id.is_in(team_ids))
            .order_by_asc(team::Column::CreatedAt)
            .all(self.db)
            .await?;

        hydrate(self.db, teams).await
    }

    /// Fails with `TEAM_NOT_FOUND`, then `NOT_MEMBER`
    pub async fn get_team_by_id(&self, team_id: Uuid, user_id: Uuid) -> Result<Team, ApiError> {
        let team = TeamEntity::find_by_id(team_id)
            .one(self.db)
            .await?
            .ok_or(ApiError::TeamNotFound)?;

        let mut teams = hydrate(self.db, vec![team]).await?;
        let team = teams.pop().ok_or(ApiError::TeamNotFound)?;

        if !team.members.iter().any(|m| m.user_id == user_id) {
            return Err(ApiError::NotMember);
        }

        Ok(team)
    }

    /// Add `new_member_id` to the team as a `MEMBER`; only leaders may do this
    pub async fn add_team_member(
        &self,
        team_id: Uuid,
        caller_id: Uuid,
        new_member_id: Uuid,
    ) -> Result<Membership, ApiError> {
        let guard = MembershipGuard::new(self.db);
        guard
            .require_leader(team_id, caller_id, "Only team leaders can add members")
            .await?;

        if User::find_by_id(new_member_id).one(self.db).await?.is_none() {
            return Err(ApiError::UserNotFound);
        }

        if guard.find(team_id, new_member_id).await?.is_some() {
            return Err(ApiError::AlreadyMember);
        }

        let membership = team_member::ActiveModel {
            team_id: Set(team_id),
            user_id: Set(new_member_id),
            role: Set(TeamRole::Member),
            joined_at: Set(Utc::now()),
        }
        .insert(self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::AlreadyMember,
            _ => ApiError::Database(e),
        })?;

        info!("User {} added to team {} by {}", new_member_id, team_id, caller_id);

        Ok(membership.into())
    }
}

/// Attach member lists and task counts to team rows
async fn hydrate<C: ConnectionTrait>(db: &C, teams: Vec<team::Model>) -> Result<Vec<Team>, ApiError> {
    let team_ids: Vec<Uuid> = teams.iter().map(|t| t.id).collect();

    let memberships = TeamMember::find()
        .filter(team_member::Column::TeamId.is_in(team_ids.clone()))
        .order_by_asc(team_member::Column::JoinedAt)
        .all(db)
        .await?;

    let users = user_summaries(db, memberships.iter().map(|m| m.user_id)).await?;

    let task_counts: HashMap<Uuid, i64> = Task::find()
        .select_only()
        .column(task::Column::TeamId)
        .column_as(task::Column::Id.count(), "task_count")
        .filter(task::Column::TeamId.is_in(team_ids))
        .group_by(task::Column::TeamId)
        .into_tuple::<(Uuid, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let mut members_by_team: HashMap<Uuid, Vec<TeamMemberView>> = HashMap::new();
    for membership in memberships {
        let Some(user) = users.get(&membership.user_id) else {
            continue;
        };
        members_by_team
            .entry(membership.team_id)
            .or_default()
            .push(TeamMemberView {
                team_id: membership.team_id,
                user_id: membership.user_id,
                role: membership.role,
                joined_at: membership.joined_at,
                user: user.clone(),
            });
    }

    Ok(teams
        .into_iter()
        .map(|t| Team {
            members: members_by_team.remove(&t.id).unwrap_or_default(),
            task_count: task_counts.get(&t.id).copied().unwrap_or(0).max(0) as u64,
            id: t.id,
            name: t.name,
            slug: t.slug,
            description: t.description,
            created_at: t.created_at,
            updated_at: t.updated_at,
        })
        .collect())
}
