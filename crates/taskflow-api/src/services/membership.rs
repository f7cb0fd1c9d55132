//! Team membership authorization

use sea_orm::{ConnectionTrait, EntityTrait};
use taskflow_db::entities::{team_member, TeamMember};
use uuid::Uuid;

use crate::error::ApiError;

/// Answers "is this user in this team, and in which role?"
///
/// Generic over the connection so it can run inside a transaction.
pub struct MembershipGuard<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> MembershipGuard<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Membership row for (team, user), if any
    pub async fn find(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<team_member::Model>, ApiError> {
        Ok(TeamMember::find_by_id((team_id, user_id))
            .one(self.db)
            .await?)
    }

    /// Fails with `NOT_MEMBER` unless the user belongs to the team
    pub async fn require_membership(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<team_member::Model, ApiError> {
        self.find(team_id, user_id).await?.ok_or(ApiError::NotMember)
    }

    /// Fails with `NOT_MEMBER` for outsiders and `FORBIDDEN` (carrying `denied`) for
    /// members who are not leaders
    pub async fn require_leader(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        denied: &str,
    ) -> Result<team_member::Model, ApiError> {
        let membership = self.require_membership(team_id, user_id).await?;

        if !membership.is_leader() {
            return Err(ApiError::forbidden(denied));
        }

        Ok(membership)
    }
}
