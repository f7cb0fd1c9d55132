//! Fixtures shared by the service unit tests

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use taskflow_db::entities::{
    prelude::{TeamRole, UserRole},
    team, team_member, user,
};
use uuid::Uuid;

/// Fresh in-memory database with the schema applied
pub async fn setup_db() -> DatabaseConnection {
    let db = taskflow_db::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    taskflow_db::migrate(&db)
        .await
        .expect("Failed to run migrations");

    db
}

/// Insert a user directly; the name is the local part of the email
pub async fn create_user(db: &DatabaseConnection, email: &str) -> user::Model {
    let name = email.split('@').next().unwrap_or(email);

    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        role: Set(UserRole::Member),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

/// Insert a team with `leader_id` as its leader
pub async fn create_team(db: &DatabaseConnection, slug: &str, leader_id: Uuid) -> team::Model {
    let now = Utc::now();
    let team = team::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(slug.to_string()),
        slug: Set(slug.to_string()),
        description: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert team");

    add_member(db, team.id, leader_id, TeamRole::Leader).await;
    team
}

pub async fn add_member(db: &DatabaseConnection, team_id: Uuid, user_id: Uuid, role: TeamRole) {
    team_member::ActiveModel {
        team_id: Set(team_id),
        user_id: Set(user_id),
        role: Set(role),
        joined_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert membership");
}
