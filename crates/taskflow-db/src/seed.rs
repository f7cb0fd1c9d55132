//! Demo data for local development
//!
//! Seeding is idempotent: users are matched by email and teams by slug, and anything
//! already present is left untouched. Tasks and their activity history are only
//! written for teams created by this run.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde_json::json;
use std::collections::HashMap;
use taskflow_auth::hash_password;
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::{
    activity_log,
    prelude::{TaskPriority, TaskStatus, TeamRole, UserRole},
    task, team, team_member, user, Team, User,
};

/// Password shared by every demo account
pub const DEMO_PASSWORD: &str = "Demo@123";

/// Number of rows written by one seeding run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub teams: usize,
    pub memberships: usize,
    pub tasks: usize,
    pub activities: usize,
}

struct DemoUser {
    key: &'static str,
    email: &'static str,
    name: &'static str,
    role: UserRole,
}

struct DemoTeam {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    leader: &'static str,
    members: &'static [&'static str],
}

struct DemoTask {
    team: &'static str,
    title: &'static str,
    description: &'static str,
    status: TaskStatus,
    priority: TaskPriority,
    /// Due date relative to now, in days
    due_in_days: i64,
    creator: &'static str,
    assignee: &'static str,
    /// Days before now the task was completed
    completed_days_ago: Option<i64>,
    /// Status transitions recorded after creation, as (actor, old, new)
    history: &'static [(&'static str, TaskStatus, TaskStatus)],
}

const USERS: &[DemoUser] = &[
    DemoUser {
        key: "alice",
        email: "alice@taskflow.demo",
        name: "Alice Johnson",
        role: UserRole::Member,
    },
    DemoUser {
        key: "bob",
        email: "bob@taskflow.demo",
        name: "Bob Smith",
        role: UserRole::Member,
    },
    DemoUser {
        key: "charlie",
        email: "charlie@taskflow.demo",
        name: "Charlie Brown",
        role: UserRole::Member,
    },
    DemoUser {
        key: "diana",
        email: "diana@taskflow.demo",
        name: "Diana Prince",
        role: UserRole::Member,
    },
    DemoUser {
        key: "eve",
        email: "eve@taskflow.demo",
        name: "Eve Wilson",
        role: UserRole::Admin,
    },
];

const TEAMS: &[DemoTeam] = &[
    DemoTeam {
        name: "Product Development",
        slug: "product-development",
        description: "Building awesome features for TaskFlow Lite",
        leader: "alice",
        members: &["bob", "charlie"],
    },
    DemoTeam {
        name: "Marketing",
        slug: "marketing",
        description: "Marketing and growth initiatives",
        leader: "diana",
        members: &["bob"],
    },
    DemoTeam {
        name: "Design",
        slug: "design",
        description: "UI/UX design and brand work",
        leader: "eve",
        members: &["alice"],
    },
];

const TASKS: &[DemoTask] = &[
    DemoTask {
        team: "product-development",
        title: "Design user dashboard",
        description: "Create mockups and wireframes for the main dashboard",
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        due_in_days: 5,
        creator: "alice",
        assignee: "charlie",
        completed_days_ago: None,
        history: &[],
    },
    DemoTask {
        team: "product-development",
        title: "Implement authentication",
        description: "Set up JWT authentication system",
        status: TaskStatus::Done,
        priority: TaskPriority::Urgent,
        due_in_days: -1,
        creator: "alice",
        assignee: "bob",
        completed_days_ago: Some(1),
        history: &[
            ("bob", TaskStatus::Todo, TaskStatus::InProgress),
            ("bob", TaskStatus::InProgress, TaskStatus::Done),
        ],
    },
    DemoTask {
        team: "product-development",
        title: "Create API documentation",
        description: "Document all REST endpoints",
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        due_in_days: 10,
        creator: "bob",
        assignee: "charlie",
        completed_days_ago: None,
        history: &[],
    },
    DemoTask {
        team: "product-development",
        title: "Setup database migration",
        description: "Implement schema migrations",
        status: TaskStatus::Done,
        priority: TaskPriority::High,
        due_in_days: -5,
        creator: "alice",
        assignee: "alice",
        completed_days_ago: Some(4),
        history: &[],
    },
    DemoTask {
        team: "product-development",
        title: "Write unit tests",
        description: "Add tests for auth services",
        status: TaskStatus::InProgress,
        priority: TaskPriority::Medium,
        due_in_days: 7,
        creator: "bob",
        assignee: "bob",
        completed_days_ago: None,
        history: &[],
    },
    DemoTask {
        team: "product-development",
        title: "Fix login redirect bug",
        description: "Users land on a blank page after signing in",
        status: TaskStatus::Todo,
        priority: TaskPriority::High,
        due_in_days: -2,
        creator: "charlie",
        assignee: "charlie",
        completed_days_ago: None,
        history: &[],
    },
    DemoTask {
        team: "marketing",
        title: "Create social media campaign",
        description: "Plan and design Twitter/LinkedIn content",
        status: TaskStatus::Todo,
        priority: TaskPriority::High,
        due_in_days: 8,
        creator: "diana",
        assignee: "diana",
        completed_days_ago: None,
        history: &[],
    },
    DemoTask {
        team: "marketing",
        title: "Write blog post about features",
        description: "Explain key features in blog",
        status: TaskStatus::InProgress,
        priority: TaskPriority::Medium,
        due_in_days: 3,
        creator: "diana",
        assignee: "bob",
        completed_days_ago: None,
        history: &[],
    },
    DemoTask {
        team: "marketing",
        title: "Email newsletter",
        description: "Send monthly product updates",
        status: TaskStatus::Todo,
        priority: TaskPriority::Low,
        due_in_days: 15,
        creator: "bob",
        assignee: "diana",
        completed_days_ago: None,
        history: &[],
    },
    DemoTask {
        team: "design",
        title: "Redesign task cards",
        description: "Improve visual hierarchy",
        status: TaskStatus::InProgress,
        priority: TaskPriority::Medium,
        due_in_days: 4,
        creator: "eve",
        assignee: "alice",
        completed_days_ago: None,
        history: &[],
    },
    DemoTask {
        team: "design",
        title: "Create color palette",
        description: "Define primary and accent colors",
        status: TaskStatus::Done,
        priority: TaskPriority::High,
        due_in_days: -2,
        creator: "eve",
        assignee: "eve",
        completed_days_ago: Some(2),
        history: &[],
    },
    DemoTask {
        team: "design",
        title: "Design analytics dashboard",
        description: "Create charts and metrics visualization",
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        due_in_days: 12,
        creator: "alice",
        assignee: "eve",
        completed_days_ago: None,
        history: &[],
    },
];

/// Populate the database with demo users, teams, tasks and activity history
///
/// Every demo account uses [`DEMO_PASSWORD`], hashed with `hash_rounds` passes.
pub async fn seed_demo_data(
    db: &DatabaseConnection,
    hash_rounds: u32,
) -> Result<SeedSummary, DbErr> {
    let mut summary = SeedSummary::default();
    let now = Utc::now();
    let txn = db.begin().await?;

    let mut user_ids: HashMap<&'static str, Uuid> = HashMap::new();
    for demo in USERS {
        let existing = User::find()
            .filter(user::Column::Email.eq(demo.email))
            .one(&txn)
            .await?;

        let id = match existing {
            Some(found) => {
                debug!("Demo user {} already exists, skipping", demo.email);
                found.id
            }
            None => {
                let password_hash = hash_password(DEMO_PASSWORD, hash_rounds)
                    .map_err(|e| DbErr::Custom(e.to_string()))?;

                let created = user::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    email: Set(demo.email.to_string()),
                    name: Set(demo.name.to_string()),
                    password_hash: Set(password_hash),
                    role: Set(demo.role),
                    created_at: Set(now),
                }
                .insert(&txn)
                .await?;
                summary.users += 1;
                created.id
            }
        };
        user_ids.insert(demo.key, id);
    }

    let lookup = |key: &str| -> Result<Uuid, DbErr> {
        user_ids
            .get(key)
            .copied()
            .ok_or_else(|| DbErr::Custom(format!("Unknown demo user '{}'", key)))
    };

    let mut new_teams: HashMap<&'static str, Uuid> = HashMap::new();
    for demo in TEAMS {
        let existing = Team::find()
            .filter(team::Column::Slug.eq(demo.slug))
            .one(&txn)
            .await?;
        if existing.is_some() {
            debug!("Demo team {} already exists, skipping", demo.slug);
            continue;
        }

        let team_id = Uuid::new_v4();
        team::ActiveModel {
            id: Set(team_id),
            name: Set(demo.name.to_string()),
            slug: Set(demo.slug.to_string()),
            description: Set(Some(demo.description.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        summary.teams += 1;

        let roster = std::iter::once((demo.leader, TeamRole::Leader))
            .chain(demo.members.iter().map(|key| (*key, TeamRole::Member)));
        for (key, role) in roster {
            team_member::ActiveModel {
                team_id: Set(team_id),
                user_id: Set(lookup(key)?),
                role: Set(role),
                joined_at: Set(now),
            }
            .insert(&txn)
            .await?;
            summary.memberships += 1;
        }

        new_teams.insert(demo.slug, team_id);
    }

    for (offset, demo) in TASKS.iter().enumerate() {
        let Some(&team_id) = new_teams.get(demo.team) else {
            continue;
        };

        // Stagger creation times so listings have a stable order
        let created_at = now - Duration::hours((TASKS.len() - offset) as i64);
        let creator_id = lookup(demo.creator)?;
        let task_id = Uuid::new_v4();

        task::ActiveModel {
            id: Set(task_id),
            title: Set(demo.title.to_string()),
            description: Set(Some(demo.description.to_string())),
            status: Set(demo.status),
            priority: Set(demo.priority),
            due_date: Set(Some(now + Duration::days(demo.due_in_days))),
            team_id: Set(team_id),
            created_by_id: Set(creator_id),
            assigned_to_id: Set(Some(lookup(demo.assignee)?)),
            completed_at: Set(demo.completed_days_ago.map(|days| now - Duration::days(days))),
            created_at: Set(created_at),
            updated_at: Set(created_at),
        }
        .insert(&txn)
        .await?;
        summary.tasks += 1;

        let mut entries = vec![(
            creator_id,
            activity_log::TASK_CREATED,
            json!({ "title": demo.title, "priority": demo.priority.as_str() }),
        )];
        for (actor, old, new) in demo.history {
            entries.push((
                lookup(*actor)?,
                activity_log::STATUS_CHANGED,
                json!({ "oldStatus": old.as_str(), "newStatus": new.as_str() }),
            ));
        }

        for (step, (user_id, action, details)) in entries.into_iter().enumerate() {
            activity_log::ActiveModel {
                id: Set(Uuid::new_v4()),
                action: Set(action.to_string()),
                details: Set(details.to_string()),
                user_id: Set(user_id),
                task_id: Set(Some(task_id)),
                team_id: Set(team_id),
                created_at: Set(created_at + Duration::minutes(step as i64)),
            }
            .insert(&txn)
            .await?;
            summary.activities += 1;
        }
    }

    txn.commit().await?;

    info!(
        "Seeded {} users, {} teams, {} memberships, {} tasks, {} activities",
        summary.users, summary.teams, summary.memberships, summary.tasks, summary.activities
    );

    Ok(summary)
}
