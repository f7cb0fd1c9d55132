//! Database entities

pub mod activity_log;
pub mod task;
pub mod team;
pub mod team_member;
pub mod user;

pub use activity_log::Entity as ActivityLog;
pub use task::Entity as Task;
pub use team::Entity as Team;
pub use team_member::Entity as TeamMember;
pub use user::Entity as User;

pub mod prelude {
    pub use super::activity_log::Entity as ActivityLog;
    pub use super::task::{Entity as Task, TaskPriority, TaskStatus};
    pub use super::team::Entity as Team;
    pub use super::team_member::{Entity as TeamMember, TeamRole};
    pub use super::user::{Entity as User, UserRole};
}
