//! Account registration and password login

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use taskflow_auth::{hash_password, verify_password};
use taskflow_db::entities::{prelude::UserRole, user, User};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;

pub struct CredentialService<'a> {
    db: &'a DatabaseConnection,
    hash_rounds: u32,
}

impl<'a> CredentialService<'a> {
    pub fn new(db: &'a DatabaseConnection, hash_rounds: u32) -> Self {
        Self { db, hash_rounds }
    }

    /// Create a `MEMBER` account; fails with `EMAIL_EXISTS` if the email is taken
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<user::Model, ApiError> {
        if self.find_by_email(email).await?.is_some() {
            return Err(ApiError::EmailExists);
        }

        let rounds = self.hash_rounds;
        let password = password.to_string();
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password, rounds)).await??;

        let created = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            password_hash: Set(password_hash),
            role: Set(UserRole::Member),
            created_at: Set(Utc::now()),
        }
        .insert(self.db)
        .await
        .map_err(|e| match e.sql_err() {
            // Lost a race with a concurrent registration
            Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::EmailExists,
            _ => ApiError::Database(e),
        })?;

        info!("Registered user {} ({})", created.email, created.id);

        Ok(created)
    }

    /// Check an email/password pair
    ///
    /// Unknown emails and wrong passwords produce the same `INVALID_CREDENTIALS` error.
    pub async fn login(&self, email: &str, password: &str) -> Result<user::Model, ApiError> {
        let Some(user) = self.find_by_email(email).await? else {
            debug!("Login attempt for unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await??;

        if !matches {
            debug!("Login attempt with wrong password for {}", user.id);
            return Err(ApiError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Fails with `USER_NOT_FOUND` if absent
    pub async fn get_user_by_id(&self, id: Uuid) -> Result<user::Model, ApiError> {
        User::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(ApiError::UserNotFound)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ApiError> {
        Ok(User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_db;

    #[tokio::test]
    async fn test_register_and_login() {
        let db = setup_db().await;
        let service = CredentialService::new(&db, 1);

        let user = service
            .register("alice@x.com", "Alice", "hunter22")
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Member);
        assert_ne!(user.password_hash, "hunter22");

        let logged_in = service.login("alice@x.com", "hunter22").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        let fetched = service.get_user_by_id(user.id).await.unwrap();
        assert_eq!(fetched.email, "alice@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = setup_db().await;
        let service = CredentialService::new(&db, 1);

        service.register("alice@x.com", "Alice", "pw").await.unwrap();
        let result = service.register("alice@x.com", "Alice 2", "pw2").await;

        assert!(matches!(result, Err(ApiError::EmailExists)));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let db = setup_db().await;
        let service = CredentialService::new(&db, 1);
        service.register("alice@x.com", "Alice", "right").await.unwrap();

        let wrong_password = service.login("alice@x.com", "wrong").await.unwrap_err();
        let unknown_email = service.login("nobody@x.com", "right").await.unwrap_err();

        assert!(matches!(wrong_password, ApiError::InvalidCredentials));
        assert!(matches!(unknown_email, ApiError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_unknown_user_id() {
        let db = setup_db().await;
        let result = CredentialService::new(&db, 1)
            .get_user_by_id(Uuid::new_v4())
            .await;

        assert!(matches!(result, Err(ApiError::UserNotFound)));
    }
}
