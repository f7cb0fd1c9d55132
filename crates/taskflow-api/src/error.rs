//! Application error taxonomy
//!
//! Services return [`ApiError`]; handlers propagate it with `?` and axum turns it into a
//! `{"error": ..., "code": ...}` response through [`IntoResponse`].

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use taskflow_auth::{JwtError, PasswordError};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("User with this email already exists")]
    EmailExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Team not found")]
    TeamNotFound,

    #[error("Team with this name already exists")]
    TeamExists,

    #[error("You are not a member of this team")]
    NotMember,

    #[error("{0}")]
    Forbidden(String),

    #[error("User is already a member of this team")]
    AlreadyMember,

    #[error("Task not found")]
    TaskNotFound,

    #[error("Assignee is not a member of this team")]
    InvalidAssignee,

    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Unauthorized {
        message: String,
        code: &'static str,
    },

    #[error("Not found - {0}")]
    RouteNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>, code: &'static str) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
            code,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::EmailExists
            | ApiError::TeamExists
            | ApiError::AlreadyMember
            | ApiError::InvalidAssignee
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized { .. } => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotMember | ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::UserNotFound
            | ApiError::TeamNotFound
            | ApiError::TaskNotFound
            | ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_)
            | ApiError::Password(_)
            | ApiError::Token(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code; `None` for internal failures
    pub fn code(&self) -> Option<&'static str> {
        let code = match self {
            ApiError::EmailExists => "EMAIL_EXISTS",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::UserNotFound => "USER_NOT_FOUND",
            ApiError::TeamNotFound => "TEAM_NOT_FOUND",
            ApiError::TeamExists => "TEAM_EXISTS",
            ApiError::NotMember => "NOT_MEMBER",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::AlreadyMember => "ALREADY_MEMBER",
            ApiError::TaskNotFound => "TASK_NOT_FOUND",
            ApiError::InvalidAssignee => "INVALID_ASSIGNEE",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized { code, .. } => *code,
            ApiError::RouteNotFound(_) => "NOT_FOUND",
            ApiError::Database(_)
            | ApiError::Password(_)
            | ApiError::Token(_)
            | ApiError::Internal(_) => return None,
        };
        Some(code)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = if status.is_server_error() {
            error!("Request failed: {}", self);
            ErrorResponse {
                error: "Internal server error".to_string(),
                code: None,
            }
        } else {
            ErrorResponse {
                error: self.to_string(),
                code: self.code().map(str::to_string),
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("Blocking task failed: {}", e))
    }
}
