//! TaskFlow Lite HTTP API
//!
//! Axum router over the service layer: bearer-token auth, teams, tasks, activity feeds and
//! analytics. The OpenAPI document is served at `/api/openapi.json`.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

use anyhow::Context;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::{future::Future, net::SocketAddr, sync::Arc};
use taskflow_auth::{TokenConfig, TokenIssuer, DEFAULT_HASH_ROUNDS};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

pub use error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: Arc<TokenIssuer>,
    /// Password hashing cost for new registrations
    pub hash_rounds: u32,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TaskFlow Lite API",
        version = "0.1.0",
        description = "REST API for team task tracking",
        contact(
            name = "TaskFlow Team",
            email = "team@taskflow.dev"
        )
    ),
    paths(
        handlers::health::health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::auth::logout,
        handlers::teams::create_team,
        handlers::teams::list_teams,
        handlers::teams::get_team,
        handlers::teams::add_member,
        handlers::tasks::create_task,
        handlers::tasks::list_tasks,
        handlers::tasks::get_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,
        handlers::activities::team_activities,
        handlers::activities::task_activities,
        handlers::analytics::overview,
        handlers::analytics::tasks_per_user,
        handlers::analytics::overdue,
    ),
    components(
        schemas(
            models::ErrorResponse,
            models::MessageResponse,
            models::HealthResponse,
            models::User,
            models::UserSummary,
            models::RegisterRequest,
            models::LoginRequest,
            models::AuthResponse,
            models::RefreshRequest,
            models::RefreshResponse,
            models::UserResponse,
            models::CreateTeamRequest,
            models::Membership,
            models::TeamMember,
            models::Team,
            models::TeamResponse,
            models::TeamList,
            models::AddMemberRequest,
            models::MembershipResponse,
            models::CreateTaskRequest,
            models::UpdateTaskRequest,
            models::Task,
            models::TaskResponse,
            models::TaskPage,
            models::TaskSummary,
            models::Activity,
            models::ActivityList,
            models::Overview,
            models::UserTaskStats,
            models::TasksPerUser,
            models::OverdueTasks,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "teams", description = "Team and membership management"),
        (name = "tasks", description = "Team task tracking"),
        (name = "activities", description = "Audit trail of task changes"),
        (name = "analytics", description = "Team task statistics"),
        (name = "system", description = "System health and info endpoints")
    )
)]
pub struct ApiDoc;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// The single browser origin allowed to call the API with credentials
    pub cors_origin: String,
    /// Token secrets and lifetimes
    pub tokens: TokenConfig,
    /// Password hashing cost
    pub hash_rounds: u32,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            cors_origin: "http://localhost:5173".to_string(),
            tokens: TokenConfig::default(),
            hash_rounds: DEFAULT_HASH_ROUNDS,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    cors_origin: HeaderValue,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    ///
    /// Fails if the configured CORS origin is not a valid header value, or if the token
    /// settings are rejected by [`TokenConfig::validate`].
    pub fn new(config: ApiServerConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        config
            .tokens
            .validate()
            .context("Invalid token configuration")?;
        let cors_origin = HeaderValue::from_str(&config.cors_origin)
            .with_context(|| format!("Invalid CORS origin: {}", config.cors_origin))?;

        let state = Arc::new(AppState {
            db,
            tokens: Arc::new(TokenIssuer::new(config.tokens.clone())),
            hash_rounds: config.hash_rounds,
        });

        Ok(Self {
            config,
            cors_origin,
            state,
        })
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        // Build PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health::health_check))
            .route("/api/openapi.json", get(openapi_json))
            .route("/api/auth/register", post(handlers::auth::register))
            .route("/api/auth/login", post(handlers::auth::login))
            .route("/api/auth/refresh", post(handlers::auth::refresh))
            .with_state(self.state.clone());

        // Build PROTECTED routes (require a bearer access token)
        let protected_router = Router::new()
            .route("/api/auth/me", get(handlers::auth::me))
            .route("/api/auth/logout", post(handlers::auth::logout))
            .route(
                "/api/teams",
                get(handlers::teams::list_teams).post(handlers::teams::create_team),
            )
            .route("/api/teams/{team_id}", get(handlers::teams::get_team))
            .route(
                "/api/teams/{team_id}/members",
                post(handlers::teams::add_member),
            )
            .route(
                "/api/teams/{team_id}/tasks",
                get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
            )
            .route(
                "/api/teams/{team_id}/tasks/{task_id}",
                get(handlers::tasks::get_task)
                    .put(handlers::tasks::update_task)
                    .delete(handlers::tasks::delete_task),
            )
            .route(
                "/api/teams/{team_id}/activities/team",
                get(handlers::activities::team_activities),
            )
            .route(
                "/api/teams/{team_id}/activities/task/{task_id}",
                get(handlers::activities::task_activities),
            )
            .route(
                "/api/teams/{team_id}/analytics/overview",
                get(handlers::analytics::overview),
            )
            .route(
                "/api/teams/{team_id}/analytics/tasks-per-user",
                get(handlers::analytics::tasks_per_user),
            )
            .route(
                "/api/teams/{team_id}/analytics/overdue",
                get(handlers::analytics::overdue),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                self.state.tokens.clone(),
                middleware::require_auth,
            ));

        // Credentials are allowed, so the origin must be exact
        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
            .allow_origin(self.cors_origin.clone());

        public_router
            .merge(protected_router)
            .fallback(not_found)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.bind_addr))?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let addr = listener.local_addr()?;

        info!("Starting API server on {}", addr);
        info!("OpenAPI document: http://{}/api/openapi.json", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        info!("API server stopped");
        Ok(())
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found(request: Request) -> ApiError {
    ApiError::RouteNotFound(request.uri().path().to_string())
}
