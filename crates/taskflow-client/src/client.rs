//! Typed wrapper around the TaskFlow HTTP API

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use taskflow_api::models::{
    Activity, ActivityList, AddMemberRequest, AuthResponse, CreateTaskRequest, CreateTeamRequest,
    ErrorResponse, HealthResponse, LoginRequest, Membership, MembershipResponse, MessageResponse,
    OverdueTasks, Overview, RefreshRequest, RefreshResponse, RegisterRequest, Task, TaskPage,
    TaskQuery, TaskResponse, TasksPerUser, Team, TeamList, TeamResponse, UpdateTaskRequest, User,
    UserResponse, UserTaskStats,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};
use crate::store::{Session, TokenStore};

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`
    pub fn new(base_url: impl Into<String>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// Create an account and store the returned session
    pub async fn register(&self, email: &str, name: &str, password: &str) -> ClientResult<User> {
        let request = RegisterRequest {
            email: Some(email.to_string()),
            name: Some(name.to_string()),
            password: Some(password.to_string()),
        };
        let auth: AuthResponse = self.send_public(Method::POST, "/auth/register", &request).await?;
        self.remember(auth)
    }

    /// Log in and store the returned session
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let request = LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        let auth: AuthResponse = self.send_public(Method::POST, "/auth/login", &request).await?;
        self.remember(auth)
    }

    /// Trade the stored refresh token for a new access token
    ///
    /// Clears the store if the server rejects the refresh token.
    pub async fn refresh(&self) -> ClientResult<()> {
        let session = self.store.get()?.ok_or(ClientError::NotAuthenticated)?;
        let request = RefreshRequest {
            refresh_token: Some(session.refresh_token.clone()),
        };

        let refreshed: RefreshResponse =
            match self.send_public(Method::POST, "/auth/refresh", &request).await {
                Ok(refreshed) => refreshed,
                Err(e) => {
                    debug!("Refresh failed, clearing session: {}", e);
                    self.store.clear()?;
                    return Err(e);
                }
            };

        self.store.set(Session {
            access_token: refreshed.access_token,
            refresh_token: session.refresh_token,
        })
    }

    pub async fn me(&self) -> ClientResult<User> {
        let response: UserResponse = self.send_authed(Method::GET, "/auth/me", None).await?;
        Ok(response.user)
    }

    /// Tell the server and forget the local session
    pub async fn logout(&self) -> ClientResult<()> {
        let result: ClientResult<MessageResponse> =
            self.send_authed(Method::POST, "/auth/logout", None).await;
        self.store.clear()?;
        result.map(|_| ())
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let response = self.http.get(self.url("/health")).send().await?;
        decode(response).await
    }

    // ------------------------------------------------------------------
    // Teams
    // ------------------------------------------------------------------

    pub async fn create_team(&self, name: &str, description: Option<&str>) -> ClientResult<Team> {
        let request = CreateTeamRequest {
            name: Some(name.to_string()),
            description: description.map(str::to_string),
        };
        let response: TeamResponse = self
            .send_authed(Method::POST, "/teams", Some(to_json(&request)?))
            .await?;
        Ok(response.team)
    }

    pub async fn list_teams(&self) -> ClientResult<Vec<Team>> {
        let response: TeamList = self.send_authed(Method::GET, "/teams", None).await?;
        Ok(response.teams)
    }

    pub async fn get_team(&self, team_id: Uuid) -> ClientResult<Team> {
        let response: TeamResponse = self
            .send_authed(Method::GET, &format!("/teams/{}", team_id), None)
            .await?;
        Ok(response.team)
    }

    pub async fn add_member(&self, team_id: Uuid, user_id: Uuid) -> ClientResult<Membership> {
        let request = AddMemberRequest {
            user_id: Some(user_id),
        };
        let response: MembershipResponse = self
            .send_authed(
                Method::POST,
                &format!("/teams/{}/members", team_id),
                Some(to_json(&request)?),
            )
            .await?;
        Ok(response.membership)
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    pub async fn create_task(&self, team_id: Uuid, request: &CreateTaskRequest) -> ClientResult<Task> {
        let response: TaskResponse = self
            .send_authed(
                Method::POST,
                &format!("/teams/{}/tasks", team_id),
                Some(to_json(request)?),
            )
            .await?;
        Ok(response.task)
    }

    pub async fn list_tasks(&self, team_id: Uuid, query: &TaskQuery) -> ClientResult<TaskPage> {
        self.send_authed_with(Method::GET, &format!("/teams/{}/tasks", team_id), None, Some(query))
            .await
    }

    pub async fn get_task(&self, team_id: Uuid, task_id: Uuid) -> ClientResult<Task> {
        let response: TaskResponse = self
            .send_authed(
                Method::GET,
                &format!("/teams/{}/tasks/{}", team_id, task_id),
                None,
            )
            .await?;
        Ok(response.task)
    }

    pub async fn update_task(
        &self,
        team_id: Uuid,
        task_id: Uuid,
        request: &UpdateTaskRequest,
    ) -> ClientResult<Task> {
        let response: TaskResponse = self
            .send_authed(
                Method::PUT,
                &format!("/teams/{}/tasks/{}", team_id, task_id),
                Some(to_json(request)?),
            )
            .await?;
        Ok(response.task)
    }

    pub async fn delete_task(&self, team_id: Uuid, task_id: Uuid) -> ClientResult<()> {
        let _: MessageResponse = self
            .send_authed(
                Method::DELETE,
                &format!("/teams/{}/tasks/{}", team_id, task_id),
                None,
            )
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Activities and analytics
    // ------------------------------------------------------------------

    pub async fn team_activities(&self, team_id: Uuid) -> ClientResult<Vec<Activity>> {
        let response: ActivityList = self
            .send_authed(
                Method::GET,
                &format!("/teams/{}/activities/team", team_id),
                None,
            )
            .await?;
        Ok(response.activities)
    }

    pub async fn task_activities(&self, team_id: Uuid, task_id: Uuid) -> ClientResult<Vec<Activity>> {
        let response: ActivityList = self
            .send_authed(
                Method::GET,
                &format!("/teams/{}/activities/task/{}", team_id, task_id),
                None,
            )
            .await?;
        Ok(response.activities)
    }

    pub async fn overview(&self, team_id: Uuid) -> ClientResult<Overview> {
        self.send_authed(
            Method::GET,
            &format!("/teams/{}/analytics/overview", team_id),
            None,
        )
        .await
    }

    pub async fn tasks_per_user(&self, team_id: Uuid) -> ClientResult<Vec<UserTaskStats>> {
        let response: TasksPerUser = self
            .send_authed(
                Method::GET,
                &format!("/teams/{}/analytics/tasks-per-user", team_id),
                None,
            )
            .await?;
        Ok(response.stats)
    }

    pub async fn overdue_tasks(&self, team_id: Uuid) -> ClientResult<Vec<Task>> {
        let response: OverdueTasks = self
            .send_authed(
                Method::GET,
                &format!("/teams/{}/analytics/overdue", team_id),
                None,
            )
            .await?;
        Ok(response.overdue_tasks)
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    fn remember(&self, auth: AuthResponse) -> ClientResult<User> {
        self.store.set(Session {
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
        })?;
        Ok(auth.user)
    }

    async fn send_public<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    async fn send_authed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<T> {
        self.send_authed_with::<T, ()>(method, path, body, None).await
    }

    /// Send with the stored access token; on 401, refresh once and retry once
    async fn send_authed_with<T, Q>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: Option<&Q>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let build = |token: &str| {
            let mut request: RequestBuilder = self
                .http
                .request(method.clone(), self.url(path))
                .bearer_auth(token);
            if let Some(query) = query {
                request = request.query(query);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }
            request
        };

        let session = self.store.get()?.ok_or(ClientError::NotAuthenticated)?;
        let response = build(&session.access_token).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        debug!("Access token rejected for {}, refreshing", path);
        self.refresh().await?;

        let session = self.store.get()?.ok_or(ClientError::NotAuthenticated)?;
        let response = build(&session.access_token).send().await?;
        decode(response).await
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> ClientResult<Value> {
    Ok(serde_json::to_value(body)?)
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        return Ok(serde_json::from_slice(&bytes)?);
    }

    let (message, code) = match serde_json::from_slice::<ErrorResponse>(&bytes) {
        Ok(body) => (body.error, body.code),
        Err(_) => (
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
            None,
        ),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
        code,
    })
}
