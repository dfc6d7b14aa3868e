// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::{
    client::{
        Auth, Client, DashboardStats, Id, Listing, LoginResponse, NewProject, NewTask, Page,
        Project, SignupRequest, Task, TaskQuery, TaskStatus, User, UserUpdate,
    },
    error::{self, Result},
    metadata,
};

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct PageQuery {
    page: u32,
    size: u32,
}

#[derive(Serialize)]
struct SignIn<'req> {
    username: &'req str,
    password: &'req str,
}

#[derive(Serialize)]
struct StatusUpdate {
    status: TaskStatus,
}

/// Turns a failed response into an error. A 401 always means our token was
/// refused, whatever the body says.
fn failure(status: StatusCode, body: &str) -> error::Error {
    if status == StatusCode::UNAUTHORIZED {
        return error::Api::Unauthorized.into();
    }

    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(body) => body.message,
        Err(e) => {
            debug!("The error response for status {} had no usable body: {}", status, e);
            None
        }
    };
    error::Api::Status { status, message }.into()
}

/// Relative paths only join under a base whose path ends in a slash.
fn as_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// The backend, reached over HTTP with a bearer token.
pub(crate) struct Http {
    inner: reqwest::Client,
    api_url: Url,
    dashboard_url: Url,
    token: Option<SecretString>,
}

impl Http {
    pub(crate) fn new(api_url: Url, dashboard_url: Url, timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(metadata::USER_AGENT.as_str())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            inner,
            api_url: as_base(api_url),
            dashboard_url: as_base(dashboard_url),
            token: None,
        })
    }

    fn request(&self, method: Method, base: &Url, path: &str) -> Result<RequestBuilder> {
        let url = base.join(path)?;
        trace!("{} {}", method, url);
        let req = self.inner.request(method, url);
        Ok(match &self.token {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        })
    }

    fn api(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        self.request(method, &self.api_url, path)
    }

    fn dashboard(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        self.request(method, &self.dashboard_url, path)
    }

    async fn send(req: RequestBuilder) -> Result<Response> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(failure(status, &body))
    }

    async fn json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
        Ok(Self::send(req).await?.json().await?)
    }

    async fn empty(req: RequestBuilder) -> Result<()> {
        let _ = Self::send(req).await?;
        Ok(())
    }

    async fn page<T: DeserializeOwned>(req: RequestBuilder) -> Result<Page<T>> {
        Ok(Self::json::<Listing<T>>(req).await?.into())
    }
}

#[async_trait]
impl Auth for Http {
    fn set_token(&mut self, token: Option<SecretString>) {
        self.token = token;
    }

    async fn current_user(&self) -> Result<User> {
        Self::json(self.api(Method::GET, "users/me")?).await
    }

    async fn user(&self, id: Id) -> Result<User> {
        Self::json(self.api(Method::GET, &format!("users/{id}"))?).await
    }

    async fn login(&self, username: &str, password: &SecretString) -> Result<LoginResponse> {
        let body = SignIn {
            username,
            password: password.expose_secret(),
        };
        Self::json(self.api(Method::POST, "auth/signin")?.json(&body)).await
    }

    async fn signup(&self, req: &SignupRequest<'_>) -> Result<LoginResponse> {
        Self::json(self.api(Method::POST, "auth/signup")?.json(req)).await
    }
}

#[async_trait]
impl Client for Http {
    async fn dashboard_stats(&self) -> Result<DashboardStats> {
        Self::json(self.dashboard(Method::GET, "dashboard/stats")?).await
    }

    async fn recent_projects(&self, page: u32, size: u32) -> Result<Page<Project>> {
        let req = self
            .dashboard(Method::GET, "dashboard/recent-projects")?
            .query(&PageQuery { page, size });
        Self::page(req).await
    }

    async fn recent_tasks(&self, page: u32, size: u32) -> Result<Page<Task>> {
        let req = self
            .dashboard(Method::GET, "dashboard/recent-tasks")?
            .query(&PageQuery { page, size });
        Self::page(req).await
    }

    async fn projects(&self, page: u32, size: u32) -> Result<Page<Project>> {
        let req = self
            .api(Method::GET, "projects")?
            .query(&PageQuery { page, size });
        Self::page(req).await
    }

    async fn project(&self, id: Id) -> Result<Project> {
        Self::json(self.api(Method::GET, &format!("projects/{id}"))?).await
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project> {
        Self::json(self.api(Method::POST, "projects")?.json(project)).await
    }

    async fn update_project(&self, id: Id, project: &NewProject) -> Result<()> {
        Self::empty(self.api(Method::PUT, &format!("projects/{id}"))?.json(project)).await
    }

    async fn delete_project(&self, id: Id) -> Result<()> {
        Self::empty(self.api(Method::DELETE, &format!("projects/{id}"))?).await
    }

    async fn tasks(&self, query: &TaskQuery) -> Result<Page<Task>> {
        Self::page(self.api(Method::GET, "tasks")?.query(query)).await
    }

    async fn task(&self, id: Id) -> Result<Task> {
        Self::json(self.api(Method::GET, &format!("tasks/{id}"))?).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task> {
        Self::json(self.api(Method::POST, "tasks")?.json(task)).await
    }

    async fn update_task(&self, id: Id, task: &NewTask) -> Result<()> {
        Self::empty(self.api(Method::PUT, &format!("tasks/{id}"))?.json(task)).await
    }

    async fn update_task_status(&self, id: Id, status: TaskStatus) -> Result<()> {
        let req = self
            .api(Method::PATCH, &format!("tasks/{id}/status"))?
            .json(&StatusUpdate { status });
        Self::empty(req).await
    }

    async fn delete_task(&self, id: Id) -> Result<()> {
        Self::empty(self.api(Method::DELETE, &format!("tasks/{id}"))?).await
    }

    async fn users(&self, page: u32, size: u32) -> Result<Page<User>> {
        let req = self
            .api(Method::GET, "users")?
            .query(&PageQuery { page, size });
        Self::page(req).await
    }

    async fn update_user(&self, id: Id, update: &UserUpdate) -> Result<User> {
        Self::json(self.api(Method::PUT, &format!("users/{id}"))?.json(update)).await
    }

    async fn update_user_roles(&self, id: Id, roles: &[String]) -> Result<()> {
        Self::empty(self.api(Method::PUT, &format!("users/{id}/roles"))?.json(roles)).await
    }

    async fn delete_user(&self, id: Id) -> Result<()> {
        Self::empty(self.api(Method::DELETE, &format!("users/{id}"))?).await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::AUTHORIZATION;

    use crate::client::Priority;

    use super::*;

    fn http() -> Result<Http> {
        Http::new(
            Url::parse("http://localhost:8080/api")?,
            Url::parse("http://localhost:8080")?,
            Duration::from_secs(10),
        )
    }

    #[test]
    fn paths_resolve_under_base_urls() -> Result<()> {
        let http = http()?;
        let req = http.api(Method::GET, "users/me")?.build()?;
        assert_eq!(req.url().as_str(), "http://localhost:8080/api/users/me");

        let req = http.dashboard(Method::GET, "dashboard/stats")?.build()?;
        assert_eq!(req.url().as_str(), "http://localhost:8080/dashboard/stats");
        Ok(())
    }

    #[test]
    fn token_is_sent_as_bearer() -> Result<()> {
        let mut http = http()?;
        let req = http.api(Method::GET, "users/me")?.build()?;
        assert!(req.headers().get(AUTHORIZATION).is_none());

        http.set_token(Some(SecretString::new("abc".to_owned())));
        let req = http.api(Method::GET, "users/me")?.build()?;
        assert_eq!(
            req.headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer abc")
        );

        http.set_token(None);
        let req = http.dashboard(Method::GET, "dashboard/stats")?.build()?;
        assert!(req.headers().get(AUTHORIZATION).is_none());
        Ok(())
    }

    #[test]
    fn unauthorized_ignores_the_body() {
        let err = failure(StatusCode::UNAUTHORIZED, r#"{"message": "expired"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn other_failures_carry_the_server_message() {
        let err = failure(StatusCode::BAD_REQUEST, r#"{"message": "Name is required"}"#);
        assert!(!err.is_unauthorized());
        assert_eq!(err.server_message(), Some("Name is required"));

        let err = failure(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert!(matches!(
            err,
            error::Error::Api(error::Api::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: None,
            })
        ));
    }

    #[test]
    fn task_filters_become_query_parameters() -> Result<()> {
        let query = TaskQuery {
            page: 1,
            size: 20,
            priority: Some(Priority::High),
            assigned_to_id: Some(7),
            ..TaskQuery::default()
        };
        let req = http()?.api(Method::GET, "tasks")?.query(&query).build()?;
        assert_eq!(
            req.url().query(),
            Some("page=1&size=20&priority=HIGH&assignedToId=7")
        );
        Ok(())
    }
}
