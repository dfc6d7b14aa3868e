// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{collections::BTreeSet, fmt};

use async_trait::async_trait;
use clap::ValueEnum;
use inflector::Inflector as _;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tabled::Tabled;

use crate::{error::Result, session::Identity};

pub(crate) type Id = i64;

pub(crate) const ROLE_PROJECT_MANAGER: &str = "ROLE_PROJECT_MANAGER";
pub(crate) const ROLE_TEAM_MEMBER: &str = "ROLE_TEAM_MEMBER";

fn display_option<T: fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn display_title_case<T: ValueEnum>(value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let value = value.to_possible_value().ok_or(fmt::Error)?;
    write!(f, "{}", value.get_name().to_title_case())
}

/// The set of role names granted to a user. The server sends each role either
/// as a bare name or as an object with a `name` field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Roles(BTreeSet<String>);

impl Roles {
    pub(crate) fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Roles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Roles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iter().collect::<Vec<_>>().join(", "))
    }
}

impl<'de> Deserialize<'de> for Roles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Role {
            Name(String),
            Object { name: String },
        }

        let roles = Option::<Vec<Role>>::deserialize(deserializer)?;
        Ok(roles
            .unwrap_or_default()
            .into_iter()
            .map(|role| match role {
                Role::Name(name) | Role::Object { name } => name,
            })
            .collect())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Tabled)]
#[serde(rename_all = "camelCase")]
pub(crate) struct User {
    #[tabled(rename = "ID")]
    pub(crate) id: Id,
    #[tabled(rename = "Username")]
    pub(crate) username: String,
    #[tabled(rename = "Email", display_with = "display_option")]
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[tabled(rename = "Roles")]
    #[serde(default)]
    pub(crate) roles: Roles,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub(crate) token: SecretString,
    pub(crate) id: Id,
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) roles: Roles,
}

impl LoginResponse {
    pub(crate) fn into_parts(self) -> (SecretString, Identity) {
        (
            self.token,
            Identity {
                id: self.id,
                username: self.username,
                roles: self.roles,
            },
        )
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SignupRequest<'req> {
    pub(crate) username: &'req str,
    pub(crate) email: &'req str,
    pub(crate) password: &'req str,
    pub(crate) role: Vec<String>,
}

fn serialize_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    secret
        .as_ref()
        .map(|s| s.expose_secret().as_str())
        .serialize(serializer)
}

/// A partial change to an account. Unset fields are left alone.
#[derive(Debug, Default, Serialize)]
pub(crate) struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret"
    )]
    pub(crate) password: Option<SecretString>,
}

impl UserUpdate {
    pub(crate) const fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum TaskStatus {
    #[value(alias = "TO_DO")]
    ToDo,
    #[value(alias = "IN_PROGRESS")]
    InProgress,
    #[value(alias = "DONE")]
    Done,
    #[value(alias = "BLOCKED")]
    Blocked,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_title_case(self, f)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum Priority {
    #[value(alias = "LOW")]
    Low,
    #[value(alias = "MEDIUM")]
    Medium,
    #[value(alias = "HIGH")]
    High,
    #[value(alias = "URGENT")]
    Urgent,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_title_case(self, f)
    }
}

#[derive(Clone, Debug, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Project {
    #[tabled(rename = "ID")]
    pub(crate) id: Id,
    #[tabled(rename = "Name")]
    pub(crate) name: String,
    #[tabled(rename = "Description", display_with = "display_option")]
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[tabled(rename = "Start", display_with = "display_option")]
    #[serde(default)]
    pub(crate) start_date: Option<String>,
    #[tabled(rename = "End", display_with = "display_option")]
    #[serde(default)]
    pub(crate) end_date: Option<String>,
    #[tabled(rename = "Manager", display_with = "display_option")]
    #[serde(default)]
    pub(crate) project_manager_name: Option<String>,
    #[tabled(skip)]
    #[serde(default)]
    pub(crate) project_manager_id: Option<Id>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewProject {
    pub(crate) name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) project_manager_id: Option<Id>,
}

impl From<Project> for NewProject {
    fn from(value: Project) -> Self {
        Self {
            name: value.name,
            description: value.description,
            start_date: value.start_date,
            end_date: value.end_date,
            project_manager_id: value.project_manager_id,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Task {
    #[tabled(rename = "ID")]
    pub(crate) id: Id,
    #[tabled(rename = "Title")]
    pub(crate) title: String,
    #[tabled(rename = "Status")]
    pub(crate) status: TaskStatus,
    #[tabled(rename = "Priority")]
    pub(crate) priority: Priority,
    #[tabled(rename = "Due", display_with = "display_option")]
    #[serde(default)]
    pub(crate) due_date: Option<String>,
    #[tabled(rename = "Assigned To", display_with = "Self::format_assignee")]
    #[serde(default)]
    pub(crate) assigned_to_name: Option<String>,
    #[tabled(skip)]
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[tabled(skip)]
    #[serde(default)]
    pub(crate) project_id: Option<Id>,
    #[tabled(skip)]
    #[serde(default)]
    pub(crate) assigned_to_id: Option<Id>,
}

impl Task {
    fn format_assignee(name: &Option<String>) -> String {
        name.clone().unwrap_or_else(|| "Unassigned".to_owned())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewTask {
    pub(crate) title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    pub(crate) status: TaskStatus,
    pub(crate) priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) project_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) assigned_to_id: Option<Id>,
}

impl From<Task> for NewTask {
    fn from(value: Task) -> Self {
        Self {
            title: value.title,
            description: value.description,
            status: value.status,
            priority: value.priority,
            due_date: value.due_date,
            project_id: value.project_id,
            assigned_to_id: value.assigned_to_id,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskQuery {
    pub(crate) page: u32,
    pub(crate) size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) assigned_to_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) project_id: Option<Id>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct DashboardStats {
    pub(crate) active_projects: u64,
    pub(crate) tasks_due: u64,
    pub(crate) completed_tasks: u64,
    pub(crate) in_progress_tasks: u64,
}

#[derive(Debug, Tabled)]
pub(crate) struct Metric {
    #[tabled(rename = "Metric")]
    pub(crate) name: &'static str,
    #[tabled(rename = "Count")]
    pub(crate) count: u64,
}

impl DashboardStats {
    pub(crate) fn metrics(&self) -> [Metric; 4] {
        [
            Metric {
                name: "Active Projects",
                count: self.active_projects,
            },
            Metric {
                name: "Tasks Due",
                count: self.tasks_due,
            },
            Metric {
                name: "Completed Tasks",
                count: self.completed_tasks,
            },
            Metric {
                name: "In Progress",
                count: self.in_progress_tasks,
            },
        ]
    }
}

/// One page of a listing.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page<T> {
    pub(crate) content: Vec<T>,
    #[serde(default)]
    pub(crate) total_pages: u32,
    #[serde(default)]
    pub(crate) number: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: vec![],
            total_pages: 0,
            number: 0,
        }
    }
}

impl<T> Page<T> {
    pub(crate) fn footer(&self) -> Option<String> {
        (self.total_pages > 1).then(|| {
            format!(
                "Page {} of {}",
                self.number.saturating_add(1),
                self.total_pages
            )
        })
    }
}

/// Some listings come back paged and some as a plain array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Paged(Page<T>),
    Plain(Vec<T>),
}

impl<T> From<Listing<T>> for Page<T> {
    fn from(value: Listing<T>) -> Self {
        match value {
            Listing::Paged(page) => page,
            Listing::Plain(content) => Self {
                content,
                total_pages: 1,
                number: 0,
            },
        }
    }
}

/// The calls needed to establish who the current user is.
#[async_trait]
pub(crate) trait Auth: Send + Sync {
    /// Sets the bearer token attached to every later request.
    fn set_token(&mut self, token: Option<SecretString>);

    async fn current_user(&self) -> Result<User>;

    async fn user(&self, id: Id) -> Result<User>;

    async fn login(&self, username: &str, password: &SecretString) -> Result<LoginResponse>;

    async fn signup(&self, req: &SignupRequest<'_>) -> Result<LoginResponse>;
}

#[async_trait]
pub(crate) trait Client: Auth {
    async fn dashboard_stats(&self) -> Result<DashboardStats>;
    async fn recent_projects(&self, page: u32, size: u32) -> Result<Page<Project>>;
    async fn recent_tasks(&self, page: u32, size: u32) -> Result<Page<Task>>;

    async fn projects(&self, page: u32, size: u32) -> Result<Page<Project>>;
    async fn project(&self, id: Id) -> Result<Project>;
    async fn create_project(&self, project: &NewProject) -> Result<Project>;
    async fn update_project(&self, id: Id, project: &NewProject) -> Result<()>;
    async fn delete_project(&self, id: Id) -> Result<()>;

    async fn tasks(&self, query: &TaskQuery) -> Result<Page<Task>>;
    async fn task(&self, id: Id) -> Result<Task>;
    async fn create_task(&self, task: &NewTask) -> Result<Task>;
    async fn update_task(&self, id: Id, task: &NewTask) -> Result<()>;
    async fn update_task_status(&self, id: Id, status: TaskStatus) -> Result<()>;
    async fn delete_task(&self, id: Id) -> Result<()>;

    async fn users(&self, page: u32, size: u32) -> Result<Page<User>>;
    async fn update_user(&self, id: Id, update: &UserUpdate) -> Result<User>;
    async fn update_user_roles(&self, id: Id, roles: &[String]) -> Result<()>;
    async fn delete_user(&self, id: Id) -> Result<()>;
}
