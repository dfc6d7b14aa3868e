// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Parser, Subcommand};

use crate::{
    client::{Id, NewProject, TaskQuery, ROLE_PROJECT_MANAGER},
    error::Result,
    route::Route,
    session::Context,
};

use super::{print_page, print_table, report, require_role};

#[derive(Debug, Subcommand)]
enum Action {
    /// List projects.
    List {
        /// The page to show, starting from zero.
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// The number of projects per page.
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    /// Show a project and its tasks.
    Show { id: Id },
    /// Create a project. Only project managers may do this.
    Create {
        name: String,

        #[arg(long)]
        description: Option<String>,

        /// The start date, as YYYY-MM-DD.
        #[arg(long)]
        start: Option<String>,

        /// The end date, as YYYY-MM-DD.
        #[arg(long)]
        end: Option<String>,

        /// The ID of the user managing the project.
        #[arg(long)]
        manager: Option<Id>,
    },
    /// Change a project. Only project managers may do this; options left
    /// out keep their current values.
    Update {
        id: Id,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// The start date, as YYYY-MM-DD.
        #[arg(long)]
        start: Option<String>,

        /// The end date, as YYYY-MM-DD.
        #[arg(long)]
        end: Option<String>,

        /// The ID of the user managing the project.
        #[arg(long)]
        manager: Option<Id>,
    },
    /// Delete a project. Only project managers may do this.
    Delete { id: Id },
}

/// Work with projects.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[command(subcommand)]
    action: Action,
}

#[async_trait]
impl super::Command for Command {
    fn route(&self) -> Option<Route> {
        match self.action {
            Action::Show { id } => Some(Route::Project(id)),
            Action::List { .. }
            | Action::Create { .. }
            | Action::Update { .. }
            | Action::Delete { .. } => Some(Route::Projects),
        }
    }

    async fn execute(self, ctx: &mut Context) -> Result<()> {
        match self.action {
            Action::List { page, size } => {
                let projects = ctx.client().projects(page, size).await;
                print_page(ctx.checked(projects).await?, "No projects found.");
            }
            Action::Show { id } => {
                let project = ctx.client().project(id).await;
                print_table([ctx.checked(project).await?]);

                let query = TaskQuery {
                    page: 0,
                    size: 10,
                    project_id: Some(id),
                    ..TaskQuery::default()
                };
                let tasks = ctx.client().tasks(&query).await;
                println!("Project tasks");
                print_page(ctx.checked(tasks).await?, "No tasks in this project yet.");
            }
            Action::Create {
                name,
                description,
                start,
                end,
                manager,
            } => {
                let _ = require_role(
                    ctx,
                    ROLE_PROJECT_MANAGER,
                    "Only project managers can create projects",
                )?;
                let project = NewProject {
                    name,
                    description,
                    start_date: start,
                    end_date: end,
                    project_manager_id: manager,
                };
                let created = ctx.client().create_project(&project).await;
                let created = report(
                    ctx,
                    created,
                    "Project created successfully",
                    "Failed to save project",
                )
                .await?;
                print_table([created]);
            }
            Action::Update {
                id,
                name,
                description,
                start,
                end,
                manager,
            } => {
                let _ = require_role(
                    ctx,
                    ROLE_PROJECT_MANAGER,
                    "Only project managers can edit projects",
                )?;
                let current = ctx.client().project(id).await;
                let mut project = NewProject::from(ctx.checked(current).await?);
                project.name = name.unwrap_or(project.name);
                project.description = description.or(project.description);
                project.start_date = start.or(project.start_date);
                project.end_date = end.or(project.end_date);
                project.project_manager_id = manager.or(project.project_manager_id);

                let updated = ctx.client().update_project(id, &project).await;
                report(
                    ctx,
                    updated,
                    "Project updated successfully",
                    "Failed to save project",
                )
                .await?;
            }
            Action::Delete { id } => {
                let _ = require_role(
                    ctx,
                    ROLE_PROJECT_MANAGER,
                    "Only project managers can delete projects",
                )?;
                let deleted = ctx.client().delete_project(id).await;
                report(
                    ctx,
                    deleted,
                    "Project deleted successfully",
                    "Failed to delete project",
                )
                .await?;
            }
        }
        Ok(())
    }
}
