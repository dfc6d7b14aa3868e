// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Parser, Subcommand};

use crate::{
    client::{Id, NewTask, Priority, Task, TaskQuery, TaskStatus, ROLE_PROJECT_MANAGER},
    error::{self, Result},
    notice::Notice,
    route::Route,
    session::Context,
};

use super::{current, print_page, print_table, report, require_role};

#[derive(Debug, Subcommand)]
enum Action {
    /// List tasks, optionally filtered.
    List {
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,

        #[arg(long, value_enum)]
        priority: Option<Priority>,

        /// Only tasks assigned to this user ID.
        #[arg(long, conflicts_with = "mine")]
        assigned_to: Option<Id>,

        /// Only tasks assigned to you.
        #[arg(long)]
        mine: bool,

        /// Only tasks in this project.
        #[arg(long)]
        project: Option<Id>,

        /// The page to show, starting from zero.
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// The number of tasks per page.
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    /// Show a single task.
    Show { id: Id },
    /// Create a task.
    Create {
        title: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, value_enum, default_value_t = TaskStatus::ToDo)]
        status: TaskStatus,

        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,

        /// The due date, as YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        project: Option<Id>,

        /// The ID of the user to assign the task to.
        #[arg(long)]
        assign: Option<Id>,
    },
    /// Change a task. Project managers may change any task; everyone else
    /// only the tasks assigned to them. Options left out keep their current
    /// values.
    Update {
        id: Id,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, value_enum)]
        status: Option<TaskStatus>,

        #[arg(long, value_enum)]
        priority: Option<Priority>,

        /// The due date, as YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        project: Option<Id>,

        /// The ID of the user to assign the task to.
        #[arg(long)]
        assign: Option<Id>,
    },
    /// Move a task to another status. Project managers may change any task;
    /// everyone else only the tasks assigned to them.
    SetStatus {
        id: Id,
        #[arg(value_enum)]
        status: TaskStatus,
    },
    /// Delete a task. Only project managers may do this.
    Delete { id: Id },
}

/// Work with tasks.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[command(subcommand)]
    action: Action,
}

#[async_trait]
impl super::Command for Command {
    fn route(&self) -> Option<Route> {
        match self.action {
            Action::Show { id } => Some(Route::Task(id)),
            Action::List { .. }
            | Action::Create { .. }
            | Action::Update { .. }
            | Action::SetStatus { .. }
            | Action::Delete { .. } => Some(Route::Tasks),
        }
    }

    async fn execute(self, ctx: &mut Context) -> Result<()> {
        match self.action {
            Action::List {
                status,
                priority,
                assigned_to,
                mine,
                project,
                page,
                size,
            } => {
                let assigned_to_id = if mine {
                    Some(current(ctx)?.id)
                } else {
                    assigned_to
                };
                let query = TaskQuery {
                    page,
                    size,
                    status,
                    priority,
                    assigned_to_id,
                    project_id: project,
                };
                let tasks = ctx.client().tasks(&query).await;
                print_page(ctx.checked(tasks).await?, "No tasks found.");
            }
            Action::Show { id } => {
                let task = ctx.client().task(id).await;
                let task = ctx.checked(task).await?;
                if let Some(description) = &task.description {
                    println!("{description}");
                }
                print_table([task]);
            }
            Action::Create {
                title,
                description,
                status,
                priority,
                due,
                project,
                assign,
            } => {
                let task = NewTask {
                    title,
                    description,
                    status,
                    priority,
                    due_date: due,
                    project_id: project,
                    assigned_to_id: assign,
                };
                let created = ctx.client().create_task(&task).await;
                let created =
                    report(ctx, created, "Task created successfully", "Failed to save task")
                        .await?;
                print_table([created]);
            }
            Action::Update {
                id,
                title,
                description,
                status,
                priority,
                due,
                project,
                assign,
            } => {
                let mut task = NewTask::from(editable(ctx, id).await?);
                task.title = title.unwrap_or(task.title);
                task.description = description.or(task.description);
                task.status = status.unwrap_or(task.status);
                task.priority = priority.unwrap_or(task.priority);
                task.due_date = due.or(task.due_date);
                task.project_id = project.or(task.project_id);
                task.assigned_to_id = assign.or(task.assigned_to_id);

                let updated = ctx.client().update_task(id, &task).await;
                report(
                    ctx,
                    updated,
                    "Task updated successfully",
                    "Failed to update task",
                )
                .await?;
            }
            Action::SetStatus { id, status } => {
                let _ = editable(ctx, id).await?;
                let updated = ctx.client().update_task_status(id, status).await;
                report(
                    ctx,
                    updated,
                    "Task status updated successfully",
                    "Failed to update task status",
                )
                .await?;
            }
            Action::Delete { id } => {
                let _ = require_role(
                    ctx,
                    ROLE_PROJECT_MANAGER,
                    "Only project managers can delete tasks",
                )?;
                let deleted = ctx.client().delete_task(id).await;
                report(
                    ctx,
                    deleted,
                    "Task deleted successfully",
                    "Failed to delete task",
                )
                .await?;
            }
        }
        Ok(())
    }
}

/// Fetches a task the current user is allowed to change.
async fn editable(ctx: &mut Context, id: Id) -> Result<Task> {
    let (user_id, is_manager) = {
        let identity = current(ctx)?;
        (identity.id, identity.has_role(ROLE_PROJECT_MANAGER))
    };

    let task = ctx.client().task(id).await;
    let task = ctx.checked(task).await?;
    if !is_manager && task.assigned_to_id != Some(user_id) {
        ctx.notify(Notice::error("You can only edit tasks assigned to you"));
        return Err(error::Error::Command);
    }
    Ok(task)
}

#[cfg(test)]
mod tests {
    use crate::{
        client::{
            fake::{task, user, Call, Fake},
            ROLE_TEAM_MEMBER,
        },
        command,
        notice::recorder::Recorder,
        session::testing::{context, logged_in},
    };

    use super::*;

    fn set_status(id: Id) -> Command {
        Command {
            action: Action::SetStatus {
                id,
                status: TaskStatus::Done,
            },
        }
    }

    #[tokio::test]
    async fn assignee_may_change_status() -> Result<()> {
        let storage = logged_in(7);
        let client = Fake::default()
            .with_current_user(user(7, "ana", &[ROLE_TEAM_MEMBER]))
            .with_task(task(11, Some(7)));
        let notices = Recorder::default();
        let mut ctx = context(&storage, &client, &notices).await;

        command::run(set_status(11), &mut ctx).await?;

        assert_eq!(
            client.calls().last(),
            Some(&Call::View("update_task_status"))
        );
        assert_eq!(
            notices.messages(),
            vec!["Task status updated successfully".to_owned()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn others_may_not_change_status() {
        let storage = logged_in(7);
        let client = Fake::default()
            .with_current_user(user(7, "ana", &[ROLE_TEAM_MEMBER]))
            .with_task(task(12, Some(8)));
        let notices = Recorder::default();
        let mut ctx = context(&storage, &client, &notices).await;

        let result = command::run(set_status(12), &mut ctx).await;

        assert!(result.is_err());
        assert!(!client.calls().contains(&Call::View("update_task_status")));
        assert_eq!(
            notices.messages(),
            vec!["You can only edit tasks assigned to you".to_owned()]
        );
    }

    #[tokio::test]
    async fn managers_may_change_any_status() -> Result<()> {
        let storage = logged_in(2);
        let client = Fake::default()
            .with_current_user(user(2, "max", &[ROLE_PROJECT_MANAGER]))
            .with_task(task(12, None));
        let notices = Recorder::default();
        let mut ctx = context(&storage, &client, &notices).await;

        command::run(set_status(12), &mut ctx).await
    }

    fn retitle(id: Id) -> Command {
        Command {
            action: Action::Update {
                id,
                title: Some("Write release notes".to_owned()),
                description: None,
                status: None,
                priority: Some(Priority::High),
                due: None,
                project: None,
                assign: None,
            },
        }
    }

    #[tokio::test]
    async fn assignee_may_update_task() -> Result<()> {
        let storage = logged_in(7);
        let client = Fake::default()
            .with_current_user(user(7, "ana", &[ROLE_TEAM_MEMBER]))
            .with_task(task(11, Some(7)));
        let notices = Recorder::default();
        let mut ctx = context(&storage, &client, &notices).await;

        command::run(retitle(11), &mut ctx).await?;

        assert_eq!(client.calls().last(), Some(&Call::View("update_task")));
        assert_eq!(
            notices.messages(),
            vec!["Task updated successfully".to_owned()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn others_may_not_update_task() {
        let storage = logged_in(7);
        let client = Fake::default()
            .with_current_user(user(7, "ana", &[ROLE_TEAM_MEMBER]))
            .with_task(task(12, Some(8)));
        let notices = Recorder::default();
        let mut ctx = context(&storage, &client, &notices).await;

        let result = command::run(retitle(12), &mut ctx).await;

        assert!(result.is_err());
        assert!(!client.calls().contains(&Call::View("update_task")));
        assert_eq!(
            notices.messages(),
            vec!["You can only edit tasks assigned to you".to_owned()]
        );
    }

    #[test]
    fn update_keeps_fields_not_given() {
        let mut current = task(11, Some(7));
        current.project_id = Some(3);
        let changed = NewTask::from(current);
        assert_eq!(changed.project_id, Some(3));
        assert_eq!(changed.assigned_to_id, Some(7));
        assert_eq!(changed.status, TaskStatus::ToDo);
    }

    #[tokio::test]
    async fn rejected_token_ends_the_session() {
        let storage = logged_in(7);
        let client = Fake::default()
            .with_current_user(user(7, "ana", &[]))
            .rejecting_views();
        let notices = Recorder::default();
        let mut ctx = context(&storage, &client, &notices).await;

        let result = command::run(
            Command {
                action: Action::Delete { id: 1 },
            },
            &mut ctx,
        )
        .await;

        // Members are stopped before the backend is asked.
        assert!(result.is_err());
        assert_eq!(ctx.identity().map(|i| i.id), Some(7));

        let result = command::run(
            Command {
                action: Action::Show { id: 1 },
            },
            &mut ctx,
        )
        .await;

        assert!(matches!(result, Err(ref e) if e.is_unauthorized()));
        assert_eq!(ctx.identity(), None);
        assert_eq!(
            notices.messages().last().map(String::as_str),
            Some(crate::notice::SESSION_EXPIRED)
        );
    }
}
