// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Parser, Subcommand};

use log::error;
use secrecy::ExposeSecret as _;

use crate::{
    client::{Id, SignupRequest, UserUpdate, ROLE_TEAM_MEMBER},
    error::{self, Result},
    password,
    route::Route,
    session::Context,
};

use super::{print_page, print_table, report};

#[derive(Debug, Subcommand)]
enum Action {
    /// List users.
    List {
        /// The page to show, starting from zero.
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// The number of users per page.
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    /// Create an account for someone else. Their password is prompted for.
    Create {
        username: String,

        email: String,

        /// A role to grant. Repeat for several roles.
        #[arg(long = "role", default_value = ROLE_TEAM_MEMBER)]
        roles: Vec<String>,
    },
    /// Change a user's name, email address or password.
    Update {
        id: Id,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Prompt for a new password.
        #[arg(long)]
        password: bool,
    },
    /// Replace the roles granted to a user.
    SetRoles {
        id: Id,
        /// Role names such as ROLE_TEAM_MEMBER or ROLE_PROJECT_MANAGER.
        #[arg(required = true)]
        roles: Vec<String>,
    },
    /// Delete a user.
    Delete { id: Id },
}

/// Manage users. Only project managers may open this view.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[command(subcommand)]
    action: Action,
}

#[async_trait]
impl super::Command for Command {
    fn route(&self) -> Option<Route> {
        Some(Route::Users)
    }

    async fn execute(self, ctx: &mut Context) -> Result<()> {
        match self.action {
            Action::List { page, size } => {
                let users = ctx.client().users(page, size).await;
                print_page(ctx.checked(users).await?, "No users found.");
            }
            Action::Create {
                username,
                email,
                roles,
            } => {
                let password = ctx.password(password::Request::signup(&username)).await?;
                let req = SignupRequest {
                    username: &username,
                    email: &email,
                    password: password.expose_secret(),
                    role: roles,
                };
                let created = ctx.client().signup(&req).await;
                let _ = report(
                    ctx,
                    created,
                    "User created successfully",
                    "Failed to create user",
                )
                .await?;
            }
            Action::Update {
                id,
                username,
                email,
                password: change_password,
            } => {
                let mut update = UserUpdate {
                    username,
                    email,
                    password: None,
                };
                if change_password {
                    let name = update.username.clone().unwrap_or_else(|| format!("user {id}"));
                    update.password = Some(ctx.password(password::Request::signup(&name)).await?);
                }
                if update.is_empty() {
                    error!("Nothing to update; pass --username, --email or --password");
                    return Err(error::Error::Command);
                }

                let updated = ctx.client().update_user(id, &update).await;
                let updated = report(
                    ctx,
                    updated,
                    "User updated successfully",
                    "Failed to update user",
                )
                .await?;
                print_table([updated]);
            }
            Action::SetRoles { id, roles } => {
                let updated = ctx.client().update_user_roles(id, &roles).await;
                report(
                    ctx,
                    updated,
                    "User roles updated successfully",
                    "Failed to update roles",
                )
                .await?;
            }
            Action::Delete { id } => {
                let deleted = ctx.client().delete_user(id).await;
                report(
                    ctx,
                    deleted,
                    "User deleted successfully",
                    "Failed to delete user",
                )
                .await?;
            }
        }
        Ok(())
    }
}
