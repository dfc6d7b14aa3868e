// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Parser, Subcommand};

use log::error;

use crate::{
    client::UserUpdate,
    error::{self, Result},
    password,
    route::Route,
    session::Context,
};

use super::{current, print_table, report};

#[derive(Debug, Subcommand)]
enum Action {
    /// Change your name, email address or password.
    Update {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Prompt for a new password.
        #[arg(long)]
        password: bool,
    },
}

/// Show the account you are logged in as.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[command(subcommand)]
    action: Option<Action>,
}

#[async_trait]
impl super::Command for Command {
    fn route(&self) -> Option<Route> {
        Some(Route::Profile)
    }

    async fn execute(self, ctx: &mut Context) -> Result<()> {
        let id = current(ctx)?.id;

        match self.action {
            None => {
                let user = ctx.client().user(id).await;
                print_table([ctx.checked(user).await?]);
            }
            Some(Action::Update {
                username,
                email,
                password: change_password,
            }) => {
                let mut update = UserUpdate {
                    username,
                    email,
                    password: None,
                };
                if change_password {
                    let name = current(ctx)?.username.clone();
                    update.password = Some(ctx.password(password::Request::signup(&name)).await?);
                }
                if update.is_empty() {
                    error!("Nothing to update; pass --username, --email or --password");
                    return Err(error::Error::Command);
                }

                let user = ctx.client().update_user(id, &update).await;
                let user = report(
                    ctx,
                    user,
                    "Profile updated successfully",
                    "Failed to update profile",
                )
                .await?;
                print_table([user]);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        client::fake::{user, Call, Fake},
        command,
        notice::recorder::Recorder,
        session::testing::{context, logged_in},
    };

    use super::*;

    #[tokio::test]
    async fn update_reports_success() -> Result<()> {
        let storage = logged_in(7);
        let client = Fake::default()
            .with_current_user(user(7, "ana", &[]))
            .with_user(user(7, "ana", &[]));
        let notices = Recorder::default();
        let mut ctx = context(&storage, &client, &notices).await;

        command::run(
            Command {
                action: Some(Action::Update {
                    username: None,
                    email: Some("ana@teamflow.test".to_owned()),
                    password: false,
                }),
            },
            &mut ctx,
        )
        .await?;

        assert_eq!(client.calls().last(), Some(&Call::View("update_user")));
        assert_eq!(
            notices.messages(),
            vec!["Profile updated successfully".to_owned()]
        );
        Ok(())
    }
}
