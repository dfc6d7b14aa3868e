// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{error::Result, password, route::Route, session::Context};

/// Log in and remember the session for later commands.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The account to log in as. The password is prompted for.
    #[clap()]
    username: String,
}

#[async_trait]
impl super::Command for Command {
    fn route(&self) -> Option<Route> {
        Some(Route::Login)
    }

    async fn execute(self, ctx: &mut Context) -> Result<()> {
        let password = ctx.password(password::Request::login(&self.username)).await?;
        let identity = ctx.login(&self.username, &password).await?;
        println!("Logged in as {} ({})", identity.username, identity.roles);
        Ok(())
    }
}
