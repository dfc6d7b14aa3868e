// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::debug;
use secrecy::ExposeSecret as _;

use crate::{
    client::SignupRequest,
    error::Result,
    notice::Notice,
    password,
    route::Route,
    session::Context,
};

/// Create a new account. Log in with it afterwards.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The name to log in with.
    #[clap()]
    username: String,

    /// The email address for the account.
    #[clap()]
    email: String,

    /// The role to request for the account.
    #[arg(long, default_value = "member")]
    role: String,
}

#[async_trait]
impl super::Command for Command {
    fn route(&self) -> Option<Route> {
        Some(Route::Signup)
    }

    async fn execute(self, ctx: &mut Context) -> Result<()> {
        let password = ctx.password(password::Request::signup(&self.username)).await?;
        let req = SignupRequest {
            username: &self.username,
            email: &self.email,
            password: password.expose_secret(),
            role: vec![self.role.clone()],
        };

        match ctx.client().signup(&req).await {
            Ok(_) => {
                ctx.notify(Notice::success("Account created! Please log in."));
                Ok(())
            }
            Err(e) => {
                debug!("Signup for {} failed: {}", self.username, e);
                ctx.notify(Notice::error(e.server_message().unwrap_or("Signup failed")));
                Err(e)
            }
        }
    }
}
