// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{error::Result, route::Route, session::Context};

/// Forget the stored session.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    fn route(&self) -> Option<Route> {
        None
    }

    async fn execute(self, ctx: &mut Context) -> Result<()> {
        ctx.logout().await
    }
}
