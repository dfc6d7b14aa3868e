// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{error::Result, route::Route, session::Context};

use super::{current, print_page, print_table};

const DEFAULT_RECENT: u32 = 5;

/// Show project and task totals along with recent activity.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// How many recent projects and tasks to list.
    #[arg(long, default_value_t = DEFAULT_RECENT)]
    recent: u32,
}

impl Default for Command {
    fn default() -> Self {
        Self {
            recent: DEFAULT_RECENT,
        }
    }
}

#[async_trait]
impl super::Command for Command {
    fn route(&self) -> Option<Route> {
        Some(Route::Dashboard)
    }

    async fn execute(self, ctx: &mut Context) -> Result<()> {
        let username = current(ctx)?.username.clone();

        let stats = ctx.client().dashboard_stats().await;
        let stats = ctx.checked(stats).await?;
        let projects = ctx.client().recent_projects(0, self.recent).await;
        let projects = ctx.checked(projects).await?;
        let tasks = ctx.client().recent_tasks(0, self.recent).await;
        let tasks = ctx.checked(tasks).await?;

        println!("Welcome back, {username}!");
        print_table(stats.metrics());
        println!("Recent projects");
        print_page(projects, "No projects yet.");
        println!("Recent tasks");
        print_page(tasks, "No tasks yet.");
        Ok(())
    }
}
