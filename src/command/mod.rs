// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use log::error;
use tabled::{settings::Style, Table, Tabled};

use crate::{
    client::Page,
    error::{self, Result},
    notice::Notice,
    route::Route,
    session::{
        guard::{self, Decision},
        Context, Identity,
    },
};

pub(crate) mod dashboard;
pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod profile;
pub(crate) mod projects;
pub(crate) mod signup;
pub(crate) mod tasks;
pub(crate) mod users;

#[async_trait]
pub(crate) trait Command: Send {
    /// The route this view lives at. Views without one skip the guard.
    fn route(&self) -> Option<Route>;

    async fn execute(self, ctx: &mut Context) -> Result<()>;
}

/// Navigates to the view for `cmd` and runs whichever view the guard lets
/// through.
pub(crate) async fn run<C: Command>(cmd: C, ctx: &mut Context) -> Result<()> {
    let Some(requested) = cmd.route() else {
        return cmd.execute(ctx).await;
    };

    match ctx.navigate(requested) {
        route if route == requested => cmd.execute(ctx).await,
        Route::Dashboard => dashboard::Command::default().execute(ctx).await,
        Route::Login => {
            error!(
                "You need to log in to view {} (run `{} login <USERNAME>`)",
                requested,
                *crate::metadata::CLIENT_NAME
            );
            Err(error::Error::NotAuthenticated)
        }
        other => {
            error!("Navigation to {} ended at {}", requested, other);
            Err(error::Error::Command)
        }
    }
}

fn current(ctx: &Context) -> Result<&Identity> {
    ctx.identity().ok_or(error::Error::NotAuthenticated)
}

/// Checks a role for an action inside an already visible view.
fn require_role<'ctx>(ctx: &'ctx Context, role: &str, denial: &str) -> Result<&'ctx Identity> {
    match guard::check(ctx.identity(), Some(role)) {
        Decision::Render(identity) => Ok(identity),
        Decision::RedirectToLogin => Err(error::Error::NotAuthenticated),
        Decision::Deny => {
            ctx.notify(Notice::error(denial));
            Err(error::Error::Command)
        }
    }
}

/// Reports the outcome of a change to the backend as a notice.
async fn report<T: Send>(
    ctx: &mut Context,
    result: Result<T>,
    success: &str,
    failure: &str,
) -> Result<T> {
    let result = ctx.checked(result).await;
    match &result {
        Ok(_) => ctx.notify(Notice::success(success)),
        Err(e) if e.is_unauthorized() => {}
        Err(e) => ctx.notify(Notice::error(e.server_message().unwrap_or(failure))),
    }
    result
}

fn print_table<I>(rows: I)
where
    I: IntoIterator,
    I::Item: Tabled,
{
    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn print_page<T: Tabled>(page: Page<T>, empty: &str) {
    let footer = page.footer();
    if page.content.is_empty() {
        println!("{empty}");
    } else {
        print_table(page.content);
    }
    if let Some(footer) = footer {
        println!("{footer}");
    }
}
