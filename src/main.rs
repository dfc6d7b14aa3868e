// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    missing_doc_code_examples,
    private_doc_tests,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod client;
mod command;
mod error;
mod http;
mod metadata;
mod notice;
mod password;
mod route;
mod session;
mod storage;

use std::{path::PathBuf, process, time::Duration};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use error::Result;
use log::{error, warn};
use route::Route;
use session::{Context, Data};
use url::Url;

#[derive(Debug, Subcommand)]
enum Command {
    Login(command::login::Command),
    Signup(command::signup::Command),
    Logout(command::logout::Command),
    Dashboard(command::dashboard::Command),
    Projects(command::projects::Command),
    Tasks(command::tasks::Command),
    Users(command::users::Command),
    Profile(command::profile::Command),
}

#[async_trait]
impl command::Command for Command {
    fn route(&self) -> Option<Route> {
        match self {
            Self::Login(cmd) => cmd.route(),
            Self::Signup(cmd) => cmd.route(),
            Self::Logout(cmd) => cmd.route(),
            Self::Dashboard(cmd) => cmd.route(),
            Self::Projects(cmd) => cmd.route(),
            Self::Tasks(cmd) => cmd.route(),
            Self::Users(cmd) => cmd.route(),
            Self::Profile(cmd) => cmd.route(),
        }
    }

    async fn execute(self, ctx: &mut Context) -> Result<()> {
        match self {
            Self::Login(cmd) => cmd.execute(ctx).await,
            Self::Signup(cmd) => cmd.execute(ctx).await,
            Self::Logout(cmd) => cmd.execute(ctx).await,
            Self::Dashboard(cmd) => cmd.execute(ctx).await,
            Self::Projects(cmd) => cmd.execute(ctx).await,
            Self::Tasks(cmd) => cmd.execute(ctx).await,
            Self::Users(cmd) => cmd.execute(ctx).await,
            Self::Profile(cmd) => cmd.execute(ctx).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The base URL of the TeamFlow API.
    #[arg(long, env = "TEAMFLOW_URL", default_value = "http://localhost:8080/api/", value_parser = Url::parse)]
    url: Url,

    /// The base URL the dashboard endpoints are served from.
    #[arg(long, env = "TEAMFLOW_DASHBOARD_URL", default_value = "http://localhost:8080/", value_parser = Url::parse)]
    dashboard_url: Url,

    /// How long to wait for the server to answer a request, in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Keep the session in memory only, so every invocation starts logged
    /// out.
    #[arg(long)]
    no_persist_session: bool,

    /// Where to keep the session instead of the per-user data directory.
    #[arg(long, value_hint = clap::ValueHint::FilePath, conflicts_with = "no_persist_session")]
    session_file: Option<PathBuf>,

    /// The path to the Pinentry program to use when asking for a password.
    #[arg(long, value_hint = clap::ValueHint::ExecutablePath)]
    pinentry_program: Option<PathBuf>,

    /// The user to look up when a stored session no longer identifies
    /// anyone on its own.
    #[arg(long, default_value_t = session::DEFAULT_LAST_RESORT_USER_ID)]
    last_resort_user_id: client::Id,

    /// Never fall back to looking up a fixed user when restoring a session.
    #[arg(long)]
    no_last_resort_lookup: bool,

    #[clap(subcommand)]
    command: Command,
}

fn get_session_storage(args: &Args) -> Box<dyn storage::Storage<Data>> {
    if !args.no_persist_session {
        if let Some(path) = &args.session_file {
            return Box::new(storage::File::at(path));
        }

        if let Some(file_storage) = storage::File::new("session.json") {
            return Box::new(file_storage);
        }
        warn!("We could not find a data directory, so the session will not be remembered");
    }

    Box::new(storage::Memory::<Data>::new())
}

async fn run(args: Args) -> Result<()> {
    let prompt: Vec<Box<dyn password::Prompt>> = vec![
        Box::new(args.pinentry_program.clone().map_or_else(
            password::PinentryPrompt::new,
            password::PinentryPrompt::new_with_executable,
        )),
        Box::new(password::RpasswordPrompt),
    ];

    let client = http::Http::new(
        args.url.clone(),
        args.dashboard_url.clone(),
        Duration::from_secs(args.timeout),
    )?;

    let options = session::Options {
        last_resort_user_id: (!args.no_last_resort_lookup).then_some(args.last_resort_user_id),
    };

    let mut ctx = Context::start(
        get_session_storage(&args),
        Box::new(client),
        Box::new(notice::Terminal),
        Box::new(prompt),
        options,
    )
    .await;

    command::run(args.command, &mut ctx).await
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("TEAMFLOW_LOG", "warn")
        .write_style("TEAMFLOW_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}
