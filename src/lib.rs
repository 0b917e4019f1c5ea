#![allow(clippy::result_large_err)]

pub mod agent;
pub mod api;
mod cli;
mod commands;
pub mod config;
pub mod dates;
mod error;
pub mod input;
pub mod install;
pub mod markdown;
pub mod models;
pub mod output;
pub mod refs;
pub mod search;
pub mod session;
pub mod ui;
pub mod visibility;

pub use error::{Result, TwistError};

use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, WorkspaceCommand};
use crate::session::Session;
use crate::visibility::VisibilityPolicy;

const LOG_ENV: &str = "TW_LOG";

pub fn run() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.no_spinner {
        ui::disable_spinners();
    }

    let command = match cli.command {
        Command::Login { command } => return commands::login::run_login(command),
        Command::Skill { command } => return commands::skill::run_skill(command),
        Command::Completions(args) => return commands::run_completions(args),
        command => command,
    };

    let policy = if cli.include_private_channels {
        VisibilityPolicy::Fixed(true)
    } else {
        VisibilityPolicy::Process
    };
    let mut session = Session::connect(config::config_path())?.with_policy(policy);
    tracing::debug!(
        include_private = session.include_private_channels(),
        config = %session.config_path().display(),
        "session ready"
    );

    match command {
        Command::Workspaces(output) => commands::workspace::run_workspaces(&mut session, output),
        Command::Workspace {
            command: WorkspaceCommand::Use { reference },
        } => commands::workspace::run_workspace_use(&mut session, &reference),
        Command::User(output) => commands::user::run_user(&mut session, output),
        Command::Users(args) => commands::user::run_users(&mut session, args),
        Command::Channels(args) => commands::channel::run_channels(&mut session, args),
        Command::Inbox(args) => commands::inbox::run_inbox(&mut session, args),
        Command::Thread(args) => commands::thread::run_thread(&mut session, args),
        Command::Msg(args) => commands::msg::run_msg(&mut session, args),
        Command::Search(args) => commands::search::run_search(&mut session, args),
        Command::React(args) => commands::react::run_react(&mut session, args, true),
        Command::Unreact(args) => commands::react::run_react(&mut session, args, false),
        Command::Login { .. } | Command::Skill { .. } | Command::Completions(_) => Ok(()),
    }
}

/// Diagnostics go to stderr: `-v` forces debug, otherwise `TW_LOG` or warn.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug,hyper=warn,reqwest=warn,rustls=warn")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
