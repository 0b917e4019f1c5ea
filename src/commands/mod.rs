//! Command handlers, one module per command group.

use std::collections::HashMap;
use std::io;

use clap_complete::generate;

use crate::api::TwistClient;
use crate::cli::{CompletionsArgs, WorkspaceSelector};
use crate::dates::parse_date;
use crate::error::{Result, TwistError};
use crate::session::Session;

pub mod channel;
pub mod inbox;
pub mod login;
pub mod msg;
pub mod react;
pub mod search;
pub mod skill;
pub mod thread;
pub mod user;
pub mod workspace;

/// Prints shell completion scripts to stdout.
pub fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    let mut cmd = crate::cli::Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, bin_name, &mut io::stdout());
    Ok(())
}

fn selected_workspace(session: &mut Session, selector: &WorkspaceSelector) -> Result<u64> {
    session.workspace_id_for(selector.workspace_ref.as_deref(), selector.workspace.as_deref())
}

/// Display names of every member of a workspace.
fn user_names(client: &TwistClient, workspace_id: u64) -> Result<HashMap<u64, String>> {
    Ok(client
        .workspace_users(workspace_id)?
        .into_iter()
        .map(|user| (user.id, user.name))
        .collect())
}

fn display_name(names: &HashMap<u64, String>, user_id: u64) -> String {
    names
        .get(&user_id)
        .cloned()
        .unwrap_or_else(|| format!("user:{user_id}"))
}

/// Parses an optional `--since`/`--until` value into epoch seconds.
fn parse_date_flag(flag: &str, value: Option<&str>) -> Result<Option<i64>> {
    value
        .map(|raw| {
            parse_date(raw)
                .map(|ts| ts.as_second())
                .ok_or_else(|| TwistError::Message(format!("Invalid date for {flag}: {raw}")))
        })
        .transpose()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_users_get_placeholders() {
        let names = HashMap::from([(1, "Ana".to_string())]);
        assert_eq!(display_name(&names, 1), "Ana");
        assert_eq!(display_name(&names, 2), "user:2");
    }

    #[test]
    fn parses_date_flags() {
        assert_eq!(
            parse_date_flag("--since", Some("2024-01-01")).expect("date"),
            Some(1_704_067_200)
        );
        assert_eq!(parse_date_flag("--since", None).expect("none"), None);
        assert!(parse_date_flag("--until", Some("soon")).is_err());
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("héllo wörld", 7), "héllo w");
        assert_eq!(truncate("hi", 50), "hi");
    }
}
