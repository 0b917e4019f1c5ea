use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::api::ReactionTarget;
use crate::output::Format;
use crate::search::SearchType;

/// CLI argument parser definition.
#[derive(Parser)]
#[command(
    name = "tw",
    version,
    about = "Twist messaging from the command line",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Include threads and results from private channels
    #[arg(long = "include-private-channels", global = true)]
    pub include_private_channels: bool,
    /// Disable loading animations
    #[arg(long = "no-spinner", global = true)]
    pub no_spinner: bool,
    /// Print debug logs to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Authenticate with Twist")]
    Login {
        #[command(subcommand)]
        command: LoginCommand,
    },
    #[command(about = "List all workspaces")]
    Workspaces(OutputArgs),
    #[command(about = "Manage the current workspace")]
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommand,
    },
    #[command(about = "Show current user info")]
    User(OutputArgs),
    #[command(about = "List users in a workspace")]
    Users(UsersArgs),
    #[command(about = "List channels in a workspace")]
    Channels(ChannelsArgs),
    #[command(about = "Show inbox threads")]
    Inbox(InboxArgs),
    #[command(about = "Thread operations")]
    Thread(ThreadArgs),
    #[command(about = "Conversation (DM/group) operations")]
    Msg(MsgArgs),
    #[command(about = "Search content across a workspace")]
    Search(SearchArgs),
    #[command(about = "Add an emoji reaction")]
    React(ReactArgs),
    #[command(about = "Remove an emoji reaction")]
    Unreact(ReactArgs),
    #[command(about = "Manage agent skill integrations")]
    Skill {
        #[command(subcommand)]
        command: SkillCommand,
    },
    #[command(aliases = ["completion"], about = "Generate shell completion scripts")]
    Completions(CompletionsArgs),
}

/// `--json`, `--ndjson` and `--full`.
#[derive(Args, Clone, Copy, Debug, Default)]
pub struct OutputArgs {
    /// Output as JSON
    #[arg(long, conflicts_with = "ndjson")]
    pub json: bool,
    /// Output as newline-delimited JSON
    #[arg(long)]
    pub ndjson: bool,
    /// Include all fields in JSON output
    #[arg(long)]
    pub full: bool,
}

impl OutputArgs {
    pub fn format(&self) -> Format {
        Format::from_flags(self.json, self.ndjson)
    }
}

/// Workspace given positionally or via `--workspace`.
#[derive(Args, Clone, Debug, Default)]
pub struct WorkspaceSelector {
    #[arg(value_name = "WORKSPACE_REF")]
    pub workspace_ref: Option<String>,
    /// Workspace ID, URL or name
    #[arg(long = "workspace", value_name = "REF")]
    pub workspace: Option<String>,
}

#[derive(Subcommand)]
pub enum LoginCommand {
    #[command(about = "Save API token to config file")]
    Token { token: String },
}

#[derive(Subcommand)]
pub enum WorkspaceCommand {
    #[command(about = "Set the current workspace")]
    Use {
        #[arg(value_name = "WORKSPACE_REF")]
        reference: String,
    },
}

/// Arguments for `tw users`.
#[derive(Args, Clone)]
pub struct UsersArgs {
    #[command(flatten)]
    pub selector: WorkspaceSelector,
    /// Filter by name or email
    #[arg(long)]
    pub search: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `tw channels`.
#[derive(Args, Clone)]
pub struct ChannelsArgs {
    #[command(flatten)]
    pub selector: WorkspaceSelector,
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `tw inbox`.
#[derive(Args, Clone)]
pub struct InboxArgs {
    #[command(flatten)]
    pub selector: WorkspaceSelector,
    /// Filter by channel name (fuzzy match)
    #[arg(long, value_name = "FILTER")]
    pub channel: Option<String>,
    /// Only show unread threads
    #[arg(long)]
    pub unread: bool,
    /// Threads newer than this date
    #[arg(long, value_name = "DATE")]
    pub since: Option<String>,
    /// Threads older than this date
    #[arg(long, value_name = "DATE")]
    pub until: Option<String>,
    /// Max items
    #[arg(long, default_value_t = 50)]
    pub limit: u32,
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `tw thread`. A bare reference views the thread.
#[derive(Args, Clone)]
#[command(args_conflicts_with_subcommands = true, arg_required_else_help = true)]
pub struct ThreadArgs {
    #[command(subcommand)]
    pub command: Option<ThreadCommand>,
    #[arg(value_name = "THREAD_REF")]
    pub reference: Option<String>,
    #[command(flatten)]
    pub view: ThreadViewOptions,
}

#[derive(Subcommand, Clone)]
pub enum ThreadCommand {
    #[command(about = "Display a thread with its comments")]
    View {
        #[arg(value_name = "THREAD_REF")]
        reference: String,
        #[command(flatten)]
        options: ThreadViewOptions,
    },
    #[command(about = "Post a comment to a thread")]
    Reply {
        #[arg(value_name = "THREAD_REF")]
        reference: String,
        content: Option<String>,
        /// EVERYONE, EVERYONE_IN_THREAD, or comma-separated user IDs
        #[arg(long, default_value = "EVERYONE_IN_THREAD")]
        notify: String,
        /// Show what would be posted without posting
        #[arg(long)]
        dry_run: bool,
    },
    #[command(about = "Archive a thread (mark as done)")]
    Done {
        #[arg(value_name = "THREAD_REF")]
        reference: String,
        /// Show what would happen without executing
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct ThreadViewOptions {
    /// Show only a specific comment
    #[arg(long, value_name = "ID")]
    pub comment: Option<String>,
    /// Show only unread comments (with original post for context)
    #[arg(long)]
    pub unread: bool,
    /// Include N read comments before unread (use with --unread)
    #[arg(long, default_value_t = 0)]
    pub context: usize,
    /// Max comments to show
    #[arg(long, default_value_t = 50)]
    pub limit: u32,
    /// Comments newer than this date
    #[arg(long, value_name = "DATE")]
    pub since: Option<String>,
    /// Comments older than this date
    #[arg(long, value_name = "DATE")]
    pub until: Option<String>,
    /// Show raw markdown instead of rendered
    #[arg(long)]
    pub raw: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `tw msg`. A bare reference views the conversation.
#[derive(Args, Clone)]
#[command(args_conflicts_with_subcommands = true, arg_required_else_help = true)]
pub struct MsgArgs {
    #[command(subcommand)]
    pub command: Option<MsgCommand>,
    #[arg(value_name = "CONVERSATION_REF")]
    pub reference: Option<String>,
    #[command(flatten)]
    pub view: MsgViewOptions,
}

#[derive(Subcommand, Clone)]
pub enum MsgCommand {
    #[command(about = "List unread conversations")]
    Unread {
        #[command(flatten)]
        selector: WorkspaceSelector,
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "Display a conversation with its messages")]
    View {
        #[arg(value_name = "CONVERSATION_REF")]
        reference: String,
        #[command(flatten)]
        options: MsgViewOptions,
    },
    #[command(about = "Send a message in a conversation")]
    Reply {
        #[arg(value_name = "CONVERSATION_REF")]
        reference: String,
        content: Option<String>,
        /// Show what would be sent without sending
        #[arg(long)]
        dry_run: bool,
    },
    #[command(about = "Archive a conversation")]
    Done {
        #[arg(value_name = "CONVERSATION_REF")]
        reference: String,
        /// Show what would happen without executing
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct MsgViewOptions {
    /// Max messages to show
    #[arg(long, default_value_t = 50)]
    pub limit: u32,
    /// Messages newer than this date
    #[arg(long, value_name = "DATE")]
    pub since: Option<String>,
    /// Messages older than this date
    #[arg(long, value_name = "DATE")]
    pub until: Option<String>,
    /// Show raw markdown instead of rendered
    #[arg(long)]
    pub raw: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `tw search`.
#[derive(Args, Clone)]
pub struct SearchArgs {
    pub query: String,
    #[command(flatten)]
    pub selector: WorkspaceSelector,
    /// Filter by channels (comma-separated IDs)
    #[arg(long, value_name = "CHANNEL_REFS")]
    pub channel: Option<String>,
    /// Filter by author (comma-separated IDs or names)
    #[arg(long, value_name = "USER_REFS")]
    pub author: Option<String>,
    /// Messages sent to these users (comma-separated IDs or names)
    #[arg(long, value_name = "USER_REFS")]
    pub to: Option<String>,
    /// Filter by result type
    #[arg(long = "type", value_enum)]
    pub kind: Option<SearchType>,
    /// Search in thread titles only
    #[arg(long)]
    pub title_only: bool,
    /// Limit to conversations (comma-separated IDs)
    #[arg(long, value_name = "CONVERSATION_REFS")]
    pub conversation: Option<String>,
    /// Only results mentioning the current user
    #[arg(long)]
    pub mention_me: bool,
    /// Content from this date
    #[arg(long, value_name = "DATE")]
    pub since: Option<String>,
    /// Content until this date
    #[arg(long, value_name = "DATE")]
    pub until: Option<String>,
    /// Max results
    #[arg(long, default_value_t = 50)]
    pub limit: u32,
    /// Pagination cursor
    #[arg(long)]
    pub cursor: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `tw react` and `tw unreact`.
#[derive(Args, Clone)]
pub struct ReactArgs {
    #[arg(value_enum)]
    pub target: ReactionTarget,
    #[arg(value_name = "TARGET_REF")]
    pub reference: String,
    /// Emoji or shortcode such as +1, heart or rocket
    pub emoji: String,
    /// Show what would happen without executing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum SkillCommand {
    #[command(about = "List available agents and install status")]
    List {
        /// Check the project directory instead of the home directory
        #[arg(long)]
        local: bool,
    },
    #[command(about = "Install the skill for an agent")]
    Install {
        agent: String,
        /// Install into the project directory
        #[arg(long)]
        local: bool,
        /// Overwrite an existing installation
        #[arg(long)]
        force: bool,
    },
    #[command(about = "Uninstall the skill for an agent")]
    Uninstall {
        agent: String,
        /// Uninstall from the project directory
        #[arg(long)]
        local: bool,
    },
}

/// Arguments for `tw completions`.
#[derive(Args, Clone)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("parse")
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_thread_reference_views() {
        let cli = parse(&["tw", "thread", "123", "--unread", "--context", "2"]);
        let Command::Thread(args) = cli.command else {
            panic!("expected thread");
        };
        assert!(args.command.is_none());
        assert_eq!(args.reference.as_deref(), Some("123"));
        assert!(args.view.unread);
        assert_eq!(args.view.context, 2);
    }

    #[test]
    fn thread_reply_takes_notify() {
        let cli = parse(&["tw", "thread", "reply", "id:5", "hello", "--notify", "EVERYONE"]);
        let Command::Thread(args) = cli.command else {
            panic!("expected thread");
        };
        match args.command {
            Some(ThreadCommand::Reply {
                reference,
                content,
                notify,
                dry_run,
            }) => {
                assert_eq!(reference, "id:5");
                assert_eq!(content.as_deref(), Some("hello"));
                assert_eq!(notify, "EVERYONE");
                assert!(!dry_run);
            }
            _ => panic!("expected reply"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["tw", "channels", "--include-private-channels", "--json"]);
        assert!(cli.include_private_channels);
        let Command::Channels(args) = cli.command else {
            panic!("expected channels");
        };
        assert_eq!(args.output.format(), Format::Json);
    }

    #[test]
    fn rejects_unknown_reaction_target() {
        assert!(Cli::try_parse_from(["tw", "react", "channel", "1", "+1"]).is_err());
        let cli = parse(&["tw", "react", "comment", "1", "+1"]);
        let Command::React(args) = cli.command else {
            panic!("expected react");
        };
        assert_eq!(args.target, ReactionTarget::Comment);
    }
}
