//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

use chat_markup::core::message::{Format, Role};

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  chat-markup render notes.md               Render a markdown file to markup
  echo '{\"a\":1}' | chat-markup render -f json
  chat-markup chats new \"Rust questions\"    Create a chat
  chat-markup chats add <ID> -f code -      Store a message read from stdin
  chat-markup chats show <ID>               Re-render a stored chat
  chat-markup chats list --query rust       Search chats by name or content
  chat-markup config                        Show paths and settings
  chat-markup completions bash              Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Render chat-model output (text, markdown, code, JSON) to markup and manage chat history",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render one message and print its markup
    Render {
        /// Declared format: text, markdown, code or json (unknown labels render as markdown)
        #[arg(short, long, default_value = "markdown")]
        format: String,
        /// Message author
        #[arg(short, long, default_value = "assistant")]
        role: Role,
        /// Keep model text escaped in the markup
        #[arg(long)]
        strict: bool,
        /// Skip syntax highlighting of code blocks
        #[arg(long)]
        no_highlight: bool,
        /// Input file, or '-' for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
    },
    /// Manage stored chats
    Chats {
        #[command(subcommand)]
        subcommand: ChatsSubcommand,
    },
    /// Show data paths and resolved settings
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ChatsSubcommand {
    /// List chats, newest first
    List {
        /// Filter by name, id or message content
        #[arg(long)]
        query: Option<String>,
        /// Maximum number of chats to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Create a chat
    New {
        /// Chat name (named after its first message when omitted)
        name: Option<String>,
    },
    /// Re-render every message of a chat
    Show {
        id: String,
    },
    /// Store a message in a chat
    Add {
        id: String,
        #[arg(short, long, default_value = "user")]
        role: Role,
        #[arg(short, long, default_value = "text")]
        format: Format,
        /// Message text, or '-' for stdin
        #[arg(default_value = "-")]
        text: String,
    },
    /// Store a user message and print the completion request it would send
    Ask {
        id: String,
        text: String,
        /// Format to request the reply in
        #[arg(short, long, default_value = "markdown")]
        format: Format,
    },
    /// Rename a chat
    Rename {
        id: String,
        name: String,
    },
    /// Delete chats and their messages
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn render_defaults() {
        let args = Args::try_parse_from(["chat-markup", "render"]).unwrap();
        match args.command {
            Commands::Render {
                format,
                role,
                strict,
                input,
                ..
            } => {
                assert_eq!(format, "markdown");
                assert_eq!(role, Role::Assistant);
                assert!(!strict);
                assert_eq!(input, PathBuf::from("-"));
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn chats_add_parses_role_and_format() {
        let args = Args::try_parse_from([
            "chat-markup", "chats", "add", "abc", "--role", "bot", "--format", "json", "{}",
        ])
        .unwrap();
        match args.command {
            Commands::Chats {
                subcommand: ChatsSubcommand::Add { role, format, text, .. },
            } => {
                assert_eq!(role, Role::Assistant);
                assert_eq!(format, Format::Json);
                assert_eq!(text, "{}");
            }
            _ => panic!("expected chats add"),
        }
    }

    #[test]
    fn log_level_from_flags() {
        let quiet = Args::try_parse_from(["chat-markup", "-q", "config"]).unwrap();
        assert_eq!(quiet.log_level(), "error");
        let debug = Args::try_parse_from(["chat-markup", "config", "-vv"]).unwrap();
        assert_eq!(debug.log_level(), "debug");
        let default = Args::try_parse_from(["chat-markup", "config"]).unwrap();
        assert_eq!(default.log_level(), "warn");
    }
}
