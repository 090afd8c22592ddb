//! Command handlers: logger init and one function per subcommand.

use std::error::Error;
use std::io::{self, Read};
use std::path::Path;

use chrono::{Local, TimeZone};

use chat_markup::core::completion::request_body;
use chat_markup::core::config::Config;
use chat_markup::core::history::{
    ChatStore, FileStore, append_message, chat_title, filter_chats, render_chat,
    searchable_content,
};
use chat_markup::core::message::{Format, Message, Role};
use chat_markup::core::render::{Body, MessageView, Renderer};
use chat_markup::core::{app, paths};

use crate::cli::{Args, ChatsSubcommand};

pub type CmdResult = Result<(), Box<dyn Error>>;

/// Initialize env_logger at the level selected by -v/-q. `RUST_LOG` overrides.
pub fn init_logger(args: &Args) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level()),
    )
    .try_init();
}

/// Read `-` from stdin, anything else as a literal value.
fn read_text_arg(text: &str) -> io::Result<String> {
    if text == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(text.to_string())
    }
}

fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        read_text_arg("-")
    } else {
        std::fs::read_to_string(path)
    }
}

fn print_view(view: &MessageView) {
    match &view.body {
        Body::Markup(html) => println!("{}", html.trim_end_matches('\n')),
        Body::PlainText(text) => println!("{}", text),
    }
}

fn format_timestamp(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Run the `render` command: render one message to stdout.
pub fn run_render(
    config: &Config,
    format: &str,
    role: Role,
    strict: bool,
    no_highlight: bool,
    input: &Path,
) -> CmdResult {
    let content = read_input(input)?;
    let config = Config {
        strict_escape: config.strict_escape || strict,
        highlight: config.highlight && !no_highlight,
        ..config.clone()
    };
    let renderer = Renderer::from_config(&config);
    let message = Message::new("", role, &content, Format::parse_lossy(format));
    print_view(&renderer.render_message(&message));
    Ok(())
}

/// Run a `chats` subcommand against the configured store.
pub fn run_chats(config: &Config, subcommand: ChatsSubcommand) -> CmdResult {
    let store = FileStore::open_default(config)?;
    match subcommand {
        ChatsSubcommand::List { query, limit } => chats_list(&store, query.as_deref(), limit),
        ChatsSubcommand::New { name } => {
            let name = name.unwrap_or_else(|| chat_title(""));
            let chat = store.create_chat(&name)?;
            println!("{}", chat.id);
            Ok(())
        }
        ChatsSubcommand::Show { id } => {
            let chat = store.get_chat(&id)?;
            println!("# {}", chat.name);
            for view in render_chat(&store, &Renderer::from_config(config), &id)? {
                println!("\n[{}]", view.role);
                print_view(&view);
            }
            Ok(())
        }
        ChatsSubcommand::Add {
            id,
            role,
            format,
            text,
        } => {
            let content = read_text_arg(&text)?;
            add_message(&store, &id, role, &content, format)?;
            Ok(())
        }
        ChatsSubcommand::Ask { id, text, format } => {
            add_message(&store, &id, Role::User, &text, Format::Text)?;
            let body = request_body(&config.model_id, &text, format);
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        ChatsSubcommand::Rename { id, name } => {
            let chat = store.rename_chat(&id, &name)?;
            println!("{}\t{}", chat.id, chat.name);
            Ok(())
        }
        ChatsSubcommand::Delete { ids } => {
            for id in ids {
                store.delete_chat(&id)?;
                println!("Deleted {}", id);
            }
            Ok(())
        }
    }
}

fn chats_list(store: &FileStore, query: Option<&str>, limit: Option<usize>) -> CmdResult {
    let chats = store.list_chats()?;
    let matched = match query {
        Some(q) => filter_chats(&chats, q, &searchable_content(store, &chats)),
        None => chats.iter().collect(),
    };
    let take = limit.unwrap_or(matched.len());
    for chat in matched.into_iter().take(take) {
        println!(
            "{}\t{}\t{}",
            chat.id,
            chat.name,
            format_timestamp(chat.timestamp)
        );
    }
    Ok(())
}

fn add_message(
    store: &FileStore,
    chat_id: &str,
    role: Role,
    content: &str,
    format: Format,
) -> CmdResult {
    let record = append_message(store, &Message::new(chat_id, role, content, format))?;
    println!("{}", record.id);
    Ok(())
}

/// Run the `config` command: display paths and resolved settings.
pub fn run_config(config: &Config) {
    let show = |p: Option<std::path::PathBuf>| {
        p.map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    println!("Version:   {} {}", app::NAME, app::VERSION);
    println!("Config:    {}", show(paths::config_dir()));
    println!("Chats:     {}", show(paths::data_dir(config)));
    println!("Model:     {}", config.model_id);
    println!("Escaping:  {:?}", config.escape_mode());
    println!(
        "Highlight: {}",
        if config.highlight {
            config.theme.as_str()
        } else {
            "off"
        }
    );
    println!(
        "Max chats: {}",
        if config.max_chats == 0 {
            "unlimited".to_string()
        } else {
            config.max_chats.to_string()
        }
    );
}
