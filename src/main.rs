//! # chat-markup
//!
//! Command-line front end for the rendering core: render a single message, or manage
//! and re-render stored chats.

mod cli;
mod run;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use chat_markup::core::config;

use crate::cli::{Args, Commands};

fn main() {
    dotenv().ok();
    let args = Args::parse();
    run::init_logger(&args);

    let config = config::load().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let result = match args.command {
        Commands::Render {
            format,
            role,
            strict,
            no_highlight,
            input,
        } => run::run_render(&config, &format, role, strict, no_highlight, &input),
        Commands::Chats { subcommand } => run::run_chats(&config, subcommand),
        Commands::Config => {
            run::run_config(&config);
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = Args::command();
            let name = cmd.get_name().to_string();
            cli::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
