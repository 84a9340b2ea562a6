mod book;
mod commands;
mod config;
mod error;
mod lookup;
mod scan_state;
mod search;
mod store;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::{AddArgs, ScanArgs};
use config::AppConfig;

#[derive(Parser)]
#[command(name = "book-catalog", version, about = "Personal book catalog with ISBN scanning")]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all books, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a book
    Add(AddArgs),
    /// Delete a book by id
    Delete { id: String },
    /// Search by title, author or both
    Search {
        term: String,
        /// all, title or author
        #[arg(long, default_value = "all")]
        by: String,
        #[arg(long)]
        json: bool,
    },
    /// List authors, or complete one from a prefix
    Authors {
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Look up title and author for an ISBN
    Lookup { isbn: String },
    /// Scan an ISBN from camera frames
    Scan(ScanArgs),
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Command::List { json } => commands::list(&config, json),
        Command::Add(args) => commands::add(&config, args),
        Command::Delete { id } => commands::delete(&config, &id),
        Command::Search { term, by, json } => commands::search(&config, &term, &by, json),
        Command::Authors { prefix } => commands::authors(&config, prefix.as_deref()),
        Command::Lookup { isbn } => commands::lookup(&config, &isbn),
        Command::Scan(args) => commands::scan(&config, args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("command failed: {:?}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
