//! Developer probe for `bookshelf_core`.
//!
//! # Responsibility
//! - Run catalog search and notification grouping over asset files.
//! - Print results as JSON so fixtures can be checked by hand.

use anyhow::Context as _;
use bookshelf_core::snapshot::read_notifications;
use bookshelf_core::{
    aggregate, init_logging, parse_timestamp, CatalogAction, CatalogSnapshot, CatalogState,
    LogLevel,
};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    /// Absolute directory for rolling log files; logging stays off when unset.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level used with `--log-dir`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage info.
    Ping,
    /// Search a book asset file.
    Search(SearchArgs),
    /// Group a notification asset file by day label.
    Notifications(NotificationsArgs),
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// JSON array of books.
    #[arg(long)]
    books: PathBuf,

    /// JSON array of chapters; an empty list is used when omitted.
    #[arg(long)]
    chapters: Option<PathBuf>,

    /// Search label, e.g. "tìm kiếm", "tác giả", "thể loại".
    #[arg(long = "type", default_value = "tìm kiếm")]
    search_type: String,

    #[arg(long)]
    keyword: String,
}

#[derive(Debug, Args)]
struct NotificationsArgs {
    /// JSON array of `{text, time}` events.
    #[arg(long)]
    file: PathBuf,

    /// Reference instant for the "today" label; defaults to the current time.
    #[arg(long)]
    now: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchOutput<'a> {
    search_type: Option<&'static str>,
    keyword: Option<&'a str>,
    results: &'a [bookshelf_core::BookRecord],
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or(LogLevel::default_for_build().as_str())
            .to_string();
        init_logging(&level, log_dir).context("init logging")?;
    }

    match cli.command {
        Command::Ping => {
            println!("bookshelf_core ping={}", bookshelf_core::ping());
            println!("bookshelf_core version={}", bookshelf_core::core_version());
        }
        Command::Search(args) => search(args)?,
        Command::Notifications(args) => notifications(args)?,
    }
    Ok(())
}

fn search(args: SearchArgs) -> anyhow::Result<()> {
    let snapshot = match &args.chapters {
        Some(chapters) => CatalogSnapshot::from_files(&args.books, chapters)?,
        None => {
            let books = std::fs::read_to_string(&args.books)
                .with_context(|| format!("read {}", args.books.display()))?;
            CatalogSnapshot::from_json(&books, "[]")?
        }
    };

    let state = CatalogState::new(snapshot).reduce(CatalogAction::SearchForBooks {
        search_type: args.search_type,
        keyword: Some(args.keyword),
    });

    let output = SearchOutput {
        search_type: state.search_type.map(|kind| kind.label()),
        keyword: state.search_keyword.as_deref(),
        results: &state.search_result_list,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn notifications(args: NotificationsArgs) -> anyhow::Result<()> {
    let now = match args.now.as_deref() {
        Some(raw) => parse_timestamp(raw).context("parse --now")?,
        None => Utc::now(),
    };
    let events = read_notifications(&args.file)?;
    let groups = aggregate(&events, now);
    println!("{}", serde_json::to_string_pretty(&groups)?);
    Ok(())
}
