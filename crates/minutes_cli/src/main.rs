//! `minutes` command-line entry point.
//!
//! # Responsibility
//! - Parse commands and load configuration.
//! - Open the store and hand off to `commands`; all invariants live in core.

mod commands;
mod terminal;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use minutes_core::MinutesConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "minutes",
    version,
    about = "Record, edit and export meeting minutes"
)]
struct Cli {
    /// Config file (defaults to $MINUTES_CONFIG, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List meetings, most recent first.
    List {
        /// Case-insensitive match on title or date.
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Show one meeting with its row ids.
    Show { id: String },
    /// Create a meeting.
    New(NewArgs),
    /// Edit a stored meeting.
    Edit(EditArgs),
    /// Delete a meeting.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Export a meeting to `<title>.pdf`.
    Export {
        id: String,
        /// Output directory (defaults to the configured export dir).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Show { .. } => "show",
            Self::New(_) => "new",
            Self::Edit(_) => "edit",
            Self::Delete { .. } => "delete",
            Self::Export { .. } => "export",
        }
    }
}

#[derive(Args, Default)]
pub struct FieldArgs {
    #[arg(long)]
    pub title: Option<String>,
    /// `YYYY-MM-DDTHH:MM`.
    #[arg(long)]
    pub date: Option<String>,
    /// Comma-separated names.
    #[arg(long)]
    pub attendees: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub decisions: Option<String>,
}

#[derive(Args)]
pub struct NewArgs {
    #[command(flatten)]
    pub fields: FieldArgs,
    /// Agenda row as `Title|Duration`; repeatable.
    #[arg(long = "agenda")]
    pub agenda: Vec<String>,
    /// Action row as `Task|Owner|Due`; repeatable.
    #[arg(long = "action")]
    pub actions: Vec<String>,
    #[arg(long)]
    pub finalized: bool,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: String,
    #[command(flatten)]
    pub fields: FieldArgs,
    /// `Title|Duration`; repeatable.
    #[arg(long)]
    pub add_agenda: Vec<String>,
    /// Agenda row id; repeatable.
    #[arg(long)]
    pub remove_agenda: Vec<String>,
    /// `Task|Owner|Due`; repeatable.
    #[arg(long)]
    pub add_action: Vec<String>,
    /// Action row id; repeatable.
    #[arg(long)]
    pub remove_action: Vec<String>,
    /// Action row id whose completed flag flips; repeatable.
    #[arg(long)]
    pub toggle_action: Vec<String>,
    /// `draft` or `finalized`.
    #[arg(long)]
    pub status: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MinutesConfig::load(path),
        None => MinutesConfig::load_default(),
    }
    .context("failed to load configuration")?;

    if let Err(err) = minutes_core::init_logging(&config.log_level, &config.log_dir()) {
        eprintln!("warning: file logging disabled: {err}");
    }

    log::info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    let conn = minutes_core::db::open_db(config.database_path())
        .with_context(|| format!("failed to open {}", config.database_path().display()))?;
    let mut store = commands::open_store(&conn, &config)?;

    match cli.command {
        Commands::List { search } => commands::list(&store, search.as_deref().unwrap_or("")),
        Commands::Show { id } => commands::show(&store, &id),
        Commands::New(args) => commands::create(&mut store, args),
        Commands::Edit(args) => commands::edit(&mut store, args),
        Commands::Delete { id, yes } => commands::delete(&mut store, &id, yes),
        Commands::Export { id, out } => commands::export(&store, &config, &id, out),
    }
}
