//! # Manual QA CLI (`mqa`)
//!
//! Question answering over technical manuals: ingest PDFs, ask questions
//! from the terminal, or serve the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! mqa --config ./config/mqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mqa init` | Create the SQLite database and schema |
//! | `mqa ingest <pdf>...` | Segment, embed and store one or more manuals |
//! | `mqa classify "<question>"` | Show the question type the classifier picks |
//! | `mqa ask "<question>"` | Answer one question |
//! | `mqa chat` | Interactive session with conversation memory |
//! | `mqa stats` | Summarise what is indexed |
//! | `mqa serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! mqa init
//! mqa ingest manuals/press-200.pdf --dry-run
//! mqa ingest manuals/*.pdf --progress json
//! mqa ask "What torque is required for the spindle bolts?"
//! mqa chat --session line-3
//! mqa serve
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use manual_qa::progress::ProgressMode;
use manual_qa::{ask, config, ingest, migrate, server, stats};
use manual_qa_core::intent::Intent;

/// Manual QA: grounded question answering over technical manuals.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/mqa.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "mqa",
    about = "Manual QA — grounded question answering over technical manuals",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/mqa.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent; running it again leaves existing data untouched.
    Init,

    /// Ingest one or more PDF manuals.
    ///
    /// Each manual is extracted page by page, segmented into safety,
    /// procedure, specification, troubleshooting and content chunks,
    /// embedded, and stored in a single transaction.
    Ingest {
        /// PDF files to ingest.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Extract and segment only; print chunk counts without embedding or writing.
        #[arg(long)]
        dry_run: bool,

        /// Progress on stderr: `human`, `json` or `off`.
        /// Defaults to `human` when stderr is a terminal.
        #[arg(long)]
        progress: Option<ProgressMode>,
    },

    /// Print the question type for a question.
    Classify {
        question: String,
    },

    /// Answer a single question.
    Ask {
        question: String,

        /// Session to read and extend. A fresh session is used when omitted.
        #[arg(long)]
        session: Option<String>,

        /// Override the question type (safety, procedure, troubleshooting,
        /// specification, definition, general).
        #[arg(long)]
        intent: Option<Intent>,
    },

    /// Interactive chat. `/clear` resets history, `/quit` exits.
    Chat {
        #[arg(long)]
        session: Option<String>,
    },

    /// Show database statistics.
    Stats,

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Classify { question } = &cli.command {
        ask::run_classify(question);
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest {
            paths,
            dry_run,
            progress,
        } => {
            let mode = progress.unwrap_or_else(ProgressMode::default_for_tty);
            ingest::run_ingest(&cfg, &paths, dry_run, mode).await?;
        }
        Commands::Classify { .. } => {}
        Commands::Ask {
            question,
            session,
            intent,
        } => {
            ask::run_ask(&cfg, &question, session, intent).await?;
        }
        Commands::Chat { session } => {
            ask::run_chat(&cfg, session).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
