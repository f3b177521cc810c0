//! Bomflow CLI - BOM document processing and knowledge base curation.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Bomflow - BOM document processing and knowledge base curation
#[derive(Parser)]
#[command(name = "bomflow")]
#[command(version)]
#[command(about = "BOM document processing and knowledge base curation", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize bomflow (create config and database)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Submit a document for processing
    Upload {
        /// Path to the document (csv, tsv, txt, md, pdf)
        document: PathBuf,

        /// Workflow name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Comparison mode: kb_only or full
        #[arg(short, long, default_value = "kb_only")]
        mode: String,

        /// Item master spreadsheet (required for full mode)
        #[arg(long)]
        item_master: Option<PathBuf>,

        /// Show progress and the result summary
        #[arg(short, long)]
        wait: bool,
    },

    /// Process every document behind a shared-folder URL
    Batch {
        /// Shared folder URL
        url: String,

        /// Base name for the derived workflows
        #[arg(short, long)]
        name: String,

        /// Local mirror directory (overrides cloud.mirror_dir)
        #[arg(long)]
        mirror: Option<PathBuf>,
    },

    /// List workflows
    Workflows,

    /// Show one workflow's state
    Status {
        /// Workflow ID
        id: String,
    },

    /// Show a workflow's match results
    Results {
        /// Workflow ID
        id: String,

        /// Print the full payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Submit reviewed results from a JSON file
    Review {
        /// Workflow ID
        id: String,

        /// Path to the edited results JSON
        file: PathBuf,
    },

    /// Delete a workflow and its stored documents
    Delete {
        /// Workflow ID
        id: String,
    },

    /// Manage the knowledge base
    #[command(subcommand)]
    Kb(KbCommands),

    /// Show database statistics
    Stats,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Write a default config file
    Init,
}

#[derive(Subcommand)]
enum KbCommands {
    /// Search items by identifier or description
    Search {
        /// Search term
        term: String,

        /// Maximum results
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show knowledge base counts
    Stats,

    /// List items awaiting a decision
    Pending,

    /// Approve pending items
    Approve {
        /// Item IDs
        ids: Vec<String>,
    },

    /// Reject pending items
    Reject {
        /// Item IDs
        ids: Vec<String>,
    },

    /// Delete an item
    Delete {
        /// Item ID
        id: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bomflow=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bomflow=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Init => commands::config::init(),
        },
        Commands::Upload {
            document,
            name,
            mode,
            item_master,
            wait,
        } => commands::upload::run(&document, name, &mode, item_master, wait),
        Commands::Batch { url, name, mirror } => commands::batch::run(&url, &name, mirror),
        Commands::Workflows => commands::workflows::run(),
        Commands::Status { id } => commands::status::run(&id),
        Commands::Results { id, json } => commands::results::run(&id, json),
        Commands::Review { id, file } => commands::review::run(&id, &file),
        Commands::Delete { id } => commands::delete::run(&id),
        Commands::Kb(cmd) => match cmd {
            KbCommands::Search { term, limit } => commands::kb::search(&term, limit),
            KbCommands::Stats => commands::kb::stats(),
            KbCommands::Pending => commands::kb::pending(),
            KbCommands::Approve { ids } => commands::kb::approve(&ids),
            KbCommands::Reject { ids } => commands::kb::reject(&ids),
            KbCommands::Delete { id } => commands::kb::delete(&id),
        },
        Commands::Stats => commands::stats::run(),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
