//! # Main: CLI Entry Point
//!
//! Routes CLI subcommands to the execution functions in [`cli`]. Handles
//! shared concerns: environment loading, structured logging, and the
//! database connection options.
//!
//! ## Subcommands
//!
//! - `init`: create the schema (idempotent)
//! - `project create|list|show|delete`: project registry management
//! - `versions`: print a project's re-optimization history
//! - `delays`: print a project's delay log
//! - `inspect`: per-table counts and result-row distribution
//!
//! ## Global Options
//!
//! - `--database-url` / `DATABASE_URL`: PostgreSQL connection for result storage.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "replan",
    about = "Versioned storage for scheduling-optimization results"
)]
struct Cli {
    /// PostgreSQL connection URL (or set DATABASE_URL env var)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema (safe to run repeatedly)
    Init,
    /// Manage scheduling projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Print a project's re-optimization version history
    Versions {
        /// Project ID
        project_id: i64,
    },
    /// Print a project's delay log
    Delays {
        /// Project ID
        project_id: i64,
        /// Only show delays not yet consumed by a version
        #[arg(long)]
        pending: bool,
    },
    /// Summarize everything stored for a project
    Inspect {
        /// Project ID
        project_id: i64,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Register a new project
    Create {
        /// Unique project name
        #[arg(long)]
        name: String,
    },
    /// List all projects
    List,
    /// Show project details
    Show {
        /// Project ID
        project_id: i64,
    },
    /// Delete a project and everything stored for it
    Delete {
        /// Project ID
        project_id: i64,
        /// Confirm the deletion
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize structured logging: LOG_FORMAT=json for log collectors, human-readable otherwise
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    match &cli.command {
        Commands::Init => cli::run_init(&cli),
        Commands::Project { action } => cli::run_project(&cli, action),
        Commands::Versions { project_id } => cli::run_versions(&cli, *project_id),
        Commands::Delays {
            project_id,
            pending,
        } => cli::run_delays(&cli, *project_id, *pending),
        Commands::Inspect { project_id } => cli::run_inspect(&cli, *project_id),
    }
}
