//! # Gradebook CLI Module
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize a new database
//! - `add-student` - Add a student
//! - `show` - Show a student's full record
//! - `list` - List students
//! - `add-grade` - Record a grade
//! - `grades` - List a student's grades
//! - `average` - Show a student's average
//! - `remove-grade` - Delete a grade by id
//! - `stats` - Averages of the whole class
//! - `export` - Write every grade to a CSV file
//! - `status` - Show student and grade counts (default)

mod commands;

use crate::config::{Backend, GradebookConfig};
use clap::{Parser, Subcommand};
use gradebook_core::{GradebookError, SortOrder};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Gradebook - student records and subject grades
#[derive(Parser, Debug)]
#[command(name = "gradebook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the gradebook database (overrides configuration)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend (overrides configuration)
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Initialize a new empty database
    Init {
        /// Replace an existing database
        #[arg(short, long)]
        force: bool,
    },

    /// Add a student
    AddStudent {
        /// Student name
        #[arg(short, long)]
        name: String,

        /// Unique roll number
        #[arg(short, long)]
        roll: String,
    },

    /// Show a student with grades and average
    Show {
        /// Roll number
        roll: String,
    },

    /// List students
    List {
        /// Case-insensitive search on name or roll number
        #[arg(long)]
        query: Option<String>,

        /// Sort order: name or avg
        #[arg(short, long, default_value = "name")]
        sort: SortOrder,
    },

    /// Record a grade for a student
    AddGrade {
        /// Roll number
        #[arg(short, long)]
        roll: String,

        /// Subject label
        #[arg(short, long)]
        subject: String,

        /// Score between 0 and 100 (up to two decimals)
        #[arg(short = 'g', long, allow_hyphen_values = true)]
        score: String,
    },

    /// List a student's grades
    Grades {
        /// Roll number
        roll: String,
    },

    /// Show a student's average
    Average {
        /// Roll number
        roll: String,
    },

    /// Delete a grade by id
    RemoveGrade {
        /// Grade id
        id: u64,
    },

    /// Show the average of every student
    Stats,

    /// Export every grade as CSV
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show student and grade counts
    Status,
}

impl Cli {
    /// Configuration file and environment, then command-line overrides.
    pub fn resolve_config(&self) -> Result<GradebookConfig, GradebookError> {
        let mut config = GradebookConfig::load(self.config.as_deref())?;
        if let Some(database) = &self.database {
            config.database.clone_from(database);
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        Ok(config)
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), GradebookError> {
    let mut config = cli.resolve_config()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            cmd_server(&config, cli.quiet).await
        }
        Some(Commands::Init { force }) => cmd_init(&config, force),
        Some(Commands::AddStudent { name, roll }) => {
            cmd_add_student(&config, json_mode, &name, &roll)
        }
        Some(Commands::Show { roll }) => cmd_show(&config, json_mode, &roll),
        Some(Commands::List { query, sort }) => cmd_list(&config, json_mode, query, sort),
        Some(Commands::AddGrade {
            roll,
            subject,
            score,
        }) => cmd_add_grade(&config, json_mode, &roll, &subject, &score),
        Some(Commands::Grades { roll }) => cmd_grades(&config, json_mode, &roll),
        Some(Commands::Average { roll }) => cmd_average(&config, json_mode, &roll),
        Some(Commands::RemoveGrade { id }) => cmd_remove_grade(&config, json_mode, id),
        Some(Commands::Stats) => cmd_stats(&config, json_mode),
        Some(Commands::Export { output }) => cmd_export(&config, &output),
        Some(Commands::Status) | None => cmd_status(&config, json_mode),
    }
}
