//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "sqlscope")]
#[command(author, version, about = "Read-only classification and table extraction for SQL scripts")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to the nearest sqlscope.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decide whether SQL files may run in a read-only session
    Classify {
        /// SQL files to classify (supports glob patterns)
        files: Vec<PathBuf>,

        /// Database engine (mysql, mariadb, oceanbase, starrocks, postgres)
        #[arg(short, long)]
        engine: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// List the tables referenced by SQL files
    Resources {
        /// SQL files to inspect (supports glob patterns)
        files: Vec<PathBuf>,

        /// Database engine (mysql, mariadb, oceanbase, starrocks, postgres)
        #[arg(short, long)]
        engine: Option<String>,

        /// Database used for unqualified table names
        #[arg(short, long)]
        database: Option<String>,

        /// Schema used for unqualified table names (PostgreSQL)
        #[arg(short, long)]
        schema: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// List registered engines and their dialect family
    Engines,

    /// Parse SQL and display AST (for debugging)
    Parse {
        /// SQL file to parse
        file: PathBuf,

        /// Database engine whose dialect is used
        #[arg(short, long)]
        engine: Option<String>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output
    Json,
}
