//! CLI command definitions
//!
//! Defines the clap commands for the harness CLI.

use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::common::Environment;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scenario suite against the service
    Run {
        /// YAML suite to run (default: the built-in suite)
        #[arg(long, short)]
        suite: Option<PathBuf>,

        /// Configuration preset
        #[arg(long, short, value_enum, default_value_t = Environment::Development)]
        env: Environment,

        /// Override the service base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Print the suite result as JSON instead of coloured lines
        #[arg(long)]
        json: bool,
    },

    /// Fetch people and print the JSON payload
    Fetch {
        /// Number of records (1-5000)
        #[arg(long, short = 'n', default_value_t = 1)]
        results: u32,

        /// male or female
        #[arg(long, short)]
        gender: Option<String>,

        /// Nationality code; repeat for several: --nat gb --nat fr
        #[arg(long)]
        nat: Vec<String>,

        /// Only include this field; can be repeated
        #[arg(long)]
        inc: Vec<String>,

        /// Exclude this field; can be repeated
        #[arg(long)]
        exc: Vec<String>,

        /// Seed for reproducible results
        #[arg(long)]
        seed: Option<String>,

        /// Page of a seeded result set
        #[arg(long)]
        page: Option<u32>,

        /// Configuration preset
        #[arg(long, short, value_enum, default_value_t = Environment::Development)]
        env: Environment,
    },

    /// Validate a saved JSON document
    Validate {
        /// Path to the JSON file
        file: PathBuf,

        /// What the document is
        #[arg(long, short, value_enum, default_value_t = DocumentKind::Response)]
        kind: DocumentKind,
    },

    /// Print the effective configuration
    Config {
        /// Configuration preset
        #[arg(long, short, value_enum, default_value_t = Environment::Development)]
        env: Environment,

        /// Also write it to the configuration file
        #[arg(long)]
        write: bool,
    },
}

/// Document kinds accepted by `validate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentKind {
    /// A full response envelope with complete person records
    Response,
    /// A single person record
    User,
    /// A response envelope, records unchecked
    Structure,
}
