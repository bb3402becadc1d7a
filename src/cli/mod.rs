//! CLI module for dbfactory
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `check` - Load config, connect every backend, report their state
//! - `types` - List registered backend types
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Verify every backend in dbfactory.toml can be reached
//! dbfactory check -c dbfactory.toml
//!
//! # Same, overriding one shard from the environment
//! DBFACTORY__DB_MAIN__PATH=/tmp/main.db dbfactory check -c dbfactory.toml --json
//!
//! # Generate shell completions
//! dbfactory completions bash > ~/.bash_completion.d/dbfactory
//! ```

pub mod check;
pub mod completions;
pub mod output;
pub mod types;

pub use check::run_check;
pub use completions::handle_completions;
pub use types::handle_types;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// dbfactory - pluggable connection factory
#[derive(Parser, Debug)]
#[command(
    name = "dbfactory",
    version,
    about = "Turns declarative configuration into live backend connections"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load config, connect every backend and report their state
    Check(CheckArgs),
    /// List registered backend types
    Types(TypesArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to configuration file
    #[arg(short, long, env = "DBFACTORY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DBFACTORY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Keep connections open until SIGINT or SIGTERM
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
