//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Query execution history and learned failure patterns
#[derive(Parser, Debug)]
#[command(name = "test-orchestrator")]
#[command(author = "hephaex@gmail.com")]
#[command(version = "0.1.0")]
#[command(about = "Inspect test executions, failure statistics and retry patterns")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory holding the pattern store and execution history
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Increase verbosity (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List recorded executions, newest first
    History(HistoryArgs),

    /// Show one execution in detail
    Show(ShowArgs),

    /// Failure statistics over a trailing window
    Stats(StatsArgs),

    /// List learned failure patterns
    Patterns(PatternsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for history command
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Maximum number of executions to show
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Only executions of this strategy
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Arguments for show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Execution id; the latest execution when omitted
    pub id: Option<String>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Export to file (.json or .csv)
    #[arg(short, long)]
    pub export: Option<String>,
}

/// Arguments for stats command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Window size in days
    #[arg(short, long, default_value = "7")]
    pub days: i64,

    /// Number of most-failing tests to list
    #[arg(short, long, default_value = "10")]
    pub top: usize,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Arguments for patterns command
#[derive(Parser, Debug)]
pub struct PatternsArgs {
    /// Maximum number of patterns to show
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Arguments for config management
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Output path
        #[arg(default_value = "./test-orchestrator.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// List environment variables instead
        #[arg(long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the file; searched in standard locations when omitted
        file: Option<String>,
    },
}
