//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// OrderStat - statistics for batch order conversion runs
///
/// Scan directories of converted and rejected real-estate orders, accumulate
/// counters across operation, estate, and object dimensions, and render an
/// aligned text report or a JSON snapshot.
///
/// Examples:
///   orderstat --input ./out/done
///   orderstat --input ./out/done --failed ./out/rejected --task import
///   orderstat --input ./out/done --format json --output stats.json
///   orderstat --input ./out/done --resume previous.json --snapshot latest.json
///   orderstat --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory of successfully converted orders
    ///
    /// Every matching file under it is fed to the accumulator as a success.
    /// Not required when using --init-config.
    #[arg(short, long, value_name = "DIR", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Directory of orders that failed conversion
    ///
    /// Every matching file under it is fed to the accumulator as a failure.
    #[arg(long, value_name = "DIR")]
    pub failed: Option<PathBuf>,

    /// Task name shown in the report header
    ///
    /// Can also be set via ORDERSTAT_TASK or .orderstat.toml.
    #[arg(short, long, env = "ORDERSTAT_TASK", value_name = "NAME")]
    pub task: Option<String>,

    /// Run identifier
    ///
    /// A timestamp is generated when neither CLI nor config provide one.
    #[arg(short, long, value_name = "ID")]
    pub run_id: Option<String>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Restore accumulator state from a snapshot before processing
    ///
    /// Lets a run continue counting on top of a previous run's state.
    #[arg(long, value_name = "FILE")]
    pub resume: Option<PathBuf>,

    /// Write the post-run snapshot to this file
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .orderstat.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with code 2 when any order failed conversion
    ///
    /// Useful for CI pipelines.
    #[arg(long)]
    pub fail_on_errors: bool,

    /// List the files that would be processed and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .orderstat.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the run results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned text report (default)
    #[default]
    Text,
    /// Pretty-printed JSON snapshot
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref input) = self.input {
            if !input.is_dir() {
                return Err(format!(
                    "Input directory does not exist: {}",
                    input.display()
                ));
            }
        }

        if let Some(ref failed) = self.failed {
            if !failed.is_dir() {
                return Err(format!(
                    "Failed-orders directory does not exist: {}",
                    failed.display()
                ));
            }
        }

        if let Some(ref resume) = self.resume {
            if !resume.is_file() {
                return Err(format!("Snapshot file does not exist: {}", resume.display()));
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
