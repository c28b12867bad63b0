//! Command-line interface definitions for dups.
//!
//! This module defines all CLI arguments using the clap derive API.
//! Options that can also come from the config file or the environment are
//! optional here: a flag that is not given leaves the lower layers alone.
//!
//! # Example
//!
//! ```bash
//! # Report duplicate sets under ./photos (dry run)
//! dups --root photos
//!
//! # Delete redundant copies and remove directories emptied by it
//! dups --root photos --delete --emptydir
//!
//! # JSON report, 8 digest workers, debug logging
//! dups -v --root photos --ncpu 8 --output json
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::duplicates::ReadErrorPolicy;

/// Find duplicate files by content and optionally delete redundant copies.
///
/// Files are grouped by size, then by SHA-1 digest. Of every duplicate set
/// the file with the shortest path is kept; with `--delete` the others are
/// removed.
#[derive(Debug, Parser)]
#[command(name = "dups")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Root directory to scan [default: test]
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Delete redundant copies (default is a dry run)
    ///
    /// Warning: deletion is permanent.
    #[arg(long)]
    pub delete: bool,

    /// Also remove a deleted file's parent directory once it is empty
    ///
    /// Only meaningful together with --delete.
    #[arg(long)]
    pub emptydir: bool,

    /// Number of digest worker threads [default: available CPUs]
    #[arg(long, value_name = "N")]
    pub ncpu: Option<usize>,

    /// What to do when a file fails mid-read [default: abort]
    #[arg(long, value_enum, value_name = "POLICY")]
    pub read_errors: Option<ReadErrorPolicy>,

    /// Report format [default: text]
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Configuration file (TOML)
    ///
    /// If not specified, config.toml in the platform config directory is
    /// used when it exists.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show progress bars on stderr
    #[arg(long)]
    pub progress: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Line-oriented report, one block per duplicate set
    #[default]
    Text,
    /// One JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
