//! Output formatters for duplicate scan results.
//!
//! This module provides the report formats:
//! - Text, one block per duplicate set, as the sets are found
//! - JSON for automation and scripting, written once the run ends, whether
//!   it completed or failed
//!
//! Warnings about files that could not be hashed always go to stderr as
//! `path: error`, whatever the format.
//!
//! # Example
//!
//! ```no_run
//! use dups::actions::plan_retention;
//! use dups::cli::OutputFormat;
//! use dups::duplicates::DuplicateFinder;
//! use dups::output::Report;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (sets, _summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let mut report = Report::new(OutputFormat::Text, std::io::stdout());
//! for set in sets {
//!     report.write_set(&plan_retention(set)).unwrap();
//! }
//! ```

pub mod json;
pub mod text;

use std::io::{self, Write};
use std::path::Path;

pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;

use crate::actions::{DeleteProgressCallback, RetentionPlan};
use crate::cli::OutputFormat;
use crate::duplicates::ScanSummary;
use crate::error::ExitCode;
use crate::scanner::HashError;

/// Reason part of a warning line.
#[must_use]
pub fn warning_reason(error: &HashError) -> String {
    match error {
        HashError::Open { source, .. } | HashError::Read { source, .. } => source.to_string(),
        HashError::Interrupted(_) => "interrupted".to_string(),
    }
}

/// Warning line for stderr: `path: error`.
#[must_use]
pub fn warning_line(error: &HashError) -> String {
    format!("{}: {}", error.path().display(), warning_reason(error))
}

/// A report in the selected format, writing to `W`.
#[derive(Debug)]
pub enum Report<W: Write> {
    /// Streaming text report
    Text(TextOutput<W>),
    /// JSON report, written by [`Report::finish`]
    Json(JsonOutput, W),
}

impl<W: Write> Report<W> {
    /// Create a report of the given format.
    pub fn new(format: OutputFormat, out: W) -> Self {
        match format {
            OutputFormat::Text => Self::Text(TextOutput::new(out)),
            OutputFormat::Json => Self::Json(JsonOutput::default(), out),
        }
    }

    /// Record one duplicate set.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_set(&mut self, plan: &RetentionPlan) -> io::Result<()> {
        match self {
            Self::Text(text) => text.write_set(plan),
            Self::Json(json, _) => {
                json.push_set(plan);
                Ok(())
            }
        }
    }

    /// Record a file left out of grouping and print it to stderr.
    pub fn warning(&mut self, error: &HashError) {
        eprintln!("{}", warning_line(error));
        if let Self::Json(json, _) = self {
            json.push_warning(error);
        }
    }

    /// Finish the report.
    ///
    /// # Errors
    ///
    /// Returns any write error, including one deferred from a deletion
    /// callback.
    pub fn finish(
        &mut self,
        summary: &ScanSummary,
        dry_run: bool,
        exit_code: ExitCode,
    ) -> Result<(), JsonOutputError> {
        match self {
            Self::Text(text) => {
                text.finish()?;
                Ok(())
            }
            Self::Json(json, out) => {
                json.set_summary(summary, dry_run, exit_code);
                json.write_to(out, true)
            }
        }
    }

    /// Finish the report of a run that stopped on `error`.
    ///
    /// The JSON document is still written, holding every set and deletion
    /// recorded so far, the error message, and the exit code of the error.
    ///
    /// # Errors
    ///
    /// Returns any write error.
    pub fn fail(
        &mut self,
        summary: &ScanSummary,
        dry_run: bool,
        error: &anyhow::Error,
    ) -> Result<(), JsonOutputError> {
        match self {
            Self::Text(text) => {
                text.finish()?;
                Ok(())
            }
            Self::Json(json, out) => {
                json.set_summary(summary, dry_run, ExitCode::for_error(error));
                json.set_error(format!("{error:#}"));
                json.write_to(out, true)
            }
        }
    }
}

impl<W: Write> DeleteProgressCallback for Report<W> {
    fn on_before_delete(&mut self, path: &Path, index: usize, total: usize) {
        match self {
            Self::Text(text) => text.on_before_delete(path, index, total),
            Self::Json(json, _) => json.on_before_delete(path, index, total),
        }
    }

    fn on_delete_success(&mut self, path: &Path, size: u64) {
        match self {
            Self::Text(text) => text.on_delete_success(path, size),
            Self::Json(json, _) => json.on_delete_success(path, size),
        }
    }

    fn on_dir_pruned(&mut self, dir: &Path) {
        match self {
            Self::Text(text) => text.on_dir_pruned(dir),
            Self::Json(json, _) => json.on_dir_pruned(dir),
        }
    }
}
