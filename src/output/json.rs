//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "hash": "aaf4c61d...",
//!       "size": 5,
//!       "keep": "root/a.txt",
//!       "remove": ["root/b/b.txt"],
//!       "deleted": [],
//!       "pruned_dirs": []
//!     }
//!   ],
//!   "warnings": [
//!     { "path": "root/locked", "error": "Permission denied (os error 13)" }
//!   ],
//!   "summary": {
//!     "total_files": 3,
//!     "duplicate_sets": 1,
//!     "reclaimable_space": 5,
//!     "exit_code": 0,
//!     "exit_code_name": "DU000"
//!   }
//! }
//! ```
//!
//! A run that fails after it has started reporting still writes the
//! document, with the sets and deletions made so far and a top-level
//! `"error"` message.
//!
//! # Example
//!
//! ```
//! use dups::error::ExitCode;
//! use dups::duplicates::ScanSummary;
//! use dups::output::json::JsonOutput;
//!
//! let mut output = JsonOutput::default();
//! output.set_summary(&ScanSummary::default(), true, ExitCode::Success);
//! let json = output.to_json().unwrap();
//! assert!(json.starts_with('{'));
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::actions::{DeleteProgressCallback, RetentionPlan};
use crate::duplicates::ScanSummary;
use crate::error::ExitCode;
use crate::scanner::HashError;

/// A single duplicate set in JSON format.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JsonDuplicateSet {
    /// SHA-1 digest as hexadecimal string (40 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// The retained file
    pub keep: String,
    /// Deletion candidates, longest path first
    pub remove: Vec<String>,
    /// Candidates that were actually deleted
    pub deleted: Vec<String>,
    /// Parent directories removed after deletion
    pub pruned_dirs: Vec<String>,
}

impl JsonDuplicateSet {
    /// Create a JSON duplicate set from a retention plan.
    #[must_use]
    pub fn from_plan(plan: &RetentionPlan) -> Self {
        Self {
            hash: plan.digest_hex(),
            size: plan.size(),
            keep: path_string(plan.keep()),
            remove: plan.remove().iter().map(|p| path_string(p)).collect(),
            deleted: Vec::new(),
            pruned_dirs: Vec::new(),
        }
    }
}

/// A file left out of grouping.
#[derive(Debug, Clone, Serialize)]
pub struct JsonWarning {
    /// File that could not be hashed
    pub path: String,
    /// Reason
    pub error: String,
}

impl JsonWarning {
    /// Create a JSON warning from a hashing error.
    #[must_use]
    pub fn from_hash_error(error: &HashError) -> Self {
        Self {
            path: path_string(error.path()),
            error: super::warning_reason(error),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JsonSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of size buckets that were hashed
    pub size_buckets_hashed: usize,
    /// Number of files hashed
    pub files_hashed: usize,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Number of deletion candidates
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Number of files deleted
    pub files_deleted: usize,
    /// Number of directories removed
    pub dirs_pruned: usize,
    /// Number of files that could not be hashed
    pub warnings: usize,
    /// Whether nothing was deleted on purpose
    pub dry_run: bool,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DU000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, dry_run: bool, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            size_buckets_hashed: summary.size_buckets_hashed,
            files_hashed: summary.files_hashed,
            duplicate_sets: summary.duplicate_sets,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            files_deleted: summary.files_deleted,
            dirs_pruned: summary.dirs_pruned,
            warnings: summary.warnings.len(),
            dry_run,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure, filled in as the scan progresses.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JsonOutput {
    /// List of duplicate sets
    pub duplicates: Vec<JsonDuplicateSet>,
    /// Files that could not be hashed
    pub warnings: Vec<JsonWarning>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Fatal error that ended the run early
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JsonOutput {
    /// Append a duplicate set. Deletion callbacks that follow apply to it.
    pub fn push_set(&mut self, plan: &RetentionPlan) {
        self.duplicates.push(JsonDuplicateSet::from_plan(plan));
    }

    /// Append a warning.
    pub fn push_warning(&mut self, error: &HashError) {
        self.warnings.push(JsonWarning::from_hash_error(error));
    }

    /// Fill in the summary.
    pub fn set_summary(&mut self, summary: &ScanSummary, dry_run: bool, exit_code: ExitCode) {
        self.summary = JsonSummary::from_scan_summary(summary, dry_run, exit_code);
    }

    /// Record the fatal error of a failed run.
    ///
    /// Set and warning counts are taken from what was recorded, since the
    /// finder's own summary is lost with the error.
    pub fn set_error(&mut self, message: String) {
        self.summary.duplicate_sets = self.duplicates.len();
        self.summary.duplicate_files = self.duplicates.iter().map(|d| d.remove.len()).sum();
        self.summary.warnings = self.warnings.len();
        self.error = Some(message);
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl DeleteProgressCallback for JsonOutput {
    fn on_before_delete(&mut self, _path: &Path, _index: usize, _total: usize) {}

    fn on_delete_success(&mut self, path: &Path, _size: u64) {
        if let Some(set) = self.duplicates.last_mut() {
            set.deleted.push(path_string(path));
        }
    }

    fn on_dir_pruned(&mut self, dir: &Path) {
        if let Some(set) = self.duplicates.last_mut() {
            set.pruned_dirs.push(path_string(dir));
        }
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
