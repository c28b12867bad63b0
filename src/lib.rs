//! dups - duplicate file finder
//!
//! Finds regular files with identical content under a directory tree,
//! reports every duplicate set, and optionally deletes all but the member
//! with the shortest path.
//!
//! The pipeline groups files by size, hashes same-size files with SHA-1 on a
//! fixed pool of worker threads, regroups them by digest and applies the
//! retention policy one size bucket at a time.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;

use crate::actions::{apply_plan, plan_retention, BatchDeleteResult, DeleteConfig};
use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, DuplicateSet, FinderConfig, ScanSink, ScanSummary};
use crate::error::ExitCode;
use crate::output::Report;
use crate::progress::Progress;
use crate::scanner::HashError;

/// Scan sink that reports each set and applies its retention plan.
struct RetentionSink<W: Write> {
    report: Report<W>,
    delete: DeleteConfig,
    totals: BatchDeleteResult,
}

impl<W: Write> ScanSink for RetentionSink<W> {
    type Error = anyhow::Error;

    fn on_warning(&mut self, warning: &HashError) -> anyhow::Result<()> {
        self.report.warning(warning);
        Ok(())
    }

    fn on_duplicate_set(&mut self, set: DuplicateSet) -> anyhow::Result<()> {
        let plan = plan_retention(set);
        self.report
            .write_set(&plan)
            .context("Failed to write report")?;

        let result = apply_plan(&plan, &self.delete, Some(&mut self.report))?;
        self.totals.merge(result);
        Ok(())
    }
}

impl<W: Write> RetentionSink<W> {
    /// Summary of the deletions made so far.
    fn deletion_summary(&self) -> ScanSummary {
        ScanSummary {
            files_deleted: self.totals.deleted_count(),
            dirs_pruned: self.totals.pruned_dirs.len(),
            ..ScanSummary::default()
        }
    }

    /// Write the report of a run that stopped on `error`. A failure to write
    /// is logged so that `error` is still the one returned.
    fn abandon(&mut self, error: &anyhow::Error) {
        let summary = self.deletion_summary();
        if let Err(e) = self.report.fail(&summary, !self.delete.delete, error) {
            log::error!("Failed to write report: {e}");
        }
    }
}

/// Run the application with parsed CLI arguments.
///
/// # Errors
///
/// Returns any fatal error: bad configuration, a traversal error, a
/// mid-read failure under the abort policy, a failed deletion, an
/// interruption, or a failure to write the report.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(&cli)?;
    log::debug!("{:?}", config);
    log::debug!("ncpu {}", config.workers());

    let handler = signal::install_handler().context("Failed to set up Ctrl+C handling")?;

    let mut finder_config = FinderConfig::default()
        .with_workers(config.workers())
        .with_read_errors(config.read_errors)
        .with_shutdown_flag(handler.get_flag());
    if cli.progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(cli.quiet)));
    }
    let finder = DuplicateFinder::new(finder_config);

    let delete = config.delete_config();
    if !delete.delete {
        log::info!("Dry run: nothing will be deleted (pass --delete to remove duplicates)");
    }

    let stdout = io::stdout();
    let mut sink = RetentionSink {
        report: Report::new(config.output, stdout.lock()),
        delete,
        totals: BatchDeleteResult::default(),
    };

    let mut summary = match finder.scan(&config.root, &mut sink) {
        Ok(summary) => summary,
        Err(error) => {
            let error = error.context(format!("Scan of {} failed", config.root.display()));
            sink.abandon(&error);
            return Err(error);
        }
    };
    let done = sink.deletion_summary();
    summary.files_deleted = done.files_deleted;
    summary.dirs_pruned = done.dirs_pruned;

    log::info!(
        "{} files, {} duplicate sets, {} reclaimable",
        summary.total_files,
        summary.duplicate_sets,
        summary.reclaimable_display()
    );
    if delete.delete {
        log::info!("{}", sink.totals.summary());
    }
    if !summary.warnings.is_empty() {
        log::warn!("{} file(s) could not be hashed", summary.warnings.len());
    }

    sink.report
        .finish(&summary, !delete.delete, ExitCode::Success)
        .context("Failed to write report")?;

    Ok(ExitCode::Success)
}
