//! Duplicate finder: walks a tree and turns it into duplicate sets.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk** - Collect every regular file under the root (see [`crate::scanner::walker`])
//! 2. **Phase 1 - Size grouping**: Group files by size (see [`crate::duplicates::groups`])
//! 3. **Phase 2 - Digest**: For each size bucket with two or more files, in
//!    ascending size order, hash every member on the [`DigestPool`] and
//!    regroup the bucket by digest
//!
//! Duplicate sets are handed to a [`ScanSink`] one bucket at a time, so a
//! caller can act on a bucket (report it, delete from it) before the next
//! bucket is hashed.
//!
//! # Example
//!
//! ```no_run
//! use dups::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_workers(4));
//! let (sets, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
//!
//! println!("Found {} duplicate sets", sets.len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::groups::{group_by_size, DigestIndex, DuplicateSet};
use super::pool::{default_workers, DigestPool, PoolError};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_WALKING};
use crate::scanner::{hash_to_hex, FileEntry, HashError, Hasher, ScanError, Walker};

/// What to do when reading a file fails after it was opened.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReadErrorPolicy {
    /// Finish the current size bucket, then fail the run.
    #[default]
    Abort,
    /// Report the file as a warning and leave it out of every set.
    Skip,
}

impl std::fmt::Display for ReadErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of digest workers. Defaults to the available parallelism.
    pub workers: usize,
    /// Handling of read failures in the middle of a file.
    pub read_errors: ReadErrorPolicy,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("read_errors", &self.read_errors)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            read_errors: ReadErrorPolicy::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of digest workers (at least one).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the read error policy.
    #[must_use]
    pub fn with_read_errors(mut self, policy: ReadErrorPolicy) -> Self {
        self.read_errors = policy;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of regular files found
    pub total_files: usize,
    /// Total size of all files found in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of size buckets that were hashed
    pub size_buckets_hashed: usize,
    /// Number of files submitted to the digest pool
    pub files_hashed: usize,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Number of deletion candidates (every member but the retained one)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Number of files actually deleted
    pub files_deleted: usize,
    /// Number of emptied parent directories removed
    pub dirs_pruned: usize,
    /// Files left out because they could not be hashed
    pub warnings: Vec<HashError>,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize(self.reclaimable_space).to_string()
    }

}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Traversal failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The digest pool failed.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// A file failed mid-read under [`ReadErrorPolicy::Abort`].
    #[error(transparent)]
    ReadFailed(HashError),
}

/// Receiver of the finder's per-bucket output.
///
/// Returning an error from either method stops the scan; the error is
/// handed back unchanged by [`DuplicateFinder::scan`].
pub trait ScanSink {
    /// Error type of the sink. Finder errors convert into it.
    type Error: From<FinderError>;

    /// A file was left out of grouping. Called before the file's bucket is
    /// finished.
    fn on_warning(&mut self, _warning: &HashError) -> Result<(), Self::Error> {
        Ok(())
    }

    /// One confirmed duplicate set. Sets of one bucket arrive together, in
    /// ascending digest order; buckets arrive in ascending size order.
    fn on_duplicate_set(&mut self, set: DuplicateSet) -> Result<(), Self::Error>;
}

/// Sink that keeps every set in memory.
#[derive(Debug, Default)]
struct CollectSink {
    sets: Vec<DuplicateSet>,
}

impl ScanSink for CollectSink {
    type Error = FinderError;

    fn on_duplicate_set(&mut self, set: DuplicateSet) -> Result<(), FinderError> {
        self.sets.push(set);
        Ok(())
    }
}

/// Duplicate finder that orchestrates the detection pipeline.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(Arc::clone(flag));
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate sets under `path` and collect them.
    ///
    /// # Errors
    ///
    /// See [`DuplicateFinder::scan`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dups::duplicates::DuplicateFinder;
    /// use std::path::Path;
    ///
    /// let finder = DuplicateFinder::with_defaults();
    /// match finder.find_duplicates(Path::new(".")) {
    ///     Ok((sets, summary)) => {
    ///         println!("Found {} duplicate sets", sets.len());
    ///         println!("Can reclaim {} bytes", summary.reclaimable_space);
    ///     }
    ///     Err(e) => eprintln!("Scan failed: {}", e),
    /// }
    /// ```
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let mut sink = CollectSink::default();
        let summary = self.scan(path, &mut sink)?;
        Ok((sink.sets, summary))
    }

    /// Run the pipeline on `path`, streaming results into `sink`.
    ///
    /// A root that is a regular file is scanned as a tree of one file.
    ///
    /// # Errors
    ///
    /// - [`FinderError::PathNotFound`] for a missing root
    /// - [`FinderError::Scan`] on the first traversal error
    /// - [`FinderError::ReadFailed`] for a mid-read failure under
    ///   [`ReadErrorPolicy::Abort`], after the bucket has been drained
    /// - [`FinderError::Interrupted`] once shutdown is requested
    /// - [`FinderError::Pool`] if the digest workers fail
    /// - any error returned by the sink
    pub fn scan<S: ScanSink>(&self, path: &Path, sink: &mut S) -> Result<ScanSummary, S::Error> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()).into());
        }

        log::info!("Starting duplicate scan of {}", path.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted.into());
        }

        let files = self.collect_files(path)?;
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted.into());
        }

        // Phase 1: size grouping
        let (size_index, size_stats) = group_by_size(files);
        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.eliminated_by_size = size_stats.eliminated_unique;

        // Phase 2: digest every candidate bucket, smallest size first
        let mut pool = DigestPool::new(self.config.workers, self.hasher.clone())
            .map_err(FinderError::from)?;
        if let Some(ref callback) = self.config.progress_callback {
            pool = pool.with_progress_callback(Arc::clone(callback));
            callback.on_phase_start(PHASE_HASHING, size_stats.potential_duplicates);
        }

        for (size, paths) in size_index.into_candidates() {
            let sets = self.digest_bucket(&pool, size, &paths, sink, &mut summary)?;
            summary.size_buckets_hashed += 1;
            summary.files_hashed += paths.len();

            for set in sets {
                summary.duplicate_sets += 1;
                summary.duplicate_files += set.duplicate_count();
                summary.reclaimable_space += set.wasted_space();
                sink.on_duplicate_set(set)?;
            }
        }
        drop(pool);

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }

        summary.scan_duration = start_time.elapsed();
        log::info!(
            "Scan complete: {} duplicate sets, {} reclaimable, {} warnings in {:?}",
            summary.duplicate_sets,
            summary.reclaimable_display(),
            summary.warnings.len(),
            summary.scan_duration
        );

        Ok(summary)
    }

    /// Walk the tree, failing on the first traversal error.
    fn collect_files(&self, path: &Path) -> Result<Vec<FileEntry>, FinderError> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let mut walker = Walker::new(path);
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        let mut files = Vec::new();
        for result in walker.walk() {
            let file = result?;
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(files.len() + 1, &file.path.to_string_lossy());
            }
            files.push(file);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }
        log::debug!("Walk found {} regular files", files.len());
        Ok(files)
    }

    /// Hash one size bucket and return its duplicate sets.
    ///
    /// Every result of the bucket is consumed before an error is returned.
    fn digest_bucket<S: ScanSink>(
        &self,
        pool: &DigestPool,
        size: u64,
        paths: &[PathBuf],
        sink: &mut S,
        summary: &mut ScanSummary,
    ) -> Result<Vec<DuplicateSet>, S::Error> {
        log::debug!("Hashing {} files of {} bytes", paths.len(), size);

        let mut index = DigestIndex::new(size);
        let mut fatal: Option<HashError> = None;
        let mut interrupted = false;
        let mut sink_error: Option<S::Error> = None;

        pool.hash_bucket_with(paths, |result| {
            let error = match result.outcome {
                Ok(digest) => {
                    log::debug!("{} {}", hash_to_hex(&digest), result.path.display());
                    index.insert(result.index, result.path, digest);
                    return;
                }
                Err(error) => error,
            };

            match error {
                HashError::Interrupted(_) => interrupted = true,
                HashError::Read { .. } if self.config.read_errors == ReadErrorPolicy::Abort => {
                    log::error!("{}", error);
                    if fatal.is_none() {
                        fatal = Some(error);
                    }
                }
                _ => {
                    log::debug!("skipping {}", error);
                    if sink_error.is_none() {
                        if let Err(e) = sink.on_warning(&error) {
                            sink_error = Some(e);
                        }
                    }
                    summary.warnings.push(error);
                }
            }
        })
        .map_err(FinderError::from)?;

        if interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted.into());
        }
        if let Some(error) = fatal {
            return Err(FinderError::ReadFailed(error).into());
        }
        if let Some(error) = sink_error {
            return Err(error);
        }

        Ok(index.into_duplicate_sets())
    }
}
