//! Deletion of redundant copies.
//!
//! # Overview
//!
//! This module applies a [`RetentionPlan`]:
//! - Every deletion candidate is reported to the callback, even in dry run
//! - With deletion enabled, each candidate is removed permanently
//! - With empty-directory cleanup enabled, the candidate's parent directory
//!   is removed right after the file; a parent that still has entries is
//!   left alone
//! - A parent spelled `.` or `..` (a candidate directly under a root given
//!   as `.`) is never pruned. The scan root itself can only become empty
//!   through such a path, since the retained copy always lives beneath it
//!
//! Any other failure stops the run: there is no partial-failure recovery.
//!
//! # Example
//!
//! ```no_run
//! use dups::actions::delete::{remove_duplicate, prune_empty_parent};
//! use std::path::Path;
//!
//! let path = Path::new("/path/to/duplicate.txt");
//! remove_duplicate(path, 1024).unwrap();
//! prune_empty_parent(path).unwrap();
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::retention::RetentionPlan;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// The duplicate itself could not be removed.
    #[error("failed to delete {path}")]
    RemoveFailed {
        /// File that was being removed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The emptied parent directory could not be removed, for a reason
    /// other than still holding entries.
    #[error("failed to remove directory {path}")]
    PruneFailed {
        /// Directory that was being removed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::RemoveFailed { path, .. } | Self::PruneFailed { path, .. } => path,
        }
    }
}

/// Result of a single successful deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// What happened to a deleted file's parent directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneOutcome {
    /// The directory was empty and has been removed.
    Removed(PathBuf),
    /// The directory still has entries and was kept.
    NotEmpty(PathBuf),
    /// There is no parent to remove (bare file name or filesystem root).
    Skipped,
}

/// Result of applying one retention plan.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Number of deletion candidates reported.
    pub candidates: usize,
    /// Files actually deleted.
    pub deleted: Vec<DeleteResult>,
    /// Parent directories removed after their last file went.
    pub pruned_dirs: Vec<PathBuf>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of files deleted.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// Fold another result into this one.
    pub fn merge(&mut self, other: Self) {
        self.candidates += other.candidates;
        self.deleted.extend(other.deleted);
        self.pruned_dirs.extend(other.pruned_dirs);
        self.bytes_freed += other.bytes_freed;
    }

    /// Get a summary message.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.deleted.is_empty() {
            format!("{} deletion candidate(s), nothing deleted", self.candidates)
        } else {
            format!(
                "Deleted {} file(s), removed {} director(ies), freed {}",
                self.deleted.len(),
                self.pruned_dirs.len(),
                bytesize::ByteSize(self.bytes_freed)
            )
        }
    }
}

/// Configuration for deletion operations.
///
/// The default is a dry run: candidates are reported and nothing is touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Actually remove deletion candidates.
    pub delete: bool,
    /// Remove a candidate's parent directory once it is empty.
    pub prune_empty_dirs: bool,
}

impl DeleteConfig {
    /// Create config that only reports.
    #[must_use]
    pub fn dry_run() -> Self {
        Self::default()
    }

    /// Create config that deletes candidates.
    #[must_use]
    pub fn permanent() -> Self {
        Self {
            delete: true,
            prune_empty_dirs: false,
        }
    }

    /// Enable/disable empty parent directory cleanup.
    #[must_use]
    pub fn with_prune_empty_dirs(mut self, prune: bool) -> Self {
        self.prune_empty_dirs = prune;
        self
    }

    /// Whether parent directories will actually be pruned.
    #[must_use]
    pub fn prunes(&self) -> bool {
        self.delete && self.prune_empty_dirs
    }
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback {
    /// Called for each deletion candidate, before anything is removed.
    /// Called in dry run as well.
    fn on_before_delete(&mut self, path: &Path, index: usize, total: usize);

    /// Called after successful deletion.
    fn on_delete_success(&mut self, _path: &Path, _size: u64) {}

    /// Called after an emptied parent directory was removed.
    fn on_dir_pruned(&mut self, _dir: &Path) {}
}

/// Permanently delete a single file.
///
/// # Errors
///
/// Returns [`DeleteError::RemoveFailed`] if the file cannot be removed.
pub fn remove_duplicate(path: &Path, size: u64) -> Result<DeleteResult, DeleteError> {
    log::debug!("really del {}", path.display());

    fs::remove_file(path).map_err(|e| {
        log::error!("Delete failed for {}: {}", path.display(), e);
        DeleteError::RemoveFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    log::info!("Deleted: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult::new(path.to_path_buf(), size))
}

/// Remove the parent directory of `path` if it is empty.
///
/// Returns [`PruneOutcome::Skipped`] when there is no nameable parent: a
/// bare file name, the filesystem root, `.` or `..`.
///
/// # Errors
///
/// Returns [`DeleteError::PruneFailed`] for any failure except the
/// directory not being empty.
pub fn prune_empty_parent(path: &Path) -> Result<PruneOutcome, DeleteError> {
    let parent = match path.parent() {
        Some(parent) if parent.file_name().is_some() => parent,
        _ => return Ok(PruneOutcome::Skipped),
    };

    log::debug!("attempt del dir {}", parent.display());

    match fs::remove_dir(parent) {
        Ok(()) => {
            log::info!("Removed empty directory: {}", parent.display());
            Ok(PruneOutcome::Removed(parent.to_path_buf()))
        }
        Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => {
            log::debug!("{} is not empty", parent.display());
            Ok(PruneOutcome::NotEmpty(parent.to_path_buf()))
        }
        Err(e) => {
            log::error!("Directory removal failed for {}: {}", parent.display(), e);
            Err(DeleteError::PruneFailed {
                path: parent.to_path_buf(),
                source: e,
            })
        }
    }
}

/// Apply a retention plan: report every candidate and, when configured,
/// delete it and prune its parent.
///
/// # Errors
///
/// Stops at the first [`DeleteError`]; candidates after it are neither
/// reported nor touched.
///
/// # Example
///
/// ```no_run
/// use dups::actions::delete::{apply_plan, DeleteConfig, DeleteProgressCallback};
/// use dups::actions::plan_retention;
/// use dups::duplicates::DuplicateSet;
/// use std::path::{Path, PathBuf};
///
/// struct Print;
/// impl DeleteProgressCallback for Print {
///     fn on_before_delete(&mut self, path: &Path, _: usize, _: usize) {
///         println!("Deleting dup {}", path.display());
///     }
/// }
///
/// let set = DuplicateSet::new([0; 20], 5, vec![PathBuf::from("a"), PathBuf::from("bb")]);
/// let plan = plan_retention(set);
/// let result = apply_plan(&plan, &DeleteConfig::dry_run(), Some(&mut Print)).unwrap();
/// assert_eq!(result.candidates, 1);
/// ```
pub fn apply_plan<C: DeleteProgressCallback>(
    plan: &RetentionPlan,
    config: &DeleteConfig,
    mut callback: Option<&mut C>,
) -> Result<BatchDeleteResult, DeleteError> {
    let mut result = BatchDeleteResult::default();
    let candidates = plan.remove();
    let total = candidates.len();

    for (index, path) in candidates.iter().enumerate() {
        if let Some(cb) = callback.as_deref_mut() {
            cb.on_before_delete(path, index, total);
        }
        result.candidates += 1;

        if !config.delete {
            continue;
        }

        let deleted = remove_duplicate(path, plan.size())?;
        result.bytes_freed += deleted.size;
        if let Some(cb) = callback.as_deref_mut() {
            cb.on_delete_success(path, deleted.size);
        }
        result.deleted.push(deleted);

        if config.prune_empty_dirs {
            if let PruneOutcome::Removed(dir) = prune_empty_parent(path)? {
                if let Some(cb) = callback.as_deref_mut() {
                    cb.on_dir_pruned(&dir);
                }
                result.pruned_dirs.push(dir);
            }
        }
    }

    log::debug!("{}", result.summary());
    Ok(result)
}
