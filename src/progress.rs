//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements
//! [`ProgressCallback`] to draw a walk spinner and a hashing bar on stderr.
//! The report itself goes to stdout, so the two never interleave on the
//! same stream.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Phase name used while walking the tree.
pub const PHASE_WALKING: &str = "walking";
/// Phase name used while hashing candidate files.
pub const PHASE_HASHING: &str = "hashing";

/// Progress callback for the duplicate finding phases.
///
/// Implement this trait to receive progress updates during
/// the duplicate detection pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ([`PHASE_WALKING`] or [`PHASE_HASHING`])
    /// * `total` - Total number of items to process (0 if unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each file found during the walk.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of files found so far
    /// * `path` - Path of the latest file
    fn on_progress(&self, current: usize, path: &str);

    /// Called by the digest pool each time one file has been hashed.
    fn on_item_completed(&self, _path: &str) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Progress {
    /// Create a new progress reporter drawing to stderr.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dups::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::stderr()),
            walking: Mutex::new(None),
            hashing: Mutex::new(None),
            quiet,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_WALKING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking directory");
                pb.enable_steady_tick(Duration::from_millis(100));
                *lock(&self.walking) = Some(pb);
            }
            _ => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::hashing_style());
                pb.set_message("Hashing");
                *lock(&self.hashing) = Some(pb);
            }
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *lock(&self.walking) {
            pb.set_position(current as u64);
            pb.set_message(truncate_path(path, 30));
        }
    }

    fn on_item_completed(&self, _path: &str) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *lock(&self.hashing) {
            pb.inc(1);
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        let slot = if phase == PHASE_WALKING {
            &self.walking
        } else {
            &self.hashing
        };
        if let Some(pb) = lock(slot).take() {
            pb.finish_and_clear();
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{}", file_name)
}
