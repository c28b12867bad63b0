//! Fixed-size worker pool computing content digests.
//!
//! # Overview
//!
//! A [`DigestPool`] owns `W` long-lived worker threads. Every worker pulls
//! [`HashJob`]s from a shared work queue and sends exactly one
//! [`HashResult`] per job into a shared results channel. The pool lives for
//! a whole run and is reused by every size bucket.
//!
//! Completion of a bucket is detected by counting: [`DigestPool::hash_bucket`]
//! submits `n` jobs and then receives exactly `n` results. The results
//! channel is never closed between buckets, so closure cannot signal
//! completion. The pool keeps no results sender of its own; if every worker
//! is gone the receive fails instead of blocking forever.
//!
//! Dropping the pool closes the work queue and joins every worker.
//!
//! # Example
//!
//! ```no_run
//! use dups::duplicates::DigestPool;
//! use dups::scanner::Hasher;
//! use std::path::PathBuf;
//!
//! let pool = DigestPool::new(4, Hasher::new()).unwrap();
//! let paths = vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")];
//! let results = pool.hash_bucket(&paths).unwrap();
//! assert_eq!(results.len(), paths.len());
//! ```

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use crate::progress::ProgressCallback;
use crate::scanner::{Digest, HashError, Hasher};

/// One unit of work: hash the file at `path`.
#[derive(Debug, Clone)]
pub struct HashJob {
    /// Position of the path in its bucket
    pub index: usize,
    /// File to hash
    pub path: PathBuf,
}

/// Outcome of one [`HashJob`], produced by exactly one worker.
#[derive(Debug)]
pub struct HashResult {
    /// Position of the path in its bucket
    pub index: usize,
    /// File that was hashed
    pub path: PathBuf,
    /// Digest, or the reason there is none
    pub outcome: Result<Digest, HashError>,
}

/// Errors from the pool itself (as opposed to per-file hashing errors).
#[derive(thiserror::Error, Debug)]
pub enum PoolError {
    /// A worker thread could not be started.
    #[error("failed to spawn digest worker: {0}")]
    Spawn(#[source] io::Error),

    /// Every worker exited before the bucket was complete.
    #[error("digest workers exited after {consumed} of {submitted} results")]
    WorkersGone {
        /// Jobs submitted for the bucket
        submitted: usize,
        /// Results received before the workers disappeared
        consumed: usize,
    },

    /// A result did not match any outstanding job of the current bucket.
    #[error("unexpected digest result #{index} for {path}")]
    UnexpectedResult {
        /// Index carried by the result
        index: usize,
        /// Path carried by the result
        path: PathBuf,
    },
}

/// Default worker count: the number of available processing units.
#[must_use]
pub fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Bounded pool of digest workers.
pub struct DigestPool {
    jobs: Option<Sender<HashJob>>,
    results: Receiver<HashResult>,
    workers: Vec<JoinHandle<()>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DigestPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestPool")
            .field("workers", &self.workers.len())
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl DigestPool {
    /// Spawn `workers` digest workers (at least one).
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] if a thread cannot be created. Workers
    /// spawned before the failure are shut down.
    pub fn new(workers: usize, hasher: Hasher) -> Result<Self, PoolError> {
        let count = workers.max(1);
        let (job_tx, job_rx) = bounded::<HashJob>(count);
        let (result_tx, result_rx) = unbounded::<HashResult>();

        let mut pool = Self {
            jobs: Some(job_tx),
            results: result_rx,
            workers: Vec::with_capacity(count),
            progress_callback: None,
        };

        for id in 0..count {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let hasher = hasher.clone();
            let handle = thread::Builder::new()
                .name(format!("dups-hash-{id}"))
                .spawn(move || worker_loop(id, &jobs, &results, &hasher))
                .map_err(PoolError::Spawn)?;
            pool.workers.push(handle);
        }

        log::debug!("Digest pool started with {} workers", count);
        Ok(pool)
    }

    /// Set the progress callback, notified once per consumed result.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Number of worker threads.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Hash every path of one bucket and collect the results.
    ///
    /// The returned vector has exactly `paths.len()` entries, in completion
    /// order.
    ///
    /// # Errors
    ///
    /// See [`DigestPool::hash_bucket_with`].
    pub fn hash_bucket(&self, paths: &[PathBuf]) -> Result<Vec<HashResult>, PoolError> {
        let mut results = Vec::with_capacity(paths.len());
        self.hash_bucket_with(paths, |result| results.push(result))?;
        Ok(results)
    }

    /// Hash every path of one bucket, handing each result to `on_result` as
    /// it arrives.
    ///
    /// Returns once exactly `paths.len()` results have been consumed. Each
    /// result is checked against the job it answers. After an error the pool
    /// may still hold results of the failed bucket and must not be reused.
    ///
    /// # Errors
    ///
    /// - [`PoolError::WorkersGone`] if the workers disappeared mid-bucket
    /// - [`PoolError::UnexpectedResult`] if a result does not belong to an
    ///   outstanding job of this bucket
    pub fn hash_bucket_with<F>(&self, paths: &[PathBuf], mut on_result: F) -> Result<usize, PoolError>
    where
        F: FnMut(HashResult),
    {
        let submitted = paths.len();
        let mut answered = vec![false; submitted];
        let mut consumed = 0usize;

        let jobs = self.jobs.as_ref().ok_or(PoolError::WorkersGone {
            submitted,
            consumed,
        })?;

        // The results channel is unbounded, so a full work queue only blocks
        // until a worker takes the next job.
        for (index, path) in paths.iter().enumerate() {
            let job = HashJob {
                index,
                path: path.clone(),
            };
            jobs.send(job)
                .map_err(|_| PoolError::WorkersGone { submitted, consumed })?;
            log::trace!("submitted #{} {}", index, path.display());
        }

        while consumed < submitted {
            let result = self
                .results
                .recv()
                .map_err(|_| PoolError::WorkersGone { submitted, consumed })?;
            self.accept(paths, &mut answered, &result)?;
            consumed += 1;
            on_result(result);
        }

        debug_assert_eq!(consumed, submitted);
        Ok(consumed)
    }

    /// Validate a result against the outstanding jobs and report progress.
    fn accept(
        &self,
        paths: &[PathBuf],
        answered: &mut [bool],
        result: &HashResult,
    ) -> Result<(), PoolError> {
        let known = paths.get(result.index).is_some_and(|p| *p == result.path);
        if !known || answered[result.index] {
            return Err(PoolError::UnexpectedResult {
                index: result.index,
                path: result.path.clone(),
            });
        }
        answered[result.index] = true;

        if let Some(ref callback) = self.progress_callback {
            callback.on_item_completed(&result.path.to_string_lossy());
        }
        Ok(())
    }
}

impl Drop for DigestPool {
    fn drop(&mut self) {
        // closing the queue lets every worker finish its loop
        self.jobs.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("Digest worker panicked during shutdown");
            }
        }
        log::trace!("Digest pool stopped");
    }
}

fn worker_loop(id: usize, jobs: &Receiver<HashJob>, results: &Sender<HashResult>, hasher: &Hasher) {
    for job in jobs.iter() {
        log::trace!("worker {} hashing {}", id, job.path.display());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| hasher.full_hash(&job.path)))
            .unwrap_or_else(|_| {
                Err(HashError::Read {
                    path: job.path.clone(),
                    source: io::Error::other("digest worker panicked"),
                })
            });

        let result = HashResult {
            index: job.index,
            path: job.path,
            outcome,
        };
        if results.send(result).is_err() {
            break;
        }
    }
    log::trace!("worker {} exiting", id);
}
