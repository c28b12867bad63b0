//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory tree
//! and collecting the path and size of every regular file in it.
//!
//! - Directory children are sorted by file name, so walk order is stable
//!   between runs.
//! - Symbolic links are never followed and never reported; devices, fifos
//!   and sockets are skipped as well.
//! - Hidden files are included.
//! - Errors are yielded as [`ScanError`] values. The finder treats the first
//!   one as fatal.
//! - Iteration stops early when the shutdown flag is set.
//!
//! # Example
//!
//! ```no_run
//! use dups::scanner::Walker;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"));
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Fatal: {}", e),
//!     }
//! }
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{FileEntry, ScanError};

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dups::scanner::Walker;
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."));
    /// ```
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            root: path.to_path_buf(),
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the directory tree, yielding regular files in walk order.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dups::scanner::Walker;
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."));
    /// let files: Result<Vec<_>, _> = walker.walk().collect();
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        self.entries(self.walk_dir())
    }

    fn walk_dir(&self) -> WalkDir {
        WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(false)
            .sort(true)
    }

    /// Turn jwalk entries into files and fatal errors.
    ///
    /// jwalk reports a directory it could not list as an `Ok` entry carrying
    /// `read_children_error`; that becomes an error here.
    fn entries(&self, walk_dir: WalkDir) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        walk_dir
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(mut entry) => {
                    let path = entry.path();
                    let file_type = entry.file_type();

                    if let Some(error) = entry.read_children_error.take() {
                        return Some(Err(self.handle_jwalk_error(path, error)));
                    }

                    if !file_type.is_file() {
                        // directories are descended by jwalk itself
                        if !file_type.is_dir() {
                            log::trace!("Skipping non-regular entry: {}", path.display());
                        }
                        return None;
                    }

                    match std::fs::symlink_metadata(&path) {
                        Ok(metadata) => {
                            log::debug!("walk {} ({} bytes)", path.display(), metadata.len());
                            Some(Ok(FileEntry::new(path, metadata.len())))
                        }
                        Err(e) => Some(Err(self.handle_io_error(&path, e))),
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(self.handle_jwalk_error(path, e)))
                }
            })
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: io::Error) -> ScanError {
        log::debug!("walk error for {}: {}", path.display(), error);

        match error.kind() {
            io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
            _ => ScanError::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Handle jwalk errors.
    fn handle_jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> ScanError {
        match error.io_error().map(io::Error::kind) {
            Some(kind) => self.handle_io_error(&path, io::Error::new(kind, error.to_string())),
            None => ScanError::Io {
                path,
                source: io::Error::other(error.to_string()),
            },
        }
    }
}
