//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Directory walking using jwalk, regular files only
//! - Content hashing with SHA-1
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: SHA-1 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use dups::scanner::Walker;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."));
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Fatal: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};

// Re-export main types
pub use hasher::{hash_to_hex, Digest, Hasher, DIGEST_LEN};
pub use walker::Walker;

/// A regular file discovered by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file, as produced by the walk (root joined with the relative path)
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Errors that can occur during directory scanning.
///
/// Every scan error is fatal to a run.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) | Self::Io { path: p, .. } => p,
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file could not be opened. Never fatal.
    #[error("failed to open {path}")]
    Open {
        /// File that failed to open
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading failed after the file was opened.
    #[error("read error for {path}")]
    Read {
        /// File that failed mid-read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Hashing was abandoned because shutdown was requested.
    #[error("hashing interrupted: {0}")]
    Interrupted(PathBuf),
}

impl HashError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } | Self::Interrupted(path) => path,
        }
    }
}
