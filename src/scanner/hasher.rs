//! SHA-1 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing SHA-1 digests of
//! file contents. Files are streamed through the digest in fixed-size chunks,
//! so memory use does not depend on file size.
//!
//! Opening and reading are reported as distinct errors
//! ([`HashError::Open`] and [`HashError::Read`]) because the pipeline treats
//! them differently: a file that cannot be opened is skipped, while a failure
//! in the middle of a read is fatal unless configured otherwise.
//!
//! # Example
//!
//! ```no_run
//! use dups::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.full_hash(Path::new("file.txt")).unwrap();
//! println!("{}", hash_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sha1::{Digest as _, Sha1};

use super::HashError;

/// Length of a content digest in bytes (160 bits).
pub const DIGEST_LEN: usize = 20;

/// Content digest of a file.
pub type Digest = [u8; DIGEST_LEN];

/// Default read chunk size (128 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Streaming SHA-1 hasher.
///
/// Cheap to clone; every worker in the digest pool holds its own copy.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            shutdown_flag: None,
        }
    }

    /// Set the read chunk size. Values below 1 byte are clamped to 1.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Set the shutdown flag.
    ///
    /// The flag is checked before a file is opened and between chunks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Configured read chunk size.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Compute the digest of a file's full content.
    ///
    /// The file handle is dropped before this returns, on every path.
    ///
    /// # Errors
    ///
    /// - [`HashError::Open`] if the file cannot be opened
    /// - [`HashError::Read`] if reading fails after a successful open
    /// - [`HashError::Interrupted`] if shutdown was requested
    pub fn full_hash(&self, path: &Path) -> Result<Digest, HashError> {
        if self.is_shutdown_requested() {
            return Err(HashError::Interrupted(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|source| HashError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        self.hash_reader(path, file)
    }

    /// Compute the digest of everything `reader` yields.
    ///
    /// `path` is only used to label errors.
    ///
    /// # Errors
    ///
    /// - [`HashError::Read`] if the reader fails
    /// - [`HashError::Interrupted`] if shutdown was requested between chunks
    pub fn hash_reader<R: Read>(&self, path: &Path, mut reader: R) -> Result<Digest, HashError> {
        let mut hasher = Sha1::new();
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }

            let count = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(HashError::Read {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            };

            hasher.update(&buffer[..count]);
        }

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&hasher.finalize());
        log::trace!("Hashed {}: {}", path.display(), hash_to_hex(&digest));
        Ok(digest)
    }
}

/// Render a digest as lowercase hexadecimal.
#[must_use]
pub fn hash_to_hex(hash: &Digest) -> String {
    hex::encode(hash)
}
