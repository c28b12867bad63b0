//! Size and digest indexes, and the duplicate sets they produce.
//!
//! # Overview
//!
//! ## Size Index (Phase 1)
//!
//! Size grouping is the first phase of duplicate detection. It groups files
//! by their exact size; only sizes shared by two or more files go on to be
//! hashed, since files with different sizes cannot be duplicates.
//!
//! ## Digest Index (Phase 2)
//!
//! Within one size bucket, files are regrouped by content digest. Every
//! digest shared by two or more files becomes a [`DuplicateSet`].
//!
//! # Example
//!
//! ```
//! use dups::scanner::FileEntry;
//! use dups::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (index, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(index.candidates().count(), 1);
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, Digest, FileEntry};

/// File paths grouped by byte length.
///
/// Paths inside a bucket keep insertion (walk) order. Buckets iterate in
/// ascending size order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeIndex {
    buckets: BTreeMap<u64, Vec<PathBuf>>,
}

impl SizeIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the bucket for `size`.
    pub fn insert(&mut self, size: u64, path: PathBuf) {
        self.buckets.entry(size).or_default().push(path);
    }

    /// Number of distinct sizes seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if no file has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Paths recorded for `size`, if any.
    #[must_use]
    pub fn get(&self, size: u64) -> Option<&[PathBuf]> {
        self.buckets.get(&size).map(Vec::as_slice)
    }

    /// Buckets that could hold duplicates (two or more paths).
    pub fn candidates(&self) -> impl Iterator<Item = (u64, &[PathBuf])> {
        self.buckets
            .iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(size, paths)| (*size, paths.as_slice()))
    }

    /// Consume the index, keeping only buckets with two or more paths.
    pub fn into_candidates(self) -> impl Iterator<Item = (u64, Vec<PathBuf>)> {
        self.buckets.into_iter().filter(|(_, paths)| paths.len() > 1)
    }
}

/// Statistics from size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of empty files encountered (they are grouped like any other size)
    pub empty_files: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (Phase 1 of duplicate detection).
///
/// Every file is recorded, including empty ones: all empty files share
/// size 0 and the same digest, so they form a duplicate set like any other.
///
/// # Returns
///
/// The full [`SizeIndex`] and statistics about the grouping. Use
/// [`SizeIndex::candidates`] to get the buckets worth hashing.
#[must_use]
pub fn group_by_size(files: impl IntoIterator<Item = FileEntry>) -> (SizeIndex, GroupingStats) {
    let mut index = SizeIndex::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        if file.size == 0 {
            stats.empty_files += 1;
        }
        index.insert(file.size, file.path);
    }

    stats.unique_sizes = index.len();
    for (size, paths) in &index.buckets {
        if paths.len() == 1 {
            stats.eliminated_unique += 1;
            log::trace!("Eliminated unique size {}: {}", size, paths[0].display());
        } else {
            stats.potential_duplicates += paths.len();
            stats.duplicate_groups += 1;
            log::debug!("Size group {} bytes: {} candidates", size, paths.len());
        }
    }

    log::info!(
        "Phase 1 complete: {} files → {} candidates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (index, stats)
}

/// Paths of one size bucket grouped by content digest.
///
/// Each path is recorded with its submission index within the bucket, and
/// duplicate sets list their members in that order, whatever order the
/// digests were computed in.
#[derive(Debug, Clone)]
pub struct DigestIndex {
    size: u64,
    entries: BTreeMap<Digest, Vec<(usize, PathBuf)>>,
}

impl DigestIndex {
    /// Create an empty index for the bucket of files with `size` bytes.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            entries: BTreeMap::new(),
        }
    }

    /// File size shared by every path in this index.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Record that the path submitted at `index` has `digest`.
    pub fn insert(&mut self, index: usize, path: PathBuf, digest: Digest) {
        self.entries.entry(digest).or_default().push((index, path));
    }

    /// Number of distinct digests recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish the bucket: digests with two or more members become duplicate
    /// sets, in ascending digest order.
    #[must_use]
    pub fn into_duplicate_sets(self) -> Vec<DuplicateSet> {
        let size = self.size;
        self.entries
            .into_iter()
            .filter_map(|(digest, mut members)| {
                if members.len() < 2 {
                    return None;
                }
                members.sort_by_key(|(index, _)| *index);
                let files = members.into_iter().map(|(_, path)| path).collect();
                Some(DuplicateSet::new(digest, size, files))
            })
            .collect()
    }
}

/// Files with byte-identical content: same size and same digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSet {
    /// SHA-1 digest of the shared content
    pub digest: Digest,
    /// File size in bytes
    pub size: u64,
    /// Member paths, in walk order
    pub files: Vec<PathBuf>,
}

impl DuplicateSet {
    /// Create a new duplicate set.
    #[must_use]
    pub fn new(digest: Digest, size: u64, files: Vec<PathBuf>) -> Self {
        Self {
            digest,
            size,
            files,
        }
    }

    /// Number of files in this set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of redundant copies (all but one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes freed by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hash_to_hex(&self.digest)
    }
}
