//! Retention policy: which member of a duplicate set survives.
//!
//! Members are stable-sorted by the byte length of their path string,
//! longest first, and the last element is kept. In other words the file with
//! the shortest path survives and every longer-named copy is a deletion
//! candidate. Paths of equal length keep their set order, so among the
//! shortest paths the one listed last wins.
//!
//! ```
//! use dups::actions::plan_retention;
//! use dups::duplicates::DuplicateSet;
//! use std::path::{Path, PathBuf};
//!
//! let set = DuplicateSet::new(
//!     [0; 20],
//!     5,
//!     vec![PathBuf::from("root/a.txt"), PathBuf::from("root/b/b.txt")],
//! );
//! let plan = plan_retention(set);
//! assert_eq!(plan.keep(), Path::new("root/a.txt"));
//! assert_eq!(plan.remove(), &[PathBuf::from("root/b/b.txt")]);
//! ```

use std::path::{Path, PathBuf};

use crate::duplicates::DuplicateSet;
use crate::scanner::{hash_to_hex, Digest};

/// Members of a duplicate set in retention order.
///
/// Invariant: `ordered` has at least one element; the last one is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPlan {
    digest: Digest,
    size: u64,
    ordered: Vec<PathBuf>,
}

impl RetentionPlan {
    /// Digest shared by every member.
    #[must_use]
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hash_to_hex(&self.digest)
    }

    /// File size shared by every member.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// All members, longest path first.
    #[must_use]
    pub fn members(&self) -> &[PathBuf] {
        &self.ordered
    }

    /// The member that survives.
    #[must_use]
    pub fn keep(&self) -> &Path {
        self.ordered.last().map_or_else(|| Path::new(""), PathBuf::as_path)
    }

    /// Deletion candidates: every member but the retained one.
    #[must_use]
    pub fn remove(&self) -> &[PathBuf] {
        &self.ordered[..self.ordered.len().saturating_sub(1)]
    }

    /// Bytes freed if every candidate is deleted.
    #[must_use]
    pub fn reclaimable(&self) -> u64 {
        self.size * self.remove().len() as u64
    }
}

/// Length used by the retention order: bytes of the path string.
fn path_len(path: &Path) -> usize {
    path.as_os_str().len()
}

/// Order a duplicate set for retention.
#[must_use]
pub fn plan_retention(set: DuplicateSet) -> RetentionPlan {
    let DuplicateSet {
        digest,
        size,
        files: mut ordered,
    } = set;

    // sort_by_key is stable
    ordered.sort_by_key(|path| std::cmp::Reverse(path_len(path)));

    log::debug!(
        "retention for {}: keep {}",
        hash_to_hex(&digest),
        ordered.last().map_or_else(String::new, |p| p.display().to_string())
    );

    RetentionPlan {
        digest,
        size,
        ordered,
    }
}
