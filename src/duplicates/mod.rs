//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Concurrent content hashing on a fixed worker pool
//! - Digest grouping into duplicate sets (Phase 2)
//! - Pipeline orchestration

pub mod finder;
pub mod groups;
pub mod pool;

pub use finder::{
    DuplicateFinder, FinderConfig, FinderError, ReadErrorPolicy, ScanSink, ScanSummary,
};
pub use groups::{group_by_size, DigestIndex, DuplicateSet, GroupingStats, SizeIndex};
pub use pool::{default_workers, DigestPool, HashJob, HashResult, PoolError};
