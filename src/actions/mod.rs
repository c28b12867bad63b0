//! File actions module.
//!
//! This module provides functionality for:
//! - Choosing which member of a duplicate set survives (retention)
//! - Deleting the other members, optionally pruning emptied directories
//!
//! # Retention
//!
//! The member with the shortest path string is kept:
//!
//! ```
//! use dups::actions::plan_retention;
//! use dups::duplicates::DuplicateSet;
//! use std::path::{Path, PathBuf};
//!
//! let set = DuplicateSet::new([0; 20], 3, vec![PathBuf::from("/x/long"), PathBuf::from("/s")]);
//! assert_eq!(plan_retention(set).keep(), Path::new("/s"));
//! ```
//!
//! # Deletion
//!
//! Deletion is permanent and opt-in; the default configuration is a dry
//! run that only reports candidates.

pub mod delete;
pub mod retention;

// Re-export commonly used types
pub use delete::{
    apply_plan, prune_empty_parent, remove_duplicate, BatchDeleteResult, DeleteConfig,
    DeleteError, DeleteProgressCallback, DeleteResult, PruneOutcome,
};
pub use retention::{plan_retention, RetentionPlan};
