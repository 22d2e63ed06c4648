//! Working tree status
//!
//! - `file_change`: per-path index and workspace change kinds
//! - `inspector`: stat-cache comparisons and untracked-content checks
//! - `status_info`: the full scan against the index and the HEAD tree

pub mod file_change;
pub mod inspector;
pub mod status_info;
