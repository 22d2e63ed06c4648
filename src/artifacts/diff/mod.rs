//! Tree-level and line-level diffing
//!
//! - `tree_diff`: structural comparison of two trees (or commits)
//! - `myers`: Myers' shortest edit script over two sequences
//! - `hunk`: grouping of line edits into context-padded hunks
//! - `diff_target`: one side of a file diff (HEAD, index, workspace or nothing)

pub mod diff_target;
pub mod hunk;
pub mod myers;
pub mod tree_diff;
