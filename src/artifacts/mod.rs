//! Value types and algorithms
//!
//! - `branch`: branch names, symbolic refs and revision resolution
//! - `checkout`: migration planning and conflicts
//! - `core`: lockfile and pager writer
//! - `database`: entries read back out of trees
//! - `diff`: tree diffs, Myers line diffs and hunks
//! - `index`: index entries and file format pieces
//! - `objects`: blobs, trees, commits and their ids
//! - `status`: workspace and index change detection

pub mod branch;
pub mod checkout;
pub mod core;
pub mod database;
pub mod diff;
pub mod index;
pub mod objects;
pub mod status;
