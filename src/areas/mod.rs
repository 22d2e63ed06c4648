//! The persistent areas of a repository
//!
//! - `database`: content-addressed object store
//! - `index`: staging area
//! - `refs`: HEAD and branches
//! - `workspace`: the checked-out files
//! - `repository`: ties the areas together for the commands

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
