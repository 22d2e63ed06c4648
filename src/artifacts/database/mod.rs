//! Values read back out of the object database
//!
//! A [`DatabaseEntry`](database_entry::DatabaseEntry) is what a tree stores
//! for each child, and what the tree differ and checkout compare.

pub mod database_entry;
