//! Checkout planning and conflict detection
//!
//! A [`Migration`](migration::Migration) turns a tree diff into workspace and
//! index actions. Every conflicting path is collected during planning, so a
//! rejected checkout leaves the workspace and index untouched.

pub mod conflict;
pub mod migration;
