//! Porcelain commands
//!
//! - `init`: create the metadata directory
//! - `add`: stage files
//! - `commit`: record the index as a commit
//! - `status`: show index and workspace changes
//! - `diff`: print unified diffs of those changes
//! - `branch`: list, create or delete branches
//! - `checkout`: switch branches or detach HEAD
//! - `log`: walk the first-parent history

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod diff;
pub mod init;
pub mod log;
pub mod status;
