//! User-facing commands, each implemented as methods on
//! [`Repository`](crate::areas::repository::Repository)

pub mod porcelain;
