//! Error kinds surfaced by the repository areas
//!
//! Operations return `anyhow::Result`, but every condition a caller may want to
//! react to is raised as a [`TwigError`] so it can be recovered with
//! `downcast_ref::<TwigError>()` and matched on kind instead of message text.

use crate::artifacts::checkout::conflict::ConflictsSet;
use std::path::PathBuf;
use thiserror::Error;

/// A revision error message together with its hint lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintedError {
    pub message: String,
    pub hints: Vec<String>,
}

impl HintedError {
    pub fn new(message: impl Into<String>, hints: Vec<String>) -> Self {
        HintedError {
            message: message.into(),
            hints,
        }
    }
}

#[derive(Debug, Error)]
pub enum TwigError {
    #[error("index file corrupt: {0}")]
    IndexCorrupt(String),

    #[error(
        "Unable to create '{}': File exists.\n\n\
        Another twig process seems to be running in this repository.\n\
        Please make sure all processes are terminated then try again.\n\
        If it still fails, a twig process may have crashed in this\n\
        repository earlier: remove the file manually to continue.",
        .0.display()
    )]
    LockDenied(PathBuf),

    #[error("missing parent directory for '{}'", .0.display())]
    MissingParent(PathBuf),

    #[error("open('{}'): Permission denied", .0.display())]
    NoPermission(PathBuf),

    #[error("Not holding lock on file: {}", .0.display())]
    StaleLock(PathBuf),

    #[error("pathspec '{}' did not match any files", .0.display())]
    MissingFile(PathBuf),

    #[error("'{0}' is not a valid branch name.")]
    InvalidBranch(String),

    #[error("A branch named '{0}' already exists.")]
    BranchExists(String),

    #[error("branch '{0}' not found.")]
    BranchNotFound(String),

    #[error("Not a valid object name: '{name}'.")]
    InvalidObject {
        name: String,
        errors: Vec<HintedError>,
    },

    #[error("{}", render_conflicts(.0))]
    MigrationConflict(ConflictsSet),

    #[error("author identity unknown: set GIT_AUTHOR_NAME and GIT_AUTHOR_EMAIL")]
    MissingAuthor,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TwigError {
    /// Process exit code the presentation layer should use for this kind
    pub fn exit_code(&self) -> i32 {
        match self {
            TwigError::IndexCorrupt(_)
            | TwigError::LockDenied(_)
            | TwigError::MissingFile(_)
            | TwigError::InvalidBranch(_)
            | TwigError::BranchExists(_)
            | TwigError::BranchNotFound(_)
            | TwigError::InvalidObject { .. }
            | TwigError::MigrationConflict(_) => 128,
            _ => 1,
        }
    }

    /// Lines printed ahead of the final `fatal:` line
    pub fn hinted_errors(&self) -> &[HintedError] {
        match self {
            TwigError::InvalidObject { errors, .. } => errors,
            _ => &[],
        }
    }
}

fn render_conflicts(conflicts: &ConflictsSet) -> String {
    let mut messages = conflicts
        .iter()
        .filter(|(_, paths)| !paths.is_empty())
        .map(|(conflict_type, paths)| {
            let message = conflict_type.message();
            let paths = paths
                .iter()
                .map(|path| format!("\t{}", path.display()))
                .collect::<Vec<_>>()
                .join("\n");

            format!("error: {}\n{}\n{}", message.header, paths, message.footer)
        })
        .collect::<Vec<_>>();
    messages.push("Aborting".to_string());

    messages.join("\n")
}
