use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Every conflicting path, grouped by kind
pub type ConflictsSet = BTreeMap<ConflictType, BTreeSet<PathBuf>>;

#[derive(Debug)]
pub struct ConflictMessage {
    pub header: &'static str,
    pub footer: &'static str,
}

/// Why a checkout would lose work, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConflictType {
    StaleFile,
    StaleDirectory,
    UntrackedOverwritten,
    UntrackedRemoved,
}

impl ConflictType {
    pub fn message(&self) -> ConflictMessage {
        match self {
            ConflictType::StaleFile => ConflictMessage {
                header: "Your local changes to the following files would be overwritten by checkout:",
                footer: "Please commit your changes or stash them before you switch branches.",
            },
            ConflictType::StaleDirectory => ConflictMessage {
                header: "Updating the following directories would lose untracked files in them:",
                footer: "\n",
            },
            ConflictType::UntrackedOverwritten => ConflictMessage {
                header: "The following untracked working tree files would be overwritten by checkout:",
                footer: "Please move or remove them before you switch branches.",
            },
            ConflictType::UntrackedRemoved => ConflictMessage {
                header: "The following untracked working tree files would be removed by checkout:",
                footer: "Please move or remove them before you switch branches.",
            },
        }
    }

    /// Kind of a workspace conflict on a path the tree diff touches
    pub fn classify(
        stat: Option<&EntryMetadata>,
        entry: Option<&IndexEntry>,
        new_entry: Option<&DatabaseEntry>,
    ) -> ConflictType {
        if entry.is_some() {
            ConflictType::StaleFile
        } else if let Some(stat) = stat
            && stat.mode.is_tree()
        {
            ConflictType::StaleDirectory
        } else if new_entry.is_some() {
            ConflictType::UntrackedOverwritten
        } else {
            ConflictType::UntrackedRemoved
        }
    }
}
