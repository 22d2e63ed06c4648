use crate::areas::database::Database;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One changed file between two trees; "both absent" is unrepresentable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChangeType {
    Added(DatabaseEntry),
    Deleted(DatabaseEntry),
    Modified { old: DatabaseEntry, new: DatabaseEntry },
}

impl TreeChangeType {
    /// `None` when nothing changed
    pub fn from_entries(old: Option<DatabaseEntry>, new: Option<DatabaseEntry>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(TreeChangeType::Added(new)),
            (Some(old), None) => Some(TreeChangeType::Deleted(old)),
            (Some(old), Some(new)) if old != new => Some(TreeChangeType::Modified { old, new }),
            _ => None,
        }
    }

    pub fn old_entry(&self) -> Option<&DatabaseEntry> {
        match self {
            TreeChangeType::Deleted(entry) => Some(entry),
            TreeChangeType::Modified { old, .. } => Some(old),
            TreeChangeType::Added(_) => None,
        }
    }

    pub fn new_entry(&self) -> Option<&DatabaseEntry> {
        match self {
            TreeChangeType::Added(entry) => Some(entry),
            TreeChangeType::Modified { new, .. } => Some(new),
            TreeChangeType::Deleted(_) => None,
        }
    }
}

pub type ChangeSet = BTreeMap<PathBuf, TreeChangeType>;
type TreeEntryMap = BTreeMap<String, DatabaseEntry>;

/// Structural diff of two trees, flattened into file-level changes
#[derive(Debug)]
pub struct TreeDiff<'r> {
    database: &'r Database,
    changes: ChangeSet,
}

impl<'r> TreeDiff<'r> {
    pub fn new(database: &'r Database) -> Self {
        TreeDiff {
            database,
            changes: BTreeMap::new(),
        }
    }

    pub fn into_changes(self) -> ChangeSet {
        self.changes
    }

    /// Compare two trees or commits under `prefix`; `None` is the empty tree
    pub fn compare_oids(&mut self, old: Option<&ObjectId>, new: Option<&ObjectId>, prefix: &Path) -> anyhow::Result<()> {
        if old == new {
            return Ok(());
        }

        let old_entries = self.tree_entries(old)?;
        let new_entries = self.tree_entries(new)?;

        self.detect_deletions(&old_entries, &new_entries, prefix)?;
        self.detect_additions(&old_entries, &new_entries, prefix)?;

        Ok(())
    }

    fn tree_entries(&self, oid: Option<&ObjectId>) -> anyhow::Result<TreeEntryMap> {
        let Some(oid) = oid else {
            return Ok(BTreeMap::new());
        };

        match self.database.load(oid)? {
            ObjectBox::Tree(tree) => Ok(tree.into_entries().collect()),
            ObjectBox::Commit(commit) => self.tree_entries(Some(commit.tree_oid())),
            ObjectBox::Blob(_) => anyhow::bail!("object {oid} is a blob, not a tree"),
        }
    }

    /// Entries of `old` that are gone or different in `new`
    fn detect_deletions(&mut self, old: &TreeEntryMap, new: &TreeEntryMap, prefix: &Path) -> anyhow::Result<()> {
        for (name, entry) in old {
            let other = new.get(name);
            if other == Some(entry) {
                continue;
            }

            let path = prefix.join(name);

            let old_tree = entry.is_tree().then_some(&entry.oid);
            let new_tree = other.filter(|other| other.is_tree()).map(|other| &other.oid);
            self.compare_oids(old_tree, new_tree, &path)?;

            let old_blob = (!entry.is_tree()).then(|| entry.clone());
            let new_blob = other.filter(|other| !other.is_tree()).cloned();
            if let Some(change) = TreeChangeType::from_entries(old_blob, new_blob) {
                self.changes.insert(path, change);
            }
        }

        Ok(())
    }

    /// Entries that only exist in `new`
    fn detect_additions(&mut self, old: &TreeEntryMap, new: &TreeEntryMap, prefix: &Path) -> anyhow::Result<()> {
        for (name, entry) in new {
            if old.contains_key(name) {
                continue;
            }

            let path = prefix.join(name);
            if entry.is_tree() {
                self.compare_oids(None, Some(&entry.oid), &path)?;
            } else {
                self.changes.insert(path, TreeChangeType::Added(entry.clone()));
            }
        }

        Ok(())
    }
}
