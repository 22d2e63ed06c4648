//! Checkout migration planner and executor
//!
//! A [`Migration`] turns a tree diff into workspace and index updates in two
//! phases. Planning inspects every changed path against the live workspace
//! and index and collects all conflicts; nothing is touched unless that
//! collection comes back empty. Applying then updates the workspace first
//! and the index second.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::conflict::{ConflictType, ConflictsSet};
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::diff::tree_diff::{ChangeSet, TreeChangeType};
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};
use crate::artifacts::status::inspector::Inspector;
use crate::errors::TwigError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File system action required for one changed path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionType {
    Create,
    Update,
    Delete,
}

/// Target entry per path; `None` for deletions
pub type ActionList = Vec<(PathBuf, Option<DatabaseEntry>)>;

pub struct Migration<'r> {
    repository: &'r Repository,
    index: &'r mut Index,
    diff: ChangeSet,
    changes: BTreeMap<ActionType, ActionList>,
    mkdirs: BTreeSet<PathBuf>,
    rmdirs: BTreeSet<PathBuf>,
    conflicts: ConflictsSet,
}

impl<'r> Migration<'r> {
    pub fn new(repository: &'r Repository, index: &'r mut Index, diff: ChangeSet) -> Self {
        Migration {
            repository,
            index,
            diff,
            changes: BTreeMap::new(),
            mkdirs: BTreeSet::new(),
            rmdirs: BTreeSet::new(),
            conflicts: ConflictsSet::new(),
        }
    }

    pub fn changes(&self, action: ActionType) -> &[(PathBuf, Option<DatabaseEntry>)] {
        self.changes.get(&action).map(Vec::as_slice).unwrap_or_default()
    }

    /// Directories that must exist before files are written, parents first
    pub fn mkdirs(&self) -> &BTreeSet<PathBuf> {
        &self.mkdirs
    }

    /// Directories that may be left empty by deletions, parents first
    pub fn rmdirs(&self) -> &BTreeSet<PathBuf> {
        &self.rmdirs
    }

    pub fn blob_data(&self, oid: &ObjectId) -> anyhow::Result<Bytes> {
        let blob = self
            .repository
            .database()
            .load_blob(oid)
            .with_context(|| format!("Unable to load blob {oid} for checkout"))?;

        Ok(blob.content().clone())
    }

    /// Plan, then update the workspace and the index
    ///
    /// Fails with [`TwigError::MigrationConflict`] before touching anything if
    /// any changed path would lose work.
    pub fn apply_changes(&mut self) -> anyhow::Result<()> {
        self.plan_changes()?;
        self.update_workspace()?;
        self.update_index()?;

        Ok(())
    }

    fn plan_changes(&mut self) -> anyhow::Result<()> {
        let diff = std::mem::take(&mut self.diff);

        for (path, change) in &diff {
            self.check_for_conflict(path, change)?;
            self.record_change(path, change);
        }

        self.conflicts.retain(|_, paths| !paths.is_empty());
        if !self.conflicts.is_empty() {
            debug!(kinds = self.conflicts.len(), "checkout blocked by conflicts");
            return Err(TwigError::MigrationConflict(std::mem::take(&mut self.conflicts)).into());
        }

        debug!(
            create = self.changes(ActionType::Create).len(),
            update = self.changes(ActionType::Update).len(),
            delete = self.changes(ActionType::Delete).len(),
            "migration planned"
        );

        Ok(())
    }

    fn inspector(&self) -> Inspector<'r> {
        Inspector::new(self.repository.workspace(), self.repository.database())
    }

    fn check_for_conflict(&mut self, path: &Path, change: &TreeChangeType) -> anyhow::Result<()> {
        let entry = self.index.entry_for_path(path).cloned();
        let old_item = change.old_entry();
        let new_item = change.new_entry();

        if self.index_differs_from_trees(entry.as_ref(), old_item, new_item) {
            self.add_conflict(ConflictType::StaleFile, path);
            return Ok(());
        }

        let workspace = self.repository.workspace();
        let inspector = self.inspector();
        let stat = workspace.stat_file(path)?;
        let conflict_type = ConflictType::classify(stat.as_ref(), entry.as_ref(), new_item);

        match stat {
            None => {
                if let Some(parent) = self.untracked_parent(path)? {
                    let conflicting = match entry {
                        Some(_) => path.to_path_buf(),
                        None => parent,
                    };
                    self.add_conflict(conflict_type, &conflicting);
                }
            }
            Some(stat) if !stat.mode.is_tree() => {
                let change = inspector.compare_index_to_workspace(entry.as_ref(), Some(&stat))?;
                if change != WorkspaceChangeType::None {
                    self.add_conflict(conflict_type, path);
                }
            }
            Some(_) => {
                if let Some(metadata) = workspace.metadata(path)?
                    && inspector.trackable_file(self.index, path, &metadata)?
                {
                    self.add_conflict(conflict_type, path);
                }
            }
        }

        Ok(())
    }

    /// Staged work that matches neither side of the diff would be lost
    fn index_differs_from_trees(
        &self,
        entry: Option<&IndexEntry>,
        old_item: Option<&DatabaseEntry>,
        new_item: Option<&DatabaseEntry>,
    ) -> bool {
        let inspector = self.inspector();

        inspector.compare_tree_to_index(old_item, entry) != IndexChangeType::None
            && inspector.compare_tree_to_index(new_item, entry) != IndexChangeType::None
    }

    /// Closest ancestor that is an untracked file standing where a directory belongs
    fn untracked_parent(&self, path: &Path) -> anyhow::Result<Option<PathBuf>> {
        let workspace = self.repository.workspace();
        let inspector = self.inspector();

        let Some(dirname) = path.parent() else {
            return Ok(None);
        };

        for parent in dirname.ancestors() {
            if parent.as_os_str().is_empty() || parent == Path::new(".") {
                continue;
            }

            if let Some(metadata) = workspace.metadata(parent)?
                && metadata.is_file()
                && inspector.trackable_file(self.index, parent, &metadata)?
            {
                return Ok(Some(parent.to_path_buf()));
            }
        }

        Ok(None)
    }

    fn add_conflict(&mut self, conflict_type: ConflictType, path: &Path) {
        self.conflicts
            .entry(conflict_type)
            .or_default()
            .insert(path.to_path_buf());
    }

    fn record_change(&mut self, path: &Path, change: &TreeChangeType) {
        let dirs = path
            .parent()
            .map(|dirname| {
                dirname
                    .ancestors()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let action = match change {
            TreeChangeType::Deleted(_) => {
                self.rmdirs.extend(dirs);
                ActionType::Delete
            }
            TreeChangeType::Added(_) => {
                self.mkdirs.extend(dirs);
                ActionType::Create
            }
            TreeChangeType::Modified { .. } => {
                self.mkdirs.extend(dirs);
                ActionType::Update
            }
        };

        self.changes
            .entry(action)
            .or_default()
            .push((path.to_path_buf(), change.new_entry().cloned()));
    }

    fn update_workspace(&self) -> anyhow::Result<()> {
        self.repository.workspace().apply_migration(self)
    }

    fn update_index(&mut self) -> anyhow::Result<()> {
        let workspace = self.repository.workspace();

        for (path, _) in self.changes(ActionType::Delete).to_vec() {
            self.index.remove(&path);
        }

        for action in [ActionType::Create, ActionType::Update] {
            for (path, entry) in self.changes(action).to_vec() {
                let entry = entry.with_context(|| format!("No target entry for {}", path.display()))?;
                let stat = workspace
                    .stat_file(&path)?
                    .with_context(|| format!("{} vanished during checkout", path.display()))?;

                self.index.add(IndexEntry::new(path, entry.oid, stat));
            }
        }

        Ok(())
    }
}
