use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};
use derive_new::new;
use std::fs::Metadata;
use std::path::Path;

/// Compares single paths across the workspace, the index and a tree
#[derive(new)]
pub struct Inspector<'r> {
    workspace: &'r Workspace,
    database: &'r Database,
}

impl<'r> Inspector<'r> {
    /// An untracked file, or a directory holding any untracked file below it
    ///
    /// Empty directories are never trackable.
    pub fn trackable_file(&self, index: &Index, path: &Path, stat: &Metadata) -> anyhow::Result<bool> {
        if stat.is_file() {
            return Ok(!index.is_tracked_file(path));
        }
        if !stat.is_dir() {
            return Ok(false);
        }

        let items = self.workspace.list_dir(Some(path))?;
        let (files, dirs): (Vec<_>, Vec<_>) = items
            .iter()
            .filter(|(_, item_stat)| item_stat.is_file() || item_stat.is_dir())
            .partition(|(_, item_stat)| item_stat.is_file());

        for (item_path, item_stat) in files.into_iter().chain(dirs) {
            if self.trackable_file(index, item_path, item_stat)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Stat-cache check first; content is hashed only when the times moved
    pub fn compare_index_to_workspace(
        &self,
        entry: Option<&IndexEntry>,
        stat: Option<&EntryMetadata>,
    ) -> anyhow::Result<WorkspaceChangeType> {
        let Some(entry) = entry else {
            return Ok(WorkspaceChangeType::Untracked);
        };
        let Some(stat) = stat else {
            return Ok(WorkspaceChangeType::Deleted);
        };

        if !entry.stat_match(stat) {
            return Ok(WorkspaceChangeType::Modified);
        }
        if entry.times_match(stat) {
            return Ok(WorkspaceChangeType::None);
        }

        let blob = Blob::new(self.workspace.read_file(&entry.name)?);
        match self.database.hash_object(&blob)? == entry.oid {
            true => Ok(WorkspaceChangeType::None),
            false => Ok(WorkspaceChangeType::Modified),
        }
    }

    pub fn compare_tree_to_index(
        &self,
        item: Option<&DatabaseEntry>,
        entry: Option<&IndexEntry>,
    ) -> IndexChangeType {
        match (item, entry) {
            (None, None) => IndexChangeType::None,
            (None, Some(_)) => IndexChangeType::Added,
            (Some(_), None) => IndexChangeType::Deleted,
            (Some(item), Some(entry)) if item.matches(entry) => IndexChangeType::None,
            (Some(_), Some(_)) => IndexChangeType::Modified,
        }
    }
}
