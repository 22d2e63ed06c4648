use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::{FileChange, IndexChangeType, WorkspaceChangeType};
use crate::artifacts::status::inspector::Inspector;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

pub type HeadTree = BTreeMap<PathBuf, DatabaseEntry>;

/// Result of one status scan
#[derive(Debug, Clone, Default)]
pub struct StatusInfo {
    /// Stats of the tracked files found in the workspace
    pub stats: BTreeMap<PathBuf, EntryMetadata>,
    /// Untracked files, and untracked directories with a trailing `/`
    pub untracked_files: BTreeSet<String>,
    pub changed: BTreeMap<PathBuf, FileChange>,
    pub workspace_changes: BTreeMap<PathBuf, WorkspaceChangeType>,
    pub index_changes: BTreeMap<PathBuf, IndexChangeType>,
    pub head_tree: HeadTree,
}

impl StatusInfo {
    fn record_workspace_change(&mut self, path: &Path, change: WorkspaceChangeType) {
        self.changed.entry(path.to_path_buf()).or_default().workspace_change = change;
        self.workspace_changes.insert(path.to_path_buf(), change);
    }

    fn record_index_change(&mut self, path: &Path, change: IndexChangeType) {
        self.changed.entry(path.to_path_buf()).or_default().index_change = change;
        self.index_changes.insert(path.to_path_buf(), change);
    }
}

/// Scans the workspace and index against a commit (HEAD by default)
///
/// Unchanged files whose cached stat went stale get it refreshed in the
/// index, so the caller should write the index back afterwards.
#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl<'r> Status<'r> {
    pub fn initialize(&self, index: &mut Index, commit_oid: Option<&ObjectId>) -> anyhow::Result<StatusInfo> {
        let inspector = Inspector::new(self.repository.workspace(), self.repository.database());
        let mut info = StatusInfo::default();

        let head_oid = match commit_oid {
            Some(oid) => Some(oid.clone()),
            None => self.repository.refs().read_head()?,
        };
        info.head_tree = self.repository.database().load_tree_list(head_oid.as_ref())?;

        self.scan_workspace(None, index, &inspector, &mut info)?;
        self.check_index_entries(index, &inspector, &mut info)?;
        self.collect_deleted_head_files(index, &mut info);

        debug!(
            untracked = info.untracked_files.len(),
            workspace = info.workspace_changes.len(),
            index = info.index_changes.len(),
            "status scanned"
        );

        Ok(info)
    }

    fn scan_workspace(
        &self,
        prefix: Option<&Path>,
        index: &Index,
        inspector: &Inspector<'_>,
        info: &mut StatusInfo,
    ) -> anyhow::Result<()> {
        let workspace = self.repository.workspace();

        for (path, stat) in workspace.list_dir(prefix)? {
            if index.is_tracked(&path) {
                if stat.is_dir() {
                    self.scan_workspace(Some(&path), index, inspector, info)?;
                } else if stat.is_file()
                    && let Some(stat) = workspace.stat_file(&path)?
                {
                    info.stats.insert(path, stat);
                }
            } else if inspector.trackable_file(index, &path, &stat)? {
                let display = match stat.is_dir() {
                    true => format!("{}/", path.display()),
                    false => path.display().to_string(),
                };
                info.untracked_files.insert(display);
            }
        }

        Ok(())
    }

    fn check_index_entries(
        &self,
        index: &mut Index,
        inspector: &Inspector<'_>,
        info: &mut StatusInfo,
    ) -> anyhow::Result<()> {
        let entries = index.entries().cloned().collect::<Vec<IndexEntry>>();

        for entry in entries {
            let stat = info.stats.get(&entry.name).cloned();
            match inspector.compare_index_to_workspace(Some(&entry), stat.as_ref())? {
                WorkspaceChangeType::None => {
                    if let Some(stat) = stat
                        && !entry.times_match(&stat)
                    {
                        index.update_entry_stat(&entry.name, stat);
                    }
                }
                change => info.record_workspace_change(&entry.name, change),
            }

            let item = info.head_tree.get(&entry.name);
            match inspector.compare_tree_to_index(item, Some(&entry)) {
                IndexChangeType::None => {}
                change => info.record_index_change(&entry.name, change),
            }
        }

        Ok(())
    }

    fn collect_deleted_head_files(&self, index: &Index, info: &mut StatusInfo) {
        let deleted = info
            .head_tree
            .keys()
            .filter(|path| !index.is_tracked_file(path))
            .cloned()
            .collect::<Vec<_>>();

        for path in deleted {
            info.record_index_change(&path, IndexChangeType::Deleted);
        }
    }
}
