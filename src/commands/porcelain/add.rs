use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::blob::Blob;
use anyhow::Context;
use std::path::{Component, Path, PathBuf};

impl Repository {
    /// Stage `paths`, expanding directories and dropping vanished files below them
    pub async fn add(&self, paths: &[String]) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.load_for_update()?;

        match self.stage_paths(&mut index, paths) {
            Ok(()) => index.write_updates(),
            Err(error) => {
                index.release_lock()?;
                Err(error)
            }
        }
    }

    fn stage_paths(&self, index: &mut Index, paths: &[String]) -> anyhow::Result<()> {
        let paths = paths
            .iter()
            .map(|path| self.relative_path(Path::new(path)))
            .collect::<Vec<_>>();

        // every pathspec must match before anything is staged
        let mut files = Vec::new();
        for path in &paths {
            files.extend(self.workspace().list_files(path)?);
        }

        for path in &paths {
            index.delete_nonexistent_entries(path, self.workspace())?;
        }

        for file in files {
            let data = self
                .workspace()
                .read_file(&file)
                .context("adding files failed")?;
            let Some(stat) = self.workspace().stat_file(&file)? else {
                continue;
            };

            let oid = self.database().store(&Blob::new(data))?;
            index.add(IndexEntry::new(file, oid, stat));
        }

        Ok(())
    }

    /// Command line paths are taken relative to the repository root
    pub(crate) fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.path())
            .unwrap_or(path)
            .components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect()
    }
}
