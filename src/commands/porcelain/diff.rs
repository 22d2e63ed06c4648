use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::diff::diff_target::DiffTarget;
use crate::artifacts::diff::hunk::Hunk;
use crate::artifacts::diff::myers::{Edit, Line, diff_lines};
use crate::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};
use crate::artifacts::status::status_info::StatusInfo;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print index-vs-workspace changes, or HEAD-vs-index ones when `cached`
    pub async fn diff(&self, cached: bool) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.load_for_update()?;

        let status = match self.status_scanner().initialize(&mut index, None) {
            Ok(status) => status,
            Err(error) => {
                index.release_lock()?;
                return Err(error);
            }
        };
        index.write_updates()?;

        match cached {
            true => self.diff_head_index(&status, &index),
            false => self.diff_index_workspace(&status, &index),
        }
    }

    fn diff_index_workspace(&self, status: &StatusInfo, index: &Index) -> anyhow::Result<()> {
        let database = self.database();

        for (path, change) in &status.workspace_changes {
            let (a, b) = match change {
                WorkspaceChangeType::Modified => (
                    DiffTarget::from_index(path, index, database)?,
                    DiffTarget::from_file(path, self.workspace(), database, &status.stats)?,
                ),
                WorkspaceChangeType::Deleted => (
                    DiffTarget::from_index(path, index, database)?,
                    DiffTarget::from_nothing(path)?,
                ),
                WorkspaceChangeType::None | WorkspaceChangeType::Untracked => continue,
            };
            self.print_diff(&a, &b)?;
        }

        Ok(())
    }

    fn diff_head_index(&self, status: &StatusInfo, index: &Index) -> anyhow::Result<()> {
        let database = self.database();

        for (path, change) in &status.index_changes {
            let (a, b) = match change {
                IndexChangeType::Added => (
                    DiffTarget::from_nothing(path)?,
                    DiffTarget::from_index(path, index, database)?,
                ),
                IndexChangeType::Modified => (
                    DiffTarget::from_head(path, &status.head_tree, database)?,
                    DiffTarget::from_index(path, index, database)?,
                ),
                IndexChangeType::Deleted => (
                    DiffTarget::from_head(path, &status.head_tree, database)?,
                    DiffTarget::from_nothing(path)?,
                ),
                IndexChangeType::None => continue,
            };
            self.print_diff(&a, &b)?;
        }

        Ok(())
    }

    fn print_diff(&self, a: &DiffTarget, b: &DiffTarget) -> anyhow::Result<()> {
        if a.oid == b.oid && a.mode == b.mode {
            return Ok(());
        }

        let header = format!("diff --git a/{} b/{}", a.path.display(), b.path.display());
        writeln!(self.writer(), "{}", header.bold())?;

        self.print_diff_mode(a, b)?;
        self.print_diff_content(a, b)
    }

    fn print_diff_mode(&self, a: &DiffTarget, b: &DiffTarget) -> anyhow::Result<()> {
        let mut writer = self.writer();

        if a.mode.is_none() {
            writeln!(writer, "{}", format!("new file mode {}", b.pretty_mode()).bold())?;
        } else if b.mode.is_none() {
            writeln!(writer, "{}", format!("deleted file mode {}", a.pretty_mode()).bold())?;
        } else if a.mode != b.mode {
            writeln!(writer, "{}", format!("old mode {}", a.pretty_mode()).bold())?;
            writeln!(writer, "{}", format!("new mode {}", b.pretty_mode()).bold())?;
        }

        Ok(())
    }

    fn print_diff_content(&self, a: &DiffTarget, b: &DiffTarget) -> anyhow::Result<()> {
        if a.oid == b.oid {
            return Ok(());
        }

        let mut oid_range = format!("index {}..{}", a.oid.to_short_oid(), b.oid.to_short_oid());
        if a.mode == b.mode {
            oid_range.push_str(&format!(" {}", a.pretty_mode()));
        }

        {
            let mut writer = self.writer();
            writeln!(writer, "{}", oid_range.bold())?;
            writeln!(writer, "{}", format!("--- {}", a.diff_path("a")).bold())?;
            writeln!(writer, "{}", format!("+++ {}", b.diff_path("b")).bold())?;
        }

        let edits = diff_lines(&a.data, &b.data);
        for hunk in Hunk::filter(&edits) {
            self.print_diff_hunk(&hunk)?;
        }

        Ok(())
    }

    fn print_diff_hunk(&self, hunk: &Hunk) -> anyhow::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "{}", hunk.header().cyan())?;
        for edit in hunk.edits() {
            writeln!(writer, "{}", colored_edit(edit))?;
        }

        Ok(())
    }
}

fn colored_edit(edit: &Edit<Line>) -> String {
    let text = edit.to_string();

    match edit {
        Edit::Equal { .. } => text,
        Edit::Insert { .. } => text.green().to_string(),
        Edit::Delete { .. } => text.red().to_string(),
    }
}
