use crate::areas::repository::Repository;
use crate::artifacts::status::file_change::LABEL_WIDTH;
use crate::artifacts::status::status_info::StatusInfo;
use colored::{Color, Colorize};
use std::fmt::Display;
use std::io::Write;

impl Repository {
    pub async fn status(&self, porcelain: bool) -> anyhow::Result<()> {
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

        match porcelain {
            true => self.print_porcelain_format(&status),
            false => self.print_long_format(&status),
        }
    }

    fn print_porcelain_format(&self, status: &StatusInfo) -> anyhow::Result<()> {
        for (path, change) in &status.changed {
            writeln!(self.writer(), "{} {}", change, path.display())?;
        }
        for path in &status.untracked_files {
            writeln!(self.writer(), "?? {path}")?;
        }

        Ok(())
    }

    fn print_long_format(&self, status: &StatusInfo) -> anyhow::Result<()> {
        self.print_branch_status()?;

        self.print_changes(
            "Changes to be committed",
            status
                .index_changes
                .iter()
                .map(|(path, change)| (path.display(), change.long_label())),
            Color::Green,
        )?;
        self.print_changes(
            "Changes not staged for commit",
            status
                .workspace_changes
                .iter()
                .map(|(path, change)| (path.display(), change.long_label())),
            Color::Red,
        )?;
        self.print_changes(
            "Untracked files",
            status.untracked_files.iter().map(|path| (path, "")),
            Color::Red,
        )?;

        self.print_commit_status(status)
    }

    fn print_branch_status(&self) -> anyhow::Result<()> {
        let current = self.refs().current_ref(None)?;

        match current.is_head() {
            true => writeln!(self.writer(), "{}", "Not currently on any branch.".red())?,
            false => writeln!(self.writer(), "On branch {}", current.short_name())?,
        }

        Ok(())
    }

    fn print_changes<P: Display>(
        &self,
        message: &str,
        changes: impl Iterator<Item = (P, &'static str)>,
        color: Color,
    ) -> anyhow::Result<()> {
        let mut changes = changes.peekable();
        if changes.peek().is_none() {
            return Ok(());
        }

        writeln!(self.writer(), "{message}:")?;
        writeln!(self.writer())?;
        for (path, label) in changes {
            let line = match label.is_empty() {
                true => path.to_string(),
                false => format!("{label:<LABEL_WIDTH$}{path}"),
            };
            writeln!(self.writer(), "\t{}", line.color(color))?;
        }
        writeln!(self.writer())?;

        Ok(())
    }

    fn print_commit_status(&self, status: &StatusInfo) -> anyhow::Result<()> {
        if !status.index_changes.is_empty() {
            return Ok(());
        }

        let summary = if !status.workspace_changes.is_empty() {
            "no changes added to commit"
        } else if !status.untracked_files.is_empty() {
            "nothing added to commit but untracked files present"
        } else {
            "nothing to commit, working tree clean"
        };
        writeln!(self.writer(), "{summary}")?;

        Ok(())
    }
}
