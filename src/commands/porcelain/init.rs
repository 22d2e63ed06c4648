use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use anyhow::Context;
use std::fs;
use std::io::Write;
use tracing::debug;

const DEFAULT_BRANCH: &str = "master";

impl Repository {
    /// Lay out `.git` with an unborn `master`; running it again is harmless
    pub async fn init(&self) -> anyhow::Result<()> {
        let heads_path = self.refs().heads_path();
        for dir in [self.database().objects_path(), &*heads_path] {
            fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let branch = BranchName::try_parse(DEFAULT_BRANCH)?;
        self.refs()
            .attach_head(&branch)
            .context("Failed to create initial HEAD reference")?;
        debug!(path = %self.git_path().display(), %branch, "initialized repository");

        writeln!(
            self.writer(),
            "Initialized empty Git repository in {}",
            self.git_path().display()
        )?;

        Ok(())
    }
}
