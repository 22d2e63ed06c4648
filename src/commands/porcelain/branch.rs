use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::{BranchName, SymRef};
use crate::artifacts::branch::revision::RevisionContext;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::TwigError;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print every branch, marking the current one; `verbose` adds the tip commit
    pub async fn list_branches(&self, verbose: bool) -> anyhow::Result<()> {
        let current = self.refs().current_ref(None)?;
        let branches = self.refs().list_branches()?;
        let width = branches
            .iter()
            .map(|branch| branch.short_name().len())
            .max()
            .unwrap_or_default();

        if current.is_head()
            && let Some(oid) = self.refs().read_head()?
        {
            let name = format!("(HEAD detached at {})", oid.to_short_oid());
            writeln!(self.writer(), "* {}", name.green())?;
        }

        for branch in &branches {
            let mut line = match *branch == current {
                true => format!("* {}", branch.short_name().green()),
                false => format!("  {}", branch.short_name()),
            };

            if verbose && let Some(oid) = branch.read_oid(self.refs())? {
                let padding = " ".repeat(width - branch.short_name().len());
                line.push_str(&format!("{padding} {}", self.commit_summary(&oid)?));
            }

            writeln!(self.writer(), "{line}")?;
        }

        Ok(())
    }

    /// Create `name` at `start_point` (HEAD by default)
    pub async fn create_branch(&self, name: &str, start_point: Option<&str>, force: bool) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(name)?;

        let start_oid = match start_point {
            Some(start_point) => {
                RevisionContext::new(self.database(), self.refs()).resolve(start_point, Some(ObjectType::Commit))?
            }
            None => self.refs().read_head()?.ok_or_else(|| TwigError::InvalidObject {
                name: self.refs().current_ref(None).map_or_else(
                    |_| SymRef::head().to_string(),
                    |current| current.short_name().to_string(),
                ),
                errors: Vec::new(),
            })?,
        };

        self.refs().create_branch(&branch_name, &start_oid, force)
    }

    /// Delete each named branch, stopping at the first failure
    pub async fn delete_branches(&self, names: &[String]) -> anyhow::Result<()> {
        for name in names {
            let branch_name = BranchName::try_parse(name.as_str())?;
            let oid = self.refs().delete_branch(&branch_name)?;

            writeln!(self.writer(), "Deleted branch {} (was {}).", branch_name, oid.to_short_oid())?;
        }

        Ok(())
    }

    fn commit_summary(&self, oid: &ObjectId) -> anyhow::Result<String> {
        let commit = self.database().load_commit(oid)?;

        Ok(format!("{} {}", oid.to_short_oid(), commit.title_line()))
    }
}
