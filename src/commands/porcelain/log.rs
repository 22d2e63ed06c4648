use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::{HEAD_REF_NAME, SymRef};
use crate::artifacts::branch::revision::RevisionContext;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use colored::Colorize;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CommitFormat {
    #[default]
    Medium,
    Oneline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Decoration {
    Short,
    Full,
    #[default]
    No,
}

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub revision: Option<String>,
    pub format: CommitFormat,
    pub abbrev_commit: bool,
    pub decorate: Decoration,
}

/// Ref names to print next to each commit
struct Decorations {
    reverse_refs: HashMap<ObjectId, Vec<SymRef>>,
    current_ref: SymRef,
    mode: Decoration,
}

impl Decorations {
    fn render(&self, oid: &ObjectId) -> String {
        if self.mode == Decoration::No {
            return String::new();
        }
        let Some(refs) = self.reverse_refs.get(oid) else {
            return String::new();
        };

        // an attached HEAD is folded into its branch as `HEAD -> branch`
        let head = refs
            .iter()
            .find(|sym_ref| sym_ref.is_head() && !self.current_ref.is_head());
        let names = refs
            .iter()
            .filter(|sym_ref| head.is_none_or(|head| sym_ref != &head))
            .map(|sym_ref| {
                let name = self.ref_name(sym_ref);
                match head {
                    Some(_) if *sym_ref == self.current_ref => {
                        format!("{} {}", format!("{HEAD_REF_NAME} ->").cyan().bold(), name)
                    }
                    _ => name,
                }
            })
            .collect::<Vec<_>>();

        format!(" {}{}{}", "(".yellow(), names.join(&", ".yellow().to_string()), ")".yellow())
    }

    fn ref_name(&self, sym_ref: &SymRef) -> String {
        let name = match self.mode {
            Decoration::Full => sym_ref.as_ref_path(),
            Decoration::Short | Decoration::No => sym_ref.short_name(),
        };

        match sym_ref.is_head() {
            true => name.cyan().bold().to_string(),
            false => name.green().bold().to_string(),
        }
    }
}

impl Repository {
    /// Walk the first-parent chain from `options.revision` (HEAD by default)
    pub async fn log(&self, options: &LogOptions) -> anyhow::Result<()> {
        let start = match &options.revision {
            Some(revision) => {
                Some(RevisionContext::new(self.database(), self.refs()).resolve(revision, Some(ObjectType::Commit))?)
            }
            None => self.refs().read_head()?,
        };

        let decorations = Decorations {
            reverse_refs: self.refs().reverse_refs()?,
            current_ref: self.refs().current_ref(None)?,
            mode: options.decorate,
        };

        let mut next = start;
        let mut first = true;
        while let Some(oid) = next {
            let commit = self.database().load_commit(&oid)?;

            match options.format {
                CommitFormat::Medium => {
                    if !first {
                        writeln!(self.writer())?;
                    }
                    self.show_commit_medium(&oid, &commit, options, &decorations)?;
                }
                CommitFormat::Oneline => self.show_commit_oneline(&oid, &commit, options, &decorations)?,
            }

            first = false;
            next = commit.parent().cloned();
        }

        Ok(())
    }

    fn show_commit_medium(
        &self,
        oid: &ObjectId,
        commit: &Commit,
        options: &LogOptions,
        decorations: &Decorations,
    ) -> anyhow::Result<()> {
        let mut writer = self.writer();
        let author = commit.author();

        writeln!(
            writer,
            "{}{}",
            format!("commit {}", abbreviate(oid, options.abbrev_commit)).yellow(),
            decorations.render(oid)
        )?;
        writeln!(writer, "Author: {}", author.display_name())?;
        writeln!(writer, "Date:   {}", author.readable_time())?;
        writeln!(writer)?;
        for line in commit.message().lines() {
            writeln!(writer, "    {line}")?;
        }

        Ok(())
    }

    fn show_commit_oneline(
        &self,
        oid: &ObjectId,
        commit: &Commit,
        options: &LogOptions,
        decorations: &Decorations,
    ) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "{}{} {}",
            abbreviate(oid, options.abbrev_commit).yellow(),
            decorations.render(oid),
            commit.title_line()
        )?;

        Ok(())
    }
}

fn abbreviate(oid: &ObjectId, abbrev_commit: bool) -> String {
    match abbrev_commit {
        true => oid.to_short_oid(),
        false => oid.to_string(),
    }
}
