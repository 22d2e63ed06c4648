//! References (HEAD and branches)
//!
//! A ref file holds either a 40-character oid or `ref: <path>`, pointing at
//! another ref. Every write goes through a [`Lockfile`] on the ref file.
//!
//! ## Layout
//!
//! - `HEAD`: the current branch (`ref: refs/heads/<name>`) or a detached oid
//! - `refs/heads/<name>`: branch tips

use crate::artifacts::branch::branch_name::{BranchName, HEAD_REF_NAME, SymRef};
use crate::artifacts::core::lockfile::Lockfile;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use anyhow::Context;
use derive_new::new;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Longest chain of `ref:` indirections followed before giving up
const MAX_SYMREF_DEPTH: usize = 5;

#[derive(Debug, new)]
pub struct Refs {
    /// The metadata directory (`.git`)
    path: Box<Path>,
}

#[derive(Debug, Clone)]
enum RefContent {
    SymRef(SymRef),
    Oid(ObjectId),
}

impl RefContent {
    /// `None` when the file is missing, not a file, or empty
    fn read(path: &Path) -> anyhow::Result<Option<RefContent>> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {}", path.display()))?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        match symref_match {
            Some(symref_match) => Ok(Some(RefContent::SymRef(SymRef::new(&symref_match[1])))),
            None => Ok(Some(RefContent::Oid(ObjectId::try_parse(content.to_string())?))),
        }
    }
}

impl Refs {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }

    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.read_symref(&self.head_path())
    }

    /// Advance whatever HEAD points at; writes through to the current branch
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_symref(&self.head_path(), oid)
    }

    /// Attach HEAD to `revision` if it names a branch, else detach it at `oid`
    pub fn set_head(&self, revision: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let branch_path = self.heads_path().join(revision);

        let content = match BranchName::is_valid(revision)? && branch_path.is_file() {
            true => format!("ref: refs/heads/{revision}"),
            false => oid.to_string(),
        };
        self.update_ref_file(&self.head_path(), &content)
    }

    /// Point HEAD at a branch, whether or not the branch exists yet
    pub fn attach_head(&self, branch: &BranchName) -> anyhow::Result<()> {
        let content = format!("ref: {}", SymRef::for_branch(branch));
        self.update_ref_file(&self.head_path(), &content)
    }

    /// Follow `source` (HEAD by default) to the last symbolic ref in its chain
    pub fn current_ref(&self, source: Option<SymRef>) -> anyhow::Result<SymRef> {
        let mut current = source.unwrap_or_else(SymRef::head);

        for _ in 0..=MAX_SYMREF_DEPTH {
            match RefContent::read(&self.path.join(current.as_ref_path()))? {
                Some(RefContent::SymRef(target)) => current = target,
                Some(RefContent::Oid(_)) | None => return Ok(current),
            }
        }

        anyhow::bail!("too many levels of symbolic refs from {}", current.as_ref_path())
    }

    /// Resolve a short ref name, searching `.git`, `.git/refs` and `.git/refs/heads`
    pub fn read_ref(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        let found = [self.path.to_path_buf(), self.refs_path().to_path_buf(), self.heads_path().to_path_buf()]
            .into_iter()
            .map(|base_path| base_path.join(name))
            .find(|path| path.is_file());

        match found {
            Some(path) => self.read_symref(&path),
            None => Ok(None),
        }
    }

    /// Follow symbolic refs from `path` down to an oid
    pub fn read_symref(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        let mut path = path.to_path_buf();

        for _ in 0..=MAX_SYMREF_DEPTH {
            match RefContent::read(&path)? {
                Some(RefContent::SymRef(target)) => path = self.path.join(target.as_ref_path()),
                Some(RefContent::Oid(oid)) => return Ok(Some(oid)),
                None => return Ok(None),
            }
        }

        anyhow::bail!("too many levels of symbolic refs at {}", path.display())
    }

    /// Write `oid` to `path`, or to the end of the symbolic chain starting there
    fn update_symref(&self, path: &Path, oid: &ObjectId) -> anyhow::Result<()> {
        let mut lockfile = Lockfile::new(path);
        Self::hold_creating_parents(&mut lockfile)?;

        match RefContent::read(path) {
            Ok(Some(RefContent::SymRef(target))) => {
                let result = self.update_symref(&self.path.join(target.as_ref_path()), oid);
                lockfile.rollback()?;
                result
            }
            Ok(_) => {
                lockfile.write(format!("{oid}\n").as_bytes())?;
                lockfile.commit()?;
                debug!(path = %path.display(), %oid, "ref updated");
                Ok(())
            }
            Err(error) => {
                lockfile.rollback()?;
                Err(error)
            }
        }
    }

    fn update_ref_file(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        let mut lockfile = Lockfile::new(path);
        Self::hold_creating_parents(&mut lockfile)?;

        lockfile.write(format!("{content}\n").as_bytes())?;
        lockfile.commit()?;
        debug!(path = %path.display(), content, "ref written");

        Ok(())
    }

    /// Take the lock, creating a missing parent directory once before retrying
    fn hold_creating_parents(lockfile: &mut Lockfile) -> anyhow::Result<()> {
        match lockfile.hold_for_update() {
            Err(error) if matches!(error.downcast_ref::<TwigError>(), Some(TwigError::MissingParent(_))) => {
                let parent = lockfile
                    .file_path()
                    .parent()
                    .with_context(|| format!("no parent directory for {}", lockfile.file_path().display()))?;
                std::fs::create_dir_all(parent)?;

                lockfile.hold_for_update()
            }
            result => result,
        }
    }

    /// Create `refs/heads/<name>`; an existing branch is only replaced when `force` is set
    pub fn create_branch(&self, name: &BranchName, oid: &ObjectId, force: bool) -> anyhow::Result<()> {
        let branch_path = self.heads_path().join(name.as_ref());

        if branch_path.is_file() && !force {
            return Err(TwigError::BranchExists(name.to_string()).into());
        }

        self.update_ref_file(&branch_path, oid.as_ref())
    }

    /// Remove a branch and any directories it leaves empty; returns its last oid
    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        let branch_path = self.heads_path().join(name.as_ref());

        let mut lockfile = Lockfile::new(&branch_path);
        match lockfile.hold_for_update() {
            Err(error) if matches!(error.downcast_ref::<TwigError>(), Some(TwigError::MissingParent(_))) => {
                return Err(TwigError::BranchNotFound(name.to_string()).into());
            }
            result => result?,
        }

        let oid = match self.read_symref(&branch_path) {
            Ok(Some(oid)) => oid,
            Ok(None) => {
                lockfile.rollback()?;
                return Err(TwigError::BranchNotFound(name.to_string()).into());
            }
            Err(error) => {
                lockfile.rollback()?;
                return Err(error);
            }
        };

        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {}", branch_path.display()))?;
        lockfile.rollback()?;
        self.prune_empty_parent_dirs(&branch_path)?;
        debug!(branch = %name, %oid, "branch deleted");

        Ok(oid)
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("failed to remove empty branch directory at {}", parent.display()))?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    pub fn list_branches(&self) -> anyhow::Result<Vec<SymRef>> {
        self.list_refs(&self.heads_path())
    }

    /// Every ref file below `path`, sorted; a missing directory has no refs
    pub fn list_refs(&self, path: &Path) -> anyhow::Result<Vec<SymRef>> {
        Ok(WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension().is_none_or(|extension| extension != "lock"))
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(self.path.as_ref()).ok()?;
                Some(SymRef::new(relative_path.to_string_lossy()))
            })
            .collect())
    }

    /// Every ref (HEAD included) grouped by the oid it resolves to
    pub fn reverse_refs(&self) -> anyhow::Result<HashMap<ObjectId, Vec<SymRef>>> {
        let mut table: HashMap<ObjectId, Vec<SymRef>> = HashMap::new();

        let all_refs = std::iter::once(SymRef::head()).chain(self.list_refs(&self.refs_path())?);
        for sym_ref in all_refs {
            if let Some(oid) = sym_ref.read_oid(self)? {
                table.entry(oid).or_default().push(sym_ref);
            }
        }

        Ok(table)
    }
}
