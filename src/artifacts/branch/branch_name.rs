use crate::areas::refs::Refs;
use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use anyhow::Context;

const HEADS_PREFIX: &str = "refs/heads/";
pub const HEAD_REF_NAME: &str = "HEAD";

/// A ref file path relative to the metadata directory, e.g. `HEAD` or `refs/heads/master`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymRef(String);

impl SymRef {
    pub fn new(path: impl Into<String>) -> Self {
        SymRef(path.into())
    }

    pub fn head() -> Self {
        SymRef(HEAD_REF_NAME.to_string())
    }

    pub fn for_branch(name: &BranchName) -> Self {
        SymRef(format!("{HEADS_PREFIX}{name}"))
    }

    pub fn is_head(&self) -> bool {
        self.0 == HEAD_REF_NAME
    }

    pub fn is_branch(&self) -> bool {
        self.0.starts_with(HEADS_PREFIX)
    }

    pub fn as_ref_path(&self) -> &str {
        &self.0
    }

    /// `refs/heads/topic` becomes `topic`; other refs are unchanged
    pub fn short_name(&self) -> &str {
        self.0.strip_prefix(HEADS_PREFIX).unwrap_or(&self.0)
    }

    pub fn read_oid(&self, refs: &Refs) -> anyhow::Result<Option<ObjectId>> {
        refs.read_symref(&refs.path().join(&self.0))
    }
}

impl std::fmt::Display for SymRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A name accepted for `refs/heads/<name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> anyhow::Result<Self> {
        let name = name.into();

        if !Self::is_valid(&name)? {
            return Err(TwigError::InvalidBranch(name).into());
        }

        Ok(Self(name))
    }

    pub fn is_valid(name: &str) -> anyhow::Result<bool> {
        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        Ok(!name.is_empty() && !re.is_match(name))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
