/// Width of the long-format label column, e.g. `modified:   `
pub const LABEL_WIDTH: usize = 12;

/// How a tracked file in the workspace differs from its index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum WorkspaceChangeType {
    #[default]
    None,
    Untracked,
    Modified,
    Deleted,
}

impl WorkspaceChangeType {
    pub fn short_code(&self) -> &'static str {
        match self {
            WorkspaceChangeType::None => " ",
            WorkspaceChangeType::Untracked => "??",
            WorkspaceChangeType::Modified => "M",
            WorkspaceChangeType::Deleted => "D",
        }
    }

    pub fn long_label(&self) -> &'static str {
        match self {
            WorkspaceChangeType::None | WorkspaceChangeType::Untracked => "",
            WorkspaceChangeType::Modified => "modified:",
            WorkspaceChangeType::Deleted => "deleted:",
        }
    }
}

/// How an index entry differs from the HEAD tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum IndexChangeType {
    #[default]
    None,
    Added,
    Modified,
    Deleted,
}

impl IndexChangeType {
    pub fn short_code(&self) -> &'static str {
        match self {
            IndexChangeType::None => " ",
            IndexChangeType::Added => "A",
            IndexChangeType::Modified => "M",
            IndexChangeType::Deleted => "D",
        }
    }

    pub fn long_label(&self) -> &'static str {
        match self {
            IndexChangeType::None => "",
            IndexChangeType::Added => "new file:",
            IndexChangeType::Modified => "modified:",
            IndexChangeType::Deleted => "deleted:",
        }
    }
}

/// Both sides of a changed path, as shown by `status --porcelain`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FileChange {
    pub index_change: IndexChangeType,
    pub workspace_change: WorkspaceChangeType,
}

impl std::fmt::Display for FileChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            self.index_change.short_code(),
            self.workspace_change.short_code()
        )
    }
}
