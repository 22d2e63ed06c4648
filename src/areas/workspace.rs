use crate::artifacts::checkout::migration::{ActionType, Migration};
use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::errors::TwigError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fs::{Metadata, OpenOptions};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 3] = [".git", ".", ".."];

/// The checked out files below the repository root
///
/// Every path taken or returned is relative to the root.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every file at or below `path`, sorted, skipping `.git`
    pub fn list_files(&self, path: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let full_path = self.path.join(path);

        let metadata = std::fs::symlink_metadata(&full_path).map_err(|error| match error.kind() {
            ErrorKind::NotFound | ErrorKind::NotADirectory => TwigError::MissingFile(path.to_path_buf()),
            ErrorKind::PermissionDenied => TwigError::NoPermission(path.to_path_buf()),
            _ => TwigError::Io(error),
        })?;

        if !metadata.is_dir() {
            return Ok(vec![self.relative(&full_path)?]);
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&full_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.file_name().to_string_lossy().as_ref()));

        for entry in walker {
            let entry = entry.map_err(|error| {
                let entry_path = error.path().unwrap_or(&full_path).to_path_buf();
                match error.io_error().map(std::io::Error::kind) {
                    Some(ErrorKind::PermissionDenied) => TwigError::NoPermission(entry_path),
                    _ => TwigError::Io(error.into()),
                }
            })?;

            if !entry.file_type().is_dir() {
                files.push(self.relative(entry.path())?);
            }
        }
        files.sort();

        Ok(files)
    }

    /// Immediate children of `dir` (the root when `None`), skipping `.git`
    pub fn list_dir(&self, dir: Option<&Path>) -> anyhow::Result<BTreeMap<PathBuf, Metadata>> {
        let dir = dir.unwrap_or(Path::new(""));
        let full_path = self.path.join(dir);

        let entries = std::fs::read_dir(&full_path).map_err(|error| match error.kind() {
            ErrorKind::PermissionDenied => TwigError::NoPermission(dir.to_path_buf()),
            _ => TwigError::Io(error),
        })?;

        let mut stats = BTreeMap::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            if Self::is_ignored(name.to_string_lossy().as_ref()) {
                continue;
            }

            let metadata = entry
                .metadata()
                .with_context(|| format!("Unable to stat {}", entry.path().display()))?;
            stats.insert(dir.join(name), metadata);
        }

        Ok(stats)
    }

    pub fn read_file(&self, path: &Path) -> anyhow::Result<Bytes> {
        let data = std::fs::read(self.path.join(path)).map_err(|error| match error.kind() {
            ErrorKind::PermissionDenied => TwigError::NoPermission(path.to_path_buf()),
            ErrorKind::NotFound => TwigError::MissingFile(path.to_path_buf()),
            _ => TwigError::Io(error),
        })?;

        Ok(Bytes::from(data))
    }

    /// Stat fields for `path`, or `None` when nothing exists there
    pub fn stat_file(&self, path: &Path) -> anyhow::Result<Option<EntryMetadata>> {
        let full_path = self.path.join(path);

        self.metadata(path)?
            .map(|metadata| (full_path.as_path(), metadata).try_into())
            .transpose()
    }

    /// Raw filesystem metadata for `path`, or `None` when nothing exists there
    pub fn metadata(&self, path: &Path) -> anyhow::Result<Option<Metadata>> {
        match std::fs::metadata(self.path.join(path)) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(error) if matches!(error.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(None),
            Err(error) if error.kind() == ErrorKind::PermissionDenied => {
                Err(TwigError::NoPermission(path.to_path_buf()).into())
            }
            Err(error) => Err(error.into()),
        }
    }

    pub fn write_file(&self, path: &Path, data: &[u8], mode: Option<FileMode>, mkdir: bool) -> anyhow::Result<()> {
        let full_path = self.path.join(path);

        if mkdir && let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create directory {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&full_path)
            .with_context(|| format!("Unable to open {}", path.display()))?;
        file.write_all(data)
            .with_context(|| format!("Unable to write {}", path.display()))?;

        if let Some(mode) = mode {
            Self::chmod(&full_path, mode)?;
        }

        Ok(())
    }

    /// Delete a file or a whole directory; missing paths are ignored
    pub fn remove(&self, path: &Path) -> anyhow::Result<()> {
        let full_path = self.path.join(path);

        let metadata = match std::fs::symlink_metadata(&full_path) {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(error.into()),
        };

        if metadata.is_dir() {
            std::fs::remove_dir_all(&full_path)
        } else {
            std::fs::remove_file(&full_path)
        }
        .with_context(|| format!("Unable to remove {}", path.display()))
    }

    /// Carry out a conflict-free migration
    ///
    /// Deletions run first and leave emptied directories behind for removal,
    /// deepest first. Target directories are then created before any file is
    /// written into them.
    pub fn apply_migration(&self, migration: &Migration) -> anyhow::Result<()> {
        self.apply_change_list(migration, ActionType::Delete)?;

        for dir in migration.rmdirs().iter().rev() {
            self.remove_directory(dir)?;
        }

        for dir in migration.mkdirs() {
            self.make_directory(dir)?;
        }

        self.apply_change_list(migration, ActionType::Update)?;
        self.apply_change_list(migration, ActionType::Create)?;

        Ok(())
    }

    fn apply_change_list(&self, migration: &Migration, action: ActionType) -> anyhow::Result<()> {
        for (path, entry) in migration.changes(action) {
            self.remove(path)?;

            let Some(entry) = entry else {
                trace!(path = %path.display(), "deleted");
                continue;
            };

            let full_path = self.path.join(path);
            let data = migration.blob_data(&entry.oid)?;

            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&full_path)
                .with_context(|| format!("Unable to create {}", path.display()))?;
            file.write_all(&data)
                .with_context(|| format!("Unable to write {}", path.display()))?;
            drop(file);

            if let EntryMode::File(mode) = entry.mode {
                Self::chmod(&full_path, mode)?;
            }
            trace!(path = %path.display(), ?action, "written");
        }

        Ok(())
    }

    fn remove_directory(&self, dir: &Path) -> anyhow::Result<()> {
        match std::fs::remove_dir(self.path.join(dir)) {
            Ok(()) => {
                debug!(dir = %dir.display(), "removed empty directory");
                Ok(())
            }
            Err(error)
                if matches!(
                    error.kind(),
                    ErrorKind::NotFound | ErrorKind::DirectoryNotEmpty | ErrorKind::NotADirectory
                ) =>
            {
                Ok(())
            }
            Err(error) => Err(error).with_context(|| format!("Unable to remove {}", dir.display())),
        }
    }

    fn make_directory(&self, dir: &Path) -> anyhow::Result<()> {
        let full_path = self.path.join(dir);

        match std::fs::symlink_metadata(&full_path) {
            Ok(metadata) if metadata.is_dir() => return Ok(()),
            Ok(_) => std::fs::remove_file(&full_path)
                .with_context(|| format!("Unable to replace {} with a directory", dir.display()))?,
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => return Err(error.into()),
        }

        std::fs::create_dir(&full_path).with_context(|| format!("Unable to create directory {}", dir.display()))
    }

    fn chmod(full_path: &Path, mode: FileMode) -> anyhow::Result<()> {
        let permissions = std::fs::Permissions::from_mode(mode.permissions());
        std::fs::set_permissions(full_path, permissions)
            .with_context(|| format!("Unable to set permissions on {}", full_path.display()))
    }

    fn relative(&self, full_path: &Path) -> anyhow::Result<PathBuf> {
        full_path
            .strip_prefix(&self.path)
            .map(Path::to_path_buf)
            .with_context(|| format!("{} is outside the repository", full_path.display()))
    }

    fn is_ignored(name: &str) -> bool {
        IGNORED_PATHS.contains(&name)
    }
}
