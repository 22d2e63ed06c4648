//! Exclusive write access to a repository file
//!
//! A lock is a `<file>.lock` sibling created with exclusive-create semantics.
//! Writes go to the lock; [`Lockfile::commit`] renames it over the target and
//! [`Lockfile::rollback`] deletes it. A lock that already exists belongs to
//! another process and is never waited on.

use crate::errors::TwigError;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Lockfile {
    file_path: PathBuf,
    lock_path: PathBuf,
    lock: Option<File>,
}

impl Lockfile {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();
        let mut lock_path = file_path.clone().into_os_string();
        lock_path.push(".lock");

        Lockfile {
            file_path,
            lock_path: PathBuf::from(lock_path),
            lock: None,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    pub fn is_held(&self) -> bool {
        self.lock.is_some()
    }

    /// Take the lock; a no-op while it is already held by this instance
    pub fn hold_for_update(&mut self) -> anyhow::Result<()> {
        if self.lock.is_some() {
            return Ok(());
        }

        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&self.lock_path)
            .map_err(|error| match error.kind() {
                ErrorKind::AlreadyExists => TwigError::LockDenied(self.lock_path.clone()),
                ErrorKind::NotFound => TwigError::MissingParent(self.lock_path.clone()),
                ErrorKind::PermissionDenied => TwigError::NoPermission(self.lock_path.clone()),
                _ => TwigError::Io(error),
            })?;

        debug!(path = %self.lock_path.display(), "lock acquired");
        self.lock = Some(lock);

        Ok(())
    }

    pub fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        let lock = self.held_lock()?;
        lock.write_all(data)?;

        Ok(())
    }

    /// Replace the target with everything written so far and release the lock
    pub fn commit(&mut self) -> anyhow::Result<()> {
        let lock = self.held_lock()?;
        lock.flush()?;
        self.lock = None;

        std::fs::rename(&self.lock_path, &self.file_path)?;
        debug!(path = %self.file_path.display(), "lock committed");

        Ok(())
    }

    /// Release the lock, discarding anything written
    pub fn rollback(&mut self) -> anyhow::Result<()> {
        self.held_lock()?;
        self.lock = None;

        std::fs::remove_file(&self.lock_path)?;
        debug!(path = %self.lock_path.display(), "lock rolled back");

        Ok(())
    }

    fn held_lock(&mut self) -> anyhow::Result<&mut File> {
        self.lock
            .as_mut()
            .ok_or_else(|| TwigError::StaleLock(self.lock_path.clone()).into())
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        if self.lock.take().is_some() {
            warn!(path = %self.lock_path.display(), "releasing abandoned lock");
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
