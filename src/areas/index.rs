//! Staging area
//!
//! Tracks the files that make up the next commit, keyed by path in byte order.
//!
//! ## Data Structures
//!
//! - `entries`: tracked files by path
//! - `children`: every ancestor directory of a tracked file mapped to the
//!   tracked files beneath it, kept in step with `entries`
//!
//! A path and any of its ancestor directories are never tracked at the same
//! time: adding one side discards the other.
//!
//! ## Locking
//!
//! [`Index::load_for_update`] takes `index.lock` before reading; the lock is
//! released by [`Index::write_updates`] (rename over the index) or
//! [`Index::release_lock`] (discard). [`Index::load`] reads without locking.

use crate::areas::workspace::Workspace;
use crate::artifacts::core::lockfile::Lockfile;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_MIN_SIZE, EntryMetadata, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{CHECKSUM_SIZE, HEADER_SIZE};
use crate::artifacts::objects::object::Packable;
use crate::errors::TwigError;
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub struct Index {
    path: Box<Path>,
    entries: BTreeMap<OsString, IndexEntry>,
    children: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    lockfile: Lockfile,
    /// Set by any mutation since the last load or write
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            lockfile: Lockfile::new(path.to_path_buf()),
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.changed = false;
    }

    /// Read the index without taking the lock
    ///
    /// A missing or empty index file loads as an empty index. Any other
    /// malformation fails with [`TwigError::IndexCorrupt`].
    pub fn load(&mut self) -> anyhow::Result<()> {
        self.clear();

        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(error.into()),
        };
        if data.is_empty() {
            return Ok(());
        }

        let mut reader = Checksum::new(data.as_slice());
        self.parse(&mut reader)
            .map_err(|error| TwigError::IndexCorrupt(error.to_string()))?;
        debug!(entries = self.entries.len(), "index loaded");

        Ok(())
    }

    /// Take `index.lock`, then load; the lock is released again if loading fails
    pub fn load_for_update(&mut self) -> anyhow::Result<()> {
        self.lockfile.hold_for_update()?;

        if let Err(error) = self.load() {
            self.release_lock()?;
            return Err(error);
        }

        Ok(())
    }

    /// Persist through the lock, or just release it when nothing changed
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed {
            return self.release_lock();
        }

        let mut writer = Checksum::new(Vec::new());
        writer.write(&IndexHeader::for_entries(self.entries.len() as u32).serialize()?)?;
        for entry in self.entries() {
            writer.write(&entry.serialize()?)?;
        }
        writer.write_checksum()?;

        self.lockfile.write(&writer.into_inner())?;
        self.lockfile.commit()?;
        self.changed = false;
        debug!(entries = self.entries.len(), "index written");

        Ok(())
    }

    pub fn release_lock(&mut self) -> anyhow::Result<()> {
        if self.lockfile.is_held() {
            self.lockfile.rollback()?;
        }

        Ok(())
    }

    fn parse(&mut self, reader: &mut Checksum<&[u8]>) -> anyhow::Result<()> {
        let header = IndexHeader::parse(&reader.read(HEADER_SIZE)?)?;
        header.validate()?;

        for _ in 0..header.entries_count {
            let mut entry_bytes = reader.read(ENTRY_MIN_SIZE)?.to_vec();

            // the path is NUL-terminated and padded to a whole block
            while entry_bytes.last() != Some(&0) {
                entry_bytes.extend_from_slice(&reader.read(ENTRY_BLOCK)?);
            }

            let entry = IndexEntry::parse(&entry_bytes)?;
            self.store_entry(entry);
        }

        reader.verify()?;
        if reader.read(1).is_ok() {
            anyhow::bail!("Unexpected data after the {CHECKSUM_SIZE}-byte checksum");
        }

        Ok(())
    }

    /// Stage an entry, discarding whatever would break file/directory exclusion
    pub fn add(&mut self, entry: IndexEntry) {
        self.discard_conflicts(&entry);
        self.store_entry(entry);
        self.changed = true;
    }

    /// Untrack a path together with everything tracked beneath it
    pub fn remove(&mut self, path: &Path) {
        self.remove_entry(path);
        self.remove_children(path);
        self.changed = true;
    }

    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(&entry.name);
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_path_buf())
                .or_default()
                .insert(entry.name.clone());
        }

        self.entries.insert(entry.name.clone().into_os_string(), entry);
    }

    fn remove_children(&mut self, path: &Path) {
        if let Some(children) = self.children.get(path).cloned() {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    fn remove_entry(&mut self, path: &Path) {
        let Some(entry) = self.entries.remove(path.as_os_str()) else {
            return;
        };

        for parent in entry.parent_dirs() {
            if let Some(children) = self.children.get_mut(parent) {
                children.remove(path);
                if children.is_empty() {
                    self.children.remove(parent);
                }
            }
        }
    }

    /// Refresh the cached stat of an unchanged file so later scans skip hashing it
    pub fn update_entry_stat(&mut self, path: &Path, stat: EntryMetadata) {
        if let Some(entry) = self.entries.get_mut(path.as_os_str()) {
            entry.update_stat(stat);
            self.changed = true;
        }
    }

    /// Drop tracked files at or under `path` that are gone from the workspace
    ///
    /// Only a missing file counts as gone; an unreadable one fails with
    /// [`TwigError::NoPermission`] and leaves its entry in place.
    pub fn delete_nonexistent_entries(&mut self, path: &Path, workspace: &Workspace) -> anyhow::Result<()> {
        let candidates = match self.is_tracked_file(path) {
            true => vec![path.to_path_buf()],
            false => self.child_paths(path),
        };

        for candidate in candidates {
            if workspace.metadata(&candidate)?.is_none() {
                debug!(path = %candidate.display(), "dropping vanished entry");
                self.remove(&candidate);
            }
        }

        Ok(())
    }

    /// Entries in strictly increasing path order
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_for_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path.as_os_str())
    }

    pub fn is_tracked_file(&self, path: &Path) -> bool {
        self.entries.contains_key(path.as_os_str())
    }

    pub fn is_tracked_directory(&self, path: &Path) -> bool {
        self.children.contains_key(path)
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.is_tracked_file(path) || self.is_tracked_directory(path)
    }

    /// Tracked files beneath `dir`; the repository root yields every entry
    pub fn child_paths(&self, dir: &Path) -> Vec<PathBuf> {
        if dir.as_os_str().is_empty() || dir == Path::new(".") {
            return self.entries().map(|entry| entry.name.clone()).collect();
        }

        self.children
            .get(dir)
            .map(|children| children.iter().cloned().collect())
            .unwrap_or_default()
    }
}
