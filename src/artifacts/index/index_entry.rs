//! Index entry representation
//!
//! Each entry tracks one file: its path, the oid of its staged content, and
//! the stat fields used to detect changes without reading content.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bitflags::bitflags;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::fs::Metadata;
use std::io::Write;
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Minimum size of an index entry in bytes
pub const ENTRY_MIN_SIZE: usize = 64;

/// Offset of the path within an entry
const NAME_OFFSET: usize = 62;

bitflags! {
    /// The 16-bit flags field; the low 12 bits hold the path length
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EntryFlags: u16 {
        const NAME_MASK = 0x0FFF;
        const EXTENDED = 0x4000;
        const ASSUME_VALID = 0x8000;
    }
}

impl EntryFlags {
    /// Path lengths beyond the mask saturate at 0xFFF
    pub fn for_name_length(length: usize) -> Self {
        let length = length.min(Self::NAME_MASK.bits() as usize) as u16;
        Self::from_bits_retain(length)
    }

    pub fn name_length(&self) -> usize {
        (self.bits() & Self::NAME_MASK.bits()) as usize
    }
}

#[derive(Debug, Clone, Default, new)]
pub struct IndexEntry {
    /// Path relative to the repository root
    pub name: PathBuf,
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    pub fn basename(&self) -> anyhow::Result<&str> {
        self.name
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid file name"))
    }

    /// Every proper ancestor directory, outermost first
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs = self
            .name
            .ancestors()
            .skip(1)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect::<Vec<_>>();
        dirs.reverse();

        dirs
    }

    pub fn mode(&self) -> EntryMode {
        self.metadata.mode
    }

    /// Size and mode agree; a zero cached size is treated as unknown
    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        (self.metadata.size == 0 || self.metadata.size == other.size)
            && self.metadata.mode == other.mode
    }

    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.ctime == other.ctime
            && self.metadata.ctime_nsec == other.ctime_nsec
            && self.metadata.mtime == other.mtime
            && self.metadata.mtime_nsec == other.mtime_nsec
    }

    /// Refresh the cached stat fields, keeping the staged oid
    pub fn update_stat(&mut self, metadata: EntryMetadata) {
        self.metadata = metadata;
    }

    pub fn flags(&self) -> EntryFlags {
        EntryFlags::for_name_length(self.name.as_os_str().len())
    }

    /// Parse one padded entry; `bytes` must span the entry up to its terminating NUL block
    pub fn parse(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < ENTRY_MIN_SIZE {
            anyhow::bail!("Invalid index entry size");
        }

        let field = |index: usize| byteorder::NetworkEndian::read_u32(&bytes[index * 4..index * 4 + 4]);

        let mode = EntryMode::try_from(field(6))?;
        let oid = ObjectId::from_digest(&bytes[40..60])?;
        let flags = EntryFlags::from_bits_retain(byteorder::NetworkEndian::read_u16(&bytes[60..62]));

        let name_end = bytes[NAME_OFFSET..]
            .iter()
            .position(|&b| b == 0)
            .context("Missing null terminator in entry name")?;
        let name = std::str::from_utf8(&bytes[NAME_OFFSET..NAME_OFFSET + name_end])
            .map_err(|_| anyhow::anyhow!("Invalid UTF-8 in entry name"))?;

        if flags.name_length() < EntryFlags::NAME_MASK.bits() as usize && flags.name_length() != name.len() {
            anyhow::bail!("Entry name length does not match its flags: {name}");
        }

        Ok(IndexEntry {
            name: PathBuf::from(name),
            oid,
            metadata: EntryMetadata {
                ctime: field(0) as i64,
                ctime_nsec: field(1) as i64,
                mtime: field(2) as i64,
                mtime_nsec: field(3) as i64,
                dev: field(4) as u64,
                ino: field(5) as u64,
                mode,
                uid: field(7),
                gid: field(8),
                size: field(9) as u64,
            },
        })
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for IndexEntry {}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// Stat fields cached per entry
///
/// `ctime` tracks inode changes, `mtime` content changes; both carry
/// nanoseconds so that rapid successive writes are still told apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub ctime: i64,
    pub ctime_nsec: i64,
    pub mtime: i64,
    pub mtime_nsec: i64,
    pub dev: u64,
    pub ino: u64,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let entry_name = self.name.to_str().context("Invalid entry name")?;

        let mut entry_bytes = Vec::with_capacity(ENTRY_MIN_SIZE + entry_name.len());
        for field in [
            self.metadata.ctime as u32,
            self.metadata.ctime_nsec as u32,
            self.metadata.mtime as u32,
            self.metadata.mtime_nsec as u32,
            self.metadata.dev as u32,
            self.metadata.ino as u32,
            self.metadata.mode.as_u32(),
            self.metadata.uid,
            self.metadata.gid,
            self.metadata.size as u32,
        ] {
            entry_bytes.write_u32::<byteorder::NetworkEndian>(field)?;
        }
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(self.flags().bits())?;
        entry_bytes.write_all(entry_name.as_bytes())?;

        // At least one NUL, then pad to the block size
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = anyhow::Error;

    /// `file_path` must be reachable from the current directory
    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self, Self::Error> {
        let mode = if metadata.is_dir() {
            EntryMode::Directory
        } else {
            match file_path.is_executable() {
                true => EntryMode::File(FileMode::Executable),
                false => EntryMode::File(FileMode::Regular),
            }
        };

        Ok(Self {
            ctime: metadata.ctime(),
            ctime_nsec: metadata.ctime_nsec(),
            mtime: metadata.mtime(),
            mtime_nsec: metadata.mtime_nsec(),
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
        })
    }
}
