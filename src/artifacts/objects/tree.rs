//! Directory snapshot record
//!
//! On disk: `tree <size>\0<entries>`, each entry `<mode> <name>\0<20-byte-sha1>`.
//!
//! ## Tree Building
//!
//! [`Tree::build`] folds sorted index entries into a [`TreeBuilder`] of owned
//! subtrees. [`TreeBuilder::traverse`] then finalizes bottom-up: a directory's
//! oid is computed only once every child below it has been finalized, and
//! every finished subtree is handed to the caller before its parent.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Default, PartialEq, new)]
pub struct Tree {
    entries: BTreeMap<String, DatabaseEntry>,
}

impl Tree {
    pub fn build<'e>(entries: impl IntoIterator<Item = &'e IndexEntry>) -> anyhow::Result<TreeBuilder> {
        let mut root = TreeBuilder::default();

        for entry in entries {
            let components = entry
                .name
                .components()
                .map(|component| {
                    component
                        .as_os_str()
                        .to_str()
                        .map(str::to_string)
                        .context("Invalid path component")
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            root.insert(
                &components,
                DatabaseEntry::new(entry.oid.clone(), entry.metadata.mode),
            )?;
        }

        Ok(root)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &DatabaseEntry)> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, DatabaseEntry)> {
        self.entries.into_iter()
    }

    pub fn get(&self, name: &str) -> Option<&DatabaseEntry> {
        self.entries.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in stored order: directories compare as if their name ended in `/`
    fn stored_order(&self) -> Vec<(&String, &DatabaseEntry)> {
        let mut entries = self.entries.iter().collect::<Vec<_>>();
        entries.sort_by_cached_key(|(name, entry)| match entry.is_tree() {
            true => format!("{name}/"),
            false => (*name).clone(),
        });

        entries
    }
}

#[derive(Debug)]
enum TreeNode {
    File(DatabaseEntry),
    Directory(TreeBuilder),
}

/// Owned, not yet hashed directory hierarchy
#[derive(Debug, Default)]
pub struct TreeBuilder {
    children: BTreeMap<String, TreeNode>,
}

impl TreeBuilder {
    fn insert(&mut self, components: &[String], entry: DatabaseEntry) -> anyhow::Result<()> {
        match components {
            [] => anyhow::bail!("Cannot add an entry with an empty path"),
            [name] => {
                self.children.insert(name.clone(), TreeNode::File(entry));
            }
            [dir, rest @ ..] => {
                let node = self
                    .children
                    .entry(dir.clone())
                    .or_insert_with(|| TreeNode::Directory(TreeBuilder::default()));

                match node {
                    TreeNode::Directory(subtree) => subtree.insert(rest, entry)?,
                    TreeNode::File(_) => {
                        anyhow::bail!("'{dir}' is tracked both as a file and as a directory")
                    }
                }
            }
        }

        Ok(())
    }

    /// Finalize every subtree in post-order, handing each to `visit`; returns the root
    pub fn traverse<F>(self, visit: &mut F) -> anyhow::Result<Tree>
    where
        F: FnMut(&Tree) -> anyhow::Result<()>,
    {
        let mut entries = BTreeMap::new();

        for (name, node) in self.children {
            let entry = match node {
                TreeNode::File(entry) => entry,
                TreeNode::Directory(subtree) => {
                    let tree = subtree.traverse(visit)?;
                    DatabaseEntry::new(tree.object_id()?, EntryMode::Directory)
                }
            };
            entries.insert(name, entry);
        }

        let tree = Tree::new(entries);
        visit(&tree)?;

        Ok(tree)
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut body = Vec::new();

        for (name, entry) in self.stored_order() {
            write!(body, "{:o} {}", entry.mode.as_u32(), name)?;
            body.push(0);
            entry.oid.write_h40_to(&mut body)?;
        }

        Ok(frame(self.object_type(), &body))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            if reader.read_until(b' ', &mut mode_bytes)? == 0 {
                break;
            }
            if mode_bytes.pop() != Some(b' ') {
                anyhow::bail!("unexpected EOF in mode");
            }
            let mode = EntryMode::from_octal_str(std::str::from_utf8(&mode_bytes)?)?;

            name_bytes.clear();
            reader.read_until(b'\0', &mut name_bytes)?;
            if name_bytes.pop() != Some(b'\0') {
                anyhow::bail!("unexpected EOF in name");
            }
            let name = std::str::from_utf8(&name_bytes)?.to_owned();

            let oid = ObjectId::read_h40_from(&mut reader).context("unexpected EOF in object id")?;

            entries.insert(name, DatabaseEntry::new(oid, mode));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.stored_order()
            .into_iter()
            .map(|(name, entry)| {
                let object_type = match entry.is_tree() {
                    true => ObjectType::Tree,
                    false => ObjectType::Blob,
                };
                format!("{} {} {}\t{}", entry.mode.as_str(), object_type, entry.oid, name)
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
