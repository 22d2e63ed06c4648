use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::status_info::HeadTree;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const NULL_OID: &str = "0000000000000000000000000000000000000000";
const NULL_PATH: &str = "/dev/null";

/// One side of a file diff: a HEAD tree entry, an index entry, a workspace
/// file, or nothing at all
#[derive(Debug, Clone)]
pub struct DiffTarget {
    pub path: PathBuf,
    pub oid: ObjectId,
    pub mode: Option<EntryMode>,
    pub data: Bytes,
}

impl DiffTarget {
    pub fn from_head(path: &Path, head_tree: &HeadTree, database: &Database) -> anyhow::Result<Self> {
        let entry = head_tree
            .get(path)
            .with_context(|| format!("{} is not in the HEAD tree", path.display()))?;
        let blob = database.load_blob(&entry.oid)?;

        Ok(DiffTarget {
            path: path.to_path_buf(),
            oid: entry.oid.clone(),
            mode: Some(entry.mode),
            data: blob.content().clone(),
        })
    }

    pub fn from_index(path: &Path, index: &Index, database: &Database) -> anyhow::Result<Self> {
        let entry = index
            .entry_for_path(path)
            .with_context(|| format!("{} is not in the index", path.display()))?;
        let blob = database.load_blob(&entry.oid)?;

        Ok(DiffTarget {
            path: path.to_path_buf(),
            oid: entry.oid.clone(),
            mode: Some(entry.mode()),
            data: blob.content().clone(),
        })
    }

    /// The workspace copy; hashed but never stored
    pub fn from_file(
        path: &Path,
        workspace: &Workspace,
        database: &Database,
        stats: &BTreeMap<PathBuf, EntryMetadata>,
    ) -> anyhow::Result<Self> {
        let data = workspace.read_file(path)?;
        let oid = database.hash_object(&Blob::new(data.clone()))?;
        let stat = stats
            .get(path)
            .with_context(|| format!("{} was not scanned", path.display()))?;

        Ok(DiffTarget {
            path: path.to_path_buf(),
            oid,
            mode: Some(stat.mode),
            data,
        })
    }

    pub fn from_nothing(path: &Path) -> anyhow::Result<Self> {
        Ok(DiffTarget {
            path: path.to_path_buf(),
            oid: ObjectId::try_parse(NULL_OID.to_string())?,
            mode: None,
            data: Bytes::new(),
        })
    }

    /// Path as shown on the `---`/`+++` lines
    pub fn diff_path(&self, prefix: &str) -> String {
        match self.mode {
            Some(_) => format!("{prefix}/{}", self.path.display()),
            None => NULL_PATH.to_string(),
        }
    }

    pub fn pretty_mode(&self) -> &'static str {
        self.mode.map(|mode| mode.as_str()).unwrap_or_default()
    }
}
