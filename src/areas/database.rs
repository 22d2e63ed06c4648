use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::diff::tree_diff::{ChangeSet, TreeDiff};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Shortest abbreviated oid accepted by [`Database::prefix_match`]
const MIN_PREFIX_LENGTH: usize = 3;

/// Content-addressed object store under `.git/objects`
///
/// Parsed objects are memoized for the lifetime of the instance; stored
/// objects never change, so the cache is never invalidated.
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
    objects: RefCell<HashMap<ObjectId, ObjectBox>>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database {
            path,
            objects: RefCell::new(HashMap::new()),
        }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Write the object unless it already exists; returns its oid
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            trace!(oid = %object_id, "object already stored");
        } else {
            self.write_object(&object_path, object.serialize()?)?;
            debug!(oid = %object_id, object_type = %object.object_type(), "object stored");
        }

        Ok(object_id)
    }

    /// The oid `store` would produce, without writing anything
    pub fn hash_object(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        object.object_id()
    }

    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        if let Some(object) = self.objects.borrow().get(object_id) {
            return Ok(object.clone());
        }

        let object = self.read_object(object_id)?;
        self.objects
            .borrow_mut()
            .insert(object_id.clone(), object.clone());

        Ok(object)
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        match self.load(object_id)? {
            ObjectBox::Commit(commit) => Ok(*commit),
            other => Err(Self::type_mismatch(object_id, other.object_type(), ObjectType::Commit)),
        }
    }

    pub fn load_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        match self.load(object_id)? {
            ObjectBox::Tree(tree) => Ok(*tree),
            other => Err(Self::type_mismatch(object_id, other.object_type(), ObjectType::Tree)),
        }
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        match self.load(object_id)? {
            ObjectBox::Blob(blob) => Ok(*blob),
            other => Err(Self::type_mismatch(object_id, other.object_type(), ObjectType::Blob)),
        }
    }

    pub fn object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        Ok(self.load(object_id)?.object_type())
    }

    /// First seven hex characters; not guaranteed unique
    pub fn short_oid(&self, object_id: &ObjectId) -> String {
        object_id.to_short_oid()
    }

    /// Full oids starting with `name`
    ///
    /// Only the shard directory named by the first two characters is scanned.
    /// Prefixes shorter than three characters, non-hex names and missing shards
    /// all yield no candidates.
    pub fn prefix_match(&self, name: &str) -> anyhow::Result<Vec<ObjectId>> {
        if name.len() < MIN_PREFIX_LENGTH || !name.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Vec::new());
        }

        let name = name.to_ascii_lowercase();
        let (dir_name, file_prefix) = name.split_at(2);
        let dir_path = self.path.join(dir_name);

        let entries = match std::fs::read_dir(&dir_path) {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        let mut matches = Vec::new();
        for entry in entries {
            let file_name = entry?.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.starts_with(file_prefix)
                && let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}"))
            {
                matches.push(oid);
            }
        }
        matches.sort();

        Ok(matches)
    }

    pub fn type_match_prefixes(
        &self,
        candidates: Vec<ObjectId>,
        object_type: ObjectType,
    ) -> anyhow::Result<Vec<ObjectId>> {
        let mut matches = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if self.object_type(&candidate)? == object_type {
                matches.push(candidate);
            }
        }

        Ok(matches)
    }

    /// Every file below a tree or commit, keyed by its full path
    pub fn load_tree_list(&self, oid: Option<&ObjectId>) -> anyhow::Result<BTreeMap<PathBuf, DatabaseEntry>> {
        let mut list = BTreeMap::new();
        if let Some(oid) = oid {
            let tree_oid = match self.load(oid)? {
                ObjectBox::Commit(commit) => commit.tree_oid().clone(),
                _ => oid.clone(),
            };
            self.build_tree_list(&tree_oid, Path::new(""), &mut list)?;
        }

        Ok(list)
    }

    fn build_tree_list(
        &self,
        tree_oid: &ObjectId,
        prefix: &Path,
        list: &mut BTreeMap<PathBuf, DatabaseEntry>,
    ) -> anyhow::Result<()> {
        for (name, entry) in self.load_tree(tree_oid)?.into_entries() {
            let path = prefix.join(name);
            match entry.is_tree() {
                true => self.build_tree_list(&entry.oid, &path, list)?,
                false => {
                    list.insert(path, entry);
                }
            }
        }

        Ok(())
    }

    /// Changes between two trees or commits; `None` stands for the empty tree
    pub fn tree_diff(&self, old_oid: Option<&ObjectId>, new_oid: Option<&ObjectId>) -> anyhow::Result<ChangeSet> {
        let mut tree_diff = TreeDiff::new(self);
        tree_diff.compare_oids(old_oid, new_oid, Path::new(""))?;

        Ok(tree_diff.into_changes())
    }

    fn type_mismatch(object_id: &ObjectId, actual: ObjectType, expected: ObjectType) -> anyhow::Error {
        anyhow::anyhow!("object {object_id} is a {actual}, not a {expected}")
    }

    fn read_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let object_path = self.path.join(object_id.to_path());
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        let mut object_reader = Cursor::new(Self::decompress(&object_content)?);
        let (object_type, _size) = ObjectType::parse_object_type(&mut object_reader)?;

        ObjectBox::parse(object_type, object_reader)
            .context(format!("Unable to parse {object_type} {object_id}"))
    }

    fn write_object(&self, object_path: &Path, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(&object_content)?;

        // exclusive create; a missing shard directory is created on first use
        let mut file = match Self::create_exclusive(&temp_object_path) {
            Err(error) if error.kind() == ErrorKind::NotFound => {
                std::fs::create_dir_all(object_dir).context(format!(
                    "Unable to create object directory {}",
                    object_dir.display()
                ))?;
                Self::create_exclusive(&temp_object_path)
            }
            result => result,
        }
        .context(format!(
            "Unable to open object file {}",
            temp_object_path.display()
        ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;
        drop(file);

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn create_exclusive(path: &Path) -> std::io::Result<std::fs::File> {
        std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
    }

    fn compress(data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
        encoder
            .write_all(data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content)
    }

    fn generate_temp_name() -> String {
        format!("tmp_obj_{}", rand::random::<u32>())
    }
}
