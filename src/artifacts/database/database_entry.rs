use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// One named slot of a stored tree: the child's oid and mode
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct DatabaseEntry {
    pub oid: ObjectId,
    pub mode: EntryMode,
}

impl DatabaseEntry {
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }

    /// Same content and mode as the staged `entry`
    pub fn matches(&self, entry: &IndexEntry) -> bool {
        self.oid == entry.oid && self.mode == entry.mode()
    }
}
