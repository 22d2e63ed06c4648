//! Stored object kinds and their identifiers
//!
//! Every record is stored as `<type> <byte-length>\0<body>` and addressed by the
//! SHA-1 of that framing:
//!
//! - **Blob**: raw file content
//! - **Tree**: directory listing (names, modes and object IDs)
//! - **Commit**: snapshot with lineage (tree, parent, author, message)

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of the abbreviated form used for display
pub const SHORT_OBJECT_ID_LENGTH: usize = 7;
