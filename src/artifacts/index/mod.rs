//! Staging index file format
//!
//! ## File Format (Version 2)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2 (4 bytes)
//!   - Entry count (4 bytes, big-endian)
//!
//! Entries (variable length):
//!   - Ten big-endian u32 stat fields, 20-byte oid, u16 flags, path
//!   - NUL-terminated, padded to 8-byte alignment
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// Trailing SHA-1 over everything before it
pub const CHECKSUM_SIZE: usize = 20;

/// Signature, version and entry count, four bytes each
pub const HEADER_SIZE: usize = 12;

pub const SIGNATURE: &str = "DIRC";

/// The only version read or written
pub const VERSION: u32 = 2;
