use sha1::{Digest, Sha1};
use std::io::Read;
use std::path::Path;

/// The inflated `<type> <len>\0<body>` record stored for `oid`
pub fn read_object(dir: &Path, oid: &str) -> Vec<u8> {
    let path = dir.join(".git/objects").join(&oid[..2]).join(&oid[2..]);
    let compressed = std::fs::read(&path).unwrap_or_else(|e| panic!("Failed to read object {oid}: {e}"));

    let mut data = Vec::new();
    flate2::read::ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut data)
        .unwrap_or_else(|e| panic!("Failed to inflate object {oid}: {e}"));
    data
}

pub fn read_object_body(dir: &Path, oid: &str) -> Vec<u8> {
    let data = read_object(dir, oid);
    let nul = data
        .iter()
        .position(|byte| *byte == 0)
        .unwrap_or_else(|| panic!("Object {oid} has no header"));
    data[nul + 1..].to_vec()
}

/// The tree oid named on the first line of a commit
pub fn commit_tree(dir: &Path, commit_oid: &str) -> String {
    let body = String::from_utf8(read_object_body(dir, commit_oid)).expect("commit is not UTF-8");
    body.lines()
        .next()
        .and_then(|line| line.strip_prefix("tree "))
        .unwrap_or_else(|| panic!("Commit {commit_oid} has no tree line"))
        .to_string()
}

/// `(mode, name, oid)` for every entry of a tree
pub fn tree_entries(dir: &Path, tree_oid: &str) -> Vec<(String, String, String)> {
    let body = read_object_body(dir, tree_oid);
    let mut entries = Vec::new();
    let mut rest = body.as_slice();

    while !rest.is_empty() {
        let space = rest.iter().position(|byte| *byte == b' ').expect("entry without mode");
        let nul = rest.iter().position(|byte| *byte == 0).expect("entry without name");
        let mode = String::from_utf8_lossy(&rest[..space]).to_string();
        let name = String::from_utf8_lossy(&rest[space + 1..nul]).to_string();
        let oid = rest[nul + 1..nul + 21]
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<String>();

        entries.push((mode, name, oid));
        rest = &rest[nul + 21..];
    }

    entries
}

pub fn blob_oid(content: &str) -> String {
    let framed = format!("blob {}\0{}", content.len(), content);
    format!("{:x}", Sha1::digest(framed.as_bytes()))
}
