//! Ref names and revision expressions
//!
//! - `branch_name`: validated branch names and symbolic ref paths
//! - `revision`: `<rev>^`, `<rev>~<n>`, `@` and abbreviated-oid resolution

pub mod branch_name;
pub mod revision;

/// Names git refuses for refs: leading dot, `/.`, `..`, leading or trailing
/// slash, `.lock` suffix, `@{`, and control or glob characters
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
pub const PARENT_REGEX: &str = r"^(.+)\^$";
pub const ANCESTOR_REGEX: &str = r"^(.+)\~(\d+)$";
pub const REF_ALIASES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "@" => "HEAD",
};
