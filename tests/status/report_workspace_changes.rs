use crate::common::command::{init_repository_dir, stdout_of};
use crate::common::file::{delete_path, make_executable, write_file};
use assert_fs::TempDir;
use filetime::FileTime;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn move_mtime(dir: &std::path::Path, path: &str, seconds: i64) {
    let full_path = dir.join(path);
    let metadata = std::fs::metadata(&full_path).unwrap();
    let mtime = FileTime::from_last_modification_time(&metadata);
    let moved = FileTime::from_unix_time(mtime.unix_seconds() + seconds, mtime.nanoseconds());

    filetime::set_file_mtime(&full_path, moved).unwrap();
}

#[rstest]
fn clean_workspace_prints_nothing(init_repository_dir: TempDir) {
    assert_eq!(stdout_of(init_repository_dir.path(), &["status", "--porcelain"]), "");
}

#[rstest]
fn touched_files_are_not_reported(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    move_mtime(dir, "1.txt", 60);

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "");
    // the refreshed stat keeps the next scan on the fast path
    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "");
}

#[rstest]
fn files_with_modified_contents(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "1.txt", "changed");
    write_file(dir, "a/2.txt", "modified");

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), " M 1.txt\n M a/2.txt\n");
}

#[rstest]
fn modified_files_with_unchanged_size(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "a/b/3.txt", "hello");
    move_mtime(dir, "a/b/3.txt", 60);

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), " M a/b/3.txt\n");
}

#[rstest]
fn files_with_changed_modes(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    make_executable(dir, "a/2.txt");

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), " M a/2.txt\n");
}

#[rstest]
fn deleted_files(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    delete_path(dir, "a/2.txt");

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), " D a/2.txt\n");
}

#[rstest]
fn files_in_deleted_directories(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    delete_path(dir, "a");

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), " D a/2.txt\n D a/b/3.txt\n");
}
