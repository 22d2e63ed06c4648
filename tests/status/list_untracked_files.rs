use crate::common::command::{init_repository_dir, repository_dir, run_twig_command, stdout_of};
use crate::common::file::write_file;
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

#[fixture]
fn empty_repository(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"]).assert().success();
    repository_dir
}

#[rstest]
fn untracked_files_are_listed_in_name_order(empty_repository: TempDir) {
    let dir = empty_repository.path();
    write_file(dir, "file.txt", "");
    write_file(dir, "another.txt", "");

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "?? another.txt\n?? file.txt\n");
}

#[rstest]
fn files_not_in_the_index_are_untracked(empty_repository: TempDir) {
    let dir = empty_repository.path();
    write_file(dir, "committed.txt", "");
    run_twig_command(dir, &["add", "."]).assert().success();
    write_file(dir, "file.txt", "");

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "A  committed.txt\n?? file.txt\n");
}

#[rstest]
fn untracked_directories_are_listed_not_their_contents(empty_repository: TempDir) {
    let dir = empty_repository.path();
    write_file(dir, "file.txt", "");
    write_file(dir, "dir/another.txt", "");

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "?? dir/\n?? file.txt\n");
}

#[rstest]
fn untracked_directories_that_indirectly_contain_files(empty_repository: TempDir) {
    let dir = empty_repository.path();
    write_file(dir, "outer/inner/file.txt", "");

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "?? outer/\n");
}

#[rstest]
fn empty_untracked_directories_are_not_listed(empty_repository: TempDir) {
    let dir = empty_repository.path();
    std::fs::create_dir_all(dir.join("outer/inner")).unwrap();

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "");
}

#[rstest]
fn untracked_files_inside_tracked_directories(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "a/outer.txt", "");
    write_file(dir, "a/b/c/file.txt", "");

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "?? a/b/c/\n?? a/outer.txt\n");
}
