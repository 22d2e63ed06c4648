use crate::common::command::{commit_all, head_oid, init_repository_dir, read_head, run_twig_command, stdout_of};
use crate::common::file::{delete_path, read_file, write_file};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn assert_untouched(dir: &TempDir, head: &str, status: &str) {
    assert_eq!(read_head(dir.path()), head);
    assert_eq!(stdout_of(dir.path(), &["status", "--porcelain"]), status);
    dir.child(".git/index.lock").assert(predicate::path::missing());
}

#[rstest]
fn unstaged_edits_to_a_changed_file(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "1.txt", "second");
    commit_all(dir, "Second commit");

    write_file(dir, "1.txt", "staged");
    run_twig_command(dir, &["add", "1.txt"]).assert().success();
    write_file(dir, "1.txt", "staged, then edited");

    run_twig_command(dir, &["checkout", "HEAD^"])
        .assert()
        .code(128)
        .stderr(
            "error: Your local changes to the following files would be overwritten by checkout:\n\
            \t1.txt\n\
            Please commit your changes or stash them before you switch branches.\n\
            Aborting\n",
        );

    assert_eq!(read_file(dir, "1.txt"), "staged, then edited");
    assert_untouched(&init_repository_dir, "ref: refs/heads/master\n", "MM 1.txt\n");
}

#[rstest]
fn every_conflicting_path_is_reported(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "1.txt", "second");
    write_file(dir, "a/2.txt", "second");
    commit_all(dir, "Second commit");

    write_file(dir, "1.txt", "local");
    write_file(dir, "a/2.txt", "local");

    run_twig_command(dir, &["checkout", "HEAD^"])
        .assert()
        .code(128)
        .stderr(predicate::str::contains("\t1.txt\n\ta/2.txt\n"));

    assert_untouched(&init_repository_dir, "ref: refs/heads/master\n", " M 1.txt\n M a/2.txt\n");
}

#[rstest]
fn untracked_files_that_would_be_overwritten(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = head_oid(dir);
    write_file(dir, "new.txt", "tracked later");
    commit_all(dir, "Add new.txt");
    run_twig_command(dir, &["checkout", &first]).assert().success();

    write_file(dir, "new.txt", "untracked");

    run_twig_command(dir, &["checkout", "master"])
        .assert()
        .code(128)
        .stderr(
            "error: The following untracked working tree files would be overwritten by checkout:\n\
            \tnew.txt\n\
            Please move or remove them before you switch branches.\n\
            Aborting\n",
        );

    assert_eq!(read_file(dir, "new.txt"), "untracked");
    assert_untouched(&init_repository_dir, &format!("{first}\n"), "?? new.txt\n");
}

#[rstest]
fn untracked_files_in_a_directory_becoming_a_file(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = head_oid(dir);
    write_file(dir, "c", "a file called c");
    commit_all(dir, "Add c");
    run_twig_command(dir, &["checkout", &first]).assert().success();

    write_file(dir, "c/untracked.txt", "untracked");

    run_twig_command(dir, &["checkout", "master"])
        .assert()
        .code(128)
        .stderr(predicate::str::starts_with(
            "error: Updating the following directories would lose untracked files in them:\n\tc\n",
        ));

    assert_eq!(read_file(dir, "c/untracked.txt"), "untracked");
}

#[rstest]
fn untracked_file_in_place_of_a_removed_directory(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "dir/a.txt", "a");
    commit_all(dir, "Add dir");

    delete_path(dir, "dir");
    run_twig_command(dir, &["add", "."]).assert().success();
    write_file(dir, "dir", "untracked");

    let head = read_head(dir);
    let status = stdout_of(dir, &["status", "--porcelain"]);

    run_twig_command(dir, &["checkout", "master^"])
        .assert()
        .code(128)
        .stderr(predicate::str::starts_with(
            "error: The following untracked working tree files would be removed by checkout:\n\tdir\n\
            Please move or remove them before you switch branches.\n",
        ));

    assert_untouched(&init_repository_dir, &head, &status);
    assert_eq!(read_file(dir, "dir"), "untracked");
}
