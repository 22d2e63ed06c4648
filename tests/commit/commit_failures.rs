use crate::common::command::{init_repository_dir, run_twig_command, twig_commit};
use crate::common::file::write_file;
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
#[case("")]
#[case("   \n")]
fn empty_messages_are_rejected(init_repository_dir: TempDir, #[case] message: &str) {
    twig_commit(init_repository_dir.path(), message)
        .assert()
        .code(1)
        .stderr("fatal: Aborting commit due to empty commit message.\n");
}

#[rstest]
fn committing_without_an_author_fails(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "1.txt", "changed");
    run_twig_command(dir, &["add", "1.txt"]).assert().success();

    run_twig_command(dir, &["commit", "-m", "anonymous"])
        .env_remove("GIT_AUTHOR_NAME")
        .env_remove("GIT_AUTHOR_EMAIL")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("fatal: author identity unknown"));
}
