use crate::common::command::{head_oid, init_repository_dir, run_twig_command, stdout_of};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("-d")]
#[case("-D")]
#[case("--delete")]
fn delete_a_branch(init_repository_dir: TempDir, #[case] flag: &str) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "topic"]).assert().success();

    run_twig_command(dir, &["branch", flag, "topic"])
        .assert()
        .success()
        .stdout(format!("Deleted branch topic (was {}).\n", &head_oid(dir)[..7]));

    init_repository_dir
        .child(".git/refs/heads/topic")
        .assert(predicate::path::missing());
    assert_eq!(stdout_of(dir, &["branch"]), "* master\n");
}

#[rstest]
fn delete_several_branches(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    for name in ["one", "two", "three"] {
        run_twig_command(dir, &["branch", name]).assert().success();
    }

    let short = &head_oid(dir)[..7];
    run_twig_command(dir, &["branch", "-D", "one", "three"])
        .assert()
        .success()
        .stdout(format!(
            "Deleted branch one (was {short}).\nDeleted branch three (was {short}).\n"
        ));

    assert_eq!(stdout_of(dir, &["branch"]), "* master\n  two\n");
}

#[rstest]
fn deleting_a_nested_branch_prunes_empty_directories(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "feature/deep/login"]).assert().success();

    run_twig_command(dir, &["branch", "-d", "feature/deep/login"]).assert().success();

    init_repository_dir
        .child(".git/refs/heads/feature")
        .assert(predicate::path::missing());
    init_repository_dir
        .child(".git/refs/heads")
        .assert(predicate::path::is_dir());
}

#[rstest]
fn deleting_a_missing_branch_fails(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["branch", "-d", "nonexistent"])
        .assert()
        .code(128)
        .stderr("fatal: branch 'nonexistent' not found.\n");
}
