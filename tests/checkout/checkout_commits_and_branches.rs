use crate::common::command::{commit_all, head_oid, init_repository_dir, read_head, run_twig_command, stdout_of};
use crate::common::file::{delete_path, read_file, write_file};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn checkout_an_earlier_commit_restores_its_files(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let first = head_oid(dir);
    write_file(dir, "a/2.txt", "second version");
    commit_all(dir, "Second commit");

    run_twig_command(dir, &["checkout", &first])
        .assert()
        .success()
        .stderr(predicate::str::starts_with(format!("Note: checking out '{first}'.\n")))
        .stderr(predicate::str::contains("You are in 'detached HEAD' state."))
        .stderr(predicate::str::ends_with(format!(
            "HEAD is now at {} Initial commit\n",
            &first[..7]
        )));

    assert_eq!(read_file(dir, "a/2.txt"), "two");
    assert_eq!(read_head(dir), format!("{first}\n"));
    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "");
    assert_eq!(stdout_of(dir, &["diff", "--cached"]), "");

    Ok(())
}

#[rstest]
fn switching_branches_adds_and_removes_files(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "topic"]).assert().success();

    write_file(dir, "d/e/new.txt", "new");
    delete_path(dir, "a/b");
    delete_path(dir, ".git/index");
    commit_all(dir, "Reshape");

    run_twig_command(dir, &["checkout", "topic"])
        .assert()
        .success()
        .stderr("Switched to branch 'topic'\n");

    assert_eq!(read_head(dir), "ref: refs/heads/topic\n");
    assert_eq!(read_file(dir, "a/b/3.txt"), "three");
    init_repository_dir.child("d").assert(predicate::path::missing());
    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "");

    run_twig_command(dir, &["checkout", "master"])
        .assert()
        .success()
        .stderr("Switched to branch 'master'\n");

    assert_eq!(read_file(dir, "d/e/new.txt"), "new");
    init_repository_dir.child("a/b").assert(predicate::path::missing());
    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "");
}

#[rstest]
fn a_file_and_a_directory_swap_places(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "topic"]).assert().success();

    delete_path(dir, "1.txt");
    write_file(dir, "1.txt/inner.txt", "inner");
    delete_path(dir, ".git/index");
    commit_all(dir, "Directory now");

    run_twig_command(dir, &["checkout", "topic"]).assert().success();
    assert_eq!(read_file(dir, "1.txt"), "one");

    run_twig_command(dir, &["checkout", "master"]).assert().success();
    assert_eq!(read_file(dir, "1.txt/inner.txt"), "inner");
    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "");
}

#[rstest]
fn checkout_the_current_branch(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["checkout", "master"])
        .assert()
        .success()
        .stderr("Already on 'master'\n");
}

#[rstest]
fn leaving_a_detached_head_reports_the_previous_position(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = head_oid(dir);
    write_file(dir, "1.txt", "second");
    commit_all(dir, "Second commit");
    run_twig_command(dir, &["checkout", "HEAD^"]).assert().success();

    run_twig_command(dir, &["checkout", "master"])
        .assert()
        .success()
        .stderr(format!(
            "Previous HEAD position was {} Initial commit\nSwitched to branch 'master'\n",
            &first[..7]
        ));

    assert_eq!(read_file(dir, "1.txt"), "second");
}

#[rstest]
fn moving_between_detached_commits(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = head_oid(dir);
    write_file(dir, "1.txt", "second");
    commit_all(dir, "Second commit");
    let second = head_oid(dir);
    run_twig_command(dir, &["checkout", &second]).assert().success();

    run_twig_command(dir, &["checkout", &first[..7]])
        .assert()
        .success()
        .stderr(format!(
            "Previous HEAD position was {} Second commit\nHEAD is now at {} Initial commit\n",
            &second[..7],
            &first[..7]
        ));
}

#[rstest]
fn unknown_revisions_are_rejected(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["checkout", "nowhere"])
        .assert()
        .code(128)
        .stderr("fatal: Not a valid object name: 'nowhere'.\n");

    assert_eq!(read_head(dir), "ref: refs/heads/master\n");
    init_repository_dir
        .child(".git/index.lock")
        .assert(predicate::path::missing());
}
