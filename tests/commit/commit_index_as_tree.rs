use crate::common::command::{head_oid, init_repository_dir, repository_dir, run_twig_command, twig_commit};
use crate::common::file::{make_executable, write_file};
use crate::common::object::{blob_oid, commit_tree, read_object_body, tree_entries};
use assert_fs::TempDir;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn root_commit_records_a_single_blob(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();
    write_file(dir, "a.txt", "hello");
    run_twig_command(dir, &["add", "a.txt"]).assert().success();

    twig_commit(dir, "first")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[master \(root-commit\) [0-9a-f]{7}\] first\n$")?);

    let head = head_oid(dir);
    let tree = commit_tree(dir, &head);
    assert_eq!(
        tree_entries(dir, &tree),
        vec![("100644".to_string(), "a.txt".to_string(), blob_oid("hello"))]
    );
    assert_eq!(blob_oid("hello"), "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0");

    let body = String::from_utf8(read_object_body(dir, &head))?;
    assert_eq!(
        body,
        format!(
            "tree {tree}\n\
            author fake_user <fake_email@email.com> 1672574400 +0000\n\
            committer fake_user <fake_email@email.com> 1672574400 +0000\n\
            \n\
            first\n"
        )
    );

    Ok(())
}

#[rstest]
fn nested_directories_become_subtrees(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let root = commit_tree(dir, &head_oid(dir));

    let entries = tree_entries(dir, &root);
    assert_eq!(
        entries
            .iter()
            .map(|(mode, name, _)| (mode.as_str(), name.as_str()))
            .collect::<Vec<_>>(),
        vec![("100644", "1.txt"), ("40000", "a")]
    );

    let a_entries = tree_entries(dir, &entries[1].2);
    assert_eq!(a_entries[0], ("100644".to_string(), "2.txt".to_string(), blob_oid("two")));
    assert_eq!(a_entries[1].1, "b");

    let b_entries = tree_entries(dir, &a_entries[1].2);
    assert_eq!(b_entries, vec![("100644".to_string(), "3.txt".to_string(), blob_oid("three"))]);
}

#[rstest]
fn executables_are_committed_with_their_mode(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();
    write_file(dir, "run.sh", "#!/bin/sh\n");
    make_executable(dir, "run.sh");
    run_twig_command(dir, &["add", "."]).assert().success();
    twig_commit(dir, "script").assert().success();

    let entries = tree_entries(dir, &commit_tree(dir, &head_oid(dir)));
    assert_eq!(entries[0].0, "100755");
}

#[rstest]
fn later_commits_point_at_their_parent(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let parent = head_oid(dir);

    write_file(dir, "1.txt", "changed");
    run_twig_command(dir, &["add", "1.txt"]).assert().success();
    twig_commit(dir, "second\n\nwith a body")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[master [0-9a-f]{7}\] second\n$")?);

    let body = String::from_utf8(read_object_body(dir, &head_oid(dir)))?;
    assert_eq!(body.lines().nth(1), Some(format!("parent {parent}").as_str()));
    assert!(body.ends_with("\n\nsecond\n\nwith a body\n"));

    Ok(())
}

#[rstest]
fn committing_on_a_detached_head(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let first = head_oid(dir);
    run_twig_command(dir, &["checkout", &first]).assert().success();

    write_file(dir, "1.txt", "detached");
    run_twig_command(dir, &["add", "1.txt"]).assert().success();
    twig_commit(dir, "detached work")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[detached HEAD [0-9a-f]{7}\] detached work\n$")?);

    // master stays behind
    let master = std::fs::read_to_string(dir.join(".git/refs/heads/master"))?;
    assert_eq!(master.trim(), first);
    assert_ne!(head_oid(dir), first);

    Ok(())
}
