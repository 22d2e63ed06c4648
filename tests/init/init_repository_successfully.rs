use crate::common::command::{read_head, repository_dir, run_twig_command};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn init_in_current_directory(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let git_path = repository_dir.path().canonicalize()?.join(".git");

    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(format!("Initialized empty Git repository in {}\n", git_path.display()));

    repository_dir.child(".git/objects").assert(predicate::path::is_dir());
    repository_dir.child(".git/refs/heads").assert(predicate::path::is_dir());
    assert_eq!(read_head(repository_dir.path()), "ref: refs/heads/master\n");

    // the branch only comes into existence with the first commit
    repository_dir
        .child(".git/refs/heads/master")
        .assert(predicate::path::missing());

    Ok(())
}

#[rstest]
fn init_creates_a_missing_target_directory(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let target = repository_dir.child("nested/project");

    run_twig_command(repository_dir.path(), &["init", "nested/project"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^Initialized empty Git repository in .+/nested/project/\.git\n$")?);

    target.child(".git/HEAD").assert("ref: refs/heads/master\n");
    repository_dir.child(".git").assert(predicate::path::missing());

    Ok(())
}
