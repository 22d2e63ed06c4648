use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

use crate::common::file::write_file;

pub const AUTHOR_NAME: &str = "fake_user";
pub const AUTHOR_EMAIL: &str = "fake_email@email.com";
pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository with `1.txt`, `a/2.txt` and `a/b/3.txt` committed on master
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(repository_dir.path(), "1.txt", "one");
    write_file(repository_dir.path(), "a/2.txt", "two");
    write_file(repository_dir.path(), "a/b/3.txt", "three");

    run_twig_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();
    twig_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_twig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("Failed to find twig binary");
    cmd.env("NO_PAGER", "1");
    cmd.env_remove("TWIG_LOG");
    cmd.current_dir(dir);
    cmd.args(args);
    cmd
}

pub fn twig_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_twig_command(dir, &["commit", "-m", message]);
    cmd.envs([
        ("GIT_AUTHOR_NAME", AUTHOR_NAME),
        ("GIT_AUTHOR_EMAIL", AUTHOR_EMAIL),
        ("GIT_AUTHOR_DATE", AUTHOR_DATE),
    ]);
    cmd
}

/// Stage everything and commit it
pub fn commit_all(dir: &Path, message: &str) {
    run_twig_command(dir, &["add", "."]).assert().success();
    twig_commit(dir, message).assert().success();
}

pub fn stdout_of(dir: &Path, args: &[&str]) -> String {
    let output = run_twig_command(dir, args).assert().success();
    String::from_utf8(output.get_output().stdout.clone()).expect("stdout is not UTF-8")
}

/// The oid HEAD resolves to, following one level of `ref:`
pub fn head_oid(dir: &Path) -> String {
    let head = std::fs::read_to_string(dir.join(".git/HEAD")).expect("Failed to read HEAD");

    match head.strip_prefix("ref: ") {
        Some(ref_path) => std::fs::read_to_string(dir.join(".git").join(ref_path.trim()))
            .expect("Failed to read branch ref")
            .trim()
            .to_string(),
        None => head.trim().to_string(),
    }
}

pub fn read_head(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(".git/HEAD")).expect("Failed to read HEAD")
}
