use crate::common::command::{commit_all, head_oid, init_repository_dir, repository_dir, run_twig_command, stdout_of};
use crate::common::file::write_file;
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

const DATE_LINE: &str = "Date:   Sun Jan 1 12:00:00 2023 +0000";

#[rstest]
fn medium_format_shows_a_single_commit(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let head = head_oid(dir);

    assert_eq!(
        stdout_of(dir, &["log"]),
        format!("commit {head}\nAuthor: fake_user <fake_email@email.com>\n{DATE_LINE}\n\n    Initial commit\n")
    );
}

#[rstest]
fn commits_are_listed_newest_first_with_blank_lines_between(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = head_oid(dir);
    write_file(dir, "1.txt", "second");
    commit_all(dir, "Second commit\n\nWith a longer body");
    let second = head_oid(dir);

    assert_eq!(
        stdout_of(dir, &["log"]),
        format!(
            "commit {second}\n\
             Author: fake_user <fake_email@email.com>\n\
             {DATE_LINE}\n\
             \n    Second commit\n    \n    With a longer body\n\
             \n\
             commit {first}\n\
             Author: fake_user <fake_email@email.com>\n\
             {DATE_LINE}\n\
             \n    Initial commit\n"
        )
    );
}

#[rstest]
fn abbrev_commit_shortens_ids(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let head = head_oid(dir);

    let stdout = stdout_of(dir, &["log", "--abbrev-commit"]);

    assert!(stdout.starts_with(&format!("commit {}\n", &head[..7])));
}

#[rstest]
fn oneline_prints_short_ids_and_titles(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = head_oid(dir);
    write_file(dir, "1.txt", "second");
    commit_all(dir, "Second commit\n\nbody is not shown");
    let second = head_oid(dir);

    assert_eq!(
        stdout_of(dir, &["log", "--oneline"]),
        format!("{} Second commit\n{} Initial commit\n", &second[..7], &first[..7])
    );
}

#[rstest]
fn oneline_format_keeps_full_ids(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let head = head_oid(dir);

    assert_eq!(
        stdout_of(dir, &["log", "--format=oneline"]),
        format!("{head} Initial commit\n")
    );
}

#[rstest]
fn an_empty_repository_has_no_history(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();

    assert_eq!(stdout_of(dir, &["log"]), "");
}
