use crate::common::command::{repository_dir, run_twig_command, stdout_of};
use crate::common::file::{delete_path, write_file, write_generated_files};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

#[fixture]
fn empty_repository(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"]).assert().success();
    repository_dir
}

#[rstest]
fn add_nested_directories(empty_repository: TempDir) {
    let dir = empty_repository.path();
    write_file(dir, "1.txt", "one");
    write_file(dir, "a/2.txt", "two");
    write_file(dir, "a/b/3.txt", "three");

    run_twig_command(dir, &["add", "."]).assert().success();

    assert_eq!(
        stdout_of(dir, &["status", "--porcelain"]),
        "A  1.txt\nA  a/2.txt\nA  a/b/3.txt\n"
    );
}

#[rstest]
fn add_files_incrementally(empty_repository: TempDir) {
    let dir = empty_repository.path();
    write_file(dir, "1.txt", "one");
    write_file(dir, "2.txt", "two");

    run_twig_command(dir, &["add", "1.txt"]).assert().success();
    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "A  1.txt\n?? 2.txt\n");

    run_twig_command(dir, &["add", "2.txt"]).assert().success();
    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "A  1.txt\nA  2.txt\n");
}

#[rstest]
fn add_generated_files(empty_repository: TempDir) {
    let dir = empty_repository.path();
    let files = write_generated_files(dir, 5);

    run_twig_command(dir, &["add", "."]).assert().success();

    let expected = files
        .iter()
        .map(|(name, _)| format!("A  {name}\n"))
        .collect::<String>();
    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), expected);
}

#[rstest]
fn a_file_replaces_a_tracked_directory(empty_repository: TempDir) {
    let dir = empty_repository.path();
    write_file(dir, "nested/inner/a.txt", "a");
    write_file(dir, "nested/b.txt", "b");
    run_twig_command(dir, &["add", "."]).assert().success();

    delete_path(dir, "nested");
    write_file(dir, "nested", "now a file");
    run_twig_command(dir, &["add", "nested"]).assert().success();

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "A  nested\n");
}

#[rstest]
fn a_directory_replaces_a_tracked_file(empty_repository: TempDir) {
    let dir = empty_repository.path();
    write_file(dir, "alice.txt", "alice");
    write_file(dir, "bob.txt", "bob");
    run_twig_command(dir, &["add", "."]).assert().success();

    delete_path(dir, "alice.txt");
    write_file(dir, "alice.txt/nested.txt", "nested");
    run_twig_command(dir, &["add", "."]).assert().success();

    assert_eq!(
        stdout_of(dir, &["status", "--porcelain"]),
        "A  alice.txt/nested.txt\nA  bob.txt\n"
    );
}

#[rstest]
fn vanished_files_are_dropped_from_the_index(empty_repository: TempDir) {
    let dir = empty_repository.path();
    write_file(dir, "a/1.txt", "one");
    write_file(dir, "a/2.txt", "two");
    run_twig_command(dir, &["add", "a"]).assert().success();

    delete_path(dir, "a/2.txt");
    run_twig_command(dir, &["add", "a"]).assert().success();

    assert_eq!(stdout_of(dir, &["status", "--porcelain"]), "A  a/1.txt\n");
}
