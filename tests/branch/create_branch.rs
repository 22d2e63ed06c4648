use crate::common::command::{commit_all, head_oid, init_repository_dir, repository_dir, run_twig_command};
use crate::common::file::write_file;
use crate::common::object::commit_tree;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use rstest::rstest;

fn branch_oid(dir: &std::path::Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(".git/refs/heads").join(name))
        .unwrap_or_else(|e| panic!("Failed to read branch {name}: {e}"))
        .trim()
        .to_string()
}

#[rstest]
#[case("topic")]
#[case("feature/login")]
#[case("bugfix/issue-123")]
#[case("v1.0")]
fn create_branch_at_head(init_repository_dir: TempDir, #[case] name: &str) {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["branch", name])
        .assert()
        .success()
        .stdout("");

    init_repository_dir
        .child(format!(".git/refs/heads/{name}"))
        .assert(format!("{}\n", head_oid(dir)));
    // HEAD stays where it was
    init_repository_dir.child(".git/HEAD").assert("ref: refs/heads/master\n");
}

#[rstest]
#[case("HEAD^", 1)]
#[case("@~2", 2)]
#[case("master~1^", 2)]
fn create_branch_from_an_ancestor(init_repository_dir: TempDir, #[case] revision: &str, #[case] generations: usize) {
    let dir = init_repository_dir.path();
    let mut history = vec![head_oid(dir)];
    for message in ["second", "third"] {
        write_file(dir, "1.txt", message);
        commit_all(dir, message);
        history.insert(0, head_oid(dir));
    }

    run_twig_command(dir, &["branch", "old", revision]).assert().success();

    assert_eq!(branch_oid(dir, "old"), history[generations]);
}

#[rstest]
fn create_branch_from_an_abbreviated_oid(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = head_oid(dir);
    write_file(dir, "1.txt", "second");
    commit_all(dir, "second");

    run_twig_command(dir, &["branch", "old", &first[..7]]).assert().success();

    assert_eq!(branch_oid(dir, "old"), first);
}

#[rstest]
fn create_branch_from_another_branch(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "topic"]).assert().success();
    write_file(dir, "1.txt", "second");
    commit_all(dir, "second");

    run_twig_command(dir, &["branch", "copy", "topic"]).assert().success();

    assert_eq!(branch_oid(dir, "copy"), branch_oid(dir, "topic"));
    assert_ne!(branch_oid(dir, "copy"), head_oid(dir));
}

#[rstest]
#[case(".hidden")]
#[case("ends.lock")]
#[case("two..dots")]
#[case("with space")]
#[case("caret^")]
#[case("trailing/")]
fn invalid_names_are_rejected(init_repository_dir: TempDir, #[case] name: &str) {
    run_twig_command(init_repository_dir.path(), &["branch", name])
        .assert()
        .code(128)
        .stderr(format!("fatal: '{name}' is not a valid branch name.\n"));
}

#[rstest]
fn duplicate_branches_need_force(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = head_oid(dir);
    run_twig_command(dir, &["branch", "topic"]).assert().success();
    write_file(dir, "1.txt", "second");
    commit_all(dir, "second");

    run_twig_command(dir, &["branch", "topic"])
        .assert()
        .code(128)
        .stderr("fatal: A branch named 'topic' already exists.\n");
    assert_eq!(branch_oid(dir, "topic"), first);

    run_twig_command(dir, &["branch", "-f", "topic"]).assert().success();
    assert_eq!(branch_oid(dir, "topic"), head_oid(dir));
}

#[rstest]
fn unknown_start_points_are_rejected(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["branch", "topic", "nowhere"])
        .assert()
        .code(128)
        .stderr("fatal: Not a valid object name: 'nowhere'.\n");

    init_repository_dir
        .child(".git/refs/heads/topic")
        .assert(predicate::path::missing());
}

#[rstest]
fn start_points_must_be_commits(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let tree = commit_tree(dir, &head_oid(dir));

    run_twig_command(dir, &["branch", "topic", &tree])
        .assert()
        .code(128)
        .stderr(format!(
            "error: object {} is a tree, not a commit\nfatal: Not a valid object name: '{tree}'.\n",
            &tree[..7]
        ));
}

#[rstest]
fn branching_needs_a_commit(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();

    run_twig_command(dir, &["branch", "topic"])
        .assert()
        .code(128)
        .stderr("fatal: Not a valid object name: 'master'.\n");
}
