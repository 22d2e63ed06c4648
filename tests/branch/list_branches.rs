use crate::common::command::{commit_all, head_oid, init_repository_dir, run_twig_command, stdout_of};
use crate::common::file::write_file;
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn only_master_after_the_first_commit(init_repository_dir: TempDir) {
    assert_eq!(stdout_of(init_repository_dir.path(), &["branch"]), "* master\n");
}

#[rstest]
fn branches_are_sorted_and_the_current_one_is_starred(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    for name in ["main", "develop", "feature/login", "bugfix/auth"] {
        run_twig_command(dir, &["branch", name]).assert().success();
    }
    run_twig_command(dir, &["checkout", "main"]).assert().success();

    assert_eq!(
        stdout_of(dir, &["branch"]),
        "  bugfix/auth\n  develop\n  feature/login\n* main\n  master\n"
    );
}

#[rstest]
fn verbose_listing_shows_tip_commits(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = head_oid(dir);
    run_twig_command(dir, &["branch", "old"]).assert().success();
    write_file(dir, "1.txt", "second");
    commit_all(dir, "Second commit");
    let second = head_oid(dir);

    assert_eq!(
        stdout_of(dir, &["branch", "-v"]),
        format!(
            "* master {} Second commit\n  old    {} Initial commit\n",
            &second[..7],
            &first[..7]
        )
    );
}

#[rstest]
fn detached_head_is_listed_first(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let head = head_oid(dir);
    run_twig_command(dir, &["checkout", &head]).assert().success();

    assert_eq!(
        stdout_of(dir, &["branch"]),
        format!("* (HEAD detached at {})\n  master\n", &head[..7])
    );
}
