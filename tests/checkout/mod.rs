mod checkout_commits_and_branches;
mod checkout_with_conflicts;
