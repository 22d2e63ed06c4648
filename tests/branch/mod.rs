mod create_branch;
mod list_branches;
mod delete_branch;
