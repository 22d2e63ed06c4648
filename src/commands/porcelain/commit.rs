use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::tree::Tree;
use std::io::Write;

impl Repository {
    pub async fn commit(&self, message: &str) -> anyhow::Result<()> {
        let message = message.trim();
        if message.is_empty() {
            anyhow::bail!("Aborting commit due to empty commit message.");
        }

        let index = self.index();
        let mut index = index.lock().await;
        index.load()?;

        let database = self.database();
        let root = Tree::build(index.entries())?.traverse(&mut |tree: &Tree| database.store(tree).map(|_| ()))?;
        let tree_oid = root.object_id()?;

        let parent = self.refs().read_head()?;
        let is_root = match parent {
            Some(_) => "",
            None => " (root-commit)",
        };

        let author = self.config().author()?;
        let commit = Commit::new(parent, tree_oid, author, format!("{message}\n"));
        let commit_oid = database.store(&commit)?;
        self.refs().update_head(&commit_oid)?;

        let current_ref = self.refs().current_ref(None)?;
        let head_name = match current_ref.is_head() {
            true => "detached HEAD",
            false => current_ref.short_name(),
        };

        writeln!(
            self.writer(),
            "[{}{} {}] {}",
            head_name,
            is_root,
            commit_oid.to_short_oid(),
            commit.title_line()
        )?;

        Ok(())
    }
}
