use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::SymRef;
use crate::artifacts::branch::revision::RevisionContext;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use tracing::debug;

const DETACHMENT_NOTICE: &str = "\
You are in 'detached HEAD' state. You can look around, make experimental
changes and commit them, and you can discard any commits you make in this
state without impacting any branches by performing another checkout.

If you want to create a new branch to retain commits you create, you may
do so (now or later) by using the branch command. Example:

    twig branch <new-branch-name>
";

impl Repository {
    /// Move HEAD, the index and the workspace to `target`
    ///
    /// Conflicting local changes abort the whole checkout before anything is
    /// written.
    pub async fn checkout(&self, target: &str) -> anyhow::Result<()> {
        let current_ref = self.refs().current_ref(None)?;
        let current_oid = current_ref.read_oid(self.refs())?;

        let target_oid = RevisionContext::new(self.database(), self.refs()).resolve(target, Some(ObjectType::Commit))?;

        let index = self.index();
        let mut index = index.lock().await;
        index.load_for_update()?;

        let diff = self.database().tree_diff(current_oid.as_ref(), Some(&target_oid))?;
        debug!(target, changes = diff.len(), "checking out");

        let migrated = self.migration(&mut index, diff).apply_changes();
        if let Err(error) = migrated {
            index.release_lock()?;
            return Err(error);
        }
        index.write_updates()?;

        self.refs().set_head(target, &target_oid)?;
        let new_ref = self.refs().current_ref(None)?;

        self.print_previous_head(&current_ref, current_oid.as_ref(), &target_oid)?;
        self.print_detachment_notice(&current_ref, &new_ref, target)?;
        self.print_new_head(&current_ref, &new_ref, &target_oid, target)
    }

    fn print_previous_head(
        &self,
        current_ref: &SymRef,
        current_oid: Option<&ObjectId>,
        target_oid: &ObjectId,
    ) -> anyhow::Result<()> {
        if let Some(current_oid) = current_oid
            && current_ref.is_head()
            && current_oid != target_oid
        {
            self.print_head_position("Previous HEAD position was", current_oid)?;
        }

        Ok(())
    }

    fn print_detachment_notice(&self, current_ref: &SymRef, new_ref: &SymRef, target: &str) -> anyhow::Result<()> {
        if new_ref.is_head() && !current_ref.is_head() {
            eprintln!("Note: checking out '{target}'.\n\n{DETACHMENT_NOTICE}");
        }

        Ok(())
    }

    fn print_new_head(
        &self,
        current_ref: &SymRef,
        new_ref: &SymRef,
        target_oid: &ObjectId,
        target: &str,
    ) -> anyhow::Result<()> {
        if new_ref.is_head() {
            self.print_head_position("HEAD is now at", target_oid)
        } else if new_ref == current_ref {
            eprintln!("Already on '{target}'");
            Ok(())
        } else {
            eprintln!("Switched to branch '{target}'");
            Ok(())
        }
    }

    fn print_head_position(&self, message: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let commit = self.database().load_commit(oid)?;

        eprintln!("{message} {} {}", oid.to_short_oid(), commit.title_line());
        Ok(())
    }
}
