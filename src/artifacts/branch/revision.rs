use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{ANCESTOR_REGEX, PARENT_REGEX, REF_ALIASES};
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{TwigError, HintedError};
use anyhow::Context;

/// A parsed revision expression
///
/// Supported forms:
/// - Ref names: `master`, `feature/x`, `HEAD`, and the `@` alias for `HEAD`
/// - Abbreviated or full oids: anything that is not a ref is prefix-matched
///   against the object store during resolution
/// - Parent notation: `<rev>^`
/// - Ancestor notation: `<rev>~<n>`
///
/// Suffixes are peeled right to left, so `master~2^` is the parent of the
/// second ancestor of `master`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// A ref name or an oid prefix; disambiguated when resolved
    Ref(String),
    /// The parent of a revision (e.g. `HEAD^`)
    Parent(Box<Revision>),
    /// The Nth ancestor of a revision (e.g. `HEAD~3`)
    Ancestor(Box<Revision>, usize),
}

impl Revision {
    pub fn try_parse(revision: &str) -> anyhow::Result<Revision> {
        let parent_regex = regex::Regex::new(PARENT_REGEX)
            .with_context(|| format!("invalid parent regex: {PARENT_REGEX}"))?;
        if let Some(caps) = parent_regex.captures(revision) {
            let base_revision = Self::try_parse(&caps[1])?;
            return Ok(Revision::Parent(Box::new(base_revision)));
        }

        let ancestor_regex = regex::Regex::new(ANCESTOR_REGEX)
            .with_context(|| format!("invalid ancestor regex: {ANCESTOR_REGEX}"))?;
        if let Some(caps) = ancestor_regex.captures(revision) {
            let generations: usize = caps[2]
                .parse()
                .with_context(|| format!("failed to parse generations in revision: {revision}"))?;
            let base_revision = Self::try_parse(&caps[1])?;
            return Ok(Revision::Ancestor(Box::new(base_revision), generations));
        }

        let resolved_name = *REF_ALIASES.get(revision).unwrap_or(&revision);
        let branch_name = BranchName::try_parse(resolved_name)?;
        Ok(Revision::Ref(branch_name.to_string()))
    }

    fn resolve(&self, context: &mut RevisionContext, object_type: Option<ObjectType>) -> anyhow::Result<Option<ObjectId>> {
        match self {
            Revision::Ref(name) => context.read_ref(name, object_type),
            Revision::Parent(base_revision) => {
                let oid = base_revision.resolve(context, Some(ObjectType::Commit))?;
                context.commit_parent(oid)
            }
            Revision::Ancestor(base_revision, generations) => {
                let mut oid = base_revision.resolve(context, Some(ObjectType::Commit))?;
                for _ in 0..*generations {
                    oid = context.commit_parent(oid)?;
                }

                Ok(oid)
            }
        }
    }
}

/// Resolves revision expressions against one repository, collecting the
/// hints explaining why a lookup failed
pub struct RevisionContext<'r> {
    database: &'r Database,
    refs: &'r Refs,
    errors: Vec<HintedError>,
}

impl<'r> RevisionContext<'r> {
    pub fn new(database: &'r Database, refs: &'r Refs) -> Self {
        RevisionContext {
            database,
            refs,
            errors: Vec::new(),
        }
    }

    /// Resolve `expression` to an oid, optionally requiring a given object type
    ///
    /// Every failure (unparsable, unresolved, ambiguous or wrong type)
    /// surfaces as [`TwigError::InvalidObject`] carrying the collected hints.
    pub fn resolve(&mut self, expression: &str, object_type: Option<ObjectType>) -> anyhow::Result<ObjectId> {
        let oid = match Revision::try_parse(expression) {
            Ok(revision) => revision.resolve(self, object_type)?,
            Err(_) => None,
        };

        let oid = match (oid, object_type) {
            (Some(oid), Some(object_type)) => self.load_typed_object(&oid, object_type)?.map(|_| oid),
            (oid, _) => oid,
        };

        oid.ok_or_else(|| {
            TwigError::InvalidObject {
                name: expression.to_string(),
                errors: std::mem::take(&mut self.errors),
            }
            .into()
        })
    }

    fn read_ref(&mut self, name: &str, object_type: Option<ObjectType>) -> anyhow::Result<Option<ObjectId>> {
        if let Some(oid) = self.refs.read_ref(name)? {
            return Ok(Some(oid));
        }

        let mut candidates = self.database.prefix_match(name)?;
        if let Some(object_type) = object_type {
            candidates = self.database.type_match_prefixes(candidates, object_type)?;
        }

        match candidates.len() {
            0 => Ok(None),
            1 => Ok(candidates.into_iter().next()),
            _ => {
                self.log_ambiguous_oid(name, &candidates)?;
                Ok(None)
            }
        }
    }

    fn commit_parent(&mut self, oid: Option<ObjectId>) -> anyhow::Result<Option<ObjectId>> {
        let Some(oid) = oid else {
            return Ok(None);
        };

        match self.load_typed_object(&oid, ObjectType::Commit)? {
            Some(ObjectBox::Commit(commit)) => Ok(commit.parent().cloned()),
            _ => Ok(None),
        }
    }

    fn load_typed_object(&mut self, oid: &ObjectId, object_type: ObjectType) -> anyhow::Result<Option<ObjectBox>> {
        let object = self.database.load(oid)?;

        if object.object_type() == object_type {
            return Ok(Some(object));
        }

        let message = format!(
            "object {} is a {}, not a {}",
            self.database.short_oid(oid),
            object.object_type(),
            object_type
        );
        self.errors.push(HintedError::new(message, Vec::new()));

        Ok(None)
    }

    fn log_ambiguous_oid(&mut self, name: &str, candidates: &[ObjectId]) -> anyhow::Result<()> {
        let mut hints = vec!["The candidates are:".to_string()];

        for oid in candidates {
            let short_oid = self.database.short_oid(oid);
            let hint = match self.database.load(oid)? {
                ObjectBox::Commit(commit) => format!(
                    "  {short_oid} commit {} - {}",
                    commit.author().short_date(),
                    commit.title_line()
                ),
                other => format!("  {short_oid} {}", other.object_type()),
            };
            hints.push(hint);
        }

        self.errors
            .push(HintedError::new(format!("short SHA1 {name} is ambiguous"), hints));

        Ok(())
    }
}
