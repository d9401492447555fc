//! Merging of per-unit registries.

use indexmap::IndexSet;
use log::{debug, info};

use litloom_core::{
    error::Diagnostic,
    fragment::{Key, Relation},
};

use super::{FragmentId, PendingReference, Registry, hierarchy::ScopeHierarchy};

/// Chain links of a fragment, as saved before a merge.
#[derive(Debug, Clone, Copy)]
struct Links {
    id: FragmentId,
    prev: Option<FragmentId>,
    next: Option<FragmentId>,
    child_index: usize,
}

/// State of the parts of a registry a merge can modify.
///
/// Only the chains sharing a key with the incoming fragments and the
/// pending provisional heads are saved. New fragments and new chain heads
/// are appended, so they are undone by truncation.
#[derive(Debug)]
struct Checkpoint {
    fragments: usize,
    heads: usize,
    replaced_heads: Vec<(Key, FragmentId)>,
    links: Vec<Links>,
    pending: Vec<PendingReference>,
    hierarchy: ScopeHierarchy,
}

impl Registry {
    /// Merges `incoming` into this registry.
    ///
    /// Scope declarations are merged first, then every incoming fragment is
    /// replayed in its original registration order, as if it had been
    /// registered directly into this registry. Pending references on both
    /// sides are retried afterwards.
    ///
    /// The merge works in place. Its cost is proportional to the incoming
    /// registry plus the chains of this registry it touches, not to the
    /// size of this registry.
    ///
    /// # Errors
    ///
    /// Returns the first conflict (`E100`, `E102` or `E103`). The registry is
    /// left unchanged on error.
    pub fn merge(&mut self, incoming: Registry) -> Result<(), Diagnostic> {
        info!(
            fragments = incoming.len(),
            scopes = incoming.hierarchy.iter().count();
            "Merging registry",
        );

        let checkpoint = self.checkpoint(&incoming);
        if let Err(err) = self.replay(&incoming) {
            self.rollback(checkpoint);
            debug!(code:? = err.code(); "Merge rolled back");
            return Err(err);
        }

        self.references.union(&incoming.references);
        self.resolve_pending();
        Ok(())
    }

    fn replay(&mut self, incoming: &Registry) -> Result<(), Diagnostic> {
        for (scope, info) in incoming.hierarchy.iter() {
            self.hierarchy
                .declare_parts(scope, info.parent(), info.fetch_files(), info.location())?;
        }

        let offset = self.fragments.len();
        self.fragments
            .extend(incoming.fragments.iter().map(|fragment| fragment.detached(offset)));

        for (index, fragment) in incoming.fragments.iter().enumerate() {
            let id = FragmentId::new(index).offset(offset);
            match fragment.relation() {
                Relation::New => self.place_new(id)?,
                Relation::Inserted => {
                    let modifier = fragment.prev().map(|modifier| modifier.offset(offset));
                    self.node_mut(id).set_prev(modifier);
                    self.place_new(id)?;
                }
                Relation::Append | Relation::Replace | Relation::Insert => self.attach(id),
            }
        }
        Ok(())
    }

    fn checkpoint(&self, incoming: &Registry) -> Checkpoint {
        let keys: IndexSet<Key> = incoming.fragments.iter().map(|f| f.key()).collect();

        let mut replaced_heads = Vec::new();
        let mut touched: IndexSet<FragmentId> = IndexSet::new();
        for key in &keys {
            if let Some(&head) = self.heads.get(key) {
                replaced_heads.push((*key, head));
                touched.extend(self.chain(head));
            }
        }
        touched.extend(self.pending.iter().map(|pending| pending.fragment));

        let links = touched
            .into_iter()
            .map(|id| {
                let fragment = self.node(id);
                Links {
                    id,
                    prev: fragment.prev(),
                    next: fragment.next(),
                    child_index: fragment.child_index(),
                }
            })
            .collect();

        Checkpoint {
            fragments: self.fragments.len(),
            heads: self.heads.len(),
            replaced_heads,
            links,
            pending: self.pending.clone(),
            hierarchy: self.hierarchy.clone(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.fragments.truncate(checkpoint.fragments);
        self.heads.truncate(checkpoint.heads);
        for (key, head) in checkpoint.replaced_heads {
            self.heads.insert(key, head);
        }
        for links in checkpoint.links {
            let fragment = self.node_mut(links.id);
            fragment.set_prev(links.prev);
            fragment.set_next(links.next);
            fragment.set_child_index(links.child_index);
        }
        self.pending = checkpoint.pending;
        self.hierarchy = checkpoint.hierarchy;
    }
}
