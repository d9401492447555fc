//! Fragment registry.
//!
//! A [`Registry`] owns every registered fragment in an arena addressed by
//! [`FragmentId`]s. Fragments sharing a [`Key`] form a chain: the head is
//! stored by key and the rest is reachable through `next` links. A chain
//! head may also extend a fragment of an ancestor scope through its `prev`
//! link, which is how a child scope overrides an inherited fragment without
//! touching the parent.
//!
//! # Lifecycle
//!
//! 1. **Build** - each content unit fills its own registry with
//!    [`Registry::register_fragment`] and [`Registry::declare_scope`].
//!    Overrides whose target is not visible yet are kept as pending
//!    references.
//! 2. **Merge** - unit registries are merged in authored order with
//!    [`Registry::merge`], resolving pending references on the way.
//! 3. **Freeze** - [`Registry::freeze`] checks that nothing is left pending
//!    and returns a read-only [`FrozenRegistry`] that can be tangled.

mod fragment;
mod hierarchy;
mod merge;
mod references;

pub use fragment::{Fragment, FragmentId};
pub use hierarchy::ScopeInfo;

use std::ops::Deref;

use indexmap::{IndexMap, IndexSet};
use log::{debug, info};

use litloom_core::{
    error::{Diagnostic, DiagnosticCollector, DiagnosticError, ErrorCode},
    fragment::{InsertLocation, Key, NewFragment, Operation, Relation, SEPARATOR, display_scope},
    identifier::Id,
    location::SourceLocation,
    scope::ScopeDeclaration,
};

use hierarchy::ScopeHierarchy;
use references::ReferenceIndex;

/// An override whose target was not visible when it was registered.
#[derive(Debug, Clone)]
pub struct PendingReference {
    key: Key,
    relation: Relation,
    fragment: FragmentId,
    location: SourceLocation,
}

impl PendingReference {
    /// Key the override was registered under.
    pub fn key(&self) -> Key {
        self.key
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    /// The provisional chain head waiting for its target.
    pub fn fragment(&self) -> FragmentId {
        self.fragment
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }
}

/// Store of fragments, scopes and references for one or more content units.
///
/// # Examples
///
/// ```
/// use litloom::registry::Registry;
/// use litloom_core::{fragment::{NewFragment, Operation}, location::SourceLocation};
///
/// let mut registry = Registry::new();
/// registry
///     .register_fragment(
///         NewFragment::new("Main", SourceLocation::new("intro", 1)).with_lines(["A"]),
///         Operation::New,
///     )
///     .unwrap();
/// registry
///     .register_fragment(
///         NewFragment::new("Main", SourceLocation::new("intro", 8)).with_lines(["B"]),
///         Operation::Append,
///     )
///     .unwrap();
///
/// let registry = registry.freeze().unwrap();
/// assert!(registry.lookup("Main".into(), None).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    fragments: Vec<Fragment>,
    heads: IndexMap<Key, FragmentId>,
    hierarchy: ScopeHierarchy,
    pending: Vec<PendingReference>,
    references: ReferenceIndex,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fragments, synthetic insertion modifiers included.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Registers an authored fragment with the given override operation.
    ///
    /// Returns the id of the authored fragment. For an insertion, that is the
    /// id of the inserted content; the synthetic modifier attached to the
    /// target is reachable through its `prev` link.
    ///
    /// # Errors
    ///
    /// - `E001` if the name, the scope or the insertion target contains `##`.
    /// - `E100` if a `new` fragment reuses the key of another fragment.
    ///
    /// A failed registration leaves the registry unchanged.
    pub fn register_fragment(
        &mut self,
        fragment: NewFragment,
        operation: Operation,
    ) -> Result<FragmentId, Diagnostic> {
        let location = fragment.location();
        validate_name(fragment.name(), location)?;
        if let Some(scope) = fragment.scope() {
            validate_name(scope, location)?;
        }

        let checkpoint = self.fragments.len();
        let relation = operation.relation();
        let result = match operation {
            Operation::New => {
                let id = self.push(Fragment::authored(fragment, Relation::New));
                self.place_new(id).map(|()| id)
            }
            Operation::Append | Operation::Replace => {
                let id = self.push(Fragment::authored(fragment, relation));
                self.attach(id);
                Ok(id)
            }
            Operation::Insert {
                target,
                placement,
                pattern,
            } => validate_name(target, location).and_then(|()| {
                self.register_insertion(fragment, target, InsertLocation::new(placement, pattern))
            }),
        };

        if result.is_err() {
            self.fragments.truncate(checkpoint);
        }
        result
    }

    /// Declares `parent` as the parent scope of `scope`.
    ///
    /// # Errors
    ///
    /// - `E102` if `scope` already has a different parent.
    /// - `E103` if `scope` is already an ancestor of `parent`.
    pub fn set_parent(
        &mut self,
        scope: impl Into<Id>,
        parent: impl Into<Id>,
        location: SourceLocation,
    ) -> Result<(), Diagnostic> {
        self.declare_scope(ScopeDeclaration::new(scope, location).with_parent(Some(parent.into())))
    }

    /// Records a scope declaration and retries every pending reference.
    pub fn declare_scope(&mut self, declaration: ScopeDeclaration) -> Result<(), Diagnostic> {
        validate_name(declaration.scope(), declaration.location())?;
        if let Some(parent) = declaration.parent() {
            validate_name(parent, declaration.location())?;
        }

        self.hierarchy.declare(&declaration)?;
        self.resolve_pending();
        Ok(())
    }

    pub fn scope_info(&self, scope: Id) -> Option<&ScopeInfo> {
        self.hierarchy.info(scope)
    }

    pub fn parent_scope(&self, scope: Id) -> Option<Id> {
        self.hierarchy.parent(scope)
    }

    /// Exact lookup of a chain head.
    pub fn lookup(&self, name: Id, scope: Option<Id>) -> Option<FragmentId> {
        self.heads.get(&Key::new(scope, name)).copied()
    }

    /// Resolves `name` as seen from `scope` through the scope hierarchy.
    ///
    /// When `override_scope` is given, the scopes from `override_scope` up to
    /// (but excluding) `scope` are searched first for an override of `name`.
    /// The most derived override wins, not the one closest to `scope`: its
    /// chain already extends the overrides of the scopes above it, so
    /// picking an outer one would drop the inner scope's own override. A
    /// `new` fragment on that path starts an unrelated chain and discards
    /// the overrides found below it. If no override is found, the first
    /// ancestor of `scope` (inclusive) defining `name` wins.
    pub fn lookup_recursive(
        &self,
        name: Id,
        scope: Option<Id>,
        override_scope: Option<Id>,
    ) -> Option<FragmentId> {
        if let Some(override_scope) = override_scope {
            let mut found = None;
            for ancestor in self.hierarchy.ancestors(Some(override_scope)) {
                if ancestor == scope {
                    break;
                }
                let Some(id) = self.lookup(name, ancestor) else {
                    continue;
                };
                if self.node(id).relation().starts_chain() {
                    found = None;
                } else if found.is_none() {
                    found = Some(id);
                }
            }
            if found.is_some() {
                return found;
            }
        }

        self.hierarchy
            .ancestors(scope)
            .find_map(|ancestor| self.lookup(name, ancestor))
    }

    /// Returns the fragment behind `id`, if `id` belongs to this registry.
    pub fn fragment(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.get(id.index())
    }

    /// Every fragment in registration order.
    pub fn fragments(&self) -> impl Iterator<Item = (FragmentId, &Fragment)> {
        self.fragments
            .iter()
            .enumerate()
            .map(|(index, fragment)| (FragmentId::new(index), fragment))
    }

    /// Walks a chain from `head` through its `next` links.
    pub fn chain(&self, head: FragmentId) -> impl Iterator<Item = FragmentId> + '_ {
        std::iter::successors(Some(head), |id| self.node(*id).next())
    }

    /// Overrides still waiting for their target.
    pub fn pending(&self) -> &[PendingReference] {
        &self.pending
    }

    /// Records that the fragment at `referencer` references `referencee`.
    ///
    /// Returns `false` if the reference was already recorded.
    pub fn add_reference(&mut self, referencer: Key, referencee: Key) -> bool {
        self.references.add(referencer, referencee)
    }

    /// Keys of the fragments referencing `key`, in first-recorded order.
    pub fn references_to(&self, key: &Key) -> impl Iterator<Item = &Key> {
        self.references.referencers(key)
    }

    /// Every scope known from declarations or fragments.
    ///
    /// The default scope is listed when a fragment uses it.
    pub fn scopes(&self) -> Vec<Option<Id>> {
        let mut scopes = IndexSet::new();
        for (scope, info) in self.hierarchy.iter() {
            scopes.insert(Some(scope));
            if let Some(parent) = info.parent() {
                scopes.insert(Some(parent));
            }
        }
        for key in self.heads.keys() {
            scopes.insert(key.scope());
        }
        scopes.into_iter().collect()
    }

    /// Chain heads visible from `scope`, one per distinct name.
    ///
    /// Inherited fragments are included. Names are listed in the order they
    /// were first registered.
    pub fn visible_fragments(&self, scope: Option<Id>) -> Vec<FragmentId> {
        let ancestors: Vec<Option<Id>> = self.hierarchy.ancestors(scope).collect();
        let mut names = IndexSet::new();
        for key in self.heads.keys() {
            if ancestors.contains(&key.scope()) {
                names.insert(key.name());
            }
        }
        names
            .into_iter()
            .filter_map(|name| self.lookup_recursive(name, scope, None))
            .collect()
    }

    /// Reports every override that never found its target.
    ///
    /// # Errors
    ///
    /// Returns one `E101` diagnostic per pending reference.
    pub fn check_integrity(&self) -> Result<(), DiagnosticError> {
        let mut collector = DiagnosticCollector::new();
        for pending in &self.pending {
            collector.emit(unresolved_override(pending));
        }
        collector.finish()
    }

    /// Checks integrity and returns the read-only registry.
    pub fn freeze(self) -> Result<FrozenRegistry, DiagnosticError> {
        self.check_integrity()?;
        info!(
            fragments = self.fragments.len(),
            chains = self.heads.len();
            "Registry frozen",
        );
        Ok(FrozenRegistry { registry: self })
    }

    pub(crate) fn node(&self, id: FragmentId) -> &Fragment {
        &self.fragments[id.index()]
    }

    fn node_mut(&mut self, id: FragmentId) -> &mut Fragment {
        &mut self.fragments[id.index()]
    }

    fn push(&mut self, fragment: Fragment) -> FragmentId {
        let id = FragmentId::new(self.fragments.len());
        self.fragments.push(fragment);
        id
    }

    /// Registers the inserted chain head and its modifier.
    fn register_insertion(
        &mut self,
        fragment: NewFragment,
        target: Id,
        insert_location: InsertLocation,
    ) -> Result<FragmentId, Diagnostic> {
        let scope = fragment.scope();
        let location = fragment.location();
        let inserted = self.push(Fragment::authored(fragment, Relation::Inserted));
        let modifier = self.push(Fragment::modifier(
            target,
            scope,
            inserted,
            insert_location,
            location,
        ));
        self.node_mut(inserted).set_prev(Some(modifier));

        self.place_new(inserted)?;
        self.attach(modifier);
        Ok(inserted)
    }

    /// Places a chain-starting fragment at its key.
    ///
    /// A pending provisional head at the same key is adopted: it moves
    /// behind the new head and its pending reference is dropped.
    fn place_new(&mut self, id: FragmentId) -> Result<(), Diagnostic> {
        let key = self.node(id).key();
        match self.heads.get(&key).copied() {
            None => {
                self.heads.insert(key, id);
                debug!(key:% = key, relation:% = self.node(id).relation(); "Chain started");
            }
            Some(head) => {
                let Some(position) = self.pending.iter().position(|p| p.key == key) else {
                    return Err(self.duplicate_block(id, head));
                };
                self.pending.remove(position);
                self.node_mut(id).set_next(Some(head));
                self.node_mut(head).set_prev(Some(id));
                self.heads.insert(key, id);
                self.renumber(id);
                debug!(key:% = key; "Chain started, adopting pending override");
            }
        }

        self.resolve_pending();
        Ok(())
    }

    /// Attaches an overriding fragment (append, replace or insertion
    /// modifier) to the chain it targets.
    fn attach(&mut self, id: FragmentId) {
        let key = self.node(id).key();
        let relation = self.node(id).relation();

        if let Some(head) = self.heads.get(&key).copied() {
            let tail = self.chain(head).last().unwrap_or(head);
            let child_index = self.node(tail).child_index() + 1;
            self.node_mut(tail).set_next(Some(id));
            let fragment = self.node_mut(id);
            fragment.set_prev(Some(tail));
            fragment.set_child_index(child_index);
            debug!(key:% = key, relation:% = relation, child_index = child_index; "Fragment attached to chain");
        } else if let Some(target) = self.lookup_inherited(&key) {
            self.node_mut(id).set_prev(Some(target));
            self.heads.insert(key, id);
            debug!(
                key:% = key,
                relation:% = relation,
                target:% = self.node(target).key();
                "Fragment attached to inherited chain",
            );
        } else {
            let location = self.node(id).location();
            self.heads.insert(key, id);
            self.pending.push(PendingReference {
                key,
                relation,
                fragment: id,
                location,
            });
            debug!(key:% = key, relation:% = relation; "Override target not found yet, pending");
        }
    }

    /// First chain head named like `key` in a strict ancestor of its scope.
    fn lookup_inherited(&self, key: &Key) -> Option<FragmentId> {
        self.hierarchy
            .strict_ancestors(key.scope())
            .find_map(|ancestor| self.lookup(key.name(), ancestor))
    }

    /// Retries every pending reference against the ancestors of its scope.
    fn resolve_pending(&mut self) {
        let mut index = 0;
        while index < self.pending.len() {
            let key = self.pending[index].key;
            match self.lookup_inherited(&key) {
                Some(target) => {
                    let pending = self.pending.remove(index);
                    self.node_mut(pending.fragment).set_prev(Some(target));
                    debug!(
                        key:% = key,
                        target:% = self.node(target).key();
                        "Pending override resolved",
                    );
                }
                None => index += 1,
            }
        }
    }

    fn renumber(&mut self, head: FragmentId) {
        let chain: Vec<FragmentId> = self.chain(head).collect();
        for (child_index, id) in chain.into_iter().enumerate() {
            self.node_mut(id).set_child_index(child_index);
        }
    }

    fn duplicate_block(&self, id: FragmentId, existing: FragmentId) -> Diagnostic {
        let fragment = self.node(id);
        Diagnostic::error(format!(
            "fragment `{}` is defined multiple times in {}",
            fragment.name(),
            display_scope(fragment.scope())
        ))
        .with_code(ErrorCode::E100)
        .with_label(fragment.location(), "duplicate definition")
        .with_secondary_label(self.node(existing).location(), "first defined here")
        .with_help("use an append or replace operation to extend the existing fragment")
    }
}

/// A registry whose integrity has been checked.
///
/// Frozen registries are read-only and can be tangled from several threads
/// at once.
#[derive(Debug, Clone)]
pub struct FrozenRegistry {
    registry: Registry,
}

impl FrozenRegistry {
    /// Returns the registry for further building.
    pub fn thaw(self) -> Registry {
        self.registry
    }
}

impl Deref for FrozenRegistry {
    type Target = Registry;

    fn deref(&self) -> &Self::Target {
        &self.registry
    }
}

fn validate_name(name: Id, location: SourceLocation) -> Result<(), Diagnostic> {
    if !name.contains(SEPARATOR) {
        return Ok(());
    }
    Err(
        Diagnostic::error(format!("name `{name}` contains the reserved separator `{SEPARATOR}`"))
            .with_code(ErrorCode::E001)
            .with_label(location, "invalid name")
            .with_help(format!("remove `{SEPARATOR}` from the name")),
    )
}

fn unresolved_override(pending: &PendingReference) -> Diagnostic {
    let key = pending.key;
    let action = match pending.relation {
        Relation::Replace => "replace",
        Relation::Insert => "insert into",
        Relation::Append | Relation::New | Relation::Inserted => "append to",
    };
    Diagnostic::error(format!(
        "cannot {action} fragment `{}`: it is not defined in {} or its ancestors",
        key.name(),
        display_scope(key.scope())
    ))
    .with_code(ErrorCode::E101)
    .with_label(pending.location, format!("{} declared here", pending.relation))
    .with_help("define the fragment first, or declare the parent scope that defines it")
}
