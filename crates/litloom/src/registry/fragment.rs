//! Registered fragments, the nodes of the registry arena.

use std::fmt;

use litloom_core::{
    fragment::{InsertLocation, Key, NewFragment, Relation},
    identifier::Id,
    location::SourceLocation,
};

/// Stable handle of a fragment inside one [`Registry`](super::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(usize);

impl FragmentId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the fragment in registration order.
    pub fn index(&self) -> usize {
        self.0
    }

    /// Shifts the handle by `offset`, used when an arena is appended to
    /// another one.
    pub(crate) fn offset(&self, offset: usize) -> Self {
        Self(self.0 + offset)
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fragment as stored by the registry.
///
/// Everything but the chain links is fixed at registration. `prev`, `next`
/// and `child_index` are set by the registry when the fragment is attached to
/// a chain.
#[derive(Debug, Clone)]
pub struct Fragment {
    name: Id,
    scope: Option<Id>,
    lexer: Option<String>,
    content: Vec<String>,
    location: SourceLocation,
    hidden: bool,
    relation: Relation,
    prev: Option<FragmentId>,
    next: Option<FragmentId>,
    inserted: Option<FragmentId>,
    insert_location: Option<InsertLocation>,
    child_index: usize,
}

impl Fragment {
    /// Builds an unlinked fragment from an authored one.
    pub(crate) fn authored(fragment: NewFragment, relation: Relation) -> Self {
        let parts = fragment.into_parts();
        Self {
            name: parts.name,
            scope: parts.scope,
            lexer: parts.lexer,
            content: parts.content,
            location: parts.location,
            hidden: parts.hidden,
            relation,
            prev: None,
            next: None,
            inserted: None,
            insert_location: None,
            child_index: 0,
        }
    }

    /// Builds the content-less modifier splicing `inserted` into `target`.
    pub(crate) fn modifier(
        target: Id,
        scope: Option<Id>,
        inserted: FragmentId,
        insert_location: InsertLocation,
        location: SourceLocation,
    ) -> Self {
        Self {
            name: target,
            scope,
            lexer: None,
            content: Vec::new(),
            location,
            hidden: false,
            relation: Relation::Insert,
            prev: None,
            next: None,
            inserted: Some(inserted),
            insert_location: Some(insert_location),
            child_index: 0,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn scope(&self) -> Option<Id> {
        self.scope
    }

    pub fn key(&self) -> Key {
        Key::new(self.scope, self.name)
    }

    pub fn lexer(&self) -> Option<&str> {
        self.lexer.as_deref()
    }

    pub fn content(&self) -> &[String] {
        &self.content
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    /// Presentation hint, never used for resolution.
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    /// The fragment this one extends, possibly in an ancestor scope.
    pub fn prev(&self) -> Option<FragmentId> {
        self.prev
    }

    /// The fragment extending this one within the same chain.
    pub fn next(&self) -> Option<FragmentId> {
        self.next
    }

    /// Head of the chain spliced in by an insertion modifier.
    pub fn inserted(&self) -> Option<FragmentId> {
        self.inserted
    }

    pub fn insert_location(&self) -> Option<&InsertLocation> {
        self.insert_location.as_ref()
    }

    /// Position within the chain, starting at 0 for the head.
    pub fn child_index(&self) -> usize {
        self.child_index
    }

    pub(crate) fn set_prev(&mut self, prev: Option<FragmentId>) {
        self.prev = prev;
    }

    pub(crate) fn set_next(&mut self, next: Option<FragmentId>) {
        self.next = next;
    }

    pub(crate) fn set_child_index(&mut self, child_index: usize) {
        self.child_index = child_index;
    }

    /// Returns a copy with every chain link cleared and the insertion handle
    /// shifted by `offset`.
    pub(crate) fn detached(&self, offset: usize) -> Self {
        Self {
            prev: None,
            next: None,
            child_index: 0,
            inserted: self.inserted.map(|inserted| inserted.offset(offset)),
            ..self.clone()
        }
    }
}
