//! Value types describing fragments as the authoring layer hands them over.
//!
//! - [`Key`] - the `(scope, name)` pair a fragment chain is stored under.
//! - [`Relation`] - how a fragment relates to the one it extends.
//! - [`Operation`] - the override operation requested for a new fragment.
//! - [`NewFragment`] - one authored fragment, before registration.

use std::fmt;

use serde::Deserialize;

use crate::{identifier::Id, location::SourceLocation};

/// Reserved separator between scope and name in the textual key form.
pub const SEPARATOR: &str = "##";

/// Identity of a fragment chain: its scope and its name.
///
/// A `None` scope is the default (unscoped) scope.
///
/// # Examples
///
/// ```
/// use litloom_core::{fragment::Key, identifier::Id};
///
/// let key = Key::new(Some(Id::new("A")), Id::new("Main"));
/// assert_eq!(key.to_string(), "A##Main");
/// assert_eq!(Key::new(None, Id::new("Main")).to_string(), "##Main");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    scope: Option<Id>,
    name: Id,
}

impl Key {
    /// Creates a key, normalizing an empty scope name to the default scope.
    pub fn new(scope: Option<Id>, name: Id) -> Self {
        Self {
            scope: normalize_scope(scope),
            name,
        }
    }

    pub fn scope(&self) -> Option<Id> {
        self.scope
    }

    pub fn name(&self) -> Id {
        self.name
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = self.scope {
            write!(f, "{scope}")?;
        }
        write!(f, "{SEPARATOR}{}", self.name)
    }
}

/// Maps an empty scope name to the default scope.
pub fn normalize_scope(scope: Option<Id>) -> Option<Id> {
    scope.filter(|scope| !scope.is_empty())
}

/// Formats an optional scope for messages.
pub fn display_scope(scope: Option<Id>) -> String {
    match scope {
        Some(scope) => format!("`{scope}`"),
        None => "the default scope".to_string(),
    }
}

/// How a fragment relates to the previous fragment of its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Starts a new chain.
    New,
    /// Extends the chain with more lines.
    Append,
    /// Discards everything before it when expanded.
    Replace,
    /// Synthetic modifier splicing another chain into this one.
    Insert,
    /// The content chain of an insertion; starts its own chain.
    Inserted,
}

impl Relation {
    /// Returns `true` for relations that start a chain of their own rather
    /// than extending an existing one.
    pub fn starts_chain(&self) -> bool {
        matches!(self, Relation::New | Relation::Inserted)
    }

    /// Returns `true` for relations that keep the content of the fragment
    /// they extend.
    pub fn extends_previous(&self) -> bool {
        matches!(self, Relation::Append | Relation::Insert)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Relation::New => "NEW",
            Relation::Append => "APPEND",
            Relation::Replace => "REPLACE",
            Relation::Insert => "INSERT",
            Relation::Inserted => "INSERTED",
        };
        f.write_str(tag)
    }
}

/// Side of the anchor line an insertion lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Before,
    After,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Before => f.write_str("BEFORE"),
            Placement::After => f.write_str("AFTER"),
        }
    }
}

/// Anchor of an insertion: the first line containing `pattern`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InsertLocation {
    placement: Placement,
    pattern: String,
}

impl InsertLocation {
    pub fn new(placement: Placement, pattern: impl Into<String>) -> Self {
        Self {
            placement,
            pattern: pattern.into(),
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Override operation requested when a fragment is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    New,
    Append,
    Replace,
    /// Splice the fragment into `target`'s expansion next to the first line
    /// matching `pattern`.
    Insert {
        target: Id,
        placement: Placement,
        pattern: String,
    },
}

impl Operation {
    /// Builds an [`Operation::Insert`].
    pub fn insert(target: impl Into<Id>, placement: Placement, pattern: impl Into<String>) -> Self {
        Operation::Insert {
            target: target.into(),
            placement,
            pattern: pattern.into(),
        }
    }

    /// The relation tag carried by the fragment the operation targets.
    ///
    /// For [`Operation::Insert`] this is the tag of the synthetic modifier;
    /// the authored fragment itself is tagged [`Relation::Inserted`].
    pub fn relation(&self) -> Relation {
        match self {
            Operation::New => Relation::New,
            Operation::Append => Relation::Append,
            Operation::Replace => Relation::Replace,
            Operation::Insert { .. } => Relation::Insert,
        }
    }
}

/// An authored fragment, as handed over by the authoring layer.
///
/// # Examples
///
/// ```
/// use litloom_core::{fragment::NewFragment, location::SourceLocation};
///
/// let fragment = NewFragment::new("Main content", SourceLocation::new("intro", 12))
///     .with_scope(Some("A"))
///     .with_lexer("C++")
///     .with_lines(["std::cout << \"Hello\" << std::endl;"]);
///
/// assert_eq!(fragment.key().to_string(), "A##Main content");
/// assert_eq!(fragment.content().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct NewFragment {
    name: Id,
    scope: Option<Id>,
    lexer: Option<String>,
    content: Vec<String>,
    location: SourceLocation,
    hidden: bool,
}

impl NewFragment {
    /// Creates an empty fragment in the default scope.
    pub fn new(name: impl Into<Id>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            scope: None,
            lexer: None,
            content: Vec::new(),
            location,
            hidden: false,
        }
    }

    /// Sets the scope; `None` or an empty name selects the default scope.
    pub fn with_scope<S: Into<Id>>(mut self, scope: Option<S>) -> Self {
        self.scope = normalize_scope(scope.map(Into::into));
        self
    }

    /// Sets the scope from an already interned identifier.
    pub fn in_scope(mut self, scope: Option<Id>) -> Self {
        self.scope = normalize_scope(scope);
        self
    }

    pub fn with_lexer(mut self, lexer: impl Into<String>) -> Self {
        self.lexer = Some(lexer.into());
        self
    }

    pub fn with_content(mut self, content: Vec<String>) -> Self {
        self.content = content;
        self
    }

    pub fn with_lines<I, L>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.content = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
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

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Splits the fragment into its parts, consuming it.
    pub fn into_parts(self) -> NewFragmentParts {
        NewFragmentParts {
            name: self.name,
            scope: self.scope,
            lexer: self.lexer,
            content: self.content,
            location: self.location,
            hidden: self.hidden,
        }
    }
}

/// Owned fields of a [`NewFragment`].
#[derive(Debug, Clone)]
pub struct NewFragmentParts {
    pub name: Id,
    pub scope: Option<Id>,
    pub lexer: Option<String>,
    pub content: Vec<String>,
    pub location: SourceLocation,
    pub hidden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        let scoped = Key::new(Some(Id::new("B")), Id::new("Block A1"));
        let unscoped = Key::new(None, Id::new("Block A1"));

        assert_eq!(scoped.to_string(), "B##Block A1");
        assert_eq!(unscoped.to_string(), "##Block A1");
    }

    #[test]
    fn test_empty_scope_is_default_scope() {
        let key = Key::new(Some(Id::new("")), Id::new("X"));
        assert_eq!(key, Key::new(None, Id::new("X")));

        let fragment = NewFragment::new("X", SourceLocation::unknown()).with_scope(Some(""));
        assert_eq!(fragment.scope(), None);
    }

    #[test]
    fn test_relation_classification() {
        assert!(Relation::New.starts_chain());
        assert!(Relation::Inserted.starts_chain());
        assert!(!Relation::Append.starts_chain());

        assert!(Relation::Append.extends_previous());
        assert!(Relation::Insert.extends_previous());
        assert!(!Relation::Replace.extends_previous());
        assert!(!Relation::New.extends_previous());
    }

    #[test]
    fn test_operation_relation() {
        assert_eq!(Operation::New.relation(), Relation::New);
        assert_eq!(Operation::Replace.relation(), Relation::Replace);
        assert_eq!(
            Operation::insert("Target", Placement::After, "Hello").relation(),
            Relation::Insert
        );
    }

    #[test]
    fn test_new_fragment_builder() {
        let fragment = NewFragment::new("Main", SourceLocation::new("doc", 3))
            .with_scope(Some("A"))
            .with_lexer("rust")
            .with_lines(["fn main() {", "}"])
            .with_hidden(true);

        assert_eq!(fragment.name(), "Main");
        assert_eq!(fragment.scope(), Some(Id::new("A")));
        assert_eq!(fragment.lexer(), Some("rust"));
        assert_eq!(fragment.content(), ["fn main() {", "}"]);
        assert!(fragment.hidden());
        assert_eq!(fragment.location().line(), 3);
    }
}
