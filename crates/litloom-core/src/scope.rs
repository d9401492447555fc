//! Scope declarations handed over by the authoring layer.

use std::path::PathBuf;

use crate::{fragment::normalize_scope, identifier::Id, location::SourceLocation};

/// Declares a scope, its optional parent and any fetch files attached to it.
///
/// Fetch files are carried as metadata for the output layer and never affect
/// resolution.
///
/// # Examples
///
/// ```
/// use litloom_core::{identifier::Id, location::SourceLocation, scope::ScopeDeclaration};
///
/// let declaration = ScopeDeclaration::new("B", SourceLocation::new("setup", 1))
///     .with_parent(Some(Id::new("A")))
///     .with_fetch_file("assets/data.zip");
///
/// assert_eq!(declaration.parent(), Some(Id::new("A")));
/// assert_eq!(declaration.fetch_files().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ScopeDeclaration {
    scope: Id,
    parent: Option<Id>,
    fetch_files: Vec<PathBuf>,
    location: SourceLocation,
}

impl ScopeDeclaration {
    pub fn new(scope: impl Into<Id>, location: SourceLocation) -> Self {
        Self {
            scope: scope.into(),
            parent: None,
            fetch_files: Vec::new(),
            location,
        }
    }

    /// Sets the parent scope; an empty name means no parent.
    pub fn with_parent(mut self, parent: Option<Id>) -> Self {
        self.parent = normalize_scope(parent);
        self
    }

    pub fn with_fetch_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.fetch_files.push(path.into());
        self
    }

    pub fn with_fetch_files(mut self, paths: Vec<PathBuf>) -> Self {
        self.fetch_files = paths;
        self
    }

    pub fn scope(&self) -> Id {
        self.scope
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn fetch_files(&self) -> &[PathBuf] {
        &self.fetch_files
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_parent_is_none() {
        let declaration = ScopeDeclaration::new("A", SourceLocation::unknown())
            .with_parent(Some(Id::new("")));

        assert_eq!(declaration.scope(), "A");
        assert_eq!(declaration.parent(), None);
        assert!(declaration.fetch_files().is_empty());
    }
}
