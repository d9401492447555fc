//! Scope hierarchy: the parent forest of named scopes.
//!
//! The default scope never takes part in the hierarchy. It has no parent and
//! is the ancestor of no named scope.

use std::path::PathBuf;

use indexmap::IndexMap;
use log::debug;

use litloom_core::{
    error::{Diagnostic, ErrorCode},
    identifier::Id,
    location::SourceLocation,
    scope::ScopeDeclaration,
};

/// What is known about a declared scope.
#[derive(Debug, Clone)]
pub struct ScopeInfo {
    parent: Option<Id>,
    fetch_files: Vec<PathBuf>,
    location: SourceLocation,
}

impl ScopeInfo {
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Extra files the output layer copies next to the scope's tangled files.
    pub fn fetch_files(&self) -> &[PathBuf] {
        &self.fetch_files
    }

    /// Where the scope (or its parent) was first declared.
    pub fn location(&self) -> SourceLocation {
        self.location
    }

    fn add_fetch_files(&mut self, paths: &[PathBuf]) {
        for path in paths {
            if !self.fetch_files.contains(path) {
                self.fetch_files.push(path.clone());
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ScopeHierarchy {
    scopes: IndexMap<Id, ScopeInfo>,
}

impl ScopeHierarchy {
    pub fn info(&self, scope: Id) -> Option<&ScopeInfo> {
        self.scopes.get(&scope)
    }

    pub fn parent(&self, scope: Id) -> Option<Id> {
        self.scopes.get(&scope).and_then(ScopeInfo::parent)
    }

    /// Declared scopes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &ScopeInfo)> {
        self.scopes.iter().map(|(scope, info)| (*scope, info))
    }

    /// Records a scope declaration.
    ///
    /// A scope keeps the first parent it is declared with. Declaring the same
    /// parent again only adds fetch files.
    pub fn declare(&mut self, declaration: &ScopeDeclaration) -> Result<(), Diagnostic> {
        self.declare_parts(
            declaration.scope(),
            declaration.parent(),
            declaration.fetch_files(),
            declaration.location(),
        )
    }

    pub fn declare_parts(
        &mut self,
        scope: Id,
        parent: Option<Id>,
        fetch_files: &[PathBuf],
        location: SourceLocation,
    ) -> Result<(), Diagnostic> {
        match (self.parent(scope), parent) {
            (Some(existing), Some(parent)) if existing != parent => {
                return Err(self.conflicting_parent(scope, existing, parent, location));
            }
            (None, Some(parent)) => self.check_acyclic(scope, parent, location)?,
            _ => {}
        }

        match self.scopes.get_mut(&scope) {
            Some(info) => {
                if info.parent.is_none() && parent.is_some() {
                    info.parent = parent;
                    info.location = location;
                }
                info.add_fetch_files(fetch_files);
            }
            None => {
                self.scopes.insert(
                    scope,
                    ScopeInfo {
                        parent,
                        fetch_files: fetch_files.to_vec(),
                        location,
                    },
                );
            }
        }

        debug!(scope:% = scope, parent:? = parent.map(|p| p.to_owned_string()); "Scope declared");
        Ok(())
    }

    /// Walks from `scope` (inclusive) up to its root.
    pub fn ancestors(&self, scope: Option<Id>) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            current: Some(scope),
        }
    }

    /// Walks the strict ancestors of `scope`.
    pub fn strict_ancestors(&self, scope: Option<Id>) -> Ancestors<'_> {
        let mut ancestors = self.ancestors(scope);
        ancestors.next();
        ancestors
    }

    fn check_acyclic(
        &self,
        scope: Id,
        parent: Id,
        location: SourceLocation,
    ) -> Result<(), Diagnostic> {
        let closes_cycle = self
            .ancestors(Some(parent))
            .any(|ancestor| ancestor == Some(scope));
        if !closes_cycle {
            return Ok(());
        }

        let mut cycle: Vec<String> = self
            .ancestors(Some(parent))
            .take_while(|ancestor| *ancestor != Some(scope))
            .flatten()
            .map(|ancestor| ancestor.to_string())
            .collect();
        cycle.insert(0, scope.to_string());
        cycle.push(scope.to_string());

        Err(Diagnostic::error(format!(
            "scope `{scope}` cannot have `{parent}` as parent"
        ))
        .with_code(ErrorCode::E103)
        .with_label(location, "this declaration closes a cycle")
        .with_help(format!("scope hierarchy would loop: {}", cycle.join(" -> "))))
    }

    fn conflicting_parent(
        &self,
        scope: Id,
        existing: Id,
        parent: Id,
        location: SourceLocation,
    ) -> Diagnostic {
        let mut diagnostic = Diagnostic::error(format!(
            "scope `{scope}` is declared with parent `{parent}` but already has parent `{existing}`"
        ))
        .with_code(ErrorCode::E102)
        .with_label(location, format!("declared with parent `{parent}` here"));
        if let Some(info) = self.scopes.get(&scope) {
            diagnostic = diagnostic.with_secondary_label(
                info.location,
                format!("first declared with parent `{existing}` here"),
            );
        }
        diagnostic.with_help("a scope can only have one parent")
    }
}

/// Iterator over a scope and its ancestors.
pub(crate) struct Ancestors<'a> {
    hierarchy: &'a ScopeHierarchy,
    current: Option<Option<Id>>,
}

impl Iterator for Ancestors<'_> {
    type Item = Option<Id>;

    fn next(&mut self) -> Option<Self::Item> {
        let scope = self.current.take()?;
        self.current = scope
            .and_then(|scope| self.hierarchy.parent(scope))
            .map(Some);
        Some(scope)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn has_fetch_file(info: &ScopeInfo, path: &Path) -> bool {
        info.fetch_files().iter().any(|candidate| candidate == path)
    }

    fn declare(hierarchy: &mut ScopeHierarchy, scope: &str, parent: &str) -> Result<(), Diagnostic> {
        hierarchy.declare(
            &ScopeDeclaration::new(scope, SourceLocation::new("setup", 1))
                .with_parent(Some(Id::new(parent))),
        )
    }

    fn ancestor_names(hierarchy: &ScopeHierarchy, scope: Option<&str>) -> Vec<Option<String>> {
        hierarchy
            .ancestors(scope.map(Id::new))
            .map(|scope| scope.map(|scope| scope.to_owned_string()))
            .collect()
    }

    #[test]
    fn test_multiple_children_single_parent() {
        let mut hierarchy = ScopeHierarchy::default();
        declare(&mut hierarchy, "B", "A").unwrap();
        declare(&mut hierarchy, "C", "A").unwrap();

        let err = declare(&mut hierarchy, "B", "D").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E102));
        assert_eq!(err.labels().len(), 2);
        assert_eq!(hierarchy.parent(Id::new("B")), Some(Id::new("A")));
    }

    #[test]
    fn test_same_parent_redeclaration_unions_fetch_files() {
        let mut hierarchy = ScopeHierarchy::default();
        hierarchy
            .declare(
                &ScopeDeclaration::new("B", SourceLocation::new("setup", 1))
                    .with_parent(Some(Id::new("A")))
                    .with_fetch_file("a.zip"),
            )
            .unwrap();
        hierarchy
            .declare(
                &ScopeDeclaration::new("B", SourceLocation::new("setup", 9))
                    .with_parent(Some(Id::new("A")))
                    .with_fetch_file("a.zip")
                    .with_fetch_file("b.txt"),
            )
            .unwrap();

        let info = hierarchy.info(Id::new("B")).unwrap();
        assert_eq!(info.fetch_files().len(), 2);
        assert!(has_fetch_file(info, Path::new("b.txt")));
        assert_eq!(info.location().line(), 1);
    }

    #[test]
    fn test_late_parent_declaration() {
        let mut hierarchy = ScopeHierarchy::default();
        hierarchy
            .declare(&ScopeDeclaration::new("B", SourceLocation::unknown()))
            .unwrap();
        assert_eq!(hierarchy.parent(Id::new("B")), None);

        declare(&mut hierarchy, "B", "A").unwrap();
        assert_eq!(hierarchy.parent(Id::new("B")), Some(Id::new("A")));
    }

    #[test]
    fn test_ancestors() {
        let mut hierarchy = ScopeHierarchy::default();
        declare(&mut hierarchy, "C", "B").unwrap();
        declare(&mut hierarchy, "B", "A").unwrap();

        assert_eq!(
            ancestor_names(&hierarchy, Some("C")),
            [Some("C".to_string()), Some("B".to_string()), Some("A".to_string())]
        );
        assert_eq!(ancestor_names(&hierarchy, None), [None]);
        assert_eq!(
            hierarchy.strict_ancestors(Some(Id::new("C"))).count(),
            2
        );
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut hierarchy = ScopeHierarchy::default();
        declare(&mut hierarchy, "B", "A").unwrap();
        declare(&mut hierarchy, "C", "B").unwrap();

        let err = declare(&mut hierarchy, "A", "C").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E103));
        assert_eq!(err.help(), Some("scope hierarchy would loop: A -> C -> B -> A"));

        let err = declare(&mut hierarchy, "D", "D").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E103));
        assert_eq!(hierarchy.parent(Id::new("A")), None);
    }
}
