//! Content unit manifests.
//!
//! A manifest is a TOML file describing one content unit: its scope
//! declarations and its authored fragments, in authored order.
//!
//! ```toml
//! [[scope]]
//! name = "step-2"
//! parent = "tutorial"
//! fetch = ["assets/data.zip"]
//!
//! [[fragment]]
//! name = "Main content"
//! scope = "step-2"
//! op = "insert"
//! target = "Main content"
//! placement = "before"
//! pattern = "return"
//! content = """
//! printf("Goodbye\n");
//! """
//! ```
//!
//! Locations point at the line of the `[[scope]]` or `[[fragment]]` entry.

use std::{ops::Range, path::PathBuf};

use log::debug;
use serde::Deserialize;
use toml::Spanned;

use litloom::{
    fragment::{Key, NewFragment, Operation, Placement},
    identifier::Id,
    location::SourceLocation,
    registry::Registry,
    scope::ScopeDeclaration,
};
use litloom_core::error::{Diagnostic, ErrorCode};
use litloom_parser::ReferenceSyntax;

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    scope: Vec<Spanned<ScopeEntry>>,

    #[serde(default)]
    fragment: Vec<Spanned<FragmentEntry>>,
}

#[derive(Debug, Deserialize)]
struct ScopeEntry {
    name: String,
    parent: Option<String>,

    #[serde(default)]
    fetch: Vec<PathBuf>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OperationKind {
    #[default]
    New,
    Append,
    Replace,
    Insert,
}

#[derive(Debug, Deserialize)]
struct FragmentEntry {
    name: String,
    scope: Option<String>,
    lexer: Option<String>,

    #[serde(default)]
    hidden: bool,

    #[serde(default)]
    op: OperationKind,

    target: Option<String>,
    placement: Option<Placement>,
    pattern: Option<String>,

    #[serde(default)]
    content: String,
}

/// A parsed content unit.
#[derive(Debug)]
pub struct Manifest {
    unit: Id,
    scopes: Vec<ScopeDeclaration>,
    fragments: Vec<(NewFragment, Operation)>,
}

impl Manifest {
    /// Parses the manifest `source` of the unit named `unit`.
    ///
    /// # Errors
    ///
    /// Returns an `E301` diagnostic if the TOML is malformed or an insertion
    /// misses its target or pattern.
    pub fn parse(unit: &str, source: &str) -> Result<Self, Diagnostic> {
        let file: ManifestFile = toml::from_str(source).map_err(|err| {
            let line = err
                .span()
                .map_or(0, |span| line_of(source, span.start));
            Diagnostic::error(format!("invalid content unit: {}", err.message()))
                .with_code(ErrorCode::E301)
                .with_label(SourceLocation::new(unit, line), "malformed entry")
        })?;

        let unit = Id::new(unit);
        let scopes = file
            .scope
            .into_iter()
            .map(|entry| {
                let location = location(unit, source, entry.span());
                let entry = entry.into_inner();
                ScopeDeclaration::new(entry.name.as_str(), location)
                    .with_parent(entry.parent.as_deref().map(Id::new))
                    .with_fetch_files(entry.fetch)
            })
            .collect();
        let fragments = file
            .fragment
            .into_iter()
            .map(|entry| {
                let location = location(unit, source, entry.span());
                fragment(entry.into_inner(), location)
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            unit,
            scopes,
            fragments,
        })
    }

    /// Builds the unit's registry.
    ///
    /// Scopes are declared before fragments are registered. Every inline
    /// reference found in a fragment's content is recorded in the reference
    /// index.
    pub fn into_registry(self, syntax: &ReferenceSyntax) -> Result<Registry, Diagnostic> {
        let mut registry = Registry::new();
        for declaration in self.scopes {
            registry.declare_scope(declaration)?;
        }

        for (fragment, operation) in self.fragments {
            let key = fragment.key();
            let referenced = syntax.references(fragment.content());
            registry.register_fragment(fragment, operation)?;
            for name in referenced {
                registry.add_reference(key, Key::new(key.scope(), Id::new(&name)));
            }
        }

        debug!(unit:% = self.unit, fragments = registry.len(); "Content unit registered");
        Ok(registry)
    }
}

fn fragment(
    entry: FragmentEntry,
    location: SourceLocation,
) -> Result<(NewFragment, Operation), Diagnostic> {
    let operation = match entry.op {
        OperationKind::New => Operation::New,
        OperationKind::Append => Operation::Append,
        OperationKind::Replace => Operation::Replace,
        OperationKind::Insert => {
            let (Some(target), Some(pattern)) = (entry.target.as_deref(), entry.pattern) else {
                return Err(Diagnostic::error(format!(
                    "insertion `{}` needs a `target` and a `pattern`",
                    entry.name
                ))
                .with_code(ErrorCode::E301)
                .with_label(location, "incomplete insertion")
                .with_help("add `target = \"...\"` and `pattern = \"...\"` to the entry"));
            };
            Operation::insert(target, entry.placement.unwrap_or(Placement::After), pattern)
        }
    };

    let mut fragment = NewFragment::new(entry.name.as_str(), location)
        .with_scope(entry.scope.as_deref())
        .with_lines(entry.content.lines())
        .with_hidden(entry.hidden);
    if let Some(lexer) = entry.lexer {
        fragment = fragment.with_lexer(lexer);
    }
    Ok((fragment, operation))
}

fn location(unit: Id, source: &str, span: Range<usize>) -> SourceLocation {
    SourceLocation::new(unit, line_of(source, span.start))
}

/// 1-based line holding byte `offset`.
fn line_of(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    source.as_bytes()[..offset]
        .iter()
        .filter(|byte| **byte == b'\n')
        .count()
        + 1
}
