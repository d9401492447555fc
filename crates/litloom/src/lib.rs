//! Litloom - fragment registry and tangling engine for literate sources.
//!
//! Authored code fragments are collected into a [`registry::Registry`],
//! where fragments sharing a name form override chains across a hierarchy of
//! scopes. Per-unit registries are merged in authored order, frozen, and then
//! tangled into the final output lines by a [`Tangler`].

pub mod config;
pub mod registry;

mod error;
mod tangle;

pub use litloom_core::{fragment, identifier, location, scope};

pub use error::LitloomError;

use log::{debug, info};

use litloom_core::{
    error::{Diagnostic, ErrorCode},
    fragment::display_scope,
    identifier::Id,
};

use config::AppConfig;
use registry::{FragmentId, FrozenRegistry};
use tangle::{ChainExpander, ReferenceResolver};

/// Name prefix of the fragments written out as files.
pub const FILE_PREFIX: &str = "file:";

/// A tangled output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TangledFile {
    path: String,
    lines: Vec<String>,
}

impl TangledFile {
    /// Relative path of the file, taken from the fragment name.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Joins the lines, each terminated by a newline.
    pub fn contents(&self) -> String {
        self.lines.iter().map(|line| format!("{line}\n")).collect()
    }
}

/// Tangles fragments of a frozen registry.
///
/// # Examples
///
/// ```rust
/// use litloom::{Tangler, config::AppConfig, registry::Registry};
/// use litloom::{fragment::{NewFragment, Operation}, location::SourceLocation};
///
/// let mut registry = Registry::new();
/// registry
///     .register_fragment(
///         NewFragment::new("file:hello.sh", SourceLocation::new("intro", 1))
///             .with_lines(["#!/bin/sh", "{{Greeting}}"]),
///         Operation::New,
///     )
///     .expect("Failed to register");
/// registry
///     .register_fragment(
///         NewFragment::new("Greeting", SourceLocation::new("intro", 7))
///             .with_lines(["echo hello"]),
///         Operation::New,
///     )
///     .expect("Failed to register");
/// let registry = registry.freeze().expect("Unresolved overrides");
///
/// let tangler = Tangler::new(AppConfig::default());
/// let lines = tangler
///     .tangle(&registry, "file:hello.sh", None)
///     .expect("Failed to tangle");
/// assert_eq!(lines, ["#!/bin/sh", "echo hello"]);
/// ```
#[derive(Debug, Default)]
pub struct Tangler {
    config: AppConfig,
}

impl Tangler {
    /// Create a new tangler with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration, including reference delimiters
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Tangles the fragment `name` as seen from `scope`.
    ///
    /// Every reference marker is replaced by the tangled lines of the
    /// referenced fragment, each prefixed with the text before the marker.
    ///
    /// # Errors
    ///
    /// Returns `LitloomError` if the delimiters are invalid, or if a fragment
    /// is missing (`E200`), an insertion matches nothing (`E201`) or a
    /// fragment is expanded within itself (`E202`). No partial output is
    /// returned.
    pub fn tangle(
        &self,
        registry: &FrozenRegistry,
        name: impl Into<Id>,
        scope: Option<Id>,
    ) -> Result<Vec<String>, LitloomError> {
        let name = name.into();
        info!(name:% = name, scope:% = display_scope(scope); "Tangling fragment");

        let syntax = self.config.reference_syntax()?;
        let root = find_root(registry, name, scope)?;
        let lines = ReferenceResolver::new(registry, &syntax, scope).resolve(root)?;

        debug!(name:% = name, lines = lines.len(); "Fragment tangled");
        Ok(lines)
    }

    /// Expands the chain of `name` as seen from `scope`, leaving reference
    /// markers untouched.
    pub fn content(
        &self,
        registry: &FrozenRegistry,
        name: impl Into<Id>,
        scope: Option<Id>,
    ) -> Result<Vec<String>, LitloomError> {
        let root = find_root(registry, name.into(), scope)?;
        let lines = ChainExpander::new(registry).expand(root)?;
        Ok(lines.into_iter().map(|line| line.into_text()).collect())
    }

    /// Tangles every `file:` fragment visible from `scope`.
    pub fn tangle_files(
        &self,
        registry: &FrozenRegistry,
        scope: Option<Id>,
    ) -> Result<Vec<TangledFile>, LitloomError> {
        let files: Vec<FragmentId> = registry
            .visible_fragments(scope)
            .into_iter()
            .filter(|id| registry.node(*id).name().starts_with(FILE_PREFIX))
            .collect();
        info!(scope:% = display_scope(scope), files = files.len(); "Tangling files");

        files
            .into_iter()
            .map(|id| {
                let name = registry.node(id).name();
                let path = name.with_str(|name| {
                    name.strip_prefix(FILE_PREFIX)
                        .unwrap_or(name)
                        .trim()
                        .to_string()
                });
                let lines = self.tangle(registry, name, scope)?;
                Ok(TangledFile { path, lines })
            })
            .collect()
    }
}

fn find_root(registry: &FrozenRegistry, name: Id, scope: Option<Id>) -> Result<FragmentId, Diagnostic> {
    registry.lookup_recursive(name, scope, None).ok_or_else(|| {
        Diagnostic::error(format!(
            "fragment `{name}` is not defined in {} or its ancestors",
            display_scope(scope)
        ))
        .with_code(ErrorCode::E200)
        .with_help("check the fragment name and the scope to tangle from")
    })
}
