//! Tangling: expands a fragment into output lines.
//!
//! Tangling runs in two nested layers. [`ChainExpander`] turns a chain into
//! lines (replacements, inherited content and insertions). The
//! [`ReferenceResolver`] then replaces every line holding a reference marker
//! with the tangled lines of the referenced fragment, prefixed with the text
//! before the marker.

mod chain;
mod path;

use log::warn;

use litloom_core::{
    error::{Diagnostic, ErrorCode},
    fragment::display_scope,
    identifier::Id,
};
use litloom_parser::ReferenceSyntax;

use crate::registry::{FragmentId, Registry};

pub(crate) use chain::ChainExpander;
use chain::Line;
use path::ExpansionPath;

/// Resolves reference markers recursively for one tangle request.
pub(crate) struct ReferenceResolver<'r> {
    registry: &'r Registry,
    syntax: &'r ReferenceSyntax,
    scope: Option<Id>,
    chains: ChainExpander<'r>,
    path: ExpansionPath,
}

impl<'r> ReferenceResolver<'r> {
    /// Creates a resolver tangling on behalf of `scope`.
    ///
    /// Overrides declared between a referencing fragment's scope and `scope`
    /// take part in name resolution.
    pub fn new(registry: &'r Registry, syntax: &'r ReferenceSyntax, scope: Option<Id>) -> Self {
        Self {
            registry,
            syntax,
            scope,
            chains: ChainExpander::new(registry),
            path: ExpansionPath::default(),
        }
    }

    pub fn resolve(&mut self, head: FragmentId) -> Result<Vec<String>, Diagnostic> {
        let mut output = Vec::new();
        self.resolve_into(head, "", &mut output)?;
        Ok(output)
    }

    fn resolve_into(
        &mut self,
        head: FragmentId,
        prefix: &str,
        output: &mut Vec<String>,
    ) -> Result<(), Diagnostic> {
        self.path.enter(self.registry, head)?;

        for line in self.chains.expand(head)? {
            let Some(reference) = self.syntax.split(line.text()) else {
                output.push(format!("{prefix}{}", line.text()));
                continue;
            };

            if !reference.suffix().trim().is_empty() {
                warn!(
                    fragment:% = self.registry.node(line.origin()).key(),
                    suffix = reference.suffix();
                    "Text after a reference is not tangled",
                );
            }

            let target = self.resolve_name(reference.name(), &line)?;
            let nested = format!("{prefix}{}", reference.prefix());
            self.resolve_into(target, &nested, output)?;
        }

        self.path.leave();
        Ok(())
    }

    /// Resolves a referenced name from the scope of the referencing line.
    fn resolve_name(&self, name: &str, line: &Line) -> Result<FragmentId, Diagnostic> {
        let origin = self.registry.node(line.origin());
        let override_scope = if origin.scope() == self.scope {
            None
        } else {
            self.scope
        };

        let name = Id::new(name);
        self.registry
            .lookup_recursive(name, origin.scope(), override_scope)
            .ok_or_else(|| {
                Diagnostic::error(format!(
                    "fragment `{name}` is not defined in {} or its ancestors",
                    display_scope(origin.scope())
                ))
                .with_code(ErrorCode::E200)
                .with_label(origin.location(), format!("`{}` references it", origin.name()))
            })
    }
}
