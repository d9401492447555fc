//! Chain expansion: replacement, inheritance and insertion splicing.

use indexmap::IndexMap;
use log::trace;

use litloom_core::{
    error::{Diagnostic, ErrorCode},
    fragment::{Placement, Relation},
};

use super::path::ExpansionPath;
use crate::registry::{FragmentId, Registry};

/// An expanded line and the fragment that authored it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    text: String,
    origin: FragmentId,
}

impl Line {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> FragmentId {
        self.origin
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Insertion modifiers of a chain waiting for their anchor line.
#[derive(Debug, Default)]
struct Insertions {
    pending: IndexMap<(Placement, String), Vec<FragmentId>>,
}

impl Insertions {
    fn collect(registry: &Registry, chain: &[FragmentId]) -> Self {
        let mut pending: IndexMap<(Placement, String), Vec<FragmentId>> = IndexMap::new();
        for &id in chain {
            let fragment = registry.node(id);
            if fragment.relation() != Relation::Insert {
                continue;
            }
            if let Some(location) = fragment.insert_location() {
                pending
                    .entry((location.placement(), location.pattern().to_string()))
                    .or_default()
                    .push(id);
            }
        }
        Self { pending }
    }

    /// Removes every insertion whose pattern occurs in `text`.
    ///
    /// Returns the modifiers landing before and after the line, each in
    /// registration order.
    fn take_matches(&mut self, text: &str) -> (Vec<FragmentId>, Vec<FragmentId>) {
        let mut before = Vec::new();
        let mut after = Vec::new();
        self.pending.retain(|(placement, pattern), modifiers| {
            if !text.contains(pattern.as_str()) {
                return true;
            }
            match placement {
                Placement::Before => before.append(modifiers),
                Placement::After => after.append(modifiers),
            }
            false
        });
        before.sort_unstable();
        after.sort_unstable();
        (before, after)
    }

    fn finish(self, registry: &Registry) -> Result<(), Diagnostic> {
        let Some(((_, pattern), modifiers)) = self.pending.into_iter().next() else {
            return Ok(());
        };
        let Some(&modifier) = modifiers.first() else {
            return Ok(());
        };

        let fragment = registry.node(modifier);
        let inserted = fragment
            .inserted()
            .map(|id| registry.node(id).name().to_string())
            .unwrap_or_default();
        Err(Diagnostic::error(format!(
            "cannot insert `{inserted}` into `{}`: pattern `{pattern}` matches no line",
            fragment.name()
        ))
        .with_code(ErrorCode::E201)
        .with_label(fragment.location(), "insertion declared here")
        .with_help("the pattern must occur in a line of the target's expanded content"))
    }
}

/// Expands fragment chains into lines, without resolving references.
pub(crate) struct ChainExpander<'r> {
    registry: &'r Registry,
    path: ExpansionPath,
}

impl<'r> ChainExpander<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            path: ExpansionPath::default(),
        }
    }

    /// Expands the chain starting at `head`.
    ///
    /// Expansion starts at the last replacement of the chain. If that
    /// fragment extends another one, the extended chain is expanded first.
    /// Insertions declared along the chain are spliced next to the first line
    /// containing their pattern.
    pub fn expand(&mut self, head: FragmentId) -> Result<Vec<Line>, Diagnostic> {
        self.path.enter(self.registry, head)?;

        let chain: Vec<FragmentId> = self.registry.chain(head).collect();
        let start = chain
            .iter()
            .rposition(|id| self.registry.node(*id).relation() == Relation::Replace)
            .unwrap_or(0);
        let chain = &chain[start..];
        let mut insertions = Insertions::collect(self.registry, chain);
        let mut output = Vec::new();

        let first = self.registry.node(chain[0]);
        if first.relation().extends_previous() {
            if let Some(prev) = first.prev() {
                for line in self.expand(prev)? {
                    self.emit(line, &mut insertions, &mut output)?;
                }
            }
        }

        for &id in chain {
            for text in self.registry.node(id).content() {
                let line = Line {
                    text: text.clone(),
                    origin: id,
                };
                self.emit(line, &mut insertions, &mut output)?;
            }
        }

        insertions.finish(self.registry)?;
        self.path.leave();

        trace!(head:% = self.registry.node(head).key(), lines = output.len(); "Chain expanded");
        Ok(output)
    }

    fn emit(
        &mut self,
        line: Line,
        insertions: &mut Insertions,
        output: &mut Vec<Line>,
    ) -> Result<(), Diagnostic> {
        let (before, after) = insertions.take_matches(&line.text);
        self.splice(&before, output)?;
        output.push(line);
        self.splice(&after, output)
    }

    fn splice(&mut self, modifiers: &[FragmentId], output: &mut Vec<Line>) -> Result<(), Diagnostic> {
        for &modifier in modifiers {
            if let Some(inserted) = self.registry.node(modifier).inserted() {
                output.extend(self.expand(inserted)?);
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptest_tests {
    use litloom_core::{
        fragment::{NewFragment, Operation},
        location::SourceLocation,
    };
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-z ]{0,12}", 0..4)
    }

    /// Content of a head fragment followed by the content of its appends.
    fn chain_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
        proptest::collection::vec(lines_strategy(), 1..6)
    }

    // ===================
    // Property Test Functions
    // ===================

    fn build(contents: &[Vec<String>]) -> (Registry, FragmentId) {
        let mut registry = Registry::new();
        let mut head = None;
        for (index, lines) in contents.iter().enumerate() {
            let operation = if index == 0 {
                Operation::New
            } else {
                Operation::Append
            };
            let fragment = NewFragment::new("Chain", SourceLocation::new("unit", index + 1))
                .with_content(lines.clone());
            let id = registry
                .register_fragment(fragment, operation)
                .unwrap_or_else(|err| unreachable!("{err}"));
            head.get_or_insert(id);
        }
        let head = head.unwrap_or_else(|| unreachable!());
        (registry, head)
    }

    /// Appended content follows the head in registration order.
    fn check_append_order(contents: &[Vec<String>]) -> Result<(), TestCaseError> {
        let (registry, head) = build(contents);

        let expanded = ChainExpander::new(&registry).expand(head);
        prop_assert!(expanded.is_ok());
        let expanded: Vec<String> = expanded
            .unwrap_or_default()
            .into_iter()
            .map(Line::into_text)
            .collect();
        let expected: Vec<String> = contents.iter().flatten().cloned().collect();
        prop_assert_eq!(expanded, expected);
        Ok(())
    }

    /// A replacement anywhere in the chain hides everything before it.
    fn check_replace_discards_prefix(
        contents: &[Vec<String>],
        replacement: &[String],
    ) -> Result<(), TestCaseError> {
        let (mut registry, head) = build(contents);
        let fragment = NewFragment::new("Chain", SourceLocation::new("unit", 99))
            .with_content(replacement.to_vec());
        prop_assert!(registry.register_fragment(fragment, Operation::Replace).is_ok());

        let expanded = ChainExpander::new(&registry).expand(head);
        prop_assert!(expanded.is_ok());
        let expanded: Vec<String> = expanded
            .unwrap_or_default()
            .into_iter()
            .map(Line::into_text)
            .collect();
        prop_assert_eq!(expanded, replacement.to_vec());
        Ok(())
    }

    /// Expanding twice gives identical lines.
    fn check_expansion_idempotent(contents: &[Vec<String>]) -> Result<(), TestCaseError> {
        let (registry, head) = build(contents);

        let first = ChainExpander::new(&registry).expand(head);
        let second = ChainExpander::new(&registry).expand(head);
        prop_assert_eq!(first.ok(), second.ok());
        Ok(())
    }

    proptest! {
        #[test]
        fn append_order(contents in chain_strategy()) {
            check_append_order(&contents)?;
        }

        #[test]
        fn replace_discards_prefix(
            contents in chain_strategy(),
            replacement in lines_strategy(),
        ) {
            check_replace_discards_prefix(&contents, &replacement)?;
        }

        #[test]
        fn expansion_idempotent(contents in chain_strategy()) {
            check_expansion_idempotent(&contents)?;
        }
    }
}
