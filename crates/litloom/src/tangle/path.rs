use indexmap::IndexSet;

use litloom_core::error::{Diagnostic, ErrorCode};

use crate::registry::{FragmentId, Registry};

/// Chain heads currently being expanded, outermost first.
#[derive(Debug, Default)]
pub(crate) struct ExpansionPath {
    stack: IndexSet<FragmentId>,
}

impl ExpansionPath {
    /// Pushes `head` on the path.
    ///
    /// # Errors
    ///
    /// Returns an `E202` diagnostic if `head` is already being expanded.
    pub fn enter(&mut self, registry: &Registry, head: FragmentId) -> Result<(), Diagnostic> {
        if self.stack.insert(head) {
            return Ok(());
        }
        Err(self.cycle(registry, head))
    }

    pub fn leave(&mut self) {
        self.stack.pop();
    }

    fn cycle(&self, registry: &Registry, head: FragmentId) -> Diagnostic {
        let fragment = registry.node(head);
        let keys: Vec<String> = self
            .stack
            .iter()
            .skip_while(|id| **id != head)
            .chain(std::iter::once(&head))
            .map(|id| registry.node(*id).key().to_string())
            .collect();

        Diagnostic::error(format!(
            "fragment `{}` is expanded within its own expansion",
            fragment.name()
        ))
        .with_code(ErrorCode::E202)
        .with_label(fragment.location(), "defined here")
        .with_help(format!("expansion path: {}", keys.join(" -> ")))
    }
}
