//! Collector for accumulating diagnostics during a pass over the registry.

use log::warn;

use crate::error::{Diagnostic, DiagnosticError};

/// Accumulates diagnostics so that a pass can report every problem it finds
/// instead of failing on the first one.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if nothing has been emitted yet.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Finish collection.
    ///
    /// Returns every diagnostic if at least one is an error. Otherwise the
    /// warnings are logged and dropped.
    pub fn finish(self) -> Result<(), DiagnosticError> {
        if self.has_errors {
            return Err(DiagnosticError::new(self.diagnostics));
        }
        for diagnostic in &self.diagnostics {
            warn!(diagnostic:% = diagnostic; "Discarding warning");
        }
        Ok(())
    }
}
