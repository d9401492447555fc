//! Error adapter for converting LitloomError to miette diagnostics.
//!
//! This module provides the bridge between the library's diagnostics, which
//! point at `(unit, line)` locations, and miette's rich diagnostic formatting
//! used in the CLI. Units are manifest paths, so their source is read back to
//! render snippets.
//!
//! # Multi-Error Support
//!
//! When a [`LitloomError`] carries multiple diagnostics, each diagnostic is
//! rendered independently.

use std::{fmt, fs};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use litloom::{LitloomError, location::SourceLocation};
use litloom_core::error::Diagnostic;

/// Adapter for a single litloom diagnostic.
///
/// Labels located in the unit of the primary label are rendered against that
/// unit's source. Labels in other units are listed in the help text.
pub struct DiagnosticAdapter<'a> {
    /// The wrapped diagnostic
    diag: &'a Diagnostic,
    /// Source of the primary label's unit, if it could be read
    src: Option<String>,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter over an already loaded source.
    pub fn new(diag: &'a Diagnostic, src: Option<String>) -> Self {
        Self { diag, src }
    }

    /// Create a new diagnostic adapter, reading the primary unit from disk.
    pub fn load(diag: &'a Diagnostic) -> Self {
        let src = diag
            .primary_location()
            .and_then(|location| fs::read_to_string(location.unit().to_string()).ok());
        Self::new(diag, src)
    }

    fn is_local(&self, location: SourceLocation) -> bool {
        self.src.is_some()
            && location.line() > 0
            && self
                .diag
                .primary_location()
                .is_some_and(|primary| primary.unit() == location.unit())
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let mut lines: Vec<String> = self.diag.help().map(str::to_string).into_iter().collect();
        for label in self.diag.labels() {
            if !self.is_local(label.location()) {
                lines.push(format!("{}: {}", label.location(), label.message()));
            }
        }

        if lines.is_empty() {
            return None;
        }
        Some(Box::new(lines.join("\n")))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src.as_ref().map(|src| src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let src = self.src.as_deref()?;
        let labels: Vec<LabeledSpan> = self
            .diag
            .labels()
            .iter()
            .filter(|label| self.is_local(label.location()))
            .filter_map(|label| {
                let span = line_span(src, label.location().line())?;
                let message = Some(label.message().to_string());
                Some(if label.is_primary() {
                    LabeledSpan::new_primary_with_span(message, span)
                } else {
                    LabeledSpan::new_with_span(message, span)
                })
            })
            .collect();

        if labels.is_empty() {
            return None;
        }
        Some(Box::new(labels.into_iter()))
    }
}

/// Adapter for non-diagnostic [`LitloomError`] variants.
///
/// This adapter handles errors that don't have rich diagnostic information,
/// such as I/O errors and configuration errors.
pub struct ErrorAdapter<'a>(pub &'a LitloomError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            LitloomError::Io(_) => "litloom::io",
            LitloomError::Config(_) => "litloom::config",
            LitloomError::Diagnostics(_) => return None,
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
///
/// This enum wraps either a single diagnostic or a non-diagnostic error,
/// providing a uniform interface for error rendering.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Byte span of the 1-based `line` of `src`, without its line break.
fn line_span(src: &str, line: usize) -> Option<SourceSpan> {
    let index = line.checked_sub(1)?;
    let mut start = 0;
    for (current, text) in src.split_inclusive('\n').enumerate() {
        if current == index {
            let len = text.trim_end_matches(['\n', '\r']).len();
            return Some(SourceSpan::new(start.into(), len));
        }
        start += text.len();
    }
    None
}

/// Convert a [`LitloomError`] into a list of reportable errors.
///
/// For [`LitloomError::Diagnostics`], this returns one [`Reportable`] for
/// each diagnostic in the error. For other error variants, this returns a
/// single [`Reportable`].
pub fn to_reportables(err: &LitloomError) -> Vec<Reportable<'_>> {
    match err {
        LitloomError::Diagnostics(diagnostics) => diagnostics
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::load(d)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}
