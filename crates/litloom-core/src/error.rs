//! Diagnostics reported by the fragment registry and the tangle engine.
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning with an optional error code, one or more
//! labeled [`SourceLocation`](crate::location::SourceLocation)s and help
//! text. Several diagnostics are wrapped in a [`DiagnosticError`] when an
//! operation reports every problem it finds instead of the first one.
//!
//! # Example
//!
//! ```
//! # use litloom_core::error::{Diagnostic, ErrorCode};
//! # use litloom_core::location::SourceLocation;
//!
//! let diag = Diagnostic::error("fragment `A##Main` is defined multiple times")
//!     .with_code(ErrorCode::E100)
//!     .with_label(SourceLocation::new("chapter2", 14), "duplicate definition")
//!     .with_secondary_label(SourceLocation::new("chapter1", 3), "first defined here")
//!     .with_help("use an append or replace operation to extend the fragment");
//!
//! assert_eq!(diag.labels().len(), 2);
//! ```

mod collector;
mod diagnostic;
mod diagnostic_error;
mod error_code;
mod label;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use diagnostic_error::DiagnosticError;
pub use error_code::ErrorCode;
pub use label::Label;
pub use severity::Severity;

/// A type alias for `Result<T, Diagnostic>`.
pub type Result<T> = std::result::Result<T, Diagnostic>;
