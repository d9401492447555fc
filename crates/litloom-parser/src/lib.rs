//! # Litloom Parser
//!
//! Scans fragment content for inline references. A reference is a fragment
//! name wrapped in a configurable begin/end delimiter pair, `{{` and `}}` by
//! default:
//!
//! ```text
//! int main() {
//!     {{Main content}}
//! }
//! ```
//!
//! ## Usage
//!
//! ```
//! # use litloom_parser::ReferenceSyntax;
//!
//! let syntax = ReferenceSyntax::default();
//! let reference = syntax.split("    {{Main content}}").unwrap();
//!
//! assert_eq!(reference.prefix(), "    ");
//! assert_eq!(reference.name(), "Main content");
//! ```

mod error;
mod reference;

pub use error::SyntaxError;
pub use reference::{DEFAULT_BEGIN, DEFAULT_END, Reference, ReferenceSyntax};
