//! Configuration types for tangling.
//!
//! All types implement [`serde::Deserialize`] so that they can be loaded from
//! a TOML file:
//!
//! ```toml
//! [references]
//! begin = "{{"
//! end = "}}"
//! ```
//!
//! # Example
//!
//! ```
//! # use litloom::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.reference_syntax().is_ok());
//! ```

use serde::Deserialize;

use litloom_core::error::{Diagnostic, ErrorCode};
use litloom_parser::{DEFAULT_BEGIN, DEFAULT_END, ReferenceSyntax};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Reference marker section.
    #[serde(default)]
    references: ReferenceConfig,
}

impl AppConfig {
    pub fn new(references: ReferenceConfig) -> Self {
        Self { references }
    }

    /// Returns the reference marker configuration.
    pub fn references(&self) -> &ReferenceConfig {
        &self.references
    }

    /// Builds the reference syntax described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an `E300` diagnostic if a delimiter is empty or spans lines.
    pub fn reference_syntax(&self) -> Result<ReferenceSyntax, Diagnostic> {
        ReferenceSyntax::new(&self.references.begin, &self.references.end).map_err(|err| {
            Diagnostic::error(format!("invalid reference delimiters: {err}"))
                .with_code(ErrorCode::E300)
                .with_help(format!(
                    "set `begin` and `end` in the `[references]` section, e.g. `{DEFAULT_BEGIN}` and `{DEFAULT_END}`"
                ))
        })
    }
}

/// Delimiters wrapping an inline reference to another fragment.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_begin")]
    begin: String,

    #[serde(default = "default_end")]
    end: String,
}

impl ReferenceConfig {
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
        }
    }

    pub fn begin(&self) -> &str {
        &self.begin
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BEGIN, DEFAULT_END)
    }
}

fn default_begin() -> String {
    DEFAULT_BEGIN.to_string()
}

fn default_end() -> String {
    DEFAULT_END.to_string()
}
