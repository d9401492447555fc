//! Error types for litloom operations.
//!
//! This module provides the main error type [`LitloomError`] which wraps the
//! error conditions that can occur while building, merging and tangling
//! fragment registries.

use std::io;

use thiserror::Error;

use litloom_core::error::{Diagnostic, DiagnosticError};

/// The main error type for litloom operations.
///
/// # Diagnostic Variants
///
/// The `Diagnostics` variant carries one or more [`Diagnostic`]s, each with
/// the source locations of the declarations at fault.
#[derive(Debug, Error)]
pub enum LitloomError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Diagnostics(#[from] DiagnosticError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<Diagnostic> for LitloomError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::Diagnostics(diagnostic.into())
    }
}

impl LitloomError {
    /// Returns the diagnostics carried by this error, if any.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Diagnostics(err) => err.diagnostics(),
            Self::Io(_) | Self::Config(_) => &[],
        }
    }
}
