//! Error codes for the litloom diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Naming errors
//! - `E1xx` - Registry construction and integrity errors
//! - `E2xx` - Tangling errors
//! - `E3xx` - Configuration and input errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Naming Errors (E0xx)
    // =========================================================================
    /// Invalid fragment or scope name.
    ///
    /// The name contains the reserved `##` key separator.
    E001,

    // =========================================================================
    // Registry Errors (E1xx)
    // =========================================================================
    /// Duplicate fragment definition.
    ///
    /// Two `new` fragments were declared under the same scope and name.
    E100,

    /// Unresolved override.
    ///
    /// An append, replace or insert targets a fragment that never appeared.
    E101,

    /// Conflicting scope parent.
    ///
    /// A scope was declared with two different parents.
    E102,

    /// Cyclic scope hierarchy.
    ///
    /// A parent declaration would make a scope its own ancestor.
    E103,

    // =========================================================================
    // Tangle Errors (E2xx)
    // =========================================================================
    /// Fragment not found.
    ///
    /// A tangle root or an inline reference resolves to nothing.
    E200,

    /// Unmatched insertion.
    ///
    /// No line of the target's expansion contains the insertion pattern.
    E201,

    /// Cyclic reference.
    ///
    /// Expanding a fragment reaches that same fragment again.
    E202,

    // =========================================================================
    // Configuration Errors (E3xx)
    // =========================================================================
    /// Invalid reference delimiters.
    ///
    /// The configured begin or end delimiter is empty.
    E300,

    /// Invalid content unit.
    ///
    /// A unit manifest is malformed or misses a required field.
    E301,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "invalid name",
            ErrorCode::E100 => "duplicate fragment",
            ErrorCode::E101 => "unresolved override",
            ErrorCode::E102 => "conflicting scope parent",
            ErrorCode::E103 => "cyclic scope hierarchy",
            ErrorCode::E200 => "fragment not found",
            ErrorCode::E201 => "unmatched insertion",
            ErrorCode::E202 => "cyclic reference",
            ErrorCode::E300 => "invalid reference delimiters",
            ErrorCode::E301 => "invalid content unit",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E202.to_string(), "E202");
        assert_eq!(ErrorCode::E300.to_string(), "E300");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E101.description(), "unresolved override");
        assert_eq!(ErrorCode::E201.description(), "unmatched insertion");
        assert_eq!(ErrorCode::E103.description(), "cyclic scope hierarchy");
    }
}
