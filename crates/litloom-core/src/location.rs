//! Source locations attached to fragments and scope declarations.

use std::fmt;

use crate::identifier::Id;

/// Where an authored declaration came from: a content unit and a line in it.
///
/// Every diagnostic carries at least one location so that an author can find
/// the offending declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    unit: Id,
    line: usize,
}

impl SourceLocation {
    /// Creates a location for `line` (1-based) of `unit`.
    pub fn new(unit: impl Into<Id>, line: usize) -> Self {
        Self {
            unit: unit.into(),
            line,
        }
    }

    /// Location used for synthetic declarations that have no authored origin.
    pub fn unknown() -> Self {
        Self::new("<unknown>", 0)
    }

    /// The originating unit (document, manifest, ...).
    pub fn unit(&self) -> Id {
        self.unit
    }

    /// The 1-based line number inside the unit.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.unit, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let location = SourceLocation::new("chapter1", 42);
        assert_eq!(location.to_string(), "chapter1:42");
        assert_eq!(location.unit(), "chapter1");
        assert_eq!(location.line(), 42);
    }

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(SourceLocation::default(), SourceLocation::unknown());
    }
}
