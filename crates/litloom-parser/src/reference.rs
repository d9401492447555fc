//! Reference marker scanning.
//!
//! Lines are scanned left to right. The first begin delimiter opens a
//! reference and the first end delimiter after it closes the reference.
//! There is no escaping: a literal delimiter sequence always opens a
//! reference.

use log::{trace, warn};
use winnow::{
    Parser as _,
    combinator::delimited,
    error::{ContextError, ErrMode},
    token::{literal, take_until},
};

use crate::error::SyntaxError;

/// Default opening delimiter.
pub const DEFAULT_BEGIN: &str = "{{";
/// Default closing delimiter.
pub const DEFAULT_END: &str = "}}";

type IResult<O> = std::result::Result<O, ErrMode<ContextError>>;

/// A line split around its first reference marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    prefix: &'a str,
    name: &'a str,
    suffix: &'a str,
}

impl<'a> Reference<'a> {
    /// Text before the opening delimiter.
    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    /// Referenced fragment name, verbatim.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Text after the closing delimiter.
    pub fn suffix(&self) -> &'a str {
        self.suffix
    }
}

/// Begin/end delimiter pair marking inline references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSyntax {
    begin: String,
    end: String,
}

impl ReferenceSyntax {
    /// Creates a syntax from a delimiter pair.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError`] if a delimiter is empty or spans lines.
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Result<Self, SyntaxError> {
        let begin = begin.into();
        let end = end.into();
        for (which, delimiter) in [("begin", &begin), ("end", &end)] {
            if delimiter.is_empty() {
                return Err(SyntaxError::EmptyDelimiter { which });
            }
            if delimiter.contains(['\n', '\r']) {
                return Err(SyntaxError::MultilineDelimiter {
                    delimiter: delimiter.clone(),
                });
            }
        }
        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> &str {
        &self.begin
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Splits `line` around its first complete reference marker.
    ///
    /// Returns `None` when the line holds no marker, including when an
    /// opening delimiter is never closed.
    pub fn split<'a>(&self, line: &'a str) -> Option<Reference<'a>> {
        let mut input = line;
        let (prefix, name) = self.marker(&mut input).ok()?;
        Some(Reference {
            prefix,
            name,
            suffix: input,
        })
    }

    /// Returns `true` if `line` opens a reference it never closes.
    pub fn is_unterminated(&self, line: &str) -> bool {
        let mut input = line;
        while self.marker(&mut input).is_ok() {}
        input.contains(self.begin.as_str())
    }

    /// Collects every referenced name in `lines`, in order of appearance.
    ///
    /// Unlike [`split`](Self::split), every marker of a line is reported.
    pub fn references<I, L>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut names = Vec::new();
        for line in lines {
            let mut input = line.as_ref();
            while let Ok((_, name)) = self.marker(&mut input) {
                names.push(name.to_string());
            }
            if input.contains(self.begin.as_str()) {
                warn!(
                    begin = self.begin.as_str(),
                    end = self.end.as_str();
                    "Found a reference opening but no matching closing delimiter on the same line"
                );
            }
        }
        trace!(count = names.len(); "Scanned references");
        names
    }

    /// Consumes everything up to and including the next marker.
    ///
    /// Leaves `input` untouched when no complete marker follows.
    fn marker<'a>(&self, input: &mut &'a str) -> IResult<(&'a str, &'a str)> {
        let begin = self.begin.as_str();
        let end = self.end.as_str();
        let start = *input;
        let result: IResult<(&'a str, &'a str)> = (
            take_until(0.., begin),
            delimited(literal(begin), take_until(0.., end), literal(end)),
        )
            .parse_next(input);
        if result.is_err() {
            *input = start;
        }
        result
    }
}

impl Default for ReferenceSyntax {
    fn default() -> Self {
        Self {
            begin: DEFAULT_BEGIN.to_string(),
            end: DEFAULT_END.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_without_marker() {
        let syntax = ReferenceSyntax::default();

        assert_eq!(syntax.split("int main() {"), None);
        assert_eq!(syntax.split(""), None);
    }

    #[test]
    fn test_split_keeps_prefix_and_suffix() {
        let syntax = ReferenceSyntax::default();
        let reference = syntax.split("\t// {{Includes}} trailing").unwrap();

        assert_eq!(reference.prefix(), "\t// ");
        assert_eq!(reference.name(), "Includes");
        assert_eq!(reference.suffix(), " trailing");
    }

    #[test]
    fn test_split_first_marker_wins() {
        let syntax = ReferenceSyntax::default();
        let reference = syntax.split("{{A}}{{B}}").unwrap();

        assert_eq!(reference.name(), "A");
        assert_eq!(reference.suffix(), "{{B}}");
    }

    #[test]
    fn test_split_unterminated_marker() {
        let syntax = ReferenceSyntax::default();

        assert_eq!(syntax.split("    {{Main content"), None);
        assert!(syntax.is_unterminated("    {{Main content"));
        assert!(!syntax.is_unterminated("    {{Main content}}"));
        assert!(syntax.is_unterminated("{{A}} then {{B"));
    }

    #[test]
    fn test_split_empty_name() {
        let syntax = ReferenceSyntax::default();
        let reference = syntax.split("x{{}}").unwrap();

        assert_eq!(reference.prefix(), "x");
        assert_eq!(reference.name(), "");
    }

    #[test]
    fn test_custom_delimiters() {
        let syntax = ReferenceSyntax::new("<<", ">>=").unwrap();
        let reference = syntax.split("  <<Compute area>>=").unwrap();

        assert_eq!(reference.prefix(), "  ");
        assert_eq!(reference.name(), "Compute area");
        assert_eq!(reference.suffix(), "");
        assert_eq!(syntax.split("  {{Compute area}}"), None);
    }

    #[test]
    fn test_same_begin_and_end_delimiter() {
        let syntax = ReferenceSyntax::new("@@", "@@").unwrap();
        let reference = syntax.split("a @@Name@@ b").unwrap();

        assert_eq!(reference.name(), "Name");
        assert_eq!(reference.suffix(), " b");
    }

    #[test]
    fn test_invalid_delimiters() {
        assert_eq!(
            ReferenceSyntax::new("", "}}"),
            Err(SyntaxError::EmptyDelimiter { which: "begin" })
        );
        assert_eq!(
            ReferenceSyntax::new("{{", ""),
            Err(SyntaxError::EmptyDelimiter { which: "end" })
        );
        assert!(matches!(
            ReferenceSyntax::new("{\n{", "}}"),
            Err(SyntaxError::MultilineDelimiter { .. })
        ));
    }

    #[test]
    fn test_references_collects_every_marker() {
        let syntax = ReferenceSyntax::default();
        let lines = [
            "#include <iostream>",
            "{{Includes}} {{Forward declarations}}",
            "int main() {",
            "    {{Main content}}",
            "    {{Unterminated",
            "}",
        ];

        assert_eq!(
            syntax.references(lines),
            ["Includes", "Forward declarations", "Main content"]
        );
    }
}
