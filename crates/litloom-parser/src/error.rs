use thiserror::Error;

/// Errors raised while building a [`ReferenceSyntax`](crate::ReferenceSyntax).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("reference {which} delimiter must not be empty")]
    EmptyDelimiter { which: &'static str },

    #[error("reference delimiter `{delimiter}` must not contain line breaks")]
    MultilineDelimiter { delimiter: String },
}
