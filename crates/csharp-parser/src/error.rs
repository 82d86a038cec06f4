//! Parse error types.

use crate::span::{LineCol, Span};
use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the source where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the 1-based line and column where the error starts.
    pub fn line_col(&self, source: &str) -> LineCol {
        LineCol::locate(source, self.span.start)
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, Error)]
pub enum ParseErrorKind {
    /// An unexpected token was encountered.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },

    /// An unexpected end of file was encountered.
    #[error("unexpected end of file: expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: String,
    },

    /// A type declaration is missing its name.
    #[error("{keyword} declaration is missing a name")]
    MissingName {
        /// The declaring keyword.
        keyword: String,
    },

    /// A type could not be read where one was required.
    #[error("expected a type in {context}")]
    ExpectedType {
        /// Where the type was expected.
        context: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "identifier".to_string(),
                found: "'}'".to_string(),
            },
            Span::from(0..1),
        );
        assert_eq!(
            error.to_string(),
            "unexpected token: expected identifier, found '}'"
        );
    }

    #[test]
    fn test_error_position() {
        let source = "class A\n{\n  int ;\n}";
        let error = ParseError::new(
            ParseErrorKind::ExpectedType {
                context: "member".to_string(),
            },
            Span::from(16..17),
        );
        assert_eq!(error.line_col(source), LineCol { line: 3, col: 7 });
        assert_eq!(error.to_string(), "expected a type in member");
    }
}
