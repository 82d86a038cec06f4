//! C# declaration parser for interfaces-generator.
//!
//! This crate reads the subset of C# needed to describe data shapes:
//! - Lexer (tokenizer) using `logos`
//! - Recursive descent parser for namespaces and type declarations
//! - AST types for records, classes, properties and constructors
//! - Error recovery so one bad member does not hide the rest of the file
//!
//! # Example
//!
//! ```
//! use csharp_parser::parse;
//!
//! let source = r#"
//! namespace Mensajeria.Ordenes;
//!
//! public record ObtenerOrdenRequest(int Id, string? Cliente);
//! "#;
//!
//! let result = parse(source);
//! assert!(result.errors.is_empty());
//! assert_eq!(result.unit.declarations[0].name, "ObtenerOrdenRequest");
//! ```

mod ast;
mod error;
mod lexer;
mod parser;
mod span;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use span::{LineCol, Span};

/// The result of parsing a C# file.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed compilation unit.
    pub unit: CompilationUnit,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

/// Parses a C# source file.
///
/// The parser recovers from errors where possible, returning both the
/// declarations it could read and any errors encountered.
pub fn parse(source: &str) -> ParseResult {
    parser::Parser::new(source).parse()
}
