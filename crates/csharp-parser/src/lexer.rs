//! C# lexer using logos.
//!
//! Only the tokens the declaration parser cares about get their own kind:
//! delimiters, declaration keywords and identifiers. Literals are lexed whole so
//! that braces inside strings never unbalance a skipped body. Everything else
//! collapses into [`TokenKind::Operator`].

use crate::span::Span;
use logos::Logos;
use text_size::TextSize;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the source.
    pub span: Span,
}

/// Token kinds for the C# declaration subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
#[logos(skip(r"([ \t\r\n\f]+|//[^\n]*|/\*([^*]|\*+[^*/])*\*+/|#[^\n]*)", allow_greedy = true))]
pub enum TokenKind {
    // === Delimiters ===
    /// `{`
    #[token("{")]
    LBrace,

    /// `}`
    #[token("}")]
    RBrace,

    /// `(`
    #[token("(")]
    LParen,

    /// `)`
    #[token(")")]
    RParen,

    /// `[`
    #[token("[")]
    LBracket,

    /// `]`
    #[token("]")]
    RBracket,

    /// `<`
    #[token("<")]
    LAngle,

    /// `>`
    #[token(">")]
    RAngle,

    // === Punctuation ===
    /// `,`
    #[token(",")]
    Comma,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `:`
    #[token(":")]
    Colon,

    /// `::`
    #[token("::")]
    DoubleColon,

    /// `.`
    #[token(".")]
    Dot,

    /// `?`
    #[token("?")]
    Question,

    /// `=`
    #[token("=")]
    Eq,

    /// `=>`
    #[token("=>")]
    FatArrow,

    /// `~`
    #[token("~")]
    Tilde,

    // === Declaration keywords ===
    /// `namespace`
    #[token("namespace")]
    Namespace,

    /// `using`
    #[token("using")]
    Using,

    /// `class`
    #[token("class")]
    Class,

    /// `record` (contextual)
    #[token("record")]
    Record,

    /// `struct`
    #[token("struct")]
    Struct,

    /// `interface`
    #[token("interface")]
    Interface,

    /// `enum`
    #[token("enum")]
    Enum,

    /// `delegate`
    #[token("delegate")]
    Delegate,

    /// `event`
    #[token("event")]
    Event,

    /// `this`
    #[token("this")]
    This,

    /// `operator`
    #[token("operator")]
    OperatorKeyword,

    /// `implicit`
    #[token("implicit")]
    Implicit,

    /// `explicit`
    #[token("explicit")]
    Explicit,

    // === Names and literals ===
    /// An identifier, optionally `@`-escaped.
    #[regex(r"@?[\p{L}_][\p{L}\p{N}_]*")]
    Ident,

    /// A numeric literal.
    #[regex(r"[0-9][0-9A-Za-z_]*(\.[0-9][0-9A-Za-z_]*)?")]
    Number,

    /// A regular, interpolated, verbatim or raw string literal.
    #[regex(r#"\$?"([^"\\\n]|\\.)*""#)]
    #[regex(r#"(@|\$@|@\$)"([^"]|"")*""#)]
    #[regex(r#"\$*""""#, lex_raw_string)]
    String,

    /// A character literal.
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Char,

    /// Any other operator characters.
    #[regex(r"[+\-*%&|\^!]+")]
    #[token("/")]
    Operator,

    /// End of file
    Eof,

    /// Invalid/unknown token
    #[default]
    Error,
}

/// Consumes the rest of a raw string literal. The opening run of three or more
/// quotes has to be closed by a run of the same length.
fn lex_raw_string(lex: &mut logos::Lexer<'_, TokenKind>) -> bool {
    let extra = lex.remainder().bytes().take_while(|b| *b == b'"').count();
    lex.bump(extra);
    let delimiter = "\"".repeat(3 + extra);
    match lex.remainder().find(&delimiter) {
        Some(end) => {
            lex.bump(end + delimiter.len());
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

impl TokenKind {
    /// Returns true for tokens that may name something.
    ///
    /// `record` is contextual in C#, so it doubles as an identifier.
    pub fn is_ident_like(&self) -> bool {
        matches!(self, TokenKind::Ident | TokenKind::Record)
    }

    /// Returns true for keywords that open a type declaration.
    pub fn starts_type_decl(&self) -> bool {
        matches!(
            self,
            TokenKind::Class | TokenKind::Record | TokenKind::Struct | TokenKind::Interface
        )
    }

    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LAngle => "'<'",
            TokenKind::RAngle => "'>'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::DoubleColon => "'::'",
            TokenKind::Dot => "'.'",
            TokenKind::Question => "'?'",
            TokenKind::Eq => "'='",
            TokenKind::FatArrow => "'=>'",
            TokenKind::Tilde => "'~'",
            TokenKind::Namespace => "'namespace'",
            TokenKind::Using => "'using'",
            TokenKind::Class => "'class'",
            TokenKind::Record => "'record'",
            TokenKind::Struct => "'struct'",
            TokenKind::Interface => "'interface'",
            TokenKind::Enum => "'enum'",
            TokenKind::Delegate => "'delegate'",
            TokenKind::Event => "'event'",
            TokenKind::This => "'this'",
            TokenKind::OperatorKeyword => "'operator'",
            TokenKind::Implicit => "'implicit'",
            TokenKind::Explicit => "'explicit'",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string literal",
            TokenKind::Char => "character literal",
            TokenKind::Operator => "operator",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }
}

/// A lexer for C# source code.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            finished: false,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.inner.next() {
            Some(result) => {
                let kind = result.unwrap_or(TokenKind::Error);
                Some(Token {
                    kind,
                    span: Span::from(self.inner.span()),
                })
            }
            None => {
                self.finished = true;
                let end = TextSize::from(self.source.len() as u32);
                Some(Token {
                    kind: TokenKind::Eof,
                    span: Span::empty(end),
                })
            }
        }
    }
}
