//! Recursive descent parser for C# type declarations.
//!
//! The parser reads only as much C# as it needs to find type shapes: namespace
//! and type headers, positional parameters, constructor parameters and property
//! declarations. Everything else (method bodies, initializers, base lists,
//! constraints) is skipped with delimiter balancing, which keeps it robust
//! against syntax it does not model.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::span::Span;
use crate::ParseResult;
use smol_str::SmolStr;
use text_size::TextSize;

/// Modifiers that may precede a type or member declaration.
const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "sealed", "abstract", "partial",
    "readonly", "virtual", "override", "new", "extern", "unsafe", "volatile", "async", "const",
    "required", "file", "fixed",
];

/// Modifiers that may precede a parameter (`this` is lexed separately).
const PARAMETER_MODIFIERS: &[&str] = &["ref", "out", "in", "params", "scoped", "readonly"];

/// The C# declaration parser.
pub struct Parser<'src> {
    /// The source being parsed.
    source: &'src str,
    /// The token stream.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Parse errors collected during parsing.
    errors: Vec<ParseError>,
    /// EOF token for when we're past the end.
    eof_token: Token,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str) -> Self {
        let mut tokens: Vec<Token> = Lexer::new(source).collect();
        // A UTF-8 byte order mark lexes as invalid tokens; drop them.
        let bom = if source.starts_with('\u{feff}') { 3 } else { 0 };
        tokens.retain(|t| usize::from(t.span.start) >= bom);
        let eof_token = Token {
            kind: TokenKind::Eof,
            span: Span::empty(TextSize::from(source.len() as u32)),
        };
        Self {
            source,
            tokens,
            pos: 0,
            errors: Vec::new(),
            eof_token,
        }
    }

    /// Parses the source into a compilation unit.
    pub fn parse(mut self) -> ParseResult {
        let mut unit = CompilationUnit {
            span: Span::new(
                TextSize::from(0),
                TextSize::from(self.source.len() as u32),
            ),
            ..Default::default()
        };
        self.parse_namespace_members(&mut unit, false);
        ParseResult {
            unit,
            errors: self.errors,
        }
    }

    // === Token helpers ===

    /// Returns the current token.
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof_token)
    }

    /// Returns the current token kind.
    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Returns the kind of the token `n` positions ahead.
    fn nth_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Returns the text of the current token.
    fn current_text(&self) -> &'src str {
        self.current().span.slice(self.source)
    }

    /// Returns the end offset of the last consumed token.
    fn previous_end(&self) -> TextSize {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span.end,
            None => self.current().span.start,
        }
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Advances if the current token matches, returns true if matched.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to be the given kind, reports error if not.
    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        if self.check(TokenKind::Eof) {
            self.error(ParseErrorKind::UnexpectedEof {
                expected: kind.name().to_string(),
            });
        } else {
            self.unexpected(kind.name());
        }
        false
    }

    /// Reports an error at the current position.
    fn error(&mut self, kind: ParseErrorKind) {
        self.errors.push(ParseError::new(kind, self.current().span));
    }

    /// Reports the current token as unexpected.
    fn unexpected(&mut self, expected: &str) {
        self.error(ParseErrorKind::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current_kind().name().to_string(),
        });
    }

    fn at_modifier(&self) -> bool {
        self.check(TokenKind::Ident) && MODIFIERS.contains(&self.current_text())
    }

    fn at_parameter_modifier(&self) -> bool {
        self.check(TokenKind::This)
            || (self.check(TokenKind::Ident)
                && PARAMETER_MODIFIERS.contains(&self.current_text())
                && self.nth_kind(1) != TokenKind::Comma
                && self.nth_kind(1) != TokenKind::RParen)
    }

    /// Returns true if the current token opens a record, class, struct or interface.
    fn at_type_decl(&self) -> bool {
        match self.current_kind() {
            TokenKind::Record => {
                let next = self.nth_kind(1);
                next.is_ident_like() || matches!(next, TokenKind::Struct | TokenKind::Class)
            }
            kind => kind.starts_type_decl(),
        }
    }

    // === Skipping ===

    /// Skips a balanced `open ... close` group starting at the current token.
    fn skip_balanced(&mut self, open: TokenKind, close: TokenKind) {
        let mut depth = 0usize;
        loop {
            let kind = self.current_kind();
            if kind == TokenKind::Eof {
                self.error(ParseErrorKind::UnexpectedEof {
                    expected: close.name().to_string(),
                });
                return;
            }
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    self.advance();
                    return;
                }
            }
            self.advance();
        }
    }

    /// Skips a type argument list. Returns false if it is not closed before a
    /// statement or body delimiter.
    fn skip_type_arguments(&mut self) -> bool {
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::LAngle => depth += 1,
                TokenKind::RAngle => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return true;
                    }
                }
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace | TokenKind::Eof => {
                    self.unexpected("'>'");
                    return false;
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skips attribute sections (`[Required, Key]`).
    fn skip_attributes(&mut self) {
        while self.check(TokenKind::LBracket) {
            self.skip_balanced(TokenKind::LBracket, TokenKind::RBracket);
        }
    }

    /// Skips the remainder of a member: up to and including `;`, or through a
    /// braced body. After `=` or `=>` the rest is an expression and only `;`
    /// ends it. A `}` that closes the enclosing body is left in place.
    fn skip_member_rest(&mut self) {
        loop {
            match self.current_kind() {
                TokenKind::Eof | TokenKind::RBrace => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::Eq | TokenKind::FatArrow => {
                    self.advance();
                    self.skip_expression();
                    return;
                }
                TokenKind::OperatorKeyword => {
                    // The operator symbol (`==`, `<=`) may contain `=`.
                    self.advance();
                    while !matches!(
                        self.current_kind(),
                        TokenKind::LParen
                            | TokenKind::Semicolon
                            | TokenKind::LBrace
                            | TokenKind::RBrace
                            | TokenKind::Eof
                    ) {
                        self.advance();
                    }
                }
                TokenKind::LBrace => {
                    self.skip_balanced(TokenKind::LBrace, TokenKind::RBrace);
                    if !self.check(TokenKind::Eq) {
                        return;
                    }
                }
                TokenKind::LParen => self.skip_balanced(TokenKind::LParen, TokenKind::RParen),
                TokenKind::LBracket => {
                    self.skip_balanced(TokenKind::LBracket, TokenKind::RBracket)
                }
                _ => self.advance(),
            }
        }
    }

    /// Skips an expression through its terminating `;`. Braced groups such as
    /// collection initializers and lambda bodies are skipped whole.
    fn skip_expression(&mut self) {
        loop {
            match self.current_kind() {
                TokenKind::Eof | TokenKind::RBrace => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => self.skip_balanced(TokenKind::LBrace, TokenKind::RBrace),
                TokenKind::LParen => self.skip_balanced(TokenKind::LParen, TokenKind::RParen),
                TokenKind::LBracket => {
                    self.skip_balanced(TokenKind::LBracket, TokenKind::RBracket)
                }
                _ => self.advance(),
            }
        }
    }

    /// Skips a base list and `where` clauses up to the type body or `;`.
    fn skip_declaration_header(&mut self) {
        loop {
            match self.current_kind() {
                TokenKind::LBrace | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => {
                    return
                }
                TokenKind::LParen => self.skip_balanced(TokenKind::LParen, TokenKind::RParen),
                _ => self.advance(),
            }
        }
    }

    /// Skips a parameter default value up to the next `,` or `)`.
    fn skip_default_value(&mut self) {
        loop {
            match self.current_kind() {
                TokenKind::Comma
                | TokenKind::RParen
                | TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::Eof => return,
                TokenKind::LParen => self.skip_balanced(TokenKind::LParen, TokenKind::RParen),
                TokenKind::LBracket => {
                    self.skip_balanced(TokenKind::LBracket, TokenKind::RBracket)
                }
                TokenKind::LBrace => self.skip_balanced(TokenKind::LBrace, TokenKind::RBrace),
                _ => self.advance(),
            }
        }
    }

    // === Namespaces ===

    fn parse_namespace_members(&mut self, unit: &mut CompilationUnit, in_block: bool) {
        loop {
            match self.current_kind() {
                TokenKind::Eof => {
                    if in_block {
                        self.error(ParseErrorKind::UnexpectedEof {
                            expected: "'}'".to_string(),
                        });
                    }
                    return;
                }
                TokenKind::RBrace if in_block => {
                    self.advance();
                    return;
                }
                TokenKind::Semicolon => self.advance(),
                TokenKind::Using => self.skip_member_rest(),
                TokenKind::Ident
                    if self.current_text() == "global" && self.nth_kind(1) == TokenKind::Using =>
                {
                    self.skip_member_rest()
                }
                TokenKind::Namespace => self.parse_namespace(unit),
                _ => {
                    if let Some(MemberDecl::Nested(decl)) = self.parse_member(None) {
                        unit.declarations.push(decl);
                    }
                }
            }
        }
    }

    fn parse_namespace(&mut self, unit: &mut CompilationUnit) {
        self.advance();
        match self.parse_qualified_name() {
            Some(name) => {
                if unit.namespace.is_none() {
                    unit.namespace = Some(name);
                }
            }
            None => self.unexpected("namespace name"),
        }

        // File-scoped: the rest of the file belongs to it.
        if self.eat(TokenKind::Semicolon) {
            return;
        }
        if self.expect(TokenKind::LBrace) {
            self.parse_namespace_members(unit, true);
        }
    }

    fn parse_qualified_name(&mut self) -> Option<SmolStr> {
        if !self.current_kind().is_ident_like() {
            return None;
        }
        let start = self.current().span.start;
        self.advance();
        while self.check(TokenKind::Dot) && self.nth_kind(1).is_ident_like() {
            self.advance();
            self.advance();
        }
        let span = Span::new(start, self.previous_end());
        Some(SmolStr::new(span.slice(self.source)))
    }

    // === Members ===

    /// Parses one member. `enclosing` is the name of the enclosing type, used
    /// to recognize constructors.
    fn parse_member(&mut self, enclosing: Option<&str>) -> Option<MemberDecl> {
        let start_pos = self.pos;
        let start = self.current().span.start;

        self.skip_attributes();
        while self.at_modifier() {
            self.advance();
        }

        let member = if self.at_type_decl() {
            self.parse_type_decl(start).map(MemberDecl::Nested)
        } else {
            match self.current_kind() {
                TokenKind::Eof => None,
                TokenKind::Enum
                | TokenKind::Delegate
                | TokenKind::Event
                | TokenKind::Tilde
                | TokenKind::Implicit
                | TokenKind::Explicit
                | TokenKind::Using => {
                    self.skip_member_rest();
                    Some(MemberDecl::Other(Span::new(start, self.previous_end())))
                }
                kind if kind.is_ident_like() || kind == TokenKind::LParen => {
                    Some(self.parse_typed_member(enclosing, start))
                }
                _ => {
                    self.unexpected("member declaration");
                    self.skip_member_rest();
                    Some(MemberDecl::Other(Span::new(start, self.previous_end())))
                }
            }
        };

        if self.pos == start_pos {
            self.advance();
        }
        member
    }

    /// Parses a member that starts with a type (or a constructor name).
    fn parse_typed_member(&mut self, enclosing: Option<&str>, start: TextSize) -> MemberDecl {
        if let Some(type_name) = enclosing {
            if self.check(TokenKind::Ident)
                && self.current_text() == type_name
                && self.nth_kind(1) == TokenKind::LParen
            {
                self.advance();
                let parameters = self.parse_parameter_list();
                self.skip_member_rest();
                return MemberDecl::Constructor(Constructor {
                    parameters,
                    span: Span::new(start, self.previous_end()),
                });
            }
        }

        let Some(ty) = self.parse_type() else {
            self.error(ParseErrorKind::ExpectedType {
                context: "member declaration".to_string(),
            });
            self.skip_member_rest();
            return MemberDecl::Other(Span::new(start, self.previous_end()));
        };

        if !self.current_kind().is_ident_like() {
            // Indexers, operators and top-level statements.
            self.skip_member_rest();
            return MemberDecl::Other(Span::new(start, self.previous_end()));
        }

        let name = self.parse_member_name();
        match self.current_kind() {
            TokenKind::LBrace => {
                self.skip_balanced(TokenKind::LBrace, TokenKind::RBrace);
                if self.eat(TokenKind::Eq) {
                    self.skip_expression();
                }
                MemberDecl::Property(Property {
                    name,
                    ty: ty.slice(self.source).to_string(),
                    span: Span::new(start, self.previous_end()),
                })
            }
            TokenKind::FatArrow => {
                self.advance();
                self.skip_expression();
                MemberDecl::Property(Property {
                    name,
                    ty: ty.slice(self.source).to_string(),
                    span: Span::new(start, self.previous_end()),
                })
            }
            // Methods and fields.
            _ => {
                self.skip_member_rest();
                MemberDecl::Other(Span::new(start, self.previous_end()))
            }
        }
    }

    /// Parses a member name, keeping the last segment of an explicit interface
    /// implementation and skipping method type parameters.
    fn parse_member_name(&mut self) -> SmolStr {
        let mut name = SmolStr::new(self.current_text());
        self.advance();
        while self.check(TokenKind::Dot) && self.nth_kind(1).is_ident_like() {
            self.advance();
            name = SmolStr::new(self.current_text());
            self.advance();
        }
        if self.check(TokenKind::LAngle) {
            self.skip_type_arguments();
        }
        name
    }

    // === Type declarations ===

    fn parse_type_decl(&mut self, start: TextSize) -> Option<TypeDecl> {
        let kind = match self.current_kind() {
            TokenKind::Record => {
                self.advance();
                if self.eat(TokenKind::Struct) {
                    DeclKind::RecordStruct
                } else {
                    self.eat(TokenKind::Class);
                    DeclKind::Record
                }
            }
            TokenKind::Class => {
                self.advance();
                DeclKind::Class
            }
            TokenKind::Struct => {
                self.advance();
                DeclKind::Struct
            }
            _ => {
                self.advance();
                DeclKind::Interface
            }
        };

        if !self.current_kind().is_ident_like() {
            self.error(ParseErrorKind::MissingName {
                keyword: kind.keyword().to_string(),
            });
            self.skip_member_rest();
            return None;
        }
        let name = SmolStr::new(self.current_text());
        self.advance();

        let type_parameters = if self.check(TokenKind::LAngle) {
            self.parse_type_parameters()
        } else {
            Vec::new()
        };
        let parameters = if self.check(TokenKind::LParen) {
            Some(self.parse_parameter_list())
        } else {
            None
        };

        self.skip_declaration_header();

        let mut members = Vec::new();
        if self.eat(TokenKind::LBrace) {
            loop {
                match self.current_kind() {
                    TokenKind::RBrace => {
                        self.advance();
                        break;
                    }
                    TokenKind::Eof => {
                        self.error(ParseErrorKind::UnexpectedEof {
                            expected: "'}'".to_string(),
                        });
                        break;
                    }
                    TokenKind::Semicolon => self.advance(),
                    _ => {
                        if let Some(member) = self.parse_member(Some(name.as_str())) {
                            members.push(member);
                        }
                    }
                }
            }
            self.eat(TokenKind::Semicolon);
        } else {
            self.expect(TokenKind::Semicolon);
        }

        Some(TypeDecl {
            kind,
            name,
            type_parameters,
            parameters,
            members,
            span: Span::new(start, self.previous_end()),
        })
    }

    fn parse_type_parameters(&mut self) -> Vec<SmolStr> {
        let mut params = Vec::new();
        self.advance();
        loop {
            self.skip_attributes();
            if self.check(TokenKind::Ident)
                && matches!(self.current_text(), "in" | "out")
                && self.nth_kind(1).is_ident_like()
            {
                self.advance();
            }
            if self.current_kind().is_ident_like() {
                params.push(SmolStr::new(self.current_text()));
                self.advance();
            } else {
                self.unexpected("type parameter");
            }
            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RAngle);
            return params;
        }
    }

    fn parse_parameter_list(&mut self) -> Vec<Parameter> {
        let mut parameters = Vec::new();
        self.expect(TokenKind::LParen);
        if self.eat(TokenKind::RParen) {
            return parameters;
        }

        loop {
            let start = self.current().span.start;
            self.skip_attributes();
            while self.at_parameter_modifier() {
                self.advance();
            }

            match self.parse_type() {
                Some(ty) if self.current_kind().is_ident_like() => {
                    let name = SmolStr::new(self.current_text());
                    self.advance();
                    if self.eat(TokenKind::Eq) {
                        self.skip_default_value();
                    }
                    parameters.push(Parameter {
                        name,
                        ty: ty.slice(self.source).to_string(),
                        span: Span::new(start, self.previous_end()),
                    });
                }
                Some(_) => {
                    self.unexpected("parameter name");
                    self.skip_default_value();
                }
                None => {
                    self.error(ParseErrorKind::ExpectedType {
                        context: "parameter list".to_string(),
                    });
                    self.skip_default_value();
                }
            }

            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen);
            return parameters;
        }
    }

    // === Types ===

    /// Parses a type and returns its span. The text is taken verbatim from the
    /// source, so `Dictionary<string,int>` keeps its original spacing.
    fn parse_type(&mut self) -> Option<Span> {
        let start = self.current().span.start;

        if self.check(TokenKind::LParen) {
            // Tuple type.
            self.skip_balanced(TokenKind::LParen, TokenKind::RParen);
        } else if self.current_kind().is_ident_like() {
            self.advance();
            if self.eat(TokenKind::DoubleColon) {
                if !self.current_kind().is_ident_like() {
                    return None;
                }
                self.advance();
            }
            loop {
                if self.check(TokenKind::LAngle) && !self.skip_type_arguments() {
                    return None;
                }
                if self.check(TokenKind::Dot) && self.nth_kind(1).is_ident_like() {
                    self.advance();
                    self.advance();
                    continue;
                }
                break;
            }
        } else {
            return None;
        }

        loop {
            match self.current_kind() {
                TokenKind::Question => self.advance(),
                TokenKind::LBracket if self.at_rank_specifier() => {
                    self.skip_balanced(TokenKind::LBracket, TokenKind::RBracket)
                }
                TokenKind::Operator if self.current_text() == "*" => self.advance(),
                _ => break,
            }
        }

        Some(Span::new(start, self.previous_end()))
    }

    /// Returns true at `[]` or `[,,]`.
    fn at_rank_specifier(&self) -> bool {
        let mut n = 1;
        while self.nth_kind(n) == TokenKind::Comma {
            n += 1;
        }
        self.nth_kind(n) == TokenKind::RBracket
    }
}
