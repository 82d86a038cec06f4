//! AST types for the C# declaration subset.
//!
//! Only the shape of type declarations is kept: names, positional parameters,
//! properties and nesting. Bodies of methods, initializers and the like are
//! skipped by the parser and recorded as [`MemberDecl::Other`] spans.

use crate::span::Span;
use smol_str::SmolStr;

/// A parsed C# source file.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    /// The first namespace declared in the file, file-scoped or block.
    pub namespace: Option<SmolStr>,
    /// Top-level type declarations in document order.
    pub declarations: Vec<TypeDecl>,
    /// The span of the entire file.
    pub span: Span,
}

impl CompilationUnit {
    /// Returns every type declaration in the file, nested ones included,
    /// in document order (a parent before its children).
    pub fn all_declarations(&self) -> Vec<&TypeDecl> {
        let mut out = Vec::new();
        for decl in &self.declarations {
            decl.collect_self_and_nested(&mut out);
        }
        out
    }
}

/// The kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// `record` or `record class`.
    Record,
    /// `record struct`.
    RecordStruct,
    /// `class`.
    Class,
    /// `struct`.
    Struct,
    /// `interface`.
    Interface,
}

impl DeclKind {
    /// Returns true for both record flavours.
    pub fn is_record(&self) -> bool {
        matches!(self, DeclKind::Record | DeclKind::RecordStruct)
    }

    /// Returns the declaring keyword(s).
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclKind::Record => "record",
            DeclKind::RecordStruct => "record struct",
            DeclKind::Class => "class",
            DeclKind::Struct => "struct",
            DeclKind::Interface => "interface",
        }
    }
}

/// A type declaration.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    /// What kind of type this is.
    pub kind: DeclKind,
    /// The declared name, without type parameters.
    pub name: SmolStr,
    /// Type parameter names (`<T, U>`).
    pub type_parameters: Vec<SmolStr>,
    /// The positional parameter list (`record R(int A)` or a class primary constructor).
    pub parameters: Option<Vec<Parameter>>,
    /// Body members in document order.
    pub members: Vec<MemberDecl>,
    /// The span of the whole declaration, attributes included.
    pub span: Span,
}

impl TypeDecl {
    /// Returns every property declared anywhere in this declaration's body,
    /// including the bodies of nested declarations, in document order.
    pub fn descendant_properties(&self) -> Vec<&Property> {
        let mut out = Vec::new();
        self.collect_properties(&mut out);
        out
    }

    fn collect_properties<'a>(&'a self, out: &mut Vec<&'a Property>) {
        for member in &self.members {
            match member {
                MemberDecl::Property(prop) => out.push(prop),
                MemberDecl::Nested(nested) => nested.collect_properties(out),
                MemberDecl::Constructor(_) | MemberDecl::Other(_) => {}
            }
        }
    }

    fn collect_self_and_nested<'a>(&'a self, out: &mut Vec<&'a TypeDecl>) {
        out.push(self);
        for member in &self.members {
            if let MemberDecl::Nested(nested) = member {
                nested.collect_self_and_nested(out);
            }
        }
    }
}

/// A member of a type body.
#[derive(Debug, Clone)]
pub enum MemberDecl {
    /// A property (`Type Name { get; set; }` or `Type Name => expr;`).
    Property(Property),
    /// A constructor.
    Constructor(Constructor),
    /// A nested type declaration.
    Nested(TypeDecl),
    /// Any member the parser skips: fields, methods, events, indexers,
    /// operators, enums and delegates.
    Other(Span),
}

/// A property declaration.
#[derive(Debug, Clone)]
pub struct Property {
    /// The property name. For explicit interface implementations this is the
    /// last segment (`IFoo.Bar` → `Bar`).
    pub name: SmolStr,
    /// The declared type, verbatim from the source.
    pub ty: String,
    /// The span of the whole property.
    pub span: Span,
}

/// A constructor declaration.
#[derive(Debug, Clone)]
pub struct Constructor {
    /// The constructor parameters.
    pub parameters: Vec<Parameter>,
    /// The span of the whole constructor.
    pub span: Span,
}

/// A parameter in a positional or constructor parameter list.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// The parameter name.
    pub name: SmolStr,
    /// The declared type, verbatim from the source.
    pub ty: String,
    /// The span of the parameter.
    pub span: Span,
}
