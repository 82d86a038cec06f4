//! Member extraction from parsed declarations.

use csharp_parser::{DeclKind, TypeDecl};

/// How a declaration contributes members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// Records: positional parameters, then body properties.
    RecordLike,
    /// Classes and structs: body properties only.
    ClassLike,
}

impl DeclarationKind {
    /// Classifies a parsed declaration. Interfaces produce nothing.
    pub fn of(decl: &TypeDecl) -> Option<Self> {
        match decl.kind {
            DeclKind::Interface => None,
            kind if kind.is_record() => Some(DeclarationKind::RecordLike),
            _ => Some(DeclarationKind::ClassLike),
        }
    }
}

/// A member as written in C#: its name and raw type text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMember<'a> {
    /// The member name.
    pub name: &'a str,
    /// The raw type text.
    pub ty: &'a str,
}

/// Extracts the members of a declaration in output order.
///
/// Records yield their positional parameters followed by every property in
/// the body, nested bodies included. Classes yield only the properties;
/// neither constructor parameters nor a primary constructor count. Duplicate
/// names are kept.
pub fn extract_members(decl: &TypeDecl, kind: DeclarationKind) -> Vec<SourceMember<'_>> {
    let mut members = Vec::new();

    if kind == DeclarationKind::RecordLike {
        if let Some(parameters) = &decl.parameters {
            members.extend(parameters.iter().map(|p| SourceMember {
                name: &p.name,
                ty: &p.ty,
            }));
        }
    }

    members.extend(decl.descendant_properties().into_iter().map(|p| SourceMember {
        name: &p.name,
        ty: &p.ty,
    }));
    members
}
