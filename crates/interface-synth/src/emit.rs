//! Rendering TypeScript interface declarations.

use crate::mapping::TsType;
use smol_str::SmolStr;
use std::fmt::Write;

/// A translated member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// The camel-cased member name.
    pub name: String,
    /// The TypeScript type.
    pub ty: TsType,
}

impl Member {
    /// Creates a member from its C# name.
    pub fn new(source_name: &str, ty: TsType) -> Self {
        Self {
            name: camel_case(source_name),
            ty,
        }
    }
}

/// Lower-cases the first character of `name` and leaves the rest alone.
pub fn camel_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders an `export interface` block, ending with a newline.
///
/// ```
/// use interface_synth::{render_interface, Member, TsType};
///
/// let block = render_interface("Ping", &[], &[Member::new("Id", TsType::Named("number".into()))]);
/// assert_eq!(block, "export interface Ping {\n  id: number;\n}\n");
/// ```
pub fn render_interface(name: &str, type_parameters: &[SmolStr], members: &[Member]) -> String {
    let mut out = String::new();
    if type_parameters.is_empty() {
        let _ = writeln!(out, "export interface {name} {{");
    } else {
        let _ = writeln!(
            out,
            "export interface {name}<{}> {{",
            type_parameters.join(", ")
        );
    }
    for member in members {
        let _ = writeln!(out, "  {}: {};", member.name, member.ty);
    }
    out.push_str("}\n");
    out
}
