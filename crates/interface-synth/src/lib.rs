//! C# to TypeScript interface synthesis.
//!
//! This crate turns parsed C# declarations into TypeScript interface files:
//! - Parsing type text into [`TypeExpr`] (arrays, nullables, known containers)
//! - Mapping to [`TsType`] through an immutable [`PrimitiveMapping`]
//! - Extracting members from records and classes
//! - Grouping output by source directory and resolving cross-group imports
//!
//! # Example
//!
//! ```
//! use csharp_parser::parse;
//! use interface_synth::{SourceFile, Translator};
//!
//! let unit = parse("public record Orden(int Id, string? Cliente);").unit;
//! let files = [SourceFile { path: "Ordenes/Orden.cs", unit: &unit }];
//! let translation = Translator::default().translate(&files);
//!
//! let group = &translation.groups[0];
//! assert_eq!(group.file_path(), "src/ordenes/ordenes.ts");
//! assert!(group.render().contains("cliente: string | null;"));
//! ```

mod emit;
mod mapping;
mod members;
mod resolve;
mod translate;
mod type_expr;

pub use emit::{camel_case, render_interface, Member};
pub use mapping::{PrimitiveMapping, TsType, TypeMapper};
pub use members::{extract_members, DeclarationKind, SourceMember};
pub use resolve::{relative_path, DeclarationRegistry, GroupKey, ImportSet, ROOT_STEM};
pub use translate::{OutputGroup, SourceFile, Translation, Translator};
pub use type_expr::{split_type_arguments, TypeExpr, MAP_HEAD, SEQUENCE_HEADS};
