//! Two-pass translation of parsed files into output groups.

use crate::emit::{render_interface, Member};
use crate::mapping::{PrimitiveMapping, TypeMapper};
use crate::members::{extract_members, DeclarationKind};
use crate::resolve::{DeclarationRegistry, GroupKey, ImportSet};
use csharp_parser::CompilationUnit;
use indexmap::IndexMap;
use smol_str::SmolStr;

/// A parsed source file.
#[derive(Debug, Clone, Copy)]
pub struct SourceFile<'a> {
    /// Path relative to the project root, `/` or `\` separated.
    pub path: &'a str,
    /// The parsed file.
    pub unit: &'a CompilationUnit,
}

/// One output file: the interfaces declared under one source directory.
#[derive(Debug, Clone, Default)]
pub struct OutputGroup {
    /// The group's key.
    pub key: GroupKey,
    /// Declaration names in emission order.
    pub declarations: Vec<SmolStr>,
    /// Rendered interface blocks in emission order.
    pub interfaces: Vec<String>,
    /// Imports from other groups.
    pub imports: ImportSet,
}

impl OutputGroup {
    fn new(key: GroupKey) -> Self {
        Self {
            key,
            ..Default::default()
        }
    }

    /// Returns the file path relative to the package root (`src/a/b/b.ts`).
    pub fn file_path(&self) -> String {
        format!("src/{}.ts", self.key.module_path())
    }

    /// Renders the file: imports and a blank line, then each interface followed
    /// by a blank line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.imports.is_empty() {
            out.push_str(&self.imports.render(&self.key));
            out.push('\n');
        }
        for interface in &self.interfaces {
            out.push_str(interface);
            out.push('\n');
        }
        out
    }
}

/// The translated output, groups in first-encounter order.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    /// Output groups keyed by normalized directory.
    pub groups: IndexMap<GroupKey, OutputGroup>,
}

impl Translation {
    /// Returns the total number of emitted interfaces.
    pub fn declaration_count(&self) -> usize {
        self.groups.values().map(|g| g.interfaces.len()).sum()
    }

    /// Returns true if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Renders `src/index.ts`, re-exporting every group.
    pub fn render_index(&self) -> String {
        let mut out = String::new();
        for key in self.groups.keys() {
            out.push_str(&format!("export * from './{}';\n", key.module_path()));
        }
        out
    }
}

/// Translates parsed C# files into TypeScript output groups.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    primitives: PrimitiveMapping,
}

impl Translator {
    /// Creates a translator with the given primitive table.
    pub fn new(primitives: PrimitiveMapping) -> Self {
        Self { primitives }
    }

    /// Returns the primitive table in use.
    pub fn primitives(&self) -> &PrimitiveMapping {
        &self.primitives
    }

    /// Translates `files`.
    ///
    /// Files are processed sorted by path, declarations in document order with
    /// nested ones included, so the same input always yields the same output.
    /// The first pass registers every declared name with its group; the second
    /// maps members and renders interfaces.
    pub fn translate(&self, files: &[SourceFile<'_>]) -> Translation {
        let mut files: Vec<&SourceFile<'_>> = files.iter().collect();
        files.sort_by(|a, b| a.path.cmp(b.path));

        let mut registry = DeclarationRegistry::new();
        for file in &files {
            let key = GroupKey::for_file(file.path);
            for decl in file.unit.all_declarations() {
                if DeclarationKind::of(decl).is_none() {
                    continue;
                }
                if let Some(first) = registry.register(&decl.name, &key) {
                    log::warn!(
                        "{}: `{}` is already declared in {}; references resolve there",
                        file.path,
                        decl.name,
                        first
                    );
                }
            }
        }
        log::debug!("registered {} declarations", registry.len());

        let mapper = TypeMapper::new(&self.primitives, &registry);
        let mut translation = Translation::default();
        for file in &files {
            let key = GroupKey::for_file(file.path);
            for decl in file.unit.all_declarations() {
                let Some(kind) = DeclarationKind::of(decl) else {
                    continue;
                };
                let group = translation
                    .groups
                    .entry(key.clone())
                    .or_insert_with(|| OutputGroup::new(key.clone()));

                let members: Vec<Member> = extract_members(decl, kind)
                    .into_iter()
                    .map(|m| Member::new(m.name, mapper.map_text(m.ty, &key, &mut group.imports)))
                    .collect();
                group
                    .interfaces
                    .push(render_interface(&decl.name, &decl.type_parameters, &members));
                group.declarations.push(decl.name.clone());
            }
        }
        translation
    }
}
