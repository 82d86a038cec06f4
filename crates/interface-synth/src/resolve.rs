//! Output groups, relative paths and cross-group imports.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use std::fmt;

/// File stem used for the group at the output root.
pub const ROOT_STEM: &str = "root";

/// The normalized relative directory that identifies an output group.
///
/// Keys are lower-cased and `/`-separated, with no leading or trailing slash.
/// The empty key is the root group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(String);

impl GroupKey {
    /// Normalizes a relative directory path (`Ordenes\Consultas` → `ordenes/consultas`).
    pub fn from_dir(dir: &str) -> Self {
        let segments: Vec<String> = split_segments(dir)
            .filter(|segment| *segment != ".")
            .map(str::to_lowercase)
            .collect();
        Self(segments.join("/"))
    }

    /// Returns the group of the directory containing `file`.
    pub fn for_file(file: &str) -> Self {
        let file = file.trim_end_matches(['/', '\\']);
        match file.rfind(['/', '\\']) {
            Some(i) => Self::from_dir(&file[..i]),
            None => Self::default(),
        }
    }

    /// Returns the key as a path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the root group.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the stem of the group's file: its last directory segment, or
    /// `root` for the root group.
    pub fn file_stem(&self) -> &str {
        match self.0.rsplit('/').next() {
            Some(last) if !last.is_empty() => last,
            _ => ROOT_STEM,
        }
    }

    /// Returns the group file's path relative to `src/`, without extension.
    pub fn module_path(&self) -> String {
        if self.is_root() {
            ROOT_STEM.to_string()
        } else {
            format!("{}/{}", self.0, self.file_stem())
        }
    }

    /// Returns the module specifier used to import `owner`'s file from this
    /// group's file.
    pub fn import_specifier(&self, owner: &GroupKey) -> String {
        let relative = relative_path(self.as_str(), owner.as_str());
        let path = if relative == "." {
            owner.file_stem().to_string()
        } else {
            format!("{relative}/{}", owner.file_stem())
        };
        if path.starts_with('.') {
            path
        } else {
            format!("./{path}")
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.0)
        }
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\']).filter(|segment| !segment.is_empty())
}

/// Computes the relative path from directory `from` to directory `to`.
///
/// Segments are compared case-insensitively. The result has one `../` per
/// segment of `from` past the common prefix followed by the rest of `to`, or
/// `.` when both name the same directory.
pub fn relative_path(from: &str, to: &str) -> String {
    let from: Vec<&str> = split_segments(from).collect();
    let to: Vec<&str> = split_segments(to).collect();

    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a.to_lowercase() == b.to_lowercase())
        .count();

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend(&to[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Maps declaration names to the group that owns them.
#[derive(Debug, Default)]
pub struct DeclarationRegistry {
    owners: FxHashMap<SmolStr, GroupKey>,
    /// Every (group, name) pair declared, duplicates included.
    declared: FxHashSet<(GroupKey, SmolStr)>,
}

impl DeclarationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` as owned by `group`.
    ///
    /// The first registration wins; returns the existing owner when `name` was
    /// already registered.
    pub fn register(&mut self, name: &str, group: &GroupKey) -> Option<&GroupKey> {
        self.declared.insert((group.clone(), SmolStr::new(name)));
        if self.owners.contains_key(name) {
            return self.owners.get(name);
        }
        self.owners.insert(SmolStr::new(name), group.clone());
        None
    }

    /// Returns the group owning `name`, if it was declared.
    pub fn owner(&self, name: &str) -> Option<&GroupKey> {
        self.owners.get(name)
    }

    /// Returns true if `group` declares `name` itself, whether or not it owns it.
    pub fn declares(&self, group: &GroupKey, name: &str) -> bool {
        self.declared.contains(&(group.clone(), SmolStr::new(name)))
    }

    /// Returns the number of registered names.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// The imports a group needs, keyed by owning group in first-reference order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    modules: IndexMap<GroupKey, Vec<SmolStr>>,
}

impl ImportSet {
    /// Creates an empty import set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a reference to `name` declared in `owner`.
    pub fn add(&mut self, name: &str, owner: &GroupKey) {
        let names = self.modules.entry(owner.clone()).or_default();
        if !names.iter().any(|existing| existing == name) {
            names.push(SmolStr::new(name));
        }
    }

    /// Returns true if no imports were recorded.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Returns the number of import lines.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Iterates over (owner, names) pairs in first-reference order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &[SmolStr])> {
        self.modules
            .iter()
            .map(|(owner, names)| (owner, names.as_slice()))
    }

    /// Renders one `import` line per owning group, as seen from `current`.
    pub fn render(&self, current: &GroupKey) -> String {
        let mut out = String::new();
        for (owner, names) in self.iter() {
            out.push_str(&format!(
                "import {{ {} }} from '{}';\n",
                names.join(", "),
                current.import_specifier(owner)
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_normalization() {
        assert_eq!(
            GroupKey::from_dir("Ordenes\\Consultas").as_str(),
            "ordenes/consultas"
        );
        assert_eq!(GroupKey::from_dir("./Ordenes/").as_str(), "ordenes");
        assert!(GroupKey::from_dir("").is_root());
        assert_eq!(GroupKey::for_file("Ordenes/Orden.cs").as_str(), "ordenes");
        assert!(GroupKey::for_file("Program.cs").is_root());
    }

    #[test]
    fn test_file_stem_and_module_path() {
        let key = GroupKey::from_dir("ordenes/consultas");
        assert_eq!(key.file_stem(), "consultas");
        assert_eq!(key.module_path(), "ordenes/consultas/consultas");
        assert_eq!(GroupKey::default().file_stem(), "root");
        assert_eq!(GroupKey::default().module_path(), "root");
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("a/b", "a/c"), "../c");
        assert_eq!(relative_path("a/b/c", "d"), "../../../d");
        assert_eq!(relative_path("a", "a/b"), "b");
        assert_eq!(relative_path("A\\B", "a/b"), ".");
        assert_eq!(relative_path("", "x/y"), "x/y");
        assert_eq!(relative_path("x/y", ""), "../..");
    }

    #[test]
    fn test_import_specifier() {
        let root = GroupKey::default();
        let ordenes = GroupKey::from_dir("ordenes");
        let consultas = GroupKey::from_dir("ordenes/consultas");
        assert_eq!(consultas.import_specifier(&ordenes), "../ordenes");
        assert_eq!(ordenes.import_specifier(&consultas), "./consultas/consultas");
        assert_eq!(root.import_specifier(&ordenes), "./ordenes/ordenes");
        assert_eq!(consultas.import_specifier(&root), "../../root");
    }

    #[test]
    fn test_registry_first_wins() {
        let mut registry = DeclarationRegistry::new();
        let a = GroupKey::from_dir("a");
        let b = GroupKey::from_dir("b");
        assert_eq!(registry.register("Foo", &a), None);
        assert_eq!(registry.register("Foo", &b), Some(&a));
        assert_eq!(registry.owner("Foo"), Some(&a));
        assert_eq!(registry.owner("Bar"), None);
        assert_eq!(registry.len(), 1);
        assert!(registry.declares(&a, "Foo"));
        assert!(registry.declares(&b, "Foo"));
        assert!(!registry.declares(&b, "Bar"));
    }

    #[test]
    fn test_import_set_render() {
        let mut imports = ImportSet::new();
        let current = GroupKey::from_dir("ventas");
        let clientes = GroupKey::from_dir("clientes");
        let comun = GroupKey::from_dir("comun");
        imports.add("Cliente", &clientes);
        imports.add("Moneda", &comun);
        imports.add("Direccion", &clientes);
        imports.add("Cliente", &clientes);
        assert_eq!(imports.len(), 2);
        assert_eq!(
            imports.render(&current),
            "import { Cliente, Direccion } from '../clientes/clientes';\n\
             import { Moneda } from '../comun/comun';\n"
        );
    }
}
