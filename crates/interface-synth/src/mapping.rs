//! Mapping C# type expressions to TypeScript types.

use crate::resolve::{DeclarationRegistry, GroupKey, ImportSet};
use crate::type_expr::TypeExpr;
use indexmap::IndexMap;
use smol_str::SmolStr;
use std::fmt;

/// Built-in C# → TypeScript primitive table.
const BUILTIN_PRIMITIVES: &[(&str, &str)] = &[
    ("string", "string"),
    ("char", "string"),
    ("int", "number"),
    ("long", "number"),
    ("short", "number"),
    ("byte", "number"),
    ("sbyte", "number"),
    ("uint", "number"),
    ("ulong", "number"),
    ("ushort", "number"),
    ("decimal", "number"),
    ("double", "number"),
    ("float", "number"),
    ("bool", "boolean"),
    ("DateTime", "string"),
    ("DateTimeOffset", "string"),
    ("DateOnly", "string"),
    ("TimeOnly", "string"),
    ("TimeSpan", "string"),
    ("Guid", "string"),
    ("object", "any"),
    ("dynamic", "any"),
];

/// Names that map to `void`.
const VOID_SENTINELS: &[&str] = &["Unit", "void"];

/// The primitive lookup table.
///
/// Built once before translation; there is no way to change it afterwards.
#[derive(Debug, Clone)]
pub struct PrimitiveMapping {
    table: IndexMap<SmolStr, SmolStr>,
}

impl PrimitiveMapping {
    /// Creates the built-in table.
    pub fn builtin() -> Self {
        Self::with_overrides(std::iter::empty::<(SmolStr, SmolStr)>())
    }

    /// Creates the built-in table with extra or replacement entries.
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<SmolStr>,
        V: Into<SmolStr>,
    {
        let mut table: IndexMap<SmolStr, SmolStr> = BUILTIN_PRIMITIVES
            .iter()
            .map(|(cs, ts)| (SmolStr::new(cs), SmolStr::new(ts)))
            .collect();
        for (cs, ts) in overrides {
            table.insert(cs.into(), ts.into());
        }
        Self { table }
    }

    /// Looks up the TypeScript type for a C# name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.table.get(name).map(SmolStr::as_str)
    }

    /// Iterates over the table in definition order, overrides last.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table.iter().map(|(cs, ts)| (cs.as_str(), ts.as_str()))
    }
}

impl Default for PrimitiveMapping {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A TypeScript type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsType {
    /// A primitive or a referenced declaration, by name.
    Named(SmolStr),
    /// `void`
    Void,
    /// `T[]`
    Array(Box<TsType>),
    /// `T | null`
    Nullable(Box<TsType>),
    /// `Record<K, V>`
    Record(Box<TsType>, Box<TsType>),
}

impl TsType {
    /// Returns true if the rendered type is a top-level union, which needs
    /// parentheses as an array element.
    fn is_union(&self) -> bool {
        match self {
            TsType::Nullable(_) => true,
            TsType::Named(name) => name.contains('|'),
            _ => false,
        }
    }
}

impl fmt::Display for TsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TsType::Named(name) => f.write_str(name),
            TsType::Void => f.write_str("void"),
            TsType::Array(element) if element.is_union() => write!(f, "({element})[]"),
            TsType::Array(element) => write!(f, "{element}[]"),
            TsType::Nullable(inner) => write!(f, "{inner} | null"),
            TsType::Record(key, value) => write!(f, "Record<{key}, {value}>"),
        }
    }
}

/// Maps type expressions, recording the imports they need.
pub struct TypeMapper<'a> {
    primitives: &'a PrimitiveMapping,
    registry: &'a DeclarationRegistry,
}

impl<'a> TypeMapper<'a> {
    /// Creates a mapper over a primitive table and the declared names.
    pub fn new(primitives: &'a PrimitiveMapping, registry: &'a DeclarationRegistry) -> Self {
        Self {
            primitives,
            registry,
        }
    }

    /// Maps `expr` as written inside `current`.
    ///
    /// A reference to a declaration owned by another group is added to
    /// `imports`. Names that are neither primitives nor declared pass through
    /// unchanged without an import.
    pub fn map(&self, expr: &TypeExpr, current: &GroupKey, imports: &mut ImportSet) -> TsType {
        match expr {
            TypeExpr::Array(element) => {
                TsType::Array(Box::new(self.map(element, current, imports)))
            }
            TypeExpr::Nullable(inner) => {
                TsType::Nullable(Box::new(self.map(inner, current, imports)))
            }
            TypeExpr::Map { key, value } => TsType::Record(
                Box::new(self.map(key, current, imports)),
                Box::new(self.map(value, current, imports)),
            ),
            TypeExpr::Sequence(element) => {
                TsType::Array(Box::new(self.map(element, current, imports)))
            }
            TypeExpr::Named(name) => self.map_name(name, current, imports),
        }
    }

    /// Parses and maps raw type text.
    pub fn map_text(&self, text: &str, current: &GroupKey, imports: &mut ImportSet) -> TsType {
        self.map(&TypeExpr::parse(text), current, imports)
    }

    fn map_name(&self, name: &SmolStr, current: &GroupKey, imports: &mut ImportSet) -> TsType {
        if let Some(primitive) = self.primitives.get(name) {
            return TsType::Named(SmolStr::new(primitive));
        }
        if VOID_SENTINELS.contains(&name.as_str()) {
            return TsType::Void;
        }
        if self.registry.declares(current, name) {
            return TsType::Named(name.clone());
        }
        if let Some(owner) = self.registry.owner(name) {
            if owner != current {
                imports.add(name, owner);
            }
        }
        TsType::Named(name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(text: &str) -> String {
        let primitives = PrimitiveMapping::builtin();
        let registry = DeclarationRegistry::new();
        let mut imports = ImportSet::new();
        TypeMapper::new(&primitives, &registry)
            .map_text(text, &GroupKey::default(), &mut imports)
            .to_string()
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(map("Foo[]"), "Foo[]");
        assert_eq!(map("Foo?"), "Foo | null");
        assert_eq!(map("Foo[]?"), "Foo[] | null");
        assert_eq!(map("Foo?[]"), "(Foo | null)[]");
        assert_eq!(map("int?[]?"), "(number | null)[] | null");
    }

    #[test]
    fn test_union_override_in_array() {
        let primitives = PrimitiveMapping::with_overrides([("Money", "number | string")]);
        let registry = DeclarationRegistry::new();
        let mut imports = ImportSet::new();
        let mapper = TypeMapper::new(&primitives, &registry);
        let current = GroupKey::default();
        assert_eq!(
            mapper.map_text("Money[]", &current, &mut imports).to_string(),
            "(number | string)[]"
        );
        assert_eq!(
            mapper.map_text("List<Money>", &current, &mut imports).to_string(),
            "(number | string)[]"
        );
        assert_eq!(
            mapper.map_text("Money?", &current, &mut imports).to_string(),
            "number | string | null"
        );
    }

    #[test]
    fn test_containers() {
        assert_eq!(map("Dictionary<string, int>"), "Record<string, number>");
        assert_eq!(map("List<int>"), "number[]");
        assert_eq!(map("ICollection<Guid?>"), "(string | null)[]");
        assert_eq!(
            map("Dictionary<string, List<decimal>>"),
            "Record<string, number[]>"
        );
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(map("Foo"), "Foo");
        assert_eq!(map("Task<int>"), "Task<int>");
        assert_eq!(map("HashSet<string>"), "HashSet<string>");
    }

    #[test]
    fn test_primitives_and_void() {
        assert_eq!(map("DateTime"), "string");
        assert_eq!(map("bool"), "boolean");
        assert_eq!(map("dynamic"), "any");
        assert_eq!(map("Unit"), "void");
        assert_eq!(map("void"), "void");
    }

    #[test]
    fn test_overrides() {
        let primitives = PrimitiveMapping::with_overrides([("decimal", "string"), ("Money", "number")]);
        let registry = DeclarationRegistry::new();
        let mapper = TypeMapper::new(&primitives, &registry);
        let mut imports = ImportSet::new();
        let root = GroupKey::default();
        assert_eq!(mapper.map_text("decimal", &root, &mut imports).to_string(), "string");
        assert_eq!(mapper.map_text("Money?", &root, &mut imports).to_string(), "number | null");
        assert_eq!(primitives.entries().last(), Some(("Money", "number")));
    }

    #[test]
    fn test_imports_only_for_other_groups() {
        let primitives = PrimitiveMapping::builtin();
        let mut registry = DeclarationRegistry::new();
        let ventas = GroupKey::from_dir("ventas");
        let clientes = GroupKey::from_dir("clientes");
        registry.register("Cliente", &clientes);
        registry.register("Factura", &ventas);
        let mapper = TypeMapper::new(&primitives, &registry);

        let mut imports = ImportSet::new();
        let ty = mapper.map_text("Dictionary<string, List<Cliente>>", &ventas, &mut imports);
        assert_eq!(ty.to_string(), "Record<string, Cliente[]>");
        mapper.map_text("Factura", &ventas, &mut imports);
        mapper.map_text("Desconocido", &ventas, &mut imports);
        assert_eq!(imports.len(), 1);
        assert_eq!(
            imports.render(&ventas),
            "import { Cliente } from '../clientes/clientes';\n"
        );
    }
}
