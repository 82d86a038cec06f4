//! Structured C# type expressions.

use smol_str::SmolStr;

/// Generic heads treated as a sequence of their single type argument.
pub const SEQUENCE_HEADS: &[&str] = &["List", "IEnumerable", "ICollection", "IList"];

/// Generic head treated as a map of its two type arguments.
pub const MAP_HEAD: &str = "Dictionary";

/// A C# type expression reduced to the shapes the mapper understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `T[]`
    Array(Box<TypeExpr>),
    /// `T?`
    Nullable(Box<TypeExpr>),
    /// `Dictionary<K, V>`
    Map {
        /// The key type.
        key: Box<TypeExpr>,
        /// The value type.
        value: Box<TypeExpr>,
    },
    /// `List<T>`, `IEnumerable<T>`, `ICollection<T>` or `IList<T>`.
    Sequence(Box<TypeExpr>),
    /// Anything else: primitives, user types and unrecognized generics, verbatim.
    Named(SmolStr),
}

impl TypeExpr {
    /// Parses type text by peeling one outermost suffix per step.
    ///
    /// `[]` is peeled before `?`, so `Foo?[]` is an array of nullable and
    /// `Foo[]?` a nullable array. A generic whose head or arity is not
    /// recognized is kept whole as a [`TypeExpr::Named`].
    pub fn parse(text: &str) -> TypeExpr {
        let text = text.trim();

        if let Some(element) = text.strip_suffix("[]") {
            return TypeExpr::Array(Box::new(TypeExpr::parse(element)));
        }
        if let Some(inner) = text.strip_suffix('?') {
            return TypeExpr::Nullable(Box::new(TypeExpr::parse(inner)));
        }
        if let Some(generic) = parse_generic(text) {
            return generic;
        }

        TypeExpr::Named(SmolStr::new(text))
    }
}

fn parse_generic(text: &str) -> Option<TypeExpr> {
    let open = text.find('<')?;
    let close = text.rfind('>')?;
    if close <= open {
        return None;
    }

    let head = text[..open].trim();
    let arguments = split_type_arguments(&text[open + 1..close]);
    match arguments.as_slice() {
        [key, value] if head == MAP_HEAD => Some(TypeExpr::Map {
            key: Box::new(TypeExpr::parse(key)),
            value: Box::new(TypeExpr::parse(value)),
        }),
        [element] if SEQUENCE_HEADS.contains(&head) => {
            Some(TypeExpr::Sequence(Box::new(TypeExpr::parse(element))))
        }
        _ => None,
    }
}

/// Splits a generic argument list on top-level commas.
///
/// Commas nested inside `<>`, `()` or `[]` belong to an inner argument, so
/// `string, Dictionary<string, int>` yields two arguments, not three.
pub fn split_type_arguments(list: &str) -> Vec<&str> {
    let mut arguments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in list.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                arguments.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = list[start..].trim();
    if !last.is_empty() || !arguments.is_empty() {
        arguments.push(last);
    }
    arguments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Box<TypeExpr> {
        Box::new(TypeExpr::Named(SmolStr::new(name)))
    }

    #[test]
    fn test_peel_order() {
        assert_eq!(
            TypeExpr::parse("Foo?[]"),
            TypeExpr::Array(Box::new(TypeExpr::Nullable(named("Foo"))))
        );
        assert_eq!(
            TypeExpr::parse("Foo[]?"),
            TypeExpr::Nullable(Box::new(TypeExpr::Array(named("Foo"))))
        );
    }

    #[test]
    fn test_recognized_generics() {
        assert_eq!(
            TypeExpr::parse("Dictionary<string, List<int>>"),
            TypeExpr::Map {
                key: named("string"),
                value: Box::new(TypeExpr::Sequence(named("int"))),
            }
        );
        assert_eq!(
            TypeExpr::parse("IEnumerable<Foo>"),
            TypeExpr::Sequence(named("Foo"))
        );
    }

    #[test]
    fn test_unrecognized_generics_stay_whole() {
        assert_eq!(TypeExpr::parse("Task<int>"), TypeExpr::Named("Task<int>".into()));
        assert_eq!(
            TypeExpr::parse("Dictionary<string>"),
            TypeExpr::Named("Dictionary<string>".into())
        );
        assert_eq!(
            TypeExpr::parse("List<int, int>"),
            TypeExpr::Named("List<int, int>".into())
        );
    }

    #[test]
    fn test_split_type_arguments() {
        assert_eq!(
            split_type_arguments("string, Dictionary<string, int>"),
            vec!["string", "Dictionary<string, int>"]
        );
        assert_eq!(split_type_arguments("(int, string)"), vec!["(int, string)"]);
        assert_eq!(split_type_arguments(""), Vec::<&str>::new());
        assert_eq!(split_type_arguments("int,"), vec!["int", ""]);
    }

    #[test]
    fn test_multidimensional_array_passes_through() {
        assert_eq!(TypeExpr::parse("int[,]"), TypeExpr::Named("int[,]".into()));
    }
}
