//! Type-string arithmetic.
//!
//! A type-string is an unordered union of atomic type texts: scalar tags
//! (`int`, `string`, ...) or FQNs. Atoms keep insertion order for stable
//! display, but equality and merging treat the union as a set. The empty
//! union is distinct from `mixed`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

/// Scalar tags that are never namespace-qualified.
const KEYWORD_TYPES: &[&str] = &[
    "int", "integer", "string", "bool", "boolean", "float", "double", "array", "mixed", "void",
    "null", "self", "static", "$this", "parent", "callable", "iterable", "object", "resource",
    "true", "false", "never",
];

pub fn is_keyword_type(atom: &str) -> bool {
    let base = atom.split('<').next().unwrap_or(atom);
    let base = base.trim_end_matches("[]");
    KEYWORD_TYPES.iter().any(|k| k.eq_ignore_ascii_case(base))
}

/// An unordered, deduplicated union of atomic type texts.
#[derive(Debug, Clone, Default, Eq)]
pub struct TypeString {
    atoms: SmallVec<[String; 2]>,
}

impl TypeString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-atom type. The atom is normalized (trimmed, one leading
    /// separator stripped); an empty atom yields the empty union.
    pub fn atom(text: impl AsRef<str>) -> Self {
        let mut ts = Self::new();
        ts.push(text.as_ref());
        ts
    }

    /// Parse a written union like `int|User|null`. `?T` expands to
    /// `T|null`. Nested unions inside generic arguments are not split.
    pub fn from_text(text: &str) -> Self {
        let mut ts = Self::new();
        let trimmed = text.trim();
        let (trimmed, nullable) = match trimmed.strip_prefix('?') {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };
        for part in split_union(trimmed) {
            ts.push(part);
        }
        if nullable {
            ts.push("null");
        }
        ts
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn atoms(&self) -> impl Iterator<Item = &str> {
        self.atoms.iter().map(String::as_str)
    }

    /// Union with another type-string. Commutative up to atom order,
    /// associative, idempotent; merging with the empty union is identity.
    pub fn merge(mut self, other: &TypeString) -> TypeString {
        for atom in other.atoms() {
            self.push(atom);
        }
        self
    }

    /// Atoms that name classes rather than scalar tags.
    pub fn atomic_classes(&self) -> Vec<&str> {
        self.atoms()
            .filter(|a| !is_keyword_type(a) && !a.ends_with("[]") && !a.contains('<'))
            .collect()
    }

    /// Element types when every atom is a container form: `T[]`,
    /// `array<K, V>`, `array<V>`, or `iterable<V>`. Plain `array` and
    /// `iterable` contribute nothing.
    pub fn element_types(&self) -> TypeString {
        let mut out = TypeString::new();
        for atom in self.atoms() {
            if let Some(base) = atom.strip_suffix("[]") {
                out.push(base);
            } else if let Some(args) = generic_arguments(atom) {
                if let Some(last) = split_generic_args(args).last() {
                    out.push(last);
                }
            }
        }
        out
    }

    /// Replace `self`/`static`/`$this` atoms with the given class FQN.
    pub fn bind_class_context(&self, class_fqn: &str) -> TypeString {
        let mut out = TypeString::new();
        for atom in self.atoms() {
            if atom.eq_ignore_ascii_case("self")
                || atom.eq_ignore_ascii_case("static")
                || atom == "$this"
                || atom.eq_ignore_ascii_case("parent")
            {
                out.push(class_fqn);
            } else {
                out.push(atom);
            }
        }
        out
    }

    fn push(&mut self, atom: &str) {
        let normalized = atom.trim().trim_start_matches('\\');
        if normalized.is_empty() {
            return;
        }
        if !self.atoms.iter().any(|existing| existing == normalized) {
            self.atoms.push(normalized.to_string());
        }
    }
}

/// Split a union on `|`, ignoring separators nested in generic arguments.
fn split_union(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '<' | '(' => depth += 1,
            '>' | ')' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// The `K, V` part of `array<K, V>`, if the atom is generic.
fn generic_arguments(atom: &str) -> Option<&str> {
    let open = atom.find('<')?;
    let close = atom.rfind('>')?;
    if close <= open {
        return None;
    }
    Some(&atom[open + 1..close])
}

fn split_generic_args(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (idx, ch) in args.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(args[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    let last = args[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

impl PartialEq for TypeString {
    fn eq(&self, other: &Self) -> bool {
        self.atoms.len() == other.atoms.len()
            && self.atoms().all(|a| other.atoms.iter().any(|b| b == a))
    }
}

impl std::fmt::Display for TypeString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.atoms.join("|"))
    }
}

impl Serialize for TypeString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TypeString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(TypeString::from_text(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_commutative_associative_idempotent() {
        let a = TypeString::from_text("Foo|int");
        let b = TypeString::from_text("Bar");
        let c = TypeString::from_text("int|Baz");

        assert_eq!(a.clone().merge(&b), b.clone().merge(&a));
        assert_eq!(
            a.clone().merge(&b).merge(&c),
            a.clone().merge(&b.clone().merge(&c))
        );
        assert_eq!(a.clone().merge(&a), a);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let a = TypeString::from_text("Foo");
        assert_eq!(a.clone().merge(&TypeString::new()), a);
        assert_eq!(TypeString::new().merge(&a), a);
    }

    #[test]
    fn empty_differs_from_mixed() {
        assert_ne!(TypeString::new(), TypeString::from_text("mixed"));
        assert!(TypeString::new().is_empty());
        assert!(!TypeString::from_text("mixed").is_empty());
    }

    #[test]
    fn nullable_shorthand_expands() {
        assert_eq!(TypeString::from_text("?Foo"), TypeString::from_text("Foo|null"));
    }

    #[test]
    fn atoms_normalize_leading_separator() {
        assert_eq!(TypeString::from_text("\\App\\User").to_string(), "App\\User");
    }

    #[test]
    fn atomic_classes_skip_keywords_and_containers() {
        let ts = TypeString::from_text("int|App\\User|array<int, App\\Post>|string[]");
        assert_eq!(ts.atomic_classes(), vec!["App\\User"]);
    }

    #[test]
    fn element_types_of_container_forms() {
        assert_eq!(
            TypeString::from_text("App\\User[]").element_types(),
            TypeString::from_text("App\\User")
        );
        assert_eq!(
            TypeString::from_text("array<int, App\\User>").element_types(),
            TypeString::from_text("App\\User")
        );
        assert_eq!(
            TypeString::from_text("iterable<App\\User>").element_types(),
            TypeString::from_text("App\\User")
        );
        assert!(TypeString::from_text("array").element_types().is_empty());
    }

    #[test]
    fn textual_round_trip() {
        let ts = TypeString::from_text("Foo|null|int");
        assert_eq!(TypeString::from_text(&ts.to_string()), ts);
    }

    #[test]
    fn bind_class_context_substitutes_self_forms() {
        let ts = TypeString::from_text("static|int");
        assert_eq!(
            ts.bind_class_context("App\\User"),
            TypeString::from_text("App\\User|int")
        );
    }
}
