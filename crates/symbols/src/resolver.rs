//! Lexical name resolution.
//!
//! Resolution is a pure function of the current namespace and the import
//! table — no symbol-store lookups. The canonical output form has no
//! leading separator; re-resolving a canonical FQN therefore requires the
//! written fully-qualified form (`\` prefix), under which resolution is
//! idempotent.

use crate::imports::ImportTable;

pub const SEPARATOR: char = '\\';

/// The symbol space a written name is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    ClassLike,
    Function,
    Constant,
}

/// Resolver for one document position: the namespace in effect there plus
/// the document's import table.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    pub namespace: String,
    pub imports: ImportTable,
}

impl NameResolver {
    pub fn new(namespace: impl Into<String>, imports: ImportTable) -> Self {
        Self {
            namespace: namespace.into(),
            imports,
        }
    }

    /// Resolve a written name to a canonical FQN (no leading separator).
    ///
    /// Written-name relativities:
    /// - fully qualified (`\A\B`): taken verbatim,
    /// - relative (`namespace\A`): current namespace prepended,
    /// - unqualified: import table, then current namespace.
    pub fn resolve(&self, written: &str, kind: NameKind) -> String {
        Self::resolve_with(&self.namespace, &self.imports, written, kind)
    }

    /// Qualify a declared name with the current namespace. Declarations
    /// never consult the import table.
    pub fn qualify(&self, name: &str) -> String {
        Self::qualify_in(&self.namespace, name)
    }

    pub fn qualify_in(namespace: &str, name: &str) -> String {
        let name = name.trim_start_matches(SEPARATOR);
        if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}{SEPARATOR}{name}")
        }
    }

    pub fn resolve_with(
        namespace: &str,
        imports: &ImportTable,
        written: &str,
        kind: NameKind,
    ) -> String {
        let written = written.trim();
        if written.is_empty() {
            return String::new();
        }

        // Fully qualified: verbatim, minus the leading separator.
        if let Some(rest) = written.strip_prefix(SEPARATOR) {
            return rest.to_string();
        }

        // Relative: `namespace\X` prepends the current namespace.
        if let Some(rest) = strip_relative_prefix(written) {
            return Self::qualify_in(namespace, rest);
        }

        // Unqualified: split into head and tail and try the import table.
        let (head, tail) = match written.find(SEPARATOR) {
            Some(idx) => (&written[..idx], &written[idx + 1..]),
            None => (written, ""),
        };

        match kind {
            NameKind::ClassLike => {
                if let Some(rule) = imports.find_class(head) {
                    return if tail.is_empty() {
                        rule.target.clone()
                    } else {
                        format!("{}{SEPARATOR}{tail}", rule.target)
                    };
                }
            }
            NameKind::Function if tail.is_empty() => {
                if let Some(rule) = imports.find_function(head) {
                    return rule.target.clone();
                }
            }
            NameKind::Constant if tail.is_empty() => {
                if let Some(rule) = imports.find_constant(head) {
                    return rule.target.clone();
                }
            }
            _ => {}
        }

        Self::qualify_in(namespace, written)
    }
}

/// Strip a leading `namespace\` keyword segment, case-insensitively.
fn strip_relative_prefix(written: &str) -> Option<&str> {
    let idx = written.find(SEPARATOR)?;
    if written[..idx].eq_ignore_ascii_case("namespace") {
        Some(&written[idx + 1..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::ImportKind;

    fn resolver() -> NameResolver {
        let mut imports = ImportTable::new();
        imports.add("E", "C\\D", ImportKind::Class);
        imports.add("strlen2", "Acme\\strlen2", ImportKind::Function);
        imports.add("LIMIT", "Acme\\LIMIT", ImportKind::Constant);
        NameResolver::new("A\\B", imports)
    }

    #[test]
    fn fully_qualified_names_are_verbatim() {
        let r = resolver();
        assert_eq!(r.resolve("\\X\\Y", NameKind::ClassLike), "X\\Y");
    }

    #[test]
    fn relative_names_prepend_namespace() {
        let r = resolver();
        assert_eq!(r.resolve("namespace\\Sub\\T", NameKind::ClassLike), "A\\B\\Sub\\T");
    }

    #[test]
    fn unqualified_class_uses_import_alias() {
        let r = resolver();
        assert_eq!(r.resolve("E", NameKind::ClassLike), "C\\D");
        assert_eq!(r.resolve("E\\G", NameKind::ClassLike), "C\\D\\G");
        assert_eq!(r.resolve("e\\G", NameKind::ClassLike), "C\\D\\G");
    }

    #[test]
    fn unqualified_without_import_prepends_namespace() {
        let r = resolver();
        assert_eq!(r.resolve("F", NameKind::ClassLike), "A\\B\\F");
        assert_eq!(r.resolve("Sub\\F", NameKind::ClassLike), "A\\B\\Sub\\F");
    }

    #[test]
    fn function_and_constant_aliases_only_match_bare_names() {
        let r = resolver();
        assert_eq!(r.resolve("strlen2", NameKind::Function), "Acme\\strlen2");
        assert_eq!(r.resolve("STRLEN2", NameKind::Function), "Acme\\strlen2");
        assert_eq!(r.resolve("LIMIT", NameKind::Constant), "Acme\\LIMIT");
        // Case-sensitive for constants.
        assert_eq!(r.resolve("limit", NameKind::Constant), "A\\B\\limit");
        // Qualified function names skip the alias step.
        assert_eq!(r.resolve("strlen2\\x", NameKind::Function), "A\\B\\strlen2\\x");
    }

    #[test]
    fn no_namespace_returns_name_unchanged() {
        let r = NameResolver::new("", ImportTable::new());
        assert_eq!(r.resolve("F", NameKind::ClassLike), "F");
    }

    #[test]
    fn resolution_is_idempotent_on_written_fqns() {
        let r = resolver();
        for (written, kind) in [
            ("E\\G", NameKind::ClassLike),
            ("F", NameKind::ClassLike),
            ("strlen2", NameKind::Function),
            ("LIMIT", NameKind::Constant),
            ("\\Already\\Fq", NameKind::ClassLike),
        ] {
            let once = r.resolve(written, kind);
            let again = r.resolve(&format!("\\{once}"), kind);
            assert_eq!(once, again);
        }
    }
}
