//! Per-document import (`use`) table.

use serde::{Deserialize, Serialize};

/// Which symbol space an import rule targets. Plain `use` statements
/// import class-likes; `use function` and `use const` are kind-tagged at
/// the statement or group-element level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportKind {
    Class,
    Function,
    Constant,
}

/// One alias: `use Target as Alias;`. The target is stored canonically,
/// without a leading separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRule {
    pub alias: String,
    pub target: String,
    pub kind: ImportKind,
}

/// The document's alias table. Lookups follow the language case rules:
/// class and function aliases match case-insensitively, constant aliases
/// exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTable {
    rules: Vec<ImportRule>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, alias: impl Into<String>, target: impl Into<String>, kind: ImportKind) {
        let target: String = target.into();
        self.rules.push(ImportRule {
            alias: alias.into(),
            target: target.trim_start_matches('\\').to_string(),
            kind,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[ImportRule] {
        &self.rules
    }

    pub fn find_class(&self, alias: &str) -> Option<&ImportRule> {
        self.rules
            .iter()
            .find(|r| r.kind == ImportKind::Class && r.alias.eq_ignore_ascii_case(alias))
    }

    pub fn find_function(&self, alias: &str) -> Option<&ImportRule> {
        self.rules
            .iter()
            .find(|r| r.kind == ImportKind::Function && r.alias.eq_ignore_ascii_case(alias))
    }

    pub fn find_constant(&self, alias: &str) -> Option<&ImportRule> {
        self.rules
            .iter()
            .find(|r| r.kind == ImportKind::Constant && r.alias == alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_lookup_is_case_insensitive() {
        let mut table = ImportTable::new();
        table.add("Request", "Http\\Request", ImportKind::Class);
        assert!(table.find_class("request").is_some());
        assert!(table.find_class("REQUEST").is_some());
        assert!(table.find_function("Request").is_none());
    }

    #[test]
    fn constant_lookup_is_case_sensitive() {
        let mut table = ImportTable::new();
        table.add("LIMIT", "App\\LIMIT", ImportKind::Constant);
        assert!(table.find_constant("LIMIT").is_some());
        assert!(table.find_constant("limit").is_none());
    }

    #[test]
    fn targets_are_stored_without_leading_separator() {
        let mut table = ImportTable::new();
        table.add("User", "\\App\\User", ImportKind::Class);
        assert_eq!(table.find_class("User").unwrap().target, "App\\User");
    }
}
