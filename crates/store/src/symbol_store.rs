//! Global symbol index keyed by FQN.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use symbols::{Symbol, SymbolKind, SymbolTable};
use tracing::debug;

use crate::error::{Result, StoreError};

/// The workspace-wide index. Overloaded names across documents are kept
/// side by side; queries filter by kind when they care.
///
/// Keys are case-folded for class-likes and functions and exact for
/// constants; one leading separator is stripped on insertion. Symbols are
/// stored behind `Arc`, so query results are snapshots that stay valid
/// across a concurrent replace.
#[derive(Debug, Default)]
pub struct SymbolStore {
    by_key: FxHashMap<String, Vec<Arc<Symbol>>>,
    by_uri: FxHashMap<String, Vec<String>>,
}

/// Index key for a top-level symbol name under the language case rules.
fn fqn_key(name: &str, kind: SymbolKind) -> String {
    let name = name.strip_prefix('\\').unwrap_or(name);
    if kind.case_sensitive() {
        name.to_string()
    } else {
        name.to_lowercase()
    }
}

impl SymbolStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert all top-level symbols of a document. Fails fast when the
    /// URI is already indexed.
    pub fn add(&mut self, table: &SymbolTable) -> Result<usize> {
        if self.by_uri.contains_key(&table.uri) {
            return Err(StoreError::DuplicateDocument {
                uri: table.uri.clone(),
            });
        }
        let mut keys = Vec::new();
        let mut added = 0usize;
        for symbol in table.indexable() {
            let key = fqn_key(&symbol.name, symbol.kind);
            self.by_key
                .entry(key.clone())
                .or_default()
                .push(Arc::new(symbol.clone()));
            keys.push(key);
            added += 1;
        }
        self.by_uri.insert(table.uri.clone(), keys);
        debug!(uri = %table.uri, symbols = added, "indexed document");
        Ok(added)
    }

    /// Drop every symbol registered under the URI. Returns the number of
    /// symbols removed.
    pub fn remove(&mut self, uri: &str) -> usize {
        let Some(keys) = self.by_uri.remove(uri) else {
            return 0;
        };
        let mut removed = 0usize;
        for key in keys {
            if let Some(list) = self.by_key.get_mut(&key) {
                let before = list.len();
                list.retain(|s| s.location.uri != uri);
                removed += before - list.len();
                if list.is_empty() {
                    self.by_key.remove(&key);
                }
            }
        }
        removed
    }

    /// Atomic replace for one document: remove whatever the URI owned,
    /// insert the new table.
    pub fn on_document_change(&mut self, table: &SymbolTable) -> usize {
        self.remove(&table.uri);
        // The URI was just removed, so add cannot fail.
        self.add(table).unwrap_or(0)
    }

    /// Exact lookup under the case rules of each symbol space.
    pub fn find(&self, fqn: &str) -> Vec<Arc<Symbol>> {
        let folded = fqn_key(fqn, SymbolKind::Class);
        let exact = fqn_key(fqn, SymbolKind::Constant);
        let mut out: Vec<Arc<Symbol>> = Vec::new();
        for key in [folded.as_str(), exact.as_str()] {
            if let Some(list) = self.by_key.get(key) {
                for symbol in list {
                    let case_ok = if symbol.kind.case_sensitive() {
                        symbol.name.trim_start_matches('\\') == exact
                    } else {
                        true
                    };
                    if case_ok && !out.iter().any(|s| Arc::ptr_eq(s, symbol)) {
                        out.push(symbol.clone());
                    }
                }
            }
        }
        out
    }

    /// Exact lookup filtered by a predicate (usually a kind check).
    pub fn find_matching(
        &self,
        fqn: &str,
        predicate: impl Fn(&Symbol) -> bool,
    ) -> Vec<Arc<Symbol>> {
        self.find(fqn).into_iter().filter(|s| predicate(s)).collect()
    }

    /// First class-like symbol with this FQN, if any.
    pub fn class_like(&self, fqn: &str) -> Option<Arc<Symbol>> {
        self.find(fqn).into_iter().find(|s| s.is_class_like())
    }

    /// Symbols whose FQN starts with the prefix, case-insensitively.
    /// Sorted stably by name; suitable for completion.
    pub fn match_prefix(&self, prefix: &str) -> Vec<Arc<Symbol>> {
        self.match_by(|key| key.starts_with(&prefix.to_lowercase()))
    }

    /// Symbols whose FQN contains the query, case-insensitively. Sorted
    /// stably by name; suitable for workspace symbol search.
    pub fn search(&self, query: &str) -> Vec<Arc<Symbol>> {
        let query = query.to_lowercase();
        self.match_by(|key| key.contains(&query))
    }

    fn match_by(&self, matches: impl Fn(&str) -> bool) -> Vec<Arc<Symbol>> {
        let mut out: Vec<Arc<Symbol>> = Vec::new();
        for (key, list) in &self.by_key {
            if matches(&key.to_lowercase()) {
                out.extend(list.iter().cloned());
            }
        }
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.location.uri.cmp(&b.location.uri)));
        out
    }

    pub fn symbol_count(&self) -> usize {
        self.by_key.values().map(Vec::len).sum()
    }

    pub fn document_count(&self) -> usize {
        self.by_uri.len()
    }

    pub fn contains_document(&self, uri: &str) -> bool {
        self.by_uri.contains_key(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symbols::{SymbolReader, SymbolTable};
    use syntax::SourceTree;

    fn table(uri: &str, source: &str) -> SymbolTable {
        let tree = SourceTree::parse(source).unwrap();
        SymbolReader::read(&tree, uri)
    }

    #[test]
    fn add_then_remove_round_trips() {
        let mut store = SymbolStore::new();
        let t = table("file:///a.php", "<?php\nnamespace X;\nclass Y {}\nfunction f() {}\n");
        store.add(&t).unwrap();
        assert_eq!(store.symbol_count(), 2);
        assert_eq!(store.remove("file:///a.php"), 2);
        assert_eq!(store.symbol_count(), 0);
        assert!(store.find("X\\Y").is_empty());
    }

    #[test]
    fn duplicate_add_is_an_error() {
        let mut store = SymbolStore::new();
        let t = table("file:///a.php", "<?php\nclass A {}\n");
        store.add(&t).unwrap();
        assert!(matches!(
            store.add(&t),
            Err(StoreError::DuplicateDocument { .. })
        ));
    }

    #[test]
    fn overloaded_fqns_across_documents() {
        let mut store = SymbolStore::new();
        store
            .add(&table("file:///a.php", "<?php\nnamespace X;\nclass Y {}\n"))
            .unwrap();
        store
            .add(&table("file:///b.php", "<?php\nnamespace X;\nclass Y {}\n"))
            .unwrap();
        assert_eq!(store.find("X\\Y").len(), 2);
        store.remove("file:///a.php");
        let left = store.find("X\\Y");
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].location.uri, "file:///b.php");
    }

    #[test]
    fn class_lookup_folds_case_constant_lookup_does_not() {
        let mut store = SymbolStore::new();
        store
            .add(&table(
                "file:///a.php",
                "<?php\nnamespace App;\nclass User {}\nconst LIMIT = 1;\n",
            ))
            .unwrap();
        assert!(store.class_like("app\\user").is_some());
        assert!(!store.find("App\\LIMIT").is_empty());
        assert!(store.find("App\\limit").is_empty());
    }

    #[test]
    fn leading_separator_is_stripped_on_lookup() {
        let mut store = SymbolStore::new();
        store
            .add(&table("file:///a.php", "<?php\nnamespace App;\nclass User {}\n"))
            .unwrap();
        assert!(store.class_like("\\App\\User").is_some());
    }

    #[test]
    fn replace_swaps_a_documents_symbols() {
        let mut store = SymbolStore::new();
        store
            .add(&table("file:///a.php", "<?php\nclass Old {}\n"))
            .unwrap();
        store.on_document_change(&table("file:///a.php", "<?php\nclass New {}\n"));
        assert!(store.find("Old").is_empty());
        assert_eq!(store.find("New").len(), 1);
    }

    #[test]
    fn prefix_match_is_sorted_and_case_insensitive() {
        let mut store = SymbolStore::new();
        store
            .add(&table(
                "file:///a.php",
                "<?php\nnamespace App;\nclass Zeta {}\nclass Alpha {}\nclass Apple {}\n",
            ))
            .unwrap();
        let names: Vec<String> = store
            .match_prefix("app\\a")
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(names, vec!["App\\Alpha", "App\\Apple"]);
    }
}
