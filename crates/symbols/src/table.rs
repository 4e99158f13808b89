//! The per-document symbol table: the symbol tree, the import table, and
//! the namespace regions. Immutable between reparses; replaced atomically.

use serde::{Deserialize, Serialize};

use crate::imports::ImportTable;
use crate::model::{Symbol, SymbolKind};
use crate::resolver::NameResolver;

/// Byte span over which a namespace statement is in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRegion {
    pub name: String,
    pub start_byte: u32,
    pub end_byte: u32,
}

/// Everything the reader extracts from one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    pub uri: String,
    /// Top-level symbols in source order: namespace declarations, plus
    /// classes, interfaces, traits, functions, and constants, each keyed
    /// by FQN. Members hang off their class-like parent.
    pub symbols: Vec<Symbol>,
    pub imports: ImportTable,
    pub regions: Vec<NamespaceRegion>,
}

impl SymbolTable {
    /// Total number of symbols in the tree, members included.
    pub fn symbol_count(&self) -> usize {
        fn count(symbol: &Symbol) -> usize {
            1 + symbol.children.iter().map(count).sum::<usize>()
        }
        self.symbols.iter().map(count).sum()
    }

    /// Depth-first flattening of the symbol tree.
    pub fn flatten(&self) -> Vec<&Symbol> {
        fn push<'a>(symbol: &'a Symbol, out: &mut Vec<&'a Symbol>) {
            out.push(symbol);
            for child in &symbol.children {
                push(child, out);
            }
        }
        let mut out = Vec::new();
        for symbol in &self.symbols {
            push(symbol, &mut out);
        }
        out
    }

    /// Symbols the global store indexes by FQN.
    pub fn indexable(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols
            .iter()
            .filter(|s| s.kind != SymbolKind::Namespace)
    }

    /// Namespace in effect at a byte offset. Braced regions nest inside
    /// the document-wide default region, so the narrowest match wins.
    pub fn namespace_at(&self, offset: usize) -> &str {
        let offset = offset as u32;
        self.regions
            .iter()
            .filter(|r| r.start_byte <= offset && offset < r.end_byte)
            .min_by_key(|r| r.end_byte - r.start_byte)
            .map(|r| r.name.as_str())
            .unwrap_or("")
    }

    /// Deepest class-like declaration covering the offset.
    pub fn class_like_at(&self, offset: usize) -> Option<&Symbol> {
        self.symbols
            .iter()
            .filter(|s| s.is_class_like() && s.location.contains_offset(offset))
            .last()
    }

    /// Function or method body covering the offset, if any.
    pub fn callable_at(&self, offset: usize) -> Option<&Symbol> {
        for symbol in &self.symbols {
            if symbol.kind == SymbolKind::Function && symbol.location.contains_offset(offset) {
                return Some(symbol);
            }
            if symbol.is_class_like() && symbol.location.contains_offset(offset) {
                if let Some(method) = symbol.children.iter().find(|c| {
                    c.kind == SymbolKind::Method && c.location.contains_offset(offset)
                }) {
                    return Some(method);
                }
            }
        }
        None
    }

    /// Name resolver for a byte offset: the namespace in effect there plus
    /// the document's imports.
    pub fn resolver_at(&self, offset: usize) -> NameResolver {
        NameResolver::new(self.namespace_at(offset), self.imports.clone())
    }
}
