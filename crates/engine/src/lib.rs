//! The engine façade.
//!
//! An [`Engine`] is an explicit value owned by the host — there is no
//! process-global state. It wires the document store, the symbol store,
//! and the change bus together: documents come in through the lifecycle
//! operations, reparses replace their symbols atomically, and queries are
//! answered through the name resolver, the type aggregate, and the
//! expression resolver. All operations run on the host's serialized
//! loop; the only timer is the reparse debounce, driven by [`Engine::tick`].

pub mod providers;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use inference::{AggregateError, ExpressionResolver, TypeAggregate};
use lsp_types::{
    CompletionItem, Position, SignatureHelp, TextDocumentContentChangeEvent, TextDocumentItem, Url,
};
use store::{ChangeBus, DocumentChange, DocumentStore, EngineEvent, SymbolStore};
use symbols::{Symbol, SymbolReader, TypeString};
use syntax::SourceTree;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct Engine {
    documents: DocumentStore,
    symbols: SymbolStore,
    bus: ChangeBus,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            documents: DocumentStore::new(),
            symbols: SymbolStore::new(),
            bus: ChangeBus::new(),
        }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EngineEvent> {
        self.bus.subscribe()
    }

    pub fn store(&self) -> &SymbolStore {
        &self.symbols
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Open a live document: parse, index, announce. Returns the number
    /// of symbols indexed.
    pub fn open_document(&mut self, item: &TextDocumentItem) -> Result<usize> {
        let change = self
            .documents
            .open(item)
            .with_context(|| format!("opening {}", item.uri))?;
        let count = self.index_change(change);
        Ok(count)
    }

    /// Close a live document and drop its symbols.
    pub fn close_document(&mut self, uri: &Url) -> usize {
        let uri = uri.to_string();
        self.documents.close(&uri);
        let removed = self.symbols.remove(&uri);
        self.bus.send(EngineEvent::DocumentRemoved { uri });
        removed
    }

    /// Apply editor content changes; the reparse is debounced and runs on
    /// the next [`Engine::tick`] after the quiet window, or on demand via
    /// a query against the document.
    pub fn edit_document(
        &mut self,
        uri: &Url,
        version: i32,
        changes: &[TextDocumentContentChangeEvent],
    ) -> Result<()> {
        self.documents
            .edit(uri.as_str(), version, changes)
            .with_context(|| format!("editing {uri}"))?;
        Ok(())
    }

    /// Index a workspace document without keeping it open. Re-discovery
    /// of a known URI replaces its symbols. Returns the symbol count.
    pub fn discover(&mut self, item: &TextDocumentItem) -> Result<usize> {
        let uri = item.uri.to_string();
        if self.documents.contains(&uri) {
            // Already open; the live document wins.
            return Ok(0);
        }
        let started = Instant::now();
        let tree = SourceTree::parse(item.text.clone())
            .with_context(|| format!("parsing {uri}"))?;
        let table = Arc::new(SymbolReader::read(&tree, &uri));
        let count = self.index_change(DocumentChange { uri: uri.clone(), table });
        info!(uri = %uri, symbols = count, elapsed = ?started.elapsed(), "discovered document");
        Ok(count)
    }

    /// Drop a document from the index entirely. Returns the number of
    /// symbols removed.
    pub fn forget(&mut self, uri: &Url) -> usize {
        let uri = uri.to_string();
        self.documents.close(&uri);
        let removed = self.symbols.remove(&uri);
        self.bus.send(EngineEvent::DocumentRemoved { uri });
        removed
    }

    /// Force the pending reparse of one document, if any.
    pub fn flush(&mut self, uri: &Url) -> Result<()> {
        if let Some(change) = self.documents.flush(uri.as_str())? {
            self.index_change(change);
        }
        Ok(())
    }

    /// Run due debounced reparses. Hosts call this from their loop.
    pub fn tick(&mut self) {
        for change in self.documents.flush_due(Instant::now()) {
            self.index_change(change);
        }
    }

    fn index_change(&mut self, change: DocumentChange) -> usize {
        let count = self.symbols.on_document_change(&change.table);
        self.bus.send(EngineEvent::DocumentParsed(change));
        count
    }

    /// Reparse the target document if it has pending edits, so the query
    /// observes the edit → reparse → replace sequence in order.
    fn flush_for_query(&mut self, uri: &Url) {
        if let Ok(Some(change)) = self.documents.flush(uri.as_str()) {
            self.index_change(change);
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// The document's symbol tree, top-level symbols in source order.
    pub fn document_symbols(&mut self, uri: &Url) -> Vec<Symbol> {
        self.flush_for_query(uri);
        self.documents
            .get(uri.as_str())
            .map(|doc| doc.table().symbols.clone())
            .unwrap_or_default()
    }

    /// Case-insensitive substring search over the workspace index.
    pub fn workspace_symbols(&self, query: &str) -> Vec<Arc<Symbol>> {
        self.symbols.search(query)
    }

    /// Static type of the expression at a position.
    pub fn resolve_type(&mut self, uri: &Url, position: Position) -> TypeString {
        self.resolve_type_with(uri, position, &CancellationToken::new())
    }

    pub fn resolve_type_with(
        &mut self,
        uri: &Url,
        position: Position,
        cancel: &CancellationToken,
    ) -> TypeString {
        self.flush_for_query(uri);
        let Some(document) = self.documents.get(uri.as_str()) else {
            return TypeString::new();
        };
        let offset = document.tree().offset_at(position.line, position.character);
        let resolver = ExpressionResolver::new(&self.symbols, cancel.clone());
        resolver.resolve_at(document.tree(), document.table(), offset)
    }

    /// Inheritance aggregate for a class-like FQN.
    pub fn aggregate(&self, class_fqn: &str) -> std::result::Result<TypeAggregate, AggregateError> {
        TypeAggregate::build(&self.symbols, class_fqn, &CancellationToken::new())
    }

    // ── Providers ────────────────────────────────────────────────────────

    pub fn provide_completions(
        &mut self,
        uri: &Url,
        position: Position,
        cancel: &CancellationToken,
    ) -> Vec<CompletionItem> {
        self.flush_for_query(uri);
        let Some(document) = self.documents.get(uri.as_str()) else {
            return Vec::new();
        };
        providers::completion::provide(&self.symbols, document, position, cancel)
    }

    pub fn provide_signature_help(
        &mut self,
        uri: &Url,
        position: Position,
        cancel: &CancellationToken,
    ) -> Option<SignatureHelp> {
        self.flush_for_query(uri);
        let document = self.documents.get(uri.as_str())?;
        providers::signature::provide(&self.symbols, document, position, cancel)
    }

    pub fn provide_definition(
        &mut self,
        uri: &Url,
        position: Position,
        cancel: &CancellationToken,
    ) -> Vec<lsp_types::Location> {
        self.flush_for_query(uri);
        let Some(document) = self.documents.get(uri.as_str()) else {
            return Vec::new();
        };
        providers::definition::provide(&self.symbols, document, position, cancel)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a symbol location to an LSP location.
pub fn to_lsp_location(location: &symbols::Location) -> Option<lsp_types::Location> {
    let uri = Url::parse(&location.uri).ok()?;
    Some(lsp_types::Location {
        uri,
        range: lsp_types::Range {
            start: Position {
                line: location.start_line,
                character: location.start_col,
            },
            end: Position {
                line: location.end_line,
                character: location.end_col,
            },
        },
    })
}

/// Shared helper: byte offset of an LSP position in a document that may
/// have pending edits (the flushed tree is authoritative here).
pub(crate) fn offset_in(document: &store::Document, position: Position) -> usize {
    document.tree().offset_at(position.line, position.character)
}
