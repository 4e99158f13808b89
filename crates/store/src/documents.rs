//! Live document set with debounced reparse.
//!
//! A document's buffer is authoritative from the moment an edit lands;
//! its parse tree and symbol table lag until the quiet window elapses or a
//! query forces a `flush`. Between reparses the tree and table are
//! immutable, and a completed reparse swaps them atomically.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lsp_types::{TextDocumentContentChangeEvent, TextDocumentItem};
use rustc_hash::FxHashMap;
use symbols::{SymbolReader, SymbolTable};
use syntax::SourceTree;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::events::DocumentChange;

/// Quiet window between the last edit and the automatic reparse.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(250);

pub struct Document {
    uri: String,
    version: i32,
    buffer: String,
    tree: Arc<SourceTree>,
    table: Arc<SymbolTable>,
    dirty_since: Option<Instant>,
}

impl Document {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// The last parsed tree. May lag the buffer while an edit is pending.
    pub fn tree(&self) -> &Arc<SourceTree> {
        &self.tree
    }

    pub fn table(&self) -> &Arc<SymbolTable> {
        &self.table
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }
}

#[derive(Default)]
pub struct DocumentStore {
    documents: FxHashMap<String, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a document: parse immediately and build its symbol table.
    pub fn open(&mut self, item: &TextDocumentItem) -> Result<DocumentChange> {
        let uri = item.uri.to_string();
        if self.documents.contains_key(&uri) {
            return Err(StoreError::DuplicateDocument { uri });
        }
        let started = Instant::now();
        let tree = SourceTree::parse(item.text.clone())?;
        let table = Arc::new(SymbolReader::read(&tree, &uri));
        debug!(
            uri = %uri,
            symbols = table.symbol_count(),
            elapsed = ?started.elapsed(),
            "parsed document"
        );
        let change = DocumentChange {
            uri: uri.clone(),
            table: table.clone(),
        };
        self.documents.insert(
            uri.clone(),
            Document {
                uri,
                version: item.version,
                buffer: item.text.clone(),
                tree: Arc::new(tree),
                table,
                dirty_since: None,
            },
        );
        Ok(change)
    }

    pub fn close(&mut self, uri: &str) -> Option<Document> {
        self.documents.remove(uri)
    }

    pub fn get(&self, uri: &str) -> Option<&Document> {
        self.documents.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Apply LSP content changes to the buffer and start (or restart) the
    /// quiet window. Ranges address the buffer as already updated by the
    /// preceding change in the same batch.
    pub fn edit(
        &mut self,
        uri: &str,
        version: i32,
        changes: &[TextDocumentContentChangeEvent],
    ) -> Result<()> {
        let document = self
            .documents
            .get_mut(uri)
            .ok_or_else(|| StoreError::UnknownDocument { uri: uri.to_string() })?;
        for change in changes {
            match change.range {
                Some(range) => {
                    let start = offset_at(&document.buffer, range.start.line, range.start.character);
                    let end = offset_at(&document.buffer, range.end.line, range.end.character);
                    let (start, end) = (start.min(end), end.max(start));
                    document.buffer.replace_range(start..end, &change.text);
                }
                None => document.buffer = change.text.clone(),
            }
        }
        document.version = version;
        document.dirty_since = Some(Instant::now());
        Ok(())
    }

    /// Force an immediate reparse of one document if it has pending edits.
    pub fn flush(&mut self, uri: &str) -> Result<Option<DocumentChange>> {
        let document = self
            .documents
            .get_mut(uri)
            .ok_or_else(|| StoreError::UnknownDocument { uri: uri.to_string() })?;
        Self::reparse(document)
    }

    /// Reparse every document whose quiet window has elapsed at `now`.
    /// Ordering is per document; across documents any interleaving is
    /// fine (§ scheduling: this runs on the serialized loop).
    pub fn flush_due(&mut self, now: Instant) -> Vec<DocumentChange> {
        let mut out = Vec::new();
        for document in self.documents.values_mut() {
            if let Some(since) = document.dirty_since
                && now.duration_since(since) >= DEBOUNCE_WINDOW
                && let Ok(Some(change)) = Self::reparse(document)
            {
                out.push(change);
            }
        }
        out
    }

    fn reparse(document: &mut Document) -> Result<Option<DocumentChange>> {
        if document.dirty_since.is_none() {
            return Ok(None);
        }
        let started = Instant::now();
        let tree = SourceTree::parse(document.buffer.clone())?;
        let table = Arc::new(SymbolReader::read(&tree, &document.uri));
        document.tree = Arc::new(tree);
        document.table = table.clone();
        document.dirty_since = None;
        debug!(
            uri = %document.uri,
            symbols = table.symbol_count(),
            elapsed = ?started.elapsed(),
            "reparsed document"
        );
        Ok(Some(DocumentChange {
            uri: document.uri.clone(),
            table,
        }))
    }
}

/// Byte offset of an LSP position (UTF-16 columns) in a plain buffer.
fn offset_at(text: &str, line: u32, character: u32) -> usize {
    let mut remaining = line;
    let mut offset = 0usize;
    let bytes = text.as_bytes();
    while remaining > 0 && offset < bytes.len() {
        if bytes[offset] == b'\n' {
            remaining -= 1;
        }
        offset += 1;
    }
    let mut units = 0u32;
    for ch in text[offset..].chars() {
        if units >= character || ch == '\n' {
            break;
        }
        units += ch.len_utf16() as u32;
        offset += ch.len_utf8();
    }
    offset
}
