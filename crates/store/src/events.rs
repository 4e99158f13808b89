//! Broadcast bus for document-change events.
//!
//! Consumers that need to react to reparses (the symbol store, host
//! diagnostics, tests) subscribe; producers fire and forget. A send with
//! no receivers is not an error.

use std::sync::Arc;

use symbols::SymbolTable;
use tokio::sync::broadcast::{self, Receiver, Sender};

/// Payload for a completed (re)parse: the document's fresh symbol table.
#[derive(Clone, Debug)]
pub struct DocumentChange {
    pub uri: String,
    pub table: Arc<SymbolTable>,
}

#[derive(Clone, Debug)]
pub enum EngineEvent {
    /// A document was parsed or reparsed and its symbols replaced.
    DocumentParsed(DocumentChange),
    /// A document left the engine; its symbols were dropped.
    DocumentRemoved { uri: String },
}

#[derive(Clone, Debug)]
pub struct ChangeBus {
    sender: Sender<EngineEvent>,
}

impl ChangeBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self { sender }
    }

    pub fn send(&self, event: EngineEvent) {
        if self.sender.send(event).is_err() {
            // No receivers; nothing to deliver to.
            tracing::debug!("change bus has no subscribers, dropping event");
        }
    }

    pub fn subscribe(&self) -> Receiver<EngineEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}
