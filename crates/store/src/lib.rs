//! Shared state of the engine: the global symbol index, the live document
//! set, and the change-event bus that connects them.
//!
//! The symbol store is the only shared mutable structure in the system.
//! Mutation happens through `add` / `remove` / `on_document_change`;
//! readers hold `Arc` snapshots, so a reparse completing mid-query never
//! mutates what the query walks.

pub mod documents;
pub mod error;
pub mod events;
pub mod symbol_store;

pub use documents::{DEBOUNCE_WINDOW, Document, DocumentStore};
pub use error::StoreError;
pub use events::{ChangeBus, DocumentChange, EngineEvent};
pub use symbol_store::SymbolStore;
