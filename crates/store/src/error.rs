//! Error types for the store crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// `add` of a URI that is already indexed. Callers must `remove`
    /// first; `on_document_change` does so atomically.
    #[error("document already indexed: {uri}")]
    DuplicateDocument { uri: String },

    /// Operation against a URI the document store does not hold.
    #[error("unknown document: {uri}")]
    UnknownDocument { uri: String },

    #[error(transparent)]
    Syntax(#[from] syntax::SyntaxError),
}
