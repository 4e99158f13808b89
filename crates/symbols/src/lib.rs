//! Symbol model and per-document symbol extraction.
//!
//! The model side defines [`Symbol`] records, the modifier bitset, and the
//! [`TypeString`] union algebra. The extraction side walks a parsed
//! document and produces its [`SymbolTable`]: the symbol tree, the import
//! table, and the namespace regions, with docblock-derived types and
//! descriptions merged in. Name resolution is purely lexical and lives in
//! [`resolver`].

pub mod imports;
pub mod model;
pub mod reader;
pub mod resolver;
pub mod table;
pub mod typestring;

pub use imports::{ImportKind, ImportRule, ImportTable};
pub use model::{Location, Modifiers, Symbol, SymbolKind};
pub use reader::SymbolReader;
pub use resolver::{NameKind, NameResolver};
pub use table::{NamespaceRegion, SymbolTable};
pub use typestring::TypeString;
