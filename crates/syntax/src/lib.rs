//! Read-only façade over the PHP parse tree.
//!
//! Parsing itself is delegated to tree-sitter with the `tree-sitter-php`
//! grammar; this crate owns a parsed document's source text together with
//! its tree and exposes everything the semantic layers need: ordered child
//! access, node-kind tags, source ranges, position mapping, a depth-first
//! visitor, and PHPDoc docblock parsing.

pub mod docblock;
pub mod kinds;
pub mod tree;
pub mod walk;

pub use tree_sitter;

pub use docblock::{Docblock, DocblockTag, MagicAccess};
pub use tree::{SourceTree, SyntaxError};
pub use walk::{TreeVisitor, walk};
