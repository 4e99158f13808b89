//! Source text plus parse tree for a single document.

use thiserror::Error;
use tree_sitter::{Node, Parser, Point, Tree};

/// Errors from the parsing seam. Parse *errors inside the source* are not
/// represented here — tree-sitter recovers and the tree carries ERROR
/// nodes; [`SourceTree::has_errors`] reports their presence.
#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("grammar rejected by tree-sitter runtime: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("tree-sitter produced no tree")]
    NoTree,
}

/// A parsed document: the text and its tree, kept together so node ranges
/// always index into the text they came from. Immutable between reparses.
pub struct SourceTree {
    text: String,
    tree: Tree,
}

impl SourceTree {
    /// Parse PHP source text into a tree.
    pub fn parse(text: impl Into<String>) -> Result<Self, SyntaxError> {
        let text = text.into();
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_php::LANGUAGE_PHP.into())?;
        let tree = parser.parse(text.as_bytes(), None).ok_or(SyntaxError::NoTree)?;
        Ok(Self { text, tree })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Whether tree-sitter had to error-recover anywhere in the document.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Text covered by a node. Empty for nodes with invalid UTF-8 ranges,
    /// which tree-sitter does not produce for UTF-8 input.
    pub fn node_text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.text.as_bytes()).unwrap_or("")
    }

    /// Byte offset of an LSP position (UTF-16 column units).
    pub fn offset_at(&self, line: u32, character: u32) -> usize {
        let mut remaining_lines = line;
        let mut offset = 0usize;
        let bytes = self.text.as_bytes();
        while remaining_lines > 0 && offset < bytes.len() {
            if bytes[offset] == b'\n' {
                remaining_lines -= 1;
            }
            offset += 1;
        }
        let mut units = 0u32;
        for ch in self.text[offset..].chars() {
            if units >= character || ch == '\n' {
                break;
            }
            units += ch.len_utf16() as u32;
            offset += ch.len_utf8();
        }
        offset
    }

    /// LSP position (line, UTF-16 character) of a byte offset.
    pub fn position_at(&self, offset: usize) -> (u32, u32) {
        let clamped = offset.min(self.text.len());
        let mut line = 0u32;
        let mut line_start = 0usize;
        for (idx, byte) in self.text.as_bytes()[..clamped].iter().enumerate() {
            if *byte == b'\n' {
                line += 1;
                line_start = idx + 1;
            }
        }
        let character = self.text[line_start..clamped]
            .chars()
            .map(|c| c.len_utf16() as u32)
            .sum();
        (line, character)
    }

    /// Smallest named node covering the byte offset.
    pub fn node_at_offset(&self, offset: usize) -> Option<Node<'_>> {
        let end = (offset + 1).min(self.text.len());
        self.root().named_descendant_for_byte_range(offset, end.max(offset))
    }

    /// Ordered list of all children, anonymous tokens included.
    pub fn children_of<'t>(node: Node<'t>) -> Vec<Node<'t>> {
        (0..node.child_count()).filter_map(|i| node.child(i)).collect()
    }

    /// Ordered list of named children.
    pub fn named_children_of<'t>(node: Node<'t>) -> Vec<Node<'t>> {
        (0..node.named_child_count()).filter_map(|i| node.named_child(i)).collect()
    }

    /// First child (named or not) with the given kind tag.
    pub fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        (0..node.child_count()).filter_map(|i| node.child(i)).find(|c| c.kind() == kind)
    }

    /// The `/** ... */` comment immediately preceding a declaration, if any.
    /// Plain `//` and `/* */` comments in between are skipped.
    pub fn docblock_before<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        let mut prev = node.prev_sibling();
        while let Some(sibling) = prev {
            if sibling.kind() != crate::kinds::COMMENT {
                return None;
            }
            if self.node_text(sibling).starts_with("/**") {
                return Some(sibling);
            }
            prev = sibling.prev_sibling();
        }
        None
    }
}

impl std::fmt::Debug for SourceTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceTree")
            .field("bytes", &self.text.len())
            .field("has_errors", &self.has_errors())
            .finish()
    }
}

/// Convert a tree-sitter point to (line, column).
pub fn point_to_line_col(point: Point) -> (u32, u32) {
    (point.row as u32, point.column as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_php_and_exposes_root() {
        let tree = SourceTree::parse("<?php\nclass A {}\n").unwrap();
        assert_eq!(tree.root().kind(), crate::kinds::PROGRAM);
        assert!(!tree.has_errors());
    }

    #[test]
    fn reports_recovered_errors() {
        let tree = SourceTree::parse("<?php\nclass {\n").unwrap();
        assert!(tree.has_errors());
    }

    #[test]
    fn maps_positions_to_offsets_and_back() {
        let tree = SourceTree::parse("<?php\n$a = 1;\n").unwrap();
        let offset = tree.offset_at(1, 0);
        assert_eq!(&tree.text()[offset..offset + 2], "$a");
        assert_eq!(tree.position_at(offset), (1, 0));
    }

    #[test]
    fn finds_docblock_before_declaration() {
        let tree = SourceTree::parse("<?php\n/** Summary. */\nclass A {}\n").unwrap();
        let class = SourceTree::child_of_kind(tree.root(), crate::kinds::CLASS_DECLARATION)
            .expect("class node");
        let doc = tree.docblock_before(class).expect("docblock");
        assert!(tree.node_text(doc).contains("Summary"));
    }
}
