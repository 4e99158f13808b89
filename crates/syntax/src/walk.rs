//! Depth-first traversal over the parse tree.
//!
//! Traversal is strictly structural; visitors carry their own state and
//! decide per node whether the walk descends.

use tree_sitter::Node;

/// Visitor hooks for [`walk`]. `preorder` runs before a node's children
/// and its return value gates descent; `postorder` runs after them.
pub trait TreeVisitor {
    fn preorder(&mut self, node: Node<'_>) -> bool;

    fn postorder(&mut self, _node: Node<'_>) {}
}

/// Depth-first walk of `node` and its subtree, anonymous tokens included.
pub fn walk(node: Node<'_>, visitor: &mut impl TreeVisitor) {
    if visitor.preorder(node) {
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                walk(child, visitor);
            }
        }
    }
    visitor.postorder(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::SourceTree;

    struct KindCounter {
        target: &'static str,
        seen: usize,
        descend_into_classes: bool,
    }

    impl TreeVisitor for KindCounter {
        fn preorder(&mut self, node: Node<'_>) -> bool {
            if node.kind() == self.target {
                self.seen += 1;
            }
            self.descend_into_classes || node.kind() != crate::kinds::CLASS_DECLARATION
        }
    }

    #[test]
    fn walk_visits_every_node_once() {
        let tree = SourceTree::parse("<?php\nclass A { function f() {} }\n").unwrap();
        let mut counter = KindCounter {
            target: crate::kinds::METHOD_DECLARATION,
            seen: 0,
            descend_into_classes: true,
        };
        walk(tree.root(), &mut counter);
        assert_eq!(counter.seen, 1);
    }

    #[test]
    fn preorder_false_prunes_subtree() {
        let tree = SourceTree::parse("<?php\nclass A { function f() {} }\n").unwrap();
        let mut counter = KindCounter {
            target: crate::kinds::METHOD_DECLARATION,
            seen: 0,
            descend_into_classes: false,
        };
        walk(tree.root(), &mut counter);
        assert_eq!(counter.seen, 0);
    }
}
