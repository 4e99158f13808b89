//! Go-to-definition.

use inference::{ExpressionResolver, TypeAggregate};
use lsp_types::Position;
use store::{Document, SymbolStore};
use symbols::{NameKind, SymbolKind};
use syntax::kinds;
use tokio_util::sync::CancellationToken;

pub fn provide(
    store: &SymbolStore,
    document: &Document,
    position: Position,
    cancel: &CancellationToken,
) -> Vec<lsp_types::Location> {
    if cancel.is_cancelled() {
        return Vec::new();
    }
    let tree = document.tree();
    let table = document.table();
    let offset = crate::offset_in(document, position);
    let Some(node) = tree.node_at_offset(offset) else {
        return Vec::new();
    };

    match node.kind() {
        kinds::VARIABLE_NAME if tree.node_text(node) == "$this" => table
            .class_like_at(offset)
            .and_then(|class| crate::to_lsp_location(&class.location))
            .into_iter()
            .collect(),
        kinds::NAME | kinds::QUALIFIED_NAME => {
            let resolver = ExpressionResolver::new(store, cancel.clone());
            if let Some(parent) = node.parent() {
                let name_side = parent
                    .child_by_field_name(kinds::fields::NAME)
                    .is_some_and(|n| n.id() == node.id());
                match parent.kind() {
                    kinds::MEMBER_ACCESS_EXPRESSION | kinds::NULLSAFE_MEMBER_ACCESS_EXPRESSION
                        if name_side =>
                    {
                        return member_definition(
                            store, document, parent, node, SymbolKind::Property, cancel,
                        );
                    }
                    kinds::MEMBER_CALL_EXPRESSION
                    | kinds::NULLSAFE_MEMBER_CALL_EXPRESSION
                    | kinds::SCOPED_CALL_EXPRESSION
                        if name_side =>
                    {
                        return member_definition(
                            store, document, parent, node, SymbolKind::Method, cancel,
                        );
                    }
                    kinds::CLASS_CONSTANT_ACCESS_EXPRESSION => {
                        let children = syntax::SourceTree::named_children_of(parent);
                        if children.last().is_some_and(|last| last.id() == node.id())
                            && children.len() > 1
                        {
                            let receiver =
                                resolver.resolve_node(tree, table, children[0]);
                            return member_locations(
                                store,
                                &receiver,
                                tree.node_text(node),
                                SymbolKind::ClassConstant,
                                cancel,
                            );
                        }
                    }
                    kinds::FUNCTION_CALL_EXPRESSION => {
                        let fqn = table
                            .resolver_at(offset)
                            .resolve(tree.node_text(node), NameKind::Function);
                        return symbol_locations(store, &fqn, |k| k == SymbolKind::Function);
                    }
                    _ => {}
                }
            }
            // A written class-like (extends/implements/use/new/hint) or,
            // failing that, a function or constant of the same spelling.
            let written = tree.node_text(node);
            let resolver = table.resolver_at(offset);
            let class_fqn = resolver.resolve(written, NameKind::ClassLike);
            let found = symbol_locations(store, &class_fqn, |k| k.is_class_like());
            if !found.is_empty() {
                return found;
            }
            let function_fqn = resolver.resolve(written, NameKind::Function);
            let found = symbol_locations(store, &function_fqn, |k| k == SymbolKind::Function);
            if !found.is_empty() {
                return found;
            }
            let constant_fqn = resolver.resolve(written, NameKind::Constant);
            symbol_locations(store, &constant_fqn, |k| k == SymbolKind::Constant)
        }
        _ => Vec::new(),
    }
}

fn member_definition(
    store: &SymbolStore,
    document: &Document,
    access: syntax::tree_sitter::Node<'_>,
    name_node: syntax::tree_sitter::Node<'_>,
    kind: SymbolKind,
    cancel: &CancellationToken,
) -> Vec<lsp_types::Location> {
    let tree = document.tree();
    let table = document.table();
    let receiver_node = access
        .child_by_field_name(kinds::fields::OBJECT)
        .or_else(|| access.child_by_field_name(kinds::fields::SCOPE));
    let Some(receiver_node) = receiver_node else {
        return Vec::new();
    };
    let resolver = ExpressionResolver::new(store, cancel.clone());
    let receiver = resolver.resolve_node(tree, table, receiver_node);
    member_locations(store, &receiver, tree.node_text(name_node), kind, cancel)
}

fn member_locations(
    store: &SymbolStore,
    receiver: &symbols::TypeString,
    name: &str,
    kind: SymbolKind,
    cancel: &CancellationToken,
) -> Vec<lsp_types::Location> {
    let name = name.trim_start_matches('$');
    let mut out = Vec::new();
    for class_fqn in receiver.atomic_classes() {
        let Ok(aggregate) = TypeAggregate::build(store, class_fqn, cancel) else {
            continue;
        };
        if let Some(member) = aggregate.member(name, kind)
            && let Some(location) = crate::to_lsp_location(&member.location)
        {
            out.push(location);
        }
    }
    out
}

fn symbol_locations(
    store: &SymbolStore,
    fqn: &str,
    kind_filter: impl Fn(SymbolKind) -> bool,
) -> Vec<lsp_types::Location> {
    store
        .find_matching(fqn, |s| kind_filter(s.kind))
        .iter()
        .filter_map(|s| crate::to_lsp_location(&s.location))
        .collect()
}
