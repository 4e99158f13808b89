//! Signature help for the call expression enclosing the cursor.

use inference::{ExpressionResolver, TypeAggregate};
use lsp_types::{
    Documentation, ParameterInformation, ParameterLabel, Position, SignatureHelp,
    SignatureInformation,
};
use store::{Document, SymbolStore};
use symbols::{NameKind, Symbol, SymbolKind};
use syntax::tree_sitter::Node;
use syntax::{SourceTree, kinds};
use tokio_util::sync::CancellationToken;

pub fn provide(
    store: &SymbolStore,
    document: &Document,
    position: Position,
    cancel: &CancellationToken,
) -> Option<SignatureHelp> {
    if cancel.is_cancelled() {
        return None;
    }
    let tree = document.tree();
    let offset = crate::offset_in(document, position);

    // The innermost argument list the cursor sits in.
    let mut current = tree.node_at_offset(offset);
    let mut arguments: Option<Node<'_>> = None;
    while let Some(node) = current {
        if node.kind() == kinds::ARGUMENTS && node.start_byte() < offset {
            arguments = Some(node);
            break;
        }
        current = node.parent();
    }
    let arguments = arguments?;
    let call = arguments.parent()?;

    let callable = callable_for(store, document, call, cancel)?;
    let parameters: Vec<ParameterInformation> = callable
        .parameters()
        .map(|p| ParameterInformation {
            label: ParameterLabel::Simple(format!("${}", p.name)),
            documentation: (!p.description.is_empty())
                .then(|| Documentation::String(p.description.clone())),
        })
        .collect();

    let active = active_parameter(tree, arguments, offset);
    Some(SignatureHelp {
        signatures: vec![SignatureInformation {
            label: callable.signature(),
            documentation: (!callable.description.is_empty())
                .then(|| Documentation::String(callable.description.clone())),
            parameters: Some(parameters),
            active_parameter: None,
        }],
        active_signature: Some(0),
        active_parameter: Some(active),
    })
}

/// The declared callable behind a call node, cloned out of the store.
fn callable_for(
    store: &SymbolStore,
    document: &Document,
    call: Node<'_>,
    cancel: &CancellationToken,
) -> Option<Symbol> {
    let tree = document.tree();
    let table = document.table();
    let resolver = ExpressionResolver::new(store, cancel.clone());

    match call.kind() {
        kinds::FUNCTION_CALL_EXPRESSION => {
            let function = call.child_by_field_name(kinds::fields::FUNCTION)?;
            if !matches!(function.kind(), kinds::NAME | kinds::QUALIFIED_NAME) {
                return None;
            }
            let fqn = table
                .resolver_at(call.start_byte())
                .resolve(tree.node_text(function), NameKind::Function);
            store
                .find_matching(&fqn, |s| s.kind == SymbolKind::Function)
                .first()
                .map(|s| (**s).clone())
        }
        kinds::MEMBER_CALL_EXPRESSION | kinds::NULLSAFE_MEMBER_CALL_EXPRESSION => {
            let object = call.child_by_field_name(kinds::fields::OBJECT)?;
            let name = call.child_by_field_name(kinds::fields::NAME)?;
            let receiver = resolver.resolve_node(tree, table, object);
            member_callable(store, &receiver, tree.node_text(name), cancel)
        }
        kinds::SCOPED_CALL_EXPRESSION => {
            let scope = call.child_by_field_name(kinds::fields::SCOPE)?;
            let name = call.child_by_field_name(kinds::fields::NAME)?;
            let receiver = resolver.resolve_node(tree, table, scope);
            member_callable(store, &receiver, tree.node_text(name), cancel)
        }
        kinds::OBJECT_CREATION_EXPRESSION => {
            let class = SourceTree::named_children_of(call)
                .into_iter()
                .find(|c| matches!(c.kind(), kinds::NAME | kinds::QUALIFIED_NAME))?;
            let fqn = table
                .resolver_at(call.start_byte())
                .resolve(tree.node_text(class), NameKind::ClassLike);
            member_callable(store, &symbols::TypeString::atom(fqn), "__construct", cancel)
        }
        _ => None,
    }
}

fn member_callable(
    store: &SymbolStore,
    receiver: &symbols::TypeString,
    name: &str,
    cancel: &CancellationToken,
) -> Option<Symbol> {
    for class_fqn in receiver.atomic_classes() {
        let Ok(aggregate) = TypeAggregate::build(store, class_fqn, cancel) else {
            continue;
        };
        if let Some(method) = aggregate.member(name, SymbolKind::Method) {
            return Some(method.clone());
        }
    }
    None
}

/// Zero-based index of the parameter the cursor is on: top-level commas
/// between the opening parenthesis and the cursor.
fn active_parameter(tree: &SourceTree, arguments: Node<'_>, offset: usize) -> u32 {
    let from = arguments.start_byte().min(offset);
    let slice = &tree.text()[from..offset];
    let mut depth = 0i32;
    let mut commas = 0u32;
    for ch in slice.chars() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            // Depth 1: directly inside the argument list's parenthesis.
            ',' if depth == 1 => commas += 1,
            _ => {}
        }
    }
    commas
}
