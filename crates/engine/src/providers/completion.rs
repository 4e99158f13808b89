//! Completion: member lists behind `->` / `::`, workspace names otherwise.

use inference::{ExpressionResolver, MergeStrategy, TypeAggregate};
use lsp_types::{CompletionItem, CompletionItemKind, Position};
use store::{Document, SymbolStore};
use symbols::{Modifiers, NameKind, Symbol, SymbolKind};
use syntax::tree_sitter::Node;
use syntax::{SourceTree, kinds};
use tokio_util::sync::CancellationToken;

enum Trigger {
    /// `expr->` — instance members.
    Member { subject_end: usize },
    /// `Expr::` — static members and constants.
    Scoped { subject_end: usize },
    /// A bare name being typed.
    Name,
}

pub fn provide(
    store: &SymbolStore,
    document: &Document,
    position: Position,
    cancel: &CancellationToken,
) -> Vec<CompletionItem> {
    if cancel.is_cancelled() {
        return Vec::new();
    }
    let tree = document.tree();
    let table = document.table();
    let offset = crate::offset_in(document, position);
    let text = tree.text();

    let prefix_start = identifier_start(text, offset);
    let prefix = text[prefix_start..offset].trim_start_matches('$');
    let head = &text[..prefix_start];

    let trigger = if head.ends_with("?->") {
        Trigger::Member { subject_end: prefix_start - 3 }
    } else if head.ends_with("->") {
        Trigger::Member { subject_end: prefix_start - 2 }
    } else if head.ends_with("::") {
        Trigger::Scoped { subject_end: prefix_start - 2 }
    } else {
        Trigger::Name
    };

    let mut items = match trigger {
        Trigger::Member { subject_end } => member_items(
            store, document, subject_end, prefix, false, cancel,
        ),
        Trigger::Scoped { subject_end } => member_items(
            store, document, subject_end, prefix, true, cancel,
        ),
        Trigger::Name => {
            if prefix.is_empty() || text[prefix_start..offset].starts_with('$') {
                return Vec::new();
            }
            name_items(store, table, offset, prefix)
        }
    };
    items.sort_by(|a, b| a.label.cmp(&b.label));
    items
}

/// Start of the identifier chunk being typed at the cursor.
fn identifier_start(text: &str, offset: usize) -> usize {
    text[..offset]
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || matches!(c, '_' | '\\' | '$'))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(offset)
}

/// Largest expression ending exactly where the access operator begins.
fn subject_node(tree: &SourceTree, end: usize) -> Option<Node<'_>> {
    let mut node = tree.node_at_offset(end.checked_sub(1)?)?;
    if node.kind() == kinds::NAME
        && let Some(parent) = node.parent()
        && parent.kind() == kinds::VARIABLE_NAME
    {
        node = parent;
    }
    while let Some(parent) = node.parent() {
        if parent.end_byte() == node.end_byte() && is_subject_kind(parent.kind()) {
            node = parent;
        } else {
            break;
        }
    }
    Some(node)
}

fn is_subject_kind(kind: &str) -> bool {
    matches!(
        kind,
        kinds::MEMBER_ACCESS_EXPRESSION
            | kinds::NULLSAFE_MEMBER_ACCESS_EXPRESSION
            | kinds::MEMBER_CALL_EXPRESSION
            | kinds::NULLSAFE_MEMBER_CALL_EXPRESSION
            | kinds::SCOPED_CALL_EXPRESSION
            | kinds::SCOPED_PROPERTY_ACCESS_EXPRESSION
            | kinds::FUNCTION_CALL_EXPRESSION
            | kinds::PARENTHESIZED_EXPRESSION
            | kinds::OBJECT_CREATION_EXPRESSION
            | kinds::QUALIFIED_NAME
    )
}

fn member_items(
    store: &SymbolStore,
    document: &Document,
    subject_end: usize,
    prefix: &str,
    scoped: bool,
    cancel: &CancellationToken,
) -> Vec<CompletionItem> {
    let tree = document.tree();
    let table = document.table();
    let Some(subject) = subject_node(tree, subject_end) else {
        return Vec::new();
    };
    let resolver = ExpressionResolver::new(store, cancel.clone());
    let receiver = resolver.resolve_node(tree, table, subject);

    // Where the cursor sits decides how much visibility it gets.
    let enclosing = table.class_like_at(subject_end).map(|c| c.name.clone());

    let mut out: Vec<CompletionItem> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    for class_fqn in receiver.atomic_classes() {
        if cancel.is_cancelled() {
            return Vec::new();
        }
        let Ok(aggregate) = TypeAggregate::build(store, class_fqn, cancel) else {
            continue;
        };
        for member in aggregate.members(MergeStrategy::Documented) {
            if !member_fits(member, scoped)
                || !member.name.to_lowercase().starts_with(&prefix.to_lowercase())
                || !visible_from(store, member, enclosing.as_deref(), cancel)
            {
                continue;
            }
            let key = member.member_key();
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            out.push(item_for(member, scoped));
        }
    }
    out
}

fn member_fits(member: &Symbol, scoped: bool) -> bool {
    match member.kind {
        SymbolKind::Method => {
            if scoped {
                member.is_static()
            } else {
                true
            }
        }
        SymbolKind::Property => member.is_static() == scoped,
        SymbolKind::ClassConstant => scoped,
        _ => false,
    }
}

/// Private members only from inside the declaring class; protected from
/// the declaring class or a subclass; public everywhere.
fn visible_from(
    store: &SymbolStore,
    member: &Symbol,
    enclosing: Option<&str>,
    cancel: &CancellationToken,
) -> bool {
    if member.modifiers.contains(Modifiers::PRIVATE) {
        return enclosing.is_some_and(|c| c.eq_ignore_ascii_case(&member.scope));
    }
    if member.modifiers.contains(Modifiers::PROTECTED) {
        let Some(enclosing) = enclosing else {
            return false;
        };
        if enclosing.eq_ignore_ascii_case(&member.scope) {
            return true;
        }
        let Ok(aggregate) = TypeAggregate::build(store, enclosing, cancel) else {
            return false;
        };
        return aggregate
            .associated()
            .iter()
            .any(|a| a.name.eq_ignore_ascii_case(&member.scope));
    }
    true
}

fn item_for(member: &Symbol, scoped: bool) -> CompletionItem {
    let (label, kind, detail) = match member.kind {
        SymbolKind::Method => (
            member.name.clone(),
            CompletionItemKind::METHOD,
            Some(member.signature()),
        ),
        SymbolKind::Property => (
            if scoped {
                format!("${}", member.name)
            } else {
                member.name.clone()
            },
            CompletionItemKind::PROPERTY,
            (!member.type_string.is_empty()).then(|| member.type_string.to_string()),
        ),
        SymbolKind::ClassConstant => (
            member.name.clone(),
            CompletionItemKind::CONSTANT,
            (!member.type_string.is_empty()).then(|| member.type_string.to_string()),
        ),
        _ => (member.name.clone(), CompletionItemKind::VALUE, None),
    };
    CompletionItem {
        label,
        kind: Some(kind),
        detail,
        ..Default::default()
    }
}

/// Bare-name completion from the workspace index: the written prefix
/// resolved against the current namespace, plus the global space.
fn name_items(
    store: &SymbolStore,
    table: &symbols::SymbolTable,
    offset: usize,
    prefix: &str,
) -> Vec<CompletionItem> {
    let resolver = table.resolver_at(offset);
    let qualified = resolver.resolve(prefix, NameKind::ClassLike);

    let mut candidates = store.match_prefix(&qualified);
    if qualified != prefix {
        candidates.extend(store.match_prefix(prefix));
    }

    let mut out: Vec<CompletionItem> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    for symbol in candidates {
        let key = format!("{}@{}", symbol.name, symbol.location.uri);
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        let kind = match symbol.kind {
            SymbolKind::Class => CompletionItemKind::CLASS,
            SymbolKind::Interface => CompletionItemKind::INTERFACE,
            SymbolKind::Trait => CompletionItemKind::CLASS,
            SymbolKind::Function => CompletionItemKind::FUNCTION,
            SymbolKind::Constant => CompletionItemKind::CONSTANT,
            _ => continue,
        };
        let short = symbol
            .name
            .rsplit('\\')
            .next()
            .unwrap_or(&symbol.name)
            .to_string();
        out.push(CompletionItem {
            label: short,
            kind: Some(kind),
            detail: Some(symbol.name.clone()),
            ..Default::default()
        });
    }
    out
}
