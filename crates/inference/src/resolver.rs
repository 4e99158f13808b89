//! Expression type resolution.
//!
//! Given a position, the resolver rebuilds the variable bindings that are
//! live there — walking the enclosing body from its start up to the
//! target, tracking assignments, `instanceof` refinements in if-chains,
//! and foreach bindings — and then computes the type of the expression at
//! the position. Every dead end (unknown name, unbound variable, missing
//! member) yields the empty type; resolution never fails.

use store::SymbolStore;
use symbols::{NameKind, SymbolKind, SymbolTable, TypeString};
use syntax::tree_sitter::Node;
use syntax::{SourceTree, kinds};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::aggregate::TypeAggregate;
use crate::vartable::VariableTable;

pub struct ExpressionResolver<'a> {
    store: &'a SymbolStore,
    cancel: CancellationToken,
}

/// Per-query state: the document being resolved and the bindings
/// reconstructed on the way to the target offset.
struct Ctx<'a> {
    tree: &'a SourceTree,
    table: &'a SymbolTable,
    resolver: symbols::NameResolver,
    class_fqn: Option<String>,
    vars: VariableTable,
    target: usize,
}

impl<'a> ExpressionResolver<'a> {
    pub fn new(store: &'a SymbolStore, cancel: CancellationToken) -> Self {
        Self { store, cancel }
    }

    /// Type of the expression at a byte offset. When the offset sits on
    /// the member-name side of an access, the whole access is resolved.
    pub fn resolve_at(&self, tree: &SourceTree, table: &SymbolTable, offset: usize) -> TypeString {
        let Some(mut node) = tree.node_at_offset(offset) else {
            return TypeString::new();
        };
        // `$x` parses as a variable_name wrapping a name token; type the
        // variable, not the bare word.
        if node.kind() == kinds::NAME
            && let Some(parent) = node.parent()
            && parent.kind() == kinds::VARIABLE_NAME
        {
            node = parent;
        }
        if let Some(parent) = node.parent()
            && is_access_kind(parent.kind())
            && SourceTree::named_children_of(parent)
                .first()
                .is_some_and(|first| first.id() != node.id())
        {
            node = parent;
        }
        self.resolve_node(tree, table, node)
    }

    /// Type of a specific expression node.
    pub fn resolve_node(
        &self,
        tree: &SourceTree,
        table: &SymbolTable,
        node: Node<'_>,
    ) -> TypeString {
        let mut ctx = self.context_at(tree, table, node.start_byte());
        self.type_of(&mut ctx, node)
    }

    // ── Context construction ─────────────────────────────────────────────

    fn context_at<'t>(
        &self,
        tree: &'t SourceTree,
        table: &'t SymbolTable,
        offset: usize,
    ) -> Ctx<'t> {
        let mut ctx = Ctx {
            tree,
            table,
            resolver: table.resolver_at(offset),
            class_fqn: table.class_like_at(offset).map(|s| s.name.clone()),
            vars: VariableTable::new(),
            target: offset,
        };

        if let Some(class) = &ctx.class_fqn {
            ctx.vars.set_type("this", TypeString::atom(class.clone()));
        }

        match self.scope_node_at(tree, offset) {
            Some(scope) => {
                self.seed_parameters(&mut ctx, scope);
                if let Some(body) = scope.child_by_field_name(kinds::fields::BODY) {
                    self.walk_statements(&mut ctx, body);
                }
            }
            None => self.walk_statements(&mut ctx, tree.root()),
        }
        ctx
    }

    /// Innermost function, method, or closure whose body covers the offset.
    fn scope_node_at<'t>(&self, tree: &'t SourceTree, offset: usize) -> Option<Node<'t>> {
        let mut current = tree.node_at_offset(offset);
        while let Some(node) = current {
            if kinds::opens_scope(node.kind())
                && node
                    .child_by_field_name(kinds::fields::BODY)
                    .is_some_and(|b| b.start_byte() <= offset && offset <= b.end_byte())
            {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// Bind parameter types, preferring the symbol table's docblock-merged
    /// view when the scope is a declared function or method; closures fall
    /// back to their written hints.
    fn seed_parameters(&self, ctx: &mut Ctx<'_>, scope: Node<'_>) {
        let declared = ctx.table.callable_at(ctx.target).filter(|callable| {
            callable.location.start_byte as usize == scope.start_byte()
        });
        if let Some(callable) = declared {
            for param in callable.parameters() {
                let bound = self.bind_self(ctx, &param.type_string);
                ctx.vars.set_type(&param.name, bound);
            }
            return;
        }
        let Some(params) = scope.child_by_field_name(kinds::fields::PARAMETERS) else {
            return;
        };
        for param in SourceTree::named_children_of(params) {
            let Some(name_node) = param.child_by_field_name(kinds::fields::NAME) else {
                continue;
            };
            let name = ctx.tree.node_text(name_node).trim_start_matches('$').to_string();
            let ty = param
                .child_by_field_name(kinds::fields::TYPE)
                .map(|hint| self.type_text(ctx, ctx.tree.node_text(hint)))
                .unwrap_or_default();
            ctx.vars.set_type(&name, ty);
        }
    }

    // ── Statement walking ────────────────────────────────────────────────

    /// Process the children of a block: statements entirely before the
    /// target apply their effects, the statement containing the target is
    /// entered, everything past it is ignored.
    fn walk_statements(&self, ctx: &mut Ctx<'_>, parent: Node<'_>) {
        for child in SourceTree::named_children_of(parent) {
            if self.cancel.is_cancelled() {
                return;
            }
            if child.start_byte() > ctx.target {
                break;
            }
            if child.end_byte() <= ctx.target {
                self.apply_statement(ctx, child);
            } else {
                self.enter_statement(ctx, child);
                break;
            }
        }
    }

    /// A body that may be a compound block or a single statement.
    fn descend(&self, ctx: &mut Ctx<'_>, body: Node<'_>) {
        if body.kind() == kinds::COMPOUND_STATEMENT {
            self.walk_statements(ctx, body);
        } else if body.end_byte() <= ctx.target {
            self.apply_statement(ctx, body);
        } else if body.start_byte() <= ctx.target {
            self.enter_statement(ctx, body);
        }
    }

    /// Effects of a statement that completed before the target.
    fn apply_statement(&self, ctx: &mut Ctx<'_>, node: Node<'_>) {
        if self.cancel.is_cancelled() {
            return;
        }
        match node.kind() {
            kinds::EXPRESSION_STATEMENT => {
                if let Some(expr) = SourceTree::named_children_of(node).first() {
                    self.apply_expression(ctx, *expr);
                }
            }
            kinds::IF_STATEMENT => self.apply_if(ctx, node),
            kinds::FOREACH_STATEMENT => {
                self.bind_foreach(ctx, node);
                if let Some(body) = body_of(node) {
                    self.apply_block(ctx, body);
                }
            }
            kinds::WHILE_STATEMENT | kinds::FOR_STATEMENT => {
                if let Some(body) = body_of(node) {
                    self.apply_block(ctx, body);
                }
            }
            kinds::COMPOUND_STATEMENT => self.apply_block(ctx, node),
            _ => {}
        }
    }

    fn apply_block(&self, ctx: &mut Ctx<'_>, body: Node<'_>) {
        if body.kind() == kinds::COMPOUND_STATEMENT {
            for child in SourceTree::named_children_of(body) {
                self.apply_statement(ctx, child);
            }
        } else {
            self.apply_statement(ctx, body);
        }
    }

    /// A completed if-chain: one branch per clause, plus an implicit
    /// empty branch when there is no else, merged on pop.
    fn apply_if(&self, ctx: &mut Ctx<'_>, node: Node<'_>) {
        ctx.vars.push_branch_group();

        ctx.vars.push_branch();
        if let Some(condition) = node.child_by_field_name(kinds::fields::CONDITION) {
            self.refine_condition(ctx, condition);
        }
        if let Some(body) = node.child_by_field_name(kinds::fields::BODY) {
            self.apply_block(ctx, body);
        }
        ctx.vars.pop_branch();

        let mut has_else = false;
        for clause in SourceTree::named_children_of(node) {
            match clause.kind() {
                kinds::ELSE_IF_CLAUSE => {
                    ctx.vars.push_branch();
                    if let Some(condition) = clause.child_by_field_name(kinds::fields::CONDITION) {
                        self.refine_condition(ctx, condition);
                    }
                    if let Some(body) = clause.child_by_field_name(kinds::fields::BODY) {
                        self.apply_block(ctx, body);
                    }
                    ctx.vars.pop_branch();
                }
                kinds::ELSE_CLAUSE => {
                    has_else = true;
                    ctx.vars.push_branch();
                    if let Some(body) = clause.child_by_field_name(kinds::fields::BODY) {
                        self.apply_block(ctx, body);
                    }
                    ctx.vars.pop_branch();
                }
                _ => {}
            }
        }
        if !has_else {
            ctx.vars.push_branch();
            ctx.vars.pop_branch();
        }

        ctx.vars.pop_branch_group();
    }

    /// The statement containing the target. Branch frames stay open on
    /// the path down so the target sees its own branch's bindings.
    fn enter_statement(&self, ctx: &mut Ctx<'_>, node: Node<'_>) {
        match node.kind() {
            kinds::IF_STATEMENT => self.enter_if(ctx, node),
            kinds::FOREACH_STATEMENT => {
                self.bind_foreach(ctx, node);
                if let Some(body) = body_of(node) {
                    self.descend(ctx, body);
                }
            }
            kinds::WHILE_STATEMENT | kinds::FOR_STATEMENT => {
                if let Some(body) = body_of(node)
                    && body.start_byte() <= ctx.target
                {
                    self.descend(ctx, body);
                }
            }
            kinds::COMPOUND_STATEMENT => self.walk_statements(ctx, node),
            _ => {}
        }
    }

    /// Entering an if-chain: only the clause containing the target is
    /// walked — sibling branches are mutually exclusive paths and their
    /// bindings must not leak into this one.
    fn enter_if(&self, ctx: &mut Ctx<'_>, node: Node<'_>) {
        ctx.vars.push_branch_group();

        if let Some(body) = node.child_by_field_name(kinds::fields::BODY)
            && body.start_byte() <= ctx.target
            && ctx.target <= body.end_byte()
        {
            ctx.vars.push_branch();
            if let Some(condition) = node.child_by_field_name(kinds::fields::CONDITION) {
                self.refine_condition(ctx, condition);
            }
            self.descend(ctx, body);
            return;
        }

        for clause in SourceTree::named_children_of(node) {
            if clause.start_byte() > ctx.target || ctx.target > clause.end_byte() {
                continue;
            }
            match clause.kind() {
                kinds::ELSE_IF_CLAUSE => {
                    ctx.vars.push_branch();
                    if let Some(condition) = clause.child_by_field_name(kinds::fields::CONDITION) {
                        self.refine_condition(ctx, condition);
                    }
                    if let Some(body) = clause.child_by_field_name(kinds::fields::BODY) {
                        self.descend(ctx, body);
                    }
                    return;
                }
                kinds::ELSE_CLAUSE => {
                    ctx.vars.push_branch();
                    if let Some(body) = clause.child_by_field_name(kinds::fields::BODY) {
                        self.descend(ctx, body);
                    }
                    return;
                }
                _ => {}
            }
        }
    }

    /// `instanceof` in a positive condition narrows the variable to the
    /// named class, stored as a replacement within the branch. `&&`
    /// chains refine through both sides.
    fn refine_condition(&self, ctx: &mut Ctx<'_>, condition: Node<'_>) {
        match condition.kind() {
            kinds::PARENTHESIZED_EXPRESSION => {
                if let Some(inner) = SourceTree::named_children_of(condition).first() {
                    self.refine_condition(ctx, *inner);
                }
            }
            kinds::BINARY_EXPRESSION => {
                let operator = condition
                    .child_by_field_name(kinds::fields::OPERATOR)
                    .map(|op| op.kind().to_string())
                    .unwrap_or_default();
                match operator.as_str() {
                    "instanceof" => {
                        let left = condition.child_by_field_name(kinds::fields::LEFT);
                        let right = condition.child_by_field_name(kinds::fields::RIGHT);
                        if let (Some(left), Some(right)) = (left, right)
                            && left.kind() == kinds::VARIABLE_NAME
                            && matches!(right.kind(), kinds::NAME | kinds::QUALIFIED_NAME)
                        {
                            let name =
                                ctx.tree.node_text(left).trim_start_matches('$').to_string();
                            let class = ctx
                                .resolver
                                .resolve(ctx.tree.node_text(right), NameKind::ClassLike);
                            ctx.vars.set_type(&name, TypeString::atom(class));
                        }
                    }
                    "&&" | "and" => {
                        for side in [kinds::fields::LEFT, kinds::fields::RIGHT] {
                            if let Some(child) = condition.child_by_field_name(side) {
                                self.refine_condition(ctx, child);
                            }
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    /// `foreach (expr as $k => $v)`: `$v` gets the element type of `expr`
    /// when deducible, `mixed` otherwise; `$k` is int|string.
    fn bind_foreach(&self, ctx: &mut Ctx<'_>, node: Node<'_>) {
        let body_start = body_of(node).map(|b| b.start_byte()).unwrap_or(usize::MAX);

        let mut subject: Option<Node<'_>> = None;
        let mut bindings: Vec<Node<'_>> = Vec::new();
        for child in SourceTree::named_children_of(node) {
            if child.start_byte() >= body_start || child.kind() == kinds::COMMENT {
                continue;
            }
            if child.kind() == kinds::PAIR {
                for part in SourceTree::named_children_of(child) {
                    if part.kind() == kinds::VARIABLE_NAME {
                        bindings.push(part);
                    }
                }
            } else if child.kind() == kinds::VARIABLE_NAME && subject.is_some() {
                bindings.push(child);
            } else if subject.is_none() {
                subject = Some(child);
            }
        }

        let element = subject
            .map(|s| {
                let subject_type = self.type_of_inner(ctx, s);
                let element = subject_type.element_types();
                if element.is_empty() {
                    TypeString::atom("mixed")
                } else {
                    element
                }
            })
            .unwrap_or_else(|| TypeString::atom("mixed"));

        match bindings.as_slice() {
            [value] => {
                let name = ctx.tree.node_text(*value).trim_start_matches('$').to_string();
                ctx.vars.set_type(&name, element);
            }
            [key, value, ..] => {
                let key_name = ctx.tree.node_text(*key).trim_start_matches('$').to_string();
                ctx.vars.set_type(&key_name, TypeString::from_text("int|string"));
                let name = ctx.tree.node_text(*value).trim_start_matches('$').to_string();
                ctx.vars.set_type(&name, element);
            }
            [] => {}
        }
    }

    /// Harvest bindings from an expression statement: assignments bind
    /// the left side to the right side's type, chains right-first.
    fn apply_expression(&self, ctx: &mut Ctx<'_>, expr: Node<'_>) {
        if expr.kind() != kinds::ASSIGNMENT_EXPRESSION {
            return;
        }
        let left = expr.child_by_field_name(kinds::fields::LEFT);
        let right = expr.child_by_field_name(kinds::fields::RIGHT);
        let (Some(left), Some(right)) = (left, right) else {
            return;
        };
        if right.kind() == kinds::ASSIGNMENT_EXPRESSION {
            self.apply_expression(ctx, right);
        }
        if left.kind() == kinds::VARIABLE_NAME {
            let name = ctx.tree.node_text(left).trim_start_matches('$').to_string();
            let ty = self.type_of_inner(ctx, right);
            ctx.vars.set_type(&name, ty);
        }
    }

    // ── Expression typing ────────────────────────────────────────────────

    fn type_of(&self, ctx: &mut Ctx<'_>, node: Node<'_>) -> TypeString {
        self.type_of_inner(ctx, node)
    }

    fn type_of_inner(&self, ctx: &mut Ctx<'_>, node: Node<'_>) -> TypeString {
        if self.cancel.is_cancelled() {
            return TypeString::new();
        }
        match node.kind() {
            kinds::VARIABLE_NAME => {
                let name = ctx.tree.node_text(node).trim_start_matches('$');
                if name == "this" {
                    return self.this_type(ctx);
                }
                ctx.vars.get_type(name).unwrap_or_default()
            }
            kinds::NAME | kinds::QUALIFIED_NAME => TypeString::atom(
                ctx.resolver
                    .resolve(ctx.tree.node_text(node), NameKind::ClassLike),
            ),
            kinds::RELATIVE_SCOPE => self.relative_scope_type(ctx, node),
            kinds::OBJECT_CREATION_EXPRESSION => self.instantiation_type(ctx, node),
            kinds::MEMBER_ACCESS_EXPRESSION | kinds::NULLSAFE_MEMBER_ACCESS_EXPRESSION => {
                self.member_access_type(ctx, node, SymbolKind::Property)
            }
            kinds::MEMBER_CALL_EXPRESSION | kinds::NULLSAFE_MEMBER_CALL_EXPRESSION => {
                self.member_access_type(ctx, node, SymbolKind::Method)
            }
            kinds::SCOPED_CALL_EXPRESSION => self.scoped_member_type(ctx, node, SymbolKind::Method),
            kinds::SCOPED_PROPERTY_ACCESS_EXPRESSION => {
                self.scoped_member_type(ctx, node, SymbolKind::Property)
            }
            kinds::CLASS_CONSTANT_ACCESS_EXPRESSION => self.class_constant_type(ctx, node),
            kinds::FUNCTION_CALL_EXPRESSION => self.call_type(ctx, node),
            kinds::PARENTHESIZED_EXPRESSION => SourceTree::named_children_of(node)
                .first()
                .map(|inner| self.type_of_inner(ctx, *inner))
                .unwrap_or_default(),
            kinds::ASSIGNMENT_EXPRESSION => node
                .child_by_field_name(kinds::fields::RIGHT)
                .map(|right| self.type_of_inner(ctx, right))
                .unwrap_or_default(),
            kinds::CONDITIONAL_EXPRESSION => self.conditional_type(ctx, node),
            kinds::BINARY_EXPRESSION => self.binary_type(node),
            kinds::CLONE_EXPRESSION => SourceTree::named_children_of(node)
                .first()
                .map(|inner| self.type_of_inner(ctx, *inner))
                .unwrap_or_default(),
            kinds::INTEGER => TypeString::atom("int"),
            kinds::FLOAT => TypeString::atom("float"),
            kinds::STRING | kinds::ENCAPSED_STRING | kinds::HEREDOC => TypeString::atom("string"),
            kinds::BOOLEAN => TypeString::atom("bool"),
            kinds::NULL => TypeString::atom("null"),
            kinds::ARRAY_CREATION_EXPRESSION => TypeString::atom("array"),
            _ => TypeString::new(),
        }
    }

    fn this_type(&self, ctx: &Ctx<'_>) -> TypeString {
        ctx.class_fqn
            .as_ref()
            .map(|c| TypeString::atom(c.clone()))
            .unwrap_or_default()
    }

    fn relative_scope_type(&self, ctx: &mut Ctx<'_>, node: Node<'_>) -> TypeString {
        match ctx.tree.node_text(node) {
            "parent" => self.parent_class(ctx),
            // self and static both resolve against the enclosing class.
            _ => self.this_type(ctx),
        }
    }

    fn parent_class(&self, ctx: &Ctx<'_>) -> TypeString {
        let Some(class_fqn) = &ctx.class_fqn else {
            return TypeString::new();
        };
        let Some(class) = self.store.class_like(class_fqn) else {
            return TypeString::new();
        };
        for fqn in &class.associated {
            if let Some(found) = self.store.class_like(fqn)
                && found.kind == SymbolKind::Class
            {
                return TypeString::atom(&found.name);
            }
        }
        TypeString::new()
    }

    fn instantiation_type(&self, ctx: &mut Ctx<'_>, node: Node<'_>) -> TypeString {
        for child in SourceTree::named_children_of(node) {
            match child.kind() {
                kinds::NAME | kinds::QUALIFIED_NAME => {
                    return TypeString::atom(
                        ctx.resolver
                            .resolve(ctx.tree.node_text(child), NameKind::ClassLike),
                    );
                }
                kinds::RELATIVE_SCOPE => return self.relative_scope_type(ctx, child),
                kinds::VARIABLE_NAME => return TypeString::new(),
                kinds::ARGUMENTS => break,
                _ => {}
            }
        }
        TypeString::new()
    }

    /// `e->m` / `e->m()`: resolve the receiver, aggregate it, and union
    /// the member's type across every atomic class of the receiver.
    fn member_access_type(
        &self,
        ctx: &mut Ctx<'_>,
        node: Node<'_>,
        member_kind: SymbolKind,
    ) -> TypeString {
        let Some(object) = node.child_by_field_name(kinds::fields::OBJECT) else {
            return TypeString::new();
        };
        let Some(name_node) = node.child_by_field_name(kinds::fields::NAME) else {
            return TypeString::new();
        };
        let receiver = self.type_of_inner(ctx, object);
        let member = ctx.tree.node_text(name_node).trim_start_matches('$').to_string();
        self.member_type(&receiver, &member, member_kind)
    }

    /// `E::m()` / `E::$m`: like member access but through a class
    /// reference on the left.
    fn scoped_member_type(
        &self,
        ctx: &mut Ctx<'_>,
        node: Node<'_>,
        member_kind: SymbolKind,
    ) -> TypeString {
        let Some(scope) = node.child_by_field_name(kinds::fields::SCOPE) else {
            return TypeString::new();
        };
        let Some(name_node) = node.child_by_field_name(kinds::fields::NAME) else {
            return TypeString::new();
        };
        let receiver = self.type_of_inner(ctx, scope);
        let member = ctx.tree.node_text(name_node).trim_start_matches('$').to_string();
        self.member_type(&receiver, &member, member_kind)
    }

    fn class_constant_type(&self, ctx: &mut Ctx<'_>, node: Node<'_>) -> TypeString {
        let children = SourceTree::named_children_of(node);
        let (Some(scope), Some(name_node)) = (children.first(), children.last()) else {
            return TypeString::new();
        };
        if scope.id() == name_node.id() {
            return TypeString::new();
        }
        let member = ctx.tree.node_text(*name_node).to_string();
        if member == "class" {
            return TypeString::atom("string");
        }
        let receiver = self.type_of_inner(ctx, *scope);
        self.member_type(&receiver, &member, SymbolKind::ClassConstant)
    }

    fn call_type(&self, ctx: &mut Ctx<'_>, node: Node<'_>) -> TypeString {
        let Some(function) = node.child_by_field_name(kinds::fields::FUNCTION) else {
            return TypeString::new();
        };
        if !matches!(function.kind(), kinds::NAME | kinds::QUALIFIED_NAME) {
            return TypeString::new();
        }
        let fqn = ctx
            .resolver
            .resolve(ctx.tree.node_text(function), NameKind::Function);
        let mut out = TypeString::new();
        for symbol in self
            .store
            .find_matching(&fqn, |s| s.kind == SymbolKind::Function)
        {
            out = out.merge(&symbol.type_string);
        }
        if out.is_empty() {
            debug!(name = %fqn, "unresolved function call");
        }
        out
    }

    fn conditional_type(&self, ctx: &mut Ctx<'_>, node: Node<'_>) -> TypeString {
        let body = node
            .child_by_field_name(kinds::fields::BODY)
            .or_else(|| node.child_by_field_name(kinds::fields::CONDITION));
        let alternative = node.child_by_field_name(kinds::fields::ALTERNATIVE);
        let mut out = TypeString::new();
        if let Some(body) = body {
            out = out.merge(&self.type_of_inner(ctx, body));
        }
        if let Some(alternative) = alternative {
            out = out.merge(&self.type_of_inner(ctx, alternative));
        }
        out
    }

    fn binary_type(&self, node: Node<'_>) -> TypeString {
        let operator = node
            .child_by_field_name(kinds::fields::OPERATOR)
            .map(|op| op.kind().to_string())
            .unwrap_or_default();
        match operator.as_str() {
            "." => TypeString::atom("string"),
            "instanceof" | "==" | "===" | "!=" | "!==" | "<" | ">" | "<=" | ">=" | "&&" | "||"
            | "and" | "or" | "xor" => TypeString::atom("bool"),
            "<=>" => TypeString::atom("int"),
            _ => TypeString::new(),
        }
    }

    /// Union of the member's declared type over every atomic class in the
    /// receiver union. `self`/`static` in declared types bind to the
    /// receiving class.
    fn member_type(&self, receiver: &TypeString, name: &str, kind: SymbolKind) -> TypeString {
        let mut out = TypeString::new();
        for class_fqn in receiver.atomic_classes() {
            if self.cancel.is_cancelled() {
                return TypeString::new();
            }
            let Ok(aggregate) = TypeAggregate::build(self.store, class_fqn, &self.cancel) else {
                debug!(class = %class_fqn, "receiver class not in store");
                continue;
            };
            if let Some(member) = aggregate.member(name, kind) {
                out = out.merge(&member.type_string.bind_class_context(class_fqn));
            }
        }
        out
    }

    fn bind_self(&self, ctx: &Ctx<'_>, ty: &TypeString) -> TypeString {
        match &ctx.class_fqn {
            Some(class) => ty.bind_class_context(class),
            None => ty.clone(),
        }
    }

    fn type_text(&self, ctx: &Ctx<'_>, text: &str) -> TypeString {
        let parsed = TypeString::from_text(text);
        let mut resolved = TypeString::new();
        for atom in parsed.atoms() {
            if symbols::typestring::is_keyword_type(atom) {
                resolved = resolved.merge(&TypeString::atom(atom));
            } else {
                resolved = resolved.merge(&TypeString::atom(
                    ctx.resolver.resolve(atom, NameKind::ClassLike),
                ));
            }
        }
        self.bind_self(ctx, &resolved)
    }
}

/// Statement body: the `body` field when the grammar exposes one, else
/// the trailing compound block.
fn body_of(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name(kinds::fields::BODY).or_else(|| {
        SourceTree::named_children_of(node)
            .into_iter()
            .rev()
            .find(|c| c.kind() == kinds::COMPOUND_STATEMENT)
    })
}

/// Kinds whose name side should promote resolution to the whole access.
fn is_access_kind(kind: &str) -> bool {
    matches!(
        kind,
        kinds::MEMBER_ACCESS_EXPRESSION
            | kinds::NULLSAFE_MEMBER_ACCESS_EXPRESSION
            | kinds::MEMBER_CALL_EXPRESSION
            | kinds::NULLSAFE_MEMBER_CALL_EXPRESSION
            | kinds::SCOPED_CALL_EXPRESSION
            | kinds::SCOPED_PROPERTY_ACCESS_EXPRESSION
            | kinds::CLASS_CONSTANT_ACCESS_EXPRESSION
    )
}
