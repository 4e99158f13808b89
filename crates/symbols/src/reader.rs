//! Symbol extraction: parse tree in, [`SymbolTable`] out.
//!
//! One descent over the document collects `use` rules, tracks the active
//! namespace, and builds a symbol for every declaration, attaching source
//! ranges, modifiers, and docblock-derived descriptions and types.
//! Docblock data is merged after the structural fields, so tag types
//! either fill in missing types or union with declared ones. The reader
//! is best-effort: subtrees tree-sitter recovered as ERROR are scanned
//! for whatever declarations survive, and nothing here panics on a
//! malformed tree.

use syntax::tree_sitter::Node;
use syntax::{Docblock, DocblockTag, MagicAccess, SourceTree, kinds};
use tracing::debug;

use crate::imports::{ImportKind, ImportTable};
use crate::model::{Location, Modifiers, Symbol, SymbolKind};
use crate::resolver::{NameKind, NameResolver, SEPARATOR};
use crate::table::{NamespaceRegion, SymbolTable};
use crate::typestring::{TypeString, is_keyword_type};

pub struct SymbolReader<'a> {
    tree: &'a SourceTree,
    uri: &'a str,
    namespace: String,
    imports: ImportTable,
    symbols: Vec<Symbol>,
    regions: Vec<NamespaceRegion>,
    /// Start of the currently open unbraced namespace region.
    region_start: u32,
}

impl<'a> SymbolReader<'a> {
    /// Read a parsed document into its symbol table.
    pub fn read(tree: &'a SourceTree, uri: &'a str) -> SymbolTable {
        let mut reader = SymbolReader {
            tree,
            uri,
            namespace: String::new(),
            imports: ImportTable::new(),
            symbols: Vec::new(),
            regions: Vec::new(),
            region_start: 0,
        };
        reader.collect_imports(reader.tree.root());
        reader.read_statements(reader.tree.root());
        reader.close_region(reader.tree.text().len() as u32);
        SymbolTable {
            uri: uri.to_string(),
            symbols: reader.symbols,
            imports: reader.imports,
            regions: reader.regions,
        }
    }

    // ── Imports ──────────────────────────────────────────────────────────

    /// Use statements live at the top level or directly inside braced
    /// namespace bodies; nothing deeper.
    fn collect_imports(&mut self, parent: Node<'_>) {
        for child in SourceTree::named_children_of(parent) {
            match child.kind() {
                kinds::NAMESPACE_USE_DECLARATION => self.read_use(child),
                kinds::NAMESPACE_DEFINITION => {
                    if let Some(body) = child.child_by_field_name(kinds::fields::BODY) {
                        self.collect_imports(body);
                    }
                }
                kinds::ERROR => self.collect_imports(child),
                _ => {}
            }
        }
    }

    fn read_use(&mut self, node: Node<'_>) {
        let statement_kind = self.use_kind_token(node).unwrap_or(ImportKind::Class);

        // Group form: `use P\{a\b as A, c};` — a prefix followed by a
        // braced clause list.
        if let Some(group) = SourceTree::child_of_kind(node, kinds::NAMESPACE_USE_GROUP) {
            let prefix = SourceTree::child_of_kind(node, kinds::NAMESPACE_NAME)
                .or_else(|| SourceTree::child_of_kind(node, kinds::QUALIFIED_NAME))
                .or_else(|| SourceTree::child_of_kind(node, kinds::NAME))
                .map(|n| self.tree.node_text(n).trim_matches(SEPARATOR).to_string())
                .unwrap_or_default();
            for clause in SourceTree::named_children_of(group) {
                if clause.kind() == kinds::NAMESPACE_USE_CLAUSE
                    || clause.kind() == kinds::NAMESPACE_USE_GROUP_CLAUSE
                {
                    let kind = self.use_kind_token(clause).unwrap_or(statement_kind);
                    self.read_use_clause(clause, Some(&prefix), kind);
                }
            }
            return;
        }

        for clause in SourceTree::named_children_of(node) {
            if clause.kind() == kinds::NAMESPACE_USE_CLAUSE {
                self.read_use_clause(clause, None, statement_kind);
            }
        }
    }

    fn read_use_clause(&mut self, clause: Node<'_>, prefix: Option<&str>, kind: ImportKind) {
        let Some(name_node) = SourceTree::named_children_of(clause).into_iter().find(|n| {
            matches!(
                n.kind(),
                kinds::NAME | kinds::QUALIFIED_NAME | kinds::NAMESPACE_NAME
            )
        }) else {
            return;
        };
        let written = self.tree.node_text(name_node).trim_start_matches(SEPARATOR);
        let target = match prefix {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}{SEPARATOR}{written}"),
            _ => written.to_string(),
        };

        let alias = SourceTree::child_of_kind(clause, kinds::NAMESPACE_ALIASING_CLAUSE)
            .and_then(|aliasing| SourceTree::child_of_kind(aliasing, kinds::NAME))
            .map(|n| self.tree.node_text(n).to_string())
            .unwrap_or_else(|| {
                written
                    .rsplit(SEPARATOR)
                    .next()
                    .unwrap_or(written)
                    .to_string()
            });

        if !alias.is_empty() && !target.is_empty() {
            self.imports.add(alias, target, kind);
        }
    }

    /// The `function` / `const` keyword token of a use statement or group
    /// element, if present.
    fn use_kind_token(&self, node: Node<'_>) -> Option<ImportKind> {
        for child in SourceTree::children_of(node) {
            match child.kind() {
                "function" => return Some(ImportKind::Function),
                "const" => return Some(ImportKind::Constant),
                _ => {}
            }
        }
        None
    }

    // ── Statements ───────────────────────────────────────────────────────

    fn read_statements(&mut self, parent: Node<'_>) {
        for child in SourceTree::named_children_of(parent) {
            match child.kind() {
                kinds::NAMESPACE_DEFINITION => self.read_namespace(child),
                kinds::CLASS_DECLARATION => self.read_class_like(child, SymbolKind::Class),
                kinds::ENUM_DECLARATION => self.read_class_like(child, SymbolKind::Class),
                kinds::INTERFACE_DECLARATION => {
                    self.read_class_like(child, SymbolKind::Interface)
                }
                kinds::TRAIT_DECLARATION => self.read_class_like(child, SymbolKind::Trait),
                kinds::FUNCTION_DEFINITION => self.read_function(child),
                kinds::CONST_DECLARATION => self.read_constants(child),
                kinds::COMPOUND_STATEMENT | kinds::ERROR => self.read_statements(child),
                _ => {}
            }
        }
    }

    fn read_namespace(&mut self, node: Node<'_>) {
        let name = node
            .child_by_field_name(kinds::fields::NAME)
            .map(|n| self.tree.node_text(n).to_string())
            .unwrap_or_default();

        let symbol = Symbol::new(SymbolKind::Namespace, name.clone(), self.location(node));
        self.symbols.push(symbol);

        match node.child_by_field_name(kinds::fields::BODY) {
            // `namespace X { ... }` scopes to the braces.
            Some(body) => {
                self.regions.push(NamespaceRegion {
                    name: name.clone(),
                    start_byte: body.start_byte() as u32,
                    end_byte: body.end_byte() as u32,
                });
                let saved = std::mem::replace(&mut self.namespace, name);
                self.read_statements(body);
                self.namespace = saved;
            }
            // `namespace X;` scopes to end-of-file or the next statement.
            None => {
                self.close_region(node.start_byte() as u32);
                self.region_start = node.end_byte() as u32;
                self.namespace = name;
            }
        }
    }

    fn close_region(&mut self, end: u32) {
        if end > self.region_start {
            self.regions.push(NamespaceRegion {
                name: self.namespace.clone(),
                start_byte: self.region_start,
                end_byte: end,
            });
        }
    }

    // ── Class-likes ──────────────────────────────────────────────────────

    fn read_class_like(&mut self, node: Node<'_>, kind: SymbolKind) {
        let Some(name_node) = node.child_by_field_name(kinds::fields::NAME) else {
            debug!(uri = self.uri, "skipping unnamed class-like declaration");
            return;
        };
        let fqn = self.qualify(self.tree.node_text(name_node));
        let mut symbol = Symbol::new(kind, fqn.clone(), self.location(node));
        symbol.modifiers = self.declaration_modifiers(node);

        // extends / implements, resolved to absolute form.
        if let Some(base) = SourceTree::child_of_kind(node, kinds::BASE_CLAUSE) {
            for name in self.clause_names(base) {
                symbol.associated.push(name);
            }
        }
        if let Some(implements) = SourceTree::child_of_kind(node, kinds::CLASS_INTERFACE_CLAUSE) {
            for name in self.clause_names(implements) {
                symbol.associated.push(name);
            }
        }

        let doc = self.docblock_for(node);
        symbol.description = doc.summary.clone();

        if let Some(body) = node.child_by_field_name(kinds::fields::BODY) {
            self.read_class_body(body, &mut symbol);
        }

        // Docblock-declared members come after everything read from source.
        self.append_magic_members(&doc, &mut symbol);

        self.symbols.push(symbol);
    }

    fn read_class_body(&mut self, body: Node<'_>, class: &mut Symbol) {
        for member in SourceTree::named_children_of(body) {
            match member.kind() {
                kinds::METHOD_DECLARATION => {
                    if let Some(method) = self.read_method(member, &class.name) {
                        let promoted = self.promoted_properties(member, &class.name);
                        let is_constructor = method.name.eq_ignore_ascii_case("__construct");
                        class.children.push(method);
                        if is_constructor {
                            class.children.extend(promoted);
                        }
                    }
                }
                kinds::PROPERTY_DECLARATION => {
                    self.read_properties(member, class);
                }
                kinds::CONST_DECLARATION => {
                    self.read_class_constants(member, class);
                }
                kinds::USE_DECLARATION => {
                    // Trait references are recorded as FQN strings, not
                    // symbols. `insteadof` / `as` adaptations are ignored.
                    for name_node in SourceTree::named_children_of(member) {
                        if matches!(name_node.kind(), kinds::NAME | kinds::QUALIFIED_NAME) {
                            let written = self.tree.node_text(name_node);
                            class
                                .associated
                                .push(self.resolve(written, NameKind::ClassLike));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn read_method(&mut self, node: Node<'_>, class_fqn: &str) -> Option<Symbol> {
        let name_node = node.child_by_field_name(kinds::fields::NAME)?;
        let name = self.tree.node_text(name_node).to_string();
        let mut method = Symbol::new(SymbolKind::Method, name, self.location(node));
        method.scope = class_fqn.to_string();
        method.modifiers = self.declaration_modifiers(node);
        method.modifiers.insert(method.modifiers.visibility());

        let param_scope = format!("{class_fqn}::{}", method.name);
        if let Some(params) = node.child_by_field_name(kinds::fields::PARAMETERS) {
            method.children = self.read_parameters(params, &param_scope);
        }
        if let Some(ret) = node.child_by_field_name(kinds::fields::RETURN_TYPE) {
            method.type_string = self.type_from_text(self.tree.node_text(ret));
        }

        let doc = self.docblock_for(node);
        self.merge_callable_docblock(&doc, &mut method);
        Some(method)
    }

    fn read_function(&mut self, node: Node<'_>) {
        let Some(name_node) = node.child_by_field_name(kinds::fields::NAME) else {
            return;
        };
        let fqn = self.qualify(self.tree.node_text(name_node));
        let mut function = Symbol::new(SymbolKind::Function, fqn.clone(), self.location(node));

        if let Some(params) = node.child_by_field_name(kinds::fields::PARAMETERS) {
            function.children = self.read_parameters(params, &fqn);
        }
        if let Some(ret) = node.child_by_field_name(kinds::fields::RETURN_TYPE) {
            function.type_string = self.type_from_text(self.tree.node_text(ret));
        }

        let doc = self.docblock_for(node);
        self.merge_callable_docblock(&doc, &mut function);
        self.symbols.push(function);
    }

    /// Walk a formal parameter list left-to-right. A parameter without a
    /// name is skipped silently.
    fn read_parameters(&mut self, params: Node<'_>, scope: &str) -> Vec<Symbol> {
        let mut out = Vec::new();
        for param in SourceTree::named_children_of(params) {
            if !matches!(
                param.kind(),
                kinds::SIMPLE_PARAMETER
                    | kinds::VARIADIC_PARAMETER
                    | kinds::PROPERTY_PROMOTION_PARAMETER
            ) {
                continue;
            }
            let Some(name_node) = param.child_by_field_name(kinds::fields::NAME) else {
                continue;
            };
            let name = self.tree.node_text(name_node).trim_start_matches('$').to_string();
            if name.is_empty() {
                continue;
            }
            let mut symbol = Symbol::new(SymbolKind::Parameter, name, self.location(param));
            symbol.scope = scope.to_string();
            if let Some(hint) = param.child_by_field_name(kinds::fields::TYPE) {
                symbol.type_string = self.type_from_text(self.tree.node_text(hint));
            }
            out.push(symbol);
        }
        out
    }

    /// Constructor promotion: parameters carrying a visibility modifier
    /// also declare a property on the class.
    fn promoted_properties(&mut self, method: Node<'_>, class_fqn: &str) -> Vec<Symbol> {
        let Some(params) = method.child_by_field_name(kinds::fields::PARAMETERS) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for param in SourceTree::named_children_of(params) {
            if param.kind() != kinds::PROPERTY_PROMOTION_PARAMETER {
                continue;
            }
            let Some(name_node) = param.child_by_field_name(kinds::fields::NAME) else {
                continue;
            };
            let name = self.tree.node_text(name_node).trim_start_matches('$').to_string();
            let mut property = Symbol::new(SymbolKind::Property, name, self.location(param));
            property.scope = class_fqn.to_string();
            property.modifiers = self.declaration_modifiers(param);
            property.modifiers.insert(property.modifiers.visibility());
            if let Some(hint) = param.child_by_field_name(kinds::fields::TYPE) {
                property.type_string = self.type_from_text(self.tree.node_text(hint));
            }
            out.push(property);
        }
        out
    }

    fn read_properties(&mut self, node: Node<'_>, class: &mut Symbol) {
        let modifiers = {
            let mut m = self.declaration_modifiers(node);
            m.insert(m.visibility());
            m
        };
        let type_hint = SourceTree::named_children_of(node)
            .into_iter()
            .find(|c| is_type_node(c.kind()))
            .map(|c| self.type_from_text(self.tree.node_text(c)))
            .unwrap_or_default();
        let doc = self.docblock_for(node);

        for element in SourceTree::named_children_of(node) {
            if element.kind() != kinds::PROPERTY_ELEMENT {
                continue;
            }
            let Some(name_node) = SourceTree::child_of_kind(element, kinds::VARIABLE_NAME) else {
                continue;
            };
            let name = self.tree.node_text(name_node).trim_start_matches('$').to_string();
            let mut property = Symbol::new(SymbolKind::Property, name, self.location(element));
            property.scope = class.name.clone();
            property.modifiers = modifiers;
            property.type_string = type_hint.clone();

            // `@var` with a matching or absent variable name supplies the
            // type and description.
            if let Some(DocblockTag::Var {
                name: tag_name,
                type_text,
                description,
            }) = doc.var_tag()
            {
                let applies = match tag_name {
                    Some(tag_name) => *tag_name == property.name,
                    None => true,
                };
                if applies {
                    let doc_type = self.type_from_text(type_text);
                    property.type_string = property.type_string.merge(&doc_type);
                    if property.description.is_empty() {
                        property.description = description.clone();
                    }
                }
            }
            if property.description.is_empty() {
                property.description = doc.summary.clone();
            }
            class.children.push(property);
        }
    }

    fn read_class_constants(&mut self, node: Node<'_>, class: &mut Symbol) {
        let modifiers = {
            let mut m = self.declaration_modifiers(node);
            m.insert(m.visibility() | Modifiers::STATIC);
            m
        };
        let doc = self.docblock_for(node);
        for element in SourceTree::named_children_of(node) {
            if element.kind() != kinds::CONST_ELEMENT {
                continue;
            }
            let Some(name_node) = SourceTree::child_of_kind(element, kinds::NAME) else {
                continue;
            };
            let mut constant = Symbol::new(
                SymbolKind::ClassConstant,
                self.tree.node_text(name_node),
                self.location(element),
            );
            constant.scope = class.name.clone();
            constant.modifiers = modifiers;
            constant.type_string = self.literal_type(element);
            constant.description = doc.summary.clone();
            class.children.push(constant);
        }
    }

    fn read_constants(&mut self, node: Node<'_>) {
        let doc = self.docblock_for(node);
        for element in SourceTree::named_children_of(node) {
            if element.kind() != kinds::CONST_ELEMENT {
                continue;
            }
            let Some(name_node) = SourceTree::child_of_kind(element, kinds::NAME) else {
                continue;
            };
            let fqn = self.qualify(self.tree.node_text(name_node));
            let mut constant = Symbol::new(SymbolKind::Constant, fqn, self.location(element));
            constant.type_string = self.literal_type(element);
            constant.description = doc.summary.clone();
            self.symbols.push(constant);
        }
    }

    // ── Docblocks ────────────────────────────────────────────────────────

    fn docblock_for(&self, node: Node<'_>) -> Docblock {
        self.tree
            .docblock_before(node)
            .map(|comment| Docblock::parse(self.tree.node_text(comment)))
            .unwrap_or_default()
    }

    /// Apply `@param` / `@return` tags to an already-built callable.
    fn merge_callable_docblock(&self, doc: &Docblock, callable: &mut Symbol) {
        if callable.description.is_empty() {
            callable.description = doc.summary.clone();
        }
        for tag in &doc.tags {
            match tag {
                DocblockTag::Param {
                    name,
                    type_text,
                    description,
                } => {
                    let doc_type = self.type_from_text(type_text);
                    if let Some(param) = callable
                        .children
                        .iter_mut()
                        .find(|c| c.kind == SymbolKind::Parameter && c.name == *name)
                    {
                        param.type_string = param.type_string.clone().merge(&doc_type);
                        if param.description.is_empty() {
                            param.description = description.clone();
                        }
                    }
                }
                DocblockTag::Return { type_text, .. } => {
                    let doc_type = self.type_from_text(type_text);
                    callable.type_string = callable.type_string.clone().merge(&doc_type);
                }
                _ => {}
            }
        }
    }

    /// Synthesize `@property*` / `@method` members with the Magic modifier.
    fn append_magic_members(&self, doc: &Docblock, class: &mut Symbol) {
        for tag in &doc.tags {
            match tag {
                DocblockTag::Property {
                    name,
                    type_text,
                    access,
                    description,
                } => {
                    let mut property =
                        Symbol::new(SymbolKind::Property, name.clone(), class.location.clone());
                    property.scope = class.name.clone();
                    property.modifiers = Modifiers::MAGIC | Modifiers::PUBLIC;
                    match access {
                        MagicAccess::ReadOnly => property.modifiers.insert(Modifiers::READ_ONLY),
                        MagicAccess::WriteOnly => property.modifiers.insert(Modifiers::WRITE_ONLY),
                        MagicAccess::ReadWrite => {}
                    }
                    property.type_string = self.type_from_text(type_text);
                    property.description = description.clone();
                    class.children.push(property);
                }
                DocblockTag::Method {
                    name,
                    is_static,
                    return_type,
                    parameters,
                    description,
                } => {
                    let mut method =
                        Symbol::new(SymbolKind::Method, name.clone(), class.location.clone());
                    method.scope = class.name.clone();
                    method.modifiers = Modifiers::MAGIC | Modifiers::PUBLIC;
                    if *is_static {
                        method.modifiers.insert(Modifiers::STATIC);
                    }
                    method.type_string = self.type_from_text(return_type);
                    method.description = description.clone();
                    for parameter in parameters {
                        let mut param = Symbol::new(
                            SymbolKind::Parameter,
                            parameter.name.clone(),
                            class.location.clone(),
                        );
                        param.scope = format!("{}::{}", class.name, method.name);
                        param.type_string = self.type_from_text(&parameter.type_text);
                        method.children.push(param);
                    }
                    class.children.push(method);
                }
                _ => {}
            }
        }
    }

    // ── Shared helpers ───────────────────────────────────────────────────

    fn qualify(&self, name: &str) -> String {
        NameResolver::qualify_in(&self.namespace, name)
    }

    fn resolve(&self, written: &str, kind: NameKind) -> String {
        NameResolver::resolve_with(&self.namespace, &self.imports, written, kind)
    }

    fn clause_names(&self, clause: Node<'_>) -> Vec<String> {
        SourceTree::named_children_of(clause)
            .into_iter()
            .filter(|n| matches!(n.kind(), kinds::NAME | kinds::QUALIFIED_NAME))
            .map(|n| self.resolve(self.tree.node_text(n), NameKind::ClassLike))
            .collect()
    }

    fn declaration_modifiers(&self, node: Node<'_>) -> Modifiers {
        let mut modifiers = Modifiers::NONE;
        for child in SourceTree::children_of(node) {
            match child.kind() {
                kinds::VISIBILITY_MODIFIER => match self.tree.node_text(child) {
                    "private" => modifiers.insert(Modifiers::PRIVATE),
                    "protected" => modifiers.insert(Modifiers::PROTECTED),
                    _ => modifiers.insert(Modifiers::PUBLIC),
                },
                kinds::STATIC_MODIFIER => modifiers.insert(Modifiers::STATIC),
                kinds::ABSTRACT_MODIFIER => modifiers.insert(Modifiers::ABSTRACT),
                kinds::FINAL_MODIFIER => modifiers.insert(Modifiers::FINAL),
                kinds::READONLY_MODIFIER => modifiers.insert(Modifiers::READ_ONLY),
                _ => {}
            }
        }
        modifiers
    }

    /// Build a type-string from written type text (hint or docblock),
    /// resolving class-like atoms against the current namespace/imports.
    fn type_from_text(&self, text: &str) -> TypeString {
        let parsed = TypeString::from_text(&text.replace('&', "|"));
        let mut resolved = TypeString::new();
        for atom in parsed.atoms() {
            resolved = resolved.merge(&TypeString::atom(self.resolve_type_atom(atom)));
        }
        resolved
    }

    fn resolve_type_atom(&self, atom: &str) -> String {
        if is_keyword_type(atom) || atom.is_empty() {
            return atom.to_string();
        }
        if let Some(base) = atom.strip_suffix("[]") {
            return format!("{}[]", self.resolve_type_atom(base));
        }
        if let Some(open) = atom.find('<') {
            // Generic syntax: resolve the argument types, keep the base.
            let base = &atom[..open];
            let args = atom[open + 1..].trim_end_matches('>');
            let resolved_args: Vec<String> = args
                .split(',')
                .map(|a| self.resolve_type_atom(a.trim()))
                .collect();
            return format!("{base}<{}>", resolved_args.join(", "));
        }
        self.resolve(atom, NameKind::ClassLike)
    }

    /// Scalar type of a constant initializer, when the literal is obvious.
    fn literal_type(&self, element: Node<'_>) -> TypeString {
        for child in SourceTree::named_children_of(element) {
            let tag = match child.kind() {
                kinds::INTEGER => "int",
                kinds::FLOAT => "float",
                kinds::STRING | kinds::ENCAPSED_STRING | kinds::HEREDOC => "string",
                kinds::BOOLEAN => "bool",
                kinds::NULL => "null",
                kinds::ARRAY_CREATION_EXPRESSION => "array",
                _ => continue,
            };
            return TypeString::atom(tag);
        }
        TypeString::new()
    }

    fn location(&self, node: Node<'_>) -> Location {
        let start = node.start_position();
        let end = node.end_position();
        Location {
            uri: self.uri.to_string(),
            start_byte: node.start_byte() as u32,
            end_byte: node.end_byte() as u32,
            start_line: start.row as u32,
            start_col: start.column as u32,
            end_line: end.row as u32,
            end_col: end.column as u32,
        }
    }
}

fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        kinds::NAMED_TYPE
            | kinds::OPTIONAL_TYPE
            | kinds::UNION_TYPE
            | kinds::INTERSECTION_TYPE
            | kinds::PRIMITIVE_TYPE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(source: &str) -> SymbolTable {
        let tree = SourceTree::parse(source).unwrap();
        SymbolReader::read(&tree, "file:///test.php")
    }

    fn find<'t>(table: &'t SymbolTable, name: &str) -> &'t Symbol {
        table
            .symbols
            .iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("missing symbol {name}, have {:?}", table.symbols))
    }

    #[test]
    fn class_fqn_and_alias_resolved_extends() {
        let table = read("<?php\nnamespace A\\B;\nuse C\\D as E;\nclass F extends E\\G {}\n");
        let class = find(&table, "A\\B\\F");
        assert_eq!(class.kind, SymbolKind::Class);
        assert_eq!(class.associated[0], "C\\D\\G");
    }

    #[test]
    fn group_use_expands_prefix_and_kinds() {
        let table = read(
            "<?php\nuse P\\{a\\b as A, c};\nuse Q\\{function f, const C};\nclass X {}\n",
        );
        let imports = &table.imports;
        assert_eq!(imports.find_class("A").unwrap().target, "P\\a\\b");
        assert_eq!(imports.find_class("c").unwrap().target, "P\\c");
        assert_eq!(imports.find_function("f").unwrap().target, "Q\\f");
        assert_eq!(imports.find_constant("C").unwrap().target, "Q\\C");
    }

    #[test]
    fn method_merges_docblock_param_and_return() {
        let table = read(
            "<?php\nnamespace App;\nclass Repo {\n  /**\n   * Finds one.\n   * @param int $id\n   * @return Item|null\n   */\n  public function find($id) {}\n}\n",
        );
        let class = find(&table, "App\\Repo");
        let method = &class.children[0];
        assert_eq!(method.kind, SymbolKind::Method);
        assert_eq!(method.description, "Finds one.");
        assert_eq!(method.type_string, TypeString::from_text("App\\Item|null"));
        let param = method.parameters().next().unwrap();
        assert_eq!(param.type_string, TypeString::from_text("int"));
    }

    #[test]
    fn property_types_from_hint_and_var_tag() {
        let table = read(
            "<?php\nclass C {\n  /** @var string the label */\n  private $label;\n  protected ?int $count;\n}\n",
        );
        let class = find(&table, "C");
        let label = class.children.iter().find(|c| c.name == "label").unwrap();
        assert_eq!(label.type_string, TypeString::from_text("string"));
        assert_eq!(label.description, "the label");
        assert!(label.modifiers.contains(Modifiers::PRIVATE));
        let count = class.children.iter().find(|c| c.name == "count").unwrap();
        assert_eq!(count.type_string, TypeString::from_text("int|null"));
        assert!(count.modifiers.contains(Modifiers::PROTECTED));
    }

    #[test]
    fn magic_property_member_from_docblock() {
        let table = read("<?php\n/** @property string $x */\nclass C {}\n");
        let class = find(&table, "C");
        let magic = &class.children[0];
        assert_eq!(magic.kind, SymbolKind::Property);
        assert_eq!(magic.name, "x");
        assert!(magic.modifiers.contains(Modifiers::MAGIC | Modifiers::PUBLIC));
        assert_eq!(magic.type_string, TypeString::from_text("string"));
    }

    #[test]
    fn magic_method_with_parameters() {
        let table = read("<?php\n/** @method static Item find(int $id) */\nclass C {}\n");
        let class = find(&table, "C");
        let magic = &class.children[0];
        assert_eq!(magic.kind, SymbolKind::Method);
        assert!(magic.modifiers.contains(Modifiers::MAGIC | Modifiers::STATIC));
        assert_eq!(magic.type_string, TypeString::from_text("Item"));
        assert_eq!(magic.parameters().count(), 1);
    }

    #[test]
    fn trait_use_lands_in_associated() {
        let table = read(
            "<?php\nnamespace App;\nuse Lib\\Loggable;\nclass C {\n  use Loggable;\n  use Helpers;\n}\n",
        );
        let class = find(&table, "App\\C");
        assert_eq!(class.associated, vec!["Lib\\Loggable", "App\\Helpers"]);
    }

    #[test]
    fn interface_extends_all_parents() {
        let table = read("<?php\ninterface I extends A, B {}\n");
        let iface = find(&table, "I");
        assert_eq!(iface.kind, SymbolKind::Interface);
        assert_eq!(iface.associated, vec!["A", "B"]);
    }

    #[test]
    fn unbraced_namespace_regions_scope_to_next_statement() {
        let table = read("<?php\nnamespace A;\nclass X {}\nnamespace B;\nclass Y {}\n");
        assert!(table.symbols.iter().any(|s| s.name == "A\\X"));
        assert!(table.symbols.iter().any(|s| s.name == "B\\Y"));
        let x = find(&table, "A\\X");
        assert_eq!(table.namespace_at(x.location.start_byte as usize), "A");
        let y = find(&table, "B\\Y");
        assert_eq!(table.namespace_at(y.location.start_byte as usize), "B");
    }

    #[test]
    fn constants_and_class_constants() {
        let table = read(
            "<?php\nnamespace App;\nconst LIMIT = 10;\nclass C { const MODE = 'fast'; }\n",
        );
        let constant = find(&table, "App\\LIMIT");
        assert_eq!(constant.kind, SymbolKind::Constant);
        assert_eq!(constant.type_string, TypeString::from_text("int"));
        let class = find(&table, "App\\C");
        let mode = &class.children[0];
        assert_eq!(mode.kind, SymbolKind::ClassConstant);
        assert_eq!(mode.type_string, TypeString::from_text("string"));
    }

    #[test]
    fn constructor_promotion_declares_properties() {
        let table = read(
            "<?php\nclass C {\n  public function __construct(private string $name, int $other) {}\n}\n",
        );
        let class = find(&table, "C");
        let property = class
            .children
            .iter()
            .find(|c| c.kind == SymbolKind::Property)
            .unwrap();
        assert_eq!(property.name, "name");
        assert!(property.modifiers.contains(Modifiers::PRIVATE));
        // The unpromoted parameter stays a parameter only.
        assert!(
            !class
                .children
                .iter()
                .any(|c| c.kind == SymbolKind::Property && c.name == "other")
        );
    }

    #[test]
    fn recovers_declarations_after_parse_errors() {
        let table = read("<?php\nclass Broken {\n  function ok() {}\n\nclass Next {}\n");
        // Best effort: at least one of the declarations survives.
        assert!(table.symbol_count() > 0);
    }

    #[test]
    fn parameter_without_name_is_skipped() {
        let table = read("<?php\nfunction f(int $a, string) {}\n");
        let function = find(&table, "f");
        let names: Vec<&str> = function.parameters().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }
}
