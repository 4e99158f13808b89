//! Node-kind tags of the PHP grammar.
//!
//! tree-sitter identifies nodes by string tags enumerated by the grammar.
//! Collecting the ones the semantic layers dispatch on here keeps the
//! stringly-typed surface in one place. A few constructs changed kind
//! names across grammar releases; those carry an `_ALT` alias and callers
//! match either.

pub const PROGRAM: &str = "program";

// Namespaces and imports
pub const NAMESPACE_DEFINITION: &str = "namespace_definition";
pub const NAMESPACE_NAME: &str = "namespace_name";
pub const NAMESPACE_USE_DECLARATION: &str = "namespace_use_declaration";
pub const NAMESPACE_USE_CLAUSE: &str = "namespace_use_clause";
pub const NAMESPACE_USE_GROUP: &str = "namespace_use_group";
pub const NAMESPACE_USE_GROUP_CLAUSE: &str = "namespace_use_group_clause";
pub const NAMESPACE_ALIASING_CLAUSE: &str = "namespace_aliasing_clause";
pub const QUALIFIED_NAME: &str = "qualified_name";
pub const RELATIVE_NAME: &str = "relative_name";
pub const NAME: &str = "name";

// Class-likes and members
pub const CLASS_DECLARATION: &str = "class_declaration";
pub const INTERFACE_DECLARATION: &str = "interface_declaration";
pub const TRAIT_DECLARATION: &str = "trait_declaration";
pub const ENUM_DECLARATION: &str = "enum_declaration";
pub const BASE_CLAUSE: &str = "base_clause";
pub const CLASS_INTERFACE_CLAUSE: &str = "class_interface_clause";
pub const DECLARATION_LIST: &str = "declaration_list";
pub const USE_DECLARATION: &str = "use_declaration";
pub const METHOD_DECLARATION: &str = "method_declaration";
pub const PROPERTY_DECLARATION: &str = "property_declaration";
pub const PROPERTY_ELEMENT: &str = "property_element";
pub const CONST_DECLARATION: &str = "const_declaration";
pub const CONST_ELEMENT: &str = "const_element";
pub const VISIBILITY_MODIFIER: &str = "visibility_modifier";
pub const STATIC_MODIFIER: &str = "static_modifier";
pub const ABSTRACT_MODIFIER: &str = "abstract_modifier";
pub const FINAL_MODIFIER: &str = "final_modifier";
pub const READONLY_MODIFIER: &str = "readonly_modifier";

// Functions and parameters
pub const FUNCTION_DEFINITION: &str = "function_definition";
pub const FORMAL_PARAMETERS: &str = "formal_parameters";
pub const SIMPLE_PARAMETER: &str = "simple_parameter";
pub const VARIADIC_PARAMETER: &str = "variadic_parameter";
pub const PROPERTY_PROMOTION_PARAMETER: &str = "property_promotion_parameter";
pub const ANONYMOUS_FUNCTION: &str = "anonymous_function";
pub const ANONYMOUS_FUNCTION_ALT: &str = "anonymous_function_creation_expression";
pub const ARROW_FUNCTION: &str = "arrow_function";
pub const ANONYMOUS_FUNCTION_USE_CLAUSE: &str = "anonymous_function_use_clause";
pub const COMPOUND_STATEMENT: &str = "compound_statement";

// Statements and expressions
pub const EXPRESSION_STATEMENT: &str = "expression_statement";
pub const RETURN_STATEMENT: &str = "return_statement";
pub const IF_STATEMENT: &str = "if_statement";
pub const ELSE_IF_CLAUSE: &str = "else_if_clause";
pub const ELSE_CLAUSE: &str = "else_clause";
pub const FOREACH_STATEMENT: &str = "foreach_statement";
pub const WHILE_STATEMENT: &str = "while_statement";
pub const FOR_STATEMENT: &str = "for_statement";
pub const PARENTHESIZED_EXPRESSION: &str = "parenthesized_expression";
pub const ASSIGNMENT_EXPRESSION: &str = "assignment_expression";
pub const BINARY_EXPRESSION: &str = "binary_expression";
pub const OBJECT_CREATION_EXPRESSION: &str = "object_creation_expression";
pub const MEMBER_ACCESS_EXPRESSION: &str = "member_access_expression";
pub const NULLSAFE_MEMBER_ACCESS_EXPRESSION: &str = "nullsafe_member_access_expression";
pub const MEMBER_CALL_EXPRESSION: &str = "member_call_expression";
pub const NULLSAFE_MEMBER_CALL_EXPRESSION: &str = "nullsafe_member_call_expression";
pub const SCOPED_CALL_EXPRESSION: &str = "scoped_call_expression";
pub const SCOPED_PROPERTY_ACCESS_EXPRESSION: &str = "scoped_property_access_expression";
pub const CLASS_CONSTANT_ACCESS_EXPRESSION: &str = "class_constant_access_expression";
pub const FUNCTION_CALL_EXPRESSION: &str = "function_call_expression";
pub const ARGUMENTS: &str = "arguments";
pub const ARGUMENT: &str = "argument";
pub const VARIABLE_NAME: &str = "variable_name";
pub const PAIR: &str = "pair";
pub const CLONE_EXPRESSION: &str = "clone_expression";
pub const CONDITIONAL_EXPRESSION: &str = "conditional_expression";
pub const RELATIVE_SCOPE: &str = "relative_scope";

// Literals
pub const STRING: &str = "string";
pub const ENCAPSED_STRING: &str = "encapsed_string";
pub const HEREDOC: &str = "heredoc";
pub const INTEGER: &str = "integer";
pub const FLOAT: &str = "float";
pub const BOOLEAN: &str = "boolean";
pub const NULL: &str = "null";
pub const ARRAY_CREATION_EXPRESSION: &str = "array_creation_expression";

// Types
pub const NAMED_TYPE: &str = "named_type";
pub const OPTIONAL_TYPE: &str = "optional_type";
pub const UNION_TYPE: &str = "union_type";
pub const INTERSECTION_TYPE: &str = "intersection_type";
pub const PRIMITIVE_TYPE: &str = "primitive_type";

pub const COMMENT: &str = "comment";
pub const ERROR: &str = "ERROR";

/// Fields used with `child_by_field_name`.
pub mod fields {
    pub const NAME: &str = "name";
    pub const BODY: &str = "body";
    pub const TYPE: &str = "type";
    pub const RETURN_TYPE: &str = "return_type";
    pub const PARAMETERS: &str = "parameters";
    pub const DEFAULT_VALUE: &str = "default_value";
    pub const LEFT: &str = "left";
    pub const RIGHT: &str = "right";
    pub const OPERATOR: &str = "operator";
    pub const OBJECT: &str = "object";
    pub const SCOPE: &str = "scope";
    pub const FUNCTION: &str = "function";
    pub const ARGUMENTS: &str = "arguments";
    pub const CONDITION: &str = "condition";
    pub const ALTERNATIVE: &str = "alternative";
}

/// True for either spelling of the closure node kind.
pub fn is_closure(kind: &str) -> bool {
    kind == ANONYMOUS_FUNCTION || kind == ANONYMOUS_FUNCTION_ALT
}

/// True for every construct that opens a fresh variable scope.
pub fn opens_scope(kind: &str) -> bool {
    kind == FUNCTION_DEFINITION || kind == METHOD_DECLARATION || is_closure(kind)
}

/// True for class, interface, and trait declarations.
pub fn is_class_like_declaration(kind: &str) -> bool {
    matches!(
        kind,
        CLASS_DECLARATION | INTERFACE_DECLARATION | TRAIT_DECLARATION | ENUM_DECLARATION
    )
}
