//! Typed records for every declaration the engine tracks.

use serde::{Deserialize, Serialize};

use crate::typestring::TypeString;

/// What a [`Symbol`] declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Namespace,
    Class,
    Interface,
    Trait,
    Function,
    Method,
    Property,
    ClassConstant,
    Constant,
    Parameter,
    Variable,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Namespace => "namespace",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Trait => "trait",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Property => "property",
            SymbolKind::ClassConstant => "class constant",
            SymbolKind::Constant => "constant",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Variable => "variable",
        }
    }

    pub fn is_class_like(&self) -> bool {
        matches!(self, SymbolKind::Class | SymbolKind::Interface | SymbolKind::Trait)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Method)
    }

    pub fn is_member(&self) -> bool {
        matches!(
            self,
            SymbolKind::Method | SymbolKind::Property | SymbolKind::ClassConstant
        )
    }

    /// Constants and variables compare case-sensitively; class-likes and
    /// functions fold case in lookups.
    pub fn case_sensitive(&self) -> bool {
        matches!(
            self,
            SymbolKind::Constant
                | SymbolKind::ClassConstant
                | SymbolKind::Property
                | SymbolKind::Parameter
                | SymbolKind::Variable
        )
    }
}

/// Declaration modifier bitset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const PUBLIC: Modifiers = Modifiers(1 << 0);
    pub const PROTECTED: Modifiers = Modifiers(1 << 1);
    pub const PRIVATE: Modifiers = Modifiers(1 << 2);
    pub const STATIC: Modifiers = Modifiers(1 << 3);
    pub const ABSTRACT: Modifiers = Modifiers(1 << 4);
    pub const FINAL: Modifiers = Modifiers(1 << 5);
    pub const MAGIC: Modifiers = Modifiers(1 << 6);
    pub const READ_ONLY: Modifiers = Modifiers(1 << 7);
    pub const WRITE_ONLY: Modifiers = Modifiers(1 << 8);
    pub const ANONYMOUS: Modifiers = Modifiers(1 << 9);
    pub const USE: Modifiers = Modifiers(1 << 10);

    pub fn contains(&self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Visibility with the PHP default of public when none is written.
    pub fn visibility(&self) -> Modifiers {
        if self.contains(Modifiers::PRIVATE) {
            Modifiers::PRIVATE
        } else if self.contains(Modifiers::PROTECTED) {
            Modifiers::PROTECTED
        } else {
            Modifiers::PUBLIC
        }
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// Where a symbol lives: document URI plus byte and line/column extents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub uri: String,
    pub start_byte: u32,
    pub end_byte: u32,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Location {
    pub fn contains_offset(&self, offset: usize) -> bool {
        let offset = offset as u32;
        self.start_byte <= offset && offset < self.end_byte
    }
}

/// One declared symbol. Top-level symbols carry their FQN in `name`;
/// members and parameters carry the simple name and point at their owner
/// through `scope`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    pub modifiers: Modifiers,
    #[serde(rename = "type")]
    pub type_string: TypeString,
    pub description: String,
    pub scope: String,
    pub location: Location,
    /// Referenced FQNs for class-likes: extends target, implemented
    /// interfaces, used traits, in source order.
    pub associated: Vec<String>,
    pub children: Vec<Symbol>,
}

impl Symbol {
    pub fn new(kind: SymbolKind, name: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            name: name.into(),
            modifiers: Modifiers::NONE,
            type_string: TypeString::new(),
            description: String::new(),
            scope: String::new(),
            location,
            associated: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_class_like(&self) -> bool {
        self.kind.is_class_like()
    }

    pub fn is_magic(&self) -> bool {
        self.modifiers.contains(Modifiers::MAGIC)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    /// Key used when merging members: method names fold case, property
    /// and constant names do not.
    pub fn member_key(&self) -> String {
        if self.kind.case_sensitive() {
            self.name.clone()
        } else {
            self.name.to_lowercase()
        }
    }

    /// The parameter children of a callable, in declaration order.
    pub fn parameters(&self) -> impl Iterator<Item = &Symbol> {
        self.children
            .iter()
            .filter(|c| c.kind == SymbolKind::Parameter)
    }

    /// Render a callable signature, `name(type $a, type $b): ret`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters()
            .map(|p| {
                if p.type_string.is_empty() {
                    format!("${}", p.name)
                } else {
                    format!("{} ${}", p.type_string, p.name)
                }
            })
            .collect();
        let mut signature = format!("{}({})", self.name, params.join(", "));
        if !self.type_string.is_empty() {
            signature.push_str(": ");
            signature.push_str(&self.type_string.to_string());
        }
        signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_bitset_operations() {
        let mut mods = Modifiers::PUBLIC | Modifiers::STATIC;
        assert!(mods.contains(Modifiers::PUBLIC));
        assert!(!mods.contains(Modifiers::FINAL));
        mods.insert(Modifiers::FINAL);
        assert!(mods.contains(Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL));
    }

    #[test]
    fn visibility_defaults_to_public() {
        assert_eq!(Modifiers::STATIC.visibility(), Modifiers::PUBLIC);
        assert_eq!(
            (Modifiers::PRIVATE | Modifiers::STATIC).visibility(),
            Modifiers::PRIVATE
        );
    }

    #[test]
    fn member_keys_fold_case_by_kind() {
        let method = Symbol::new(SymbolKind::Method, "FindAll", Location::default());
        assert_eq!(method.member_key(), "findall");
        let property = Symbol::new(SymbolKind::Property, "FindAll", Location::default());
        assert_eq!(property.member_key(), "FindAll");
    }

    #[test]
    fn signature_renders_parameters_and_return() {
        let mut method = Symbol::new(SymbolKind::Method, "find", Location::default());
        let mut param = Symbol::new(SymbolKind::Parameter, "id", Location::default());
        param.type_string = TypeString::from_text("int");
        method.children.push(param);
        method.type_string = TypeString::from_text("User|null");
        assert_eq!(method.signature(), "find(int $id): User|null");
    }
}
