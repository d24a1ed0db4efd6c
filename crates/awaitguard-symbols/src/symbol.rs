//! Symbol information and types

use awaitguard_ir::SymbolId;
use serde::{Deserialize, Serialize};

/// Kind of a callable symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// A method declared on a type
    #[default]
    Ordinary,
    LocalFunction,
    /// Lambda or anonymous method
    AnonymousFunction,
}

/// A named type, or a constructed instantiation of a generic type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSymbol {
    /// Assigned on insertion into the table
    #[serde(default = "unassigned")]
    pub id: SymbolId,

    /// Fully-qualified metadata name, e.g. `System.Threading.Tasks.Task`1`
    pub metadata_name: String,

    #[serde(default)]
    pub base_type: Option<SymbolId>,

    #[serde(default)]
    pub interfaces: Vec<SymbolId>,

    /// Declared type parameter names (empty for non-generic types)
    #[serde(default)]
    pub type_parameters: Vec<String>,

    // === Constructed generics ===
    /// For `Task<int>`: the `Task<T>` definition
    #[serde(default)]
    pub original_definition: Option<SymbolId>,

    #[serde(default)]
    pub type_arguments: Vec<SymbolId>,
}

impl TypeSymbol {
    pub fn new(metadata_name: impl Into<String>) -> Self {
        Self {
            id: unassigned(),
            metadata_name: metadata_name.into(),
            base_type: None,
            interfaces: Vec::new(),
            type_parameters: Vec::new(),
            original_definition: None,
            type_arguments: Vec::new(),
        }
    }

    /// Whether this is a constructed instantiation rather than a definition
    pub fn is_constructed(&self) -> bool {
        self.original_definition.is_some()
    }
}

/// A method, local function, or anonymous function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSymbol {
    #[serde(default = "unassigned")]
    pub id: SymbolId,

    /// Simple name; empty for anonymous functions
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub kind: MethodKind,

    #[serde(default)]
    pub containing_type: Option<SymbolId>,

    /// Declared with the `async` modifier
    #[serde(default)]
    pub is_async: bool,

    /// `None` means the method returns nothing (void)
    #[serde(default)]
    pub return_type: Option<SymbolId>,

    #[serde(default)]
    pub type_parameters: Vec<String>,

    // === Constructed generics ===
    #[serde(default)]
    pub original_definition: Option<SymbolId>,

    #[serde(default)]
    pub type_arguments: Vec<SymbolId>,
}

impl MethodSymbol {
    pub fn new(name: impl Into<String>, kind: MethodKind) -> Self {
        Self {
            id: unassigned(),
            name: name.into(),
            kind,
            containing_type: None,
            is_async: false,
            return_type: None,
            type_parameters: Vec::new(),
            original_definition: None,
            type_arguments: Vec::new(),
        }
    }

    /// True for generic method definitions and for their instantiations
    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty() || !self.type_arguments.is_empty()
    }

    /// Whether the method is found by member lookup on its containing type
    pub fn is_member(&self) -> bool {
        self.kind == MethodKind::Ordinary
            && self.containing_type.is_some()
            && self.original_definition.is_none()
    }
}

/// Any symbol in the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "symbol", rename_all = "snake_case")]
pub enum Symbol {
    Type(TypeSymbol),
    Method(MethodSymbol),
}

impl Symbol {
    pub fn id(&self) -> SymbolId {
        match self {
            Symbol::Type(t) => t.id,
            Symbol::Method(m) => m.id,
        }
    }

    pub(crate) fn set_id(&mut self, id: SymbolId) {
        match self {
            Symbol::Type(t) => t.id = id,
            Symbol::Method(m) => m.id = id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Type(t) => &t.metadata_name,
            Symbol::Method(m) => &m.name,
        }
    }

    pub fn as_type(&self) -> Option<&TypeSymbol> {
        match self {
            Symbol::Type(t) => Some(t),
            Symbol::Method(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodSymbol> {
        match self {
            Symbol::Method(m) => Some(m),
            Symbol::Type(_) => None,
        }
    }
}

fn unassigned() -> SymbolId {
    SymbolId(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_generic_flags() {
        let plain = MethodSymbol::new("RunAsync", MethodKind::Ordinary);
        assert!(!plain.is_generic());

        let mut definition = MethodSymbol::new("RunAsync", MethodKind::Ordinary);
        definition.type_parameters = vec!["T".into()];
        assert!(definition.is_generic());

        let mut constructed = MethodSymbol::new("RunAsync", MethodKind::Ordinary);
        constructed.original_definition = Some(SymbolId(3));
        constructed.type_arguments = vec![SymbolId(1)];
        assert!(constructed.is_generic());
    }

    #[test]
    fn test_member_excludes_locals_and_constructions() {
        let mut m = MethodSymbol::new("Load", MethodKind::Ordinary);
        assert!(!m.is_member(), "no containing type");
        m.containing_type = Some(SymbolId(0));
        assert!(m.is_member());

        let mut local = m.clone();
        local.kind = MethodKind::LocalFunction;
        assert!(!local.is_member());

        let mut constructed = m.clone();
        constructed.original_definition = Some(SymbolId(5));
        assert!(!constructed.is_member());
    }
}
