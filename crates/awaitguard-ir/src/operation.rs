//! Operation nodes

use serde::{Deserialize, Serialize};

use crate::{SymbolId, SyntaxNodeId};

/// Index of an operation inside its [`OperationGraph`](crate::OperationGraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId(pub u32);

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// Kind of an operation node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationKind {
    /// `await <operand>`
    Await { operand: OperationId },
    /// Call of `target`; `target` is the constructed symbol for generic calls
    Invocation {
        target: SymbolId,
        #[serde(default)]
        arguments: Vec<OperationId>,
    },
    /// Declaration of a local function
    LocalFunction { symbol: SymbolId },
    /// Lambda or anonymous method
    AnonymousFunction { symbol: SymbolId },
    /// Body of an ordinary method; its symbol is the block owner
    MethodBody,
    /// Anything else (blocks, returns, assignments, ...)
    Other {
        #[serde(default)]
        label: String,
    },
}

impl OperationKind {
    /// Whether this node owns an asynchrony declaration and a return type
    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            OperationKind::LocalFunction { .. }
                | OperationKind::AnonymousFunction { .. }
                | OperationKind::MethodBody
        )
    }

    pub fn is_await(&self) -> bool {
        matches!(self, OperationKind::Await { .. })
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Await { .. } => "await",
            OperationKind::Invocation { .. } => "invocation",
            OperationKind::LocalFunction { .. } => "local function",
            OperationKind::AnonymousFunction { .. } => "anonymous function",
            OperationKind::MethodBody => "method body",
            OperationKind::Other { .. } => "other",
        }
    }
}

/// A node of the operation graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    #[serde(flatten)]
    pub kind: OperationKind,
    /// Back-reference to the enclosing operation; `None` for the root
    #[serde(default)]
    pub parent: Option<OperationId>,
    pub syntax: SyntaxNodeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_like_kinds() {
        assert!(OperationKind::MethodBody.is_function_like());
        assert!(OperationKind::LocalFunction { symbol: SymbolId(1) }.is_function_like());
        assert!(OperationKind::AnonymousFunction { symbol: SymbolId(2) }.is_function_like());
        assert!(!OperationKind::Await { operand: OperationId(0) }.is_function_like());
        assert!(!OperationKind::Other { label: "block".into() }.is_function_like());
    }
}
