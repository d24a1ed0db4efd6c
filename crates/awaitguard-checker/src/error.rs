//! Internal rule errors
//!
//! These never leave the rule: the analyzer logs them and skips the await
//! that produced them.

use awaitguard_ir::{OperationId, SymbolId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// E-RULE-001: Classification reached a node outside the function-like stop set
    #[error("operation {op} ({kind}) is not a function-like construct")]
    NotAFunctionConstruct { op: OperationId, kind: &'static str },

    /// E-RULE-002: A construct's symbol is missing or is not callable
    #[error("symbol {id} of {construct} is not a callable in the symbol table")]
    UnknownCallable {
        id: SymbolId,
        construct: &'static str,
    },
}

impl RuleError {
    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            RuleError::NotAFunctionConstruct { .. } => "E-RULE-001",
            RuleError::UnknownCallable { .. } => "E-RULE-002",
        }
    }

    /// Whether this indicates a bug in the traversal rather than odd input
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, RuleError::NotAFunctionConstruct { .. })
    }
}
