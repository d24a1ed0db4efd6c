//! Error types for operation graph validation

use thiserror::Error;

use crate::{OperationId, SyntaxNodeId};

/// Structural errors found when validating a deserialized operation graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    /// E-IR-001: An operation points at a parent that is not in the graph
    #[error("operation {op} has unknown parent {parent}")]
    UnknownParent { op: OperationId, parent: OperationId },

    /// E-IR-002: An await or invocation references a missing operation
    #[error("operation {op} references unknown operand {operand}")]
    UnknownOperand { op: OperationId, operand: OperationId },

    /// E-IR-003: Following parent links from an operation loops back on itself
    #[error("parent chain starting at {op} is cyclic")]
    CyclicParent { op: OperationId },

    /// E-IR-004: An operation is anchored at a syntax node that does not exist
    #[error("operation {op} is anchored at unknown syntax node {syntax}")]
    UnknownSyntax { op: OperationId, syntax: SyntaxNodeId },

    /// E-IR-005: Stored ids disagree with arena positions
    #[error("{what} id {found} stored at index {index}")]
    MisplacedId {
        what: &'static str,
        found: u32,
        index: usize,
    },
}

impl IrError {
    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            IrError::UnknownParent { .. } => "E-IR-001",
            IrError::UnknownOperand { .. } => "E-IR-002",
            IrError::CyclicParent { .. } => "E-IR-003",
            IrError::UnknownSyntax { .. } => "E-IR-004",
            IrError::MisplacedId { .. } => "E-IR-005",
        }
    }
}
