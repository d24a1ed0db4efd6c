//! Error types for loading and validating compilations

use awaitguard_ir::{IrError, SymbolId, SyntaxNodeId};
use thiserror::Error;

/// Errors found while loading a compilation
#[derive(Debug, Error)]
pub enum SymbolError {
    /// E-SYMBOL-001: A symbol references an id that is not in the table
    #[error("unknown symbol {id} referenced by {referrer}")]
    UnknownSymbol { id: SymbolId, referrer: String },

    /// E-SYMBOL-002: A symbol of the wrong category is referenced
    #[error("symbol {id} referenced by {referrer} is not a {expected}")]
    WrongCategory {
        id: SymbolId,
        referrer: String,
        expected: &'static str,
    },

    /// E-SYMBOL-003: Stored symbol id does not match its table position
    #[error("symbol id {found} stored at index {index}")]
    MisplacedId { found: SymbolId, index: usize },

    /// E-SYMBOL-004: A pre-existing diagnostic is attached to a missing node
    #[error("diagnostic {rule_id} attached to unknown syntax node {syntax}")]
    UnknownAttachment { rule_id: String, syntax: SyntaxNodeId },

    /// E-SYMBOL-005: A type reaches itself through type arguments or original definition
    #[error("type {id} refers to itself through its type arguments or definition")]
    CyclicType { id: SymbolId },

    /// E-IR-*: Structural error inside an operation block
    #[error("block {block}: {source}")]
    Block {
        block: usize,
        #[source]
        source: IrError,
    },

    /// E-LOAD-001: Compilation file could not be decoded
    #[error("malformed compilation: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl SymbolError {
    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            SymbolError::UnknownSymbol { .. } => "E-SYMBOL-001",
            SymbolError::WrongCategory { .. } => "E-SYMBOL-002",
            SymbolError::MisplacedId { .. } => "E-SYMBOL-003",
            SymbolError::UnknownAttachment { .. } => "E-SYMBOL-004",
            SymbolError::CyclicType { .. } => "E-SYMBOL-005",
            SymbolError::Block { source, .. } => source.code(),
            SymbolError::Malformed(_) => "E-LOAD-001",
        }
    }
}
