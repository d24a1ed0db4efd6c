//! awaitguard IR - Operation graph and syntax model
//!
//! This crate defines the semantic operation graph that rules walk,
//! the syntax nodes that diagnostics anchor to, and source spans.

mod error;
mod graph;
mod operation;
mod span;
mod syntax;

pub use error::IrError;
pub use graph::{Ancestors, OperationBlock, OperationGraph};
pub use operation::{Operation, OperationId, OperationKind};
pub use span::*;
pub use syntax::{SyntaxNode, SyntaxNodeId, SyntaxTree};

use serde::{Deserialize, Serialize};

/// Identifier of a symbol in the compilation's symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
