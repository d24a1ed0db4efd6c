//! Matching awaits of the runner method

use awaitguard_ir::{Operation, OperationGraph, OperationKind, SymbolId};
use awaitguard_symbols::SymbolTable;

/// Decides whether an await's operand invokes exactly the runner method
#[derive(Debug, Clone, Copy)]
pub struct AwaitMatcher {
    runner: SymbolId,
}

impl AwaitMatcher {
    pub fn new(runner: SymbolId) -> Self {
        Self { runner }
    }

    /// True when `await_op` awaits a non-generic invocation whose target is
    /// the runner symbol itself
    ///
    /// Identity is by symbol id, never by name, so same-named methods on
    /// other types and generic instantiations do not match.
    pub fn matches(
        &self,
        graph: &OperationGraph,
        symbols: &SymbolTable,
        await_op: &Operation,
    ) -> bool {
        let OperationKind::Await { operand } = await_op.kind else {
            return false;
        };
        let Some(OperationKind::Invocation { target, .. }) = graph.get(operand).map(|op| &op.kind)
        else {
            return false;
        };
        let Some(method) = symbols.method(*target) else {
            return false;
        };

        !method.is_generic() && method.id == self.runner
    }
}
