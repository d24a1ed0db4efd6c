//! The async/task-return predicate

use awaitguard_ir::SymbolId;
use awaitguard_symbols::{MethodSymbol, SymbolTable};

/// Checks that a callable is async and returns the awaitable type
pub struct AsyncTaskValidator;

impl AsyncTaskValidator {
    /// Passes iff `callable` is declared async and its return type is
    /// assignable to `awaitable`
    ///
    /// An absent awaitable type, or a callable returning nothing, always
    /// fails.
    pub fn is_valid(
        callable: &MethodSymbol,
        awaitable: Option<SymbolId>,
        symbols: &SymbolTable,
    ) -> bool {
        let (Some(awaitable), Some(returns)) = (awaitable, callable.return_type) else {
            return false;
        };
        callable.is_async && symbols.is_assignable(awaitable, returns)
    }
}
