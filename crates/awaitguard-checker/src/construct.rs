//! Finding and classifying the function-like construct that encloses an await

use awaitguard_ir::{Operation, OperationGraph, OperationId, OperationKind, SymbolId, SyntaxNodeId};
use awaitguard_symbols::{MethodSymbol, SymbolTable};

use crate::RuleError;

/// Walks parent links outward from an await
pub struct EnclosingConstructFinder;

impl EnclosingConstructFinder {
    /// Nearest ancestor of `await_op` that is a method body, local function,
    /// or anonymous function
    ///
    /// The search starts at the await's parent. `None` means the await is not
    /// nested in any function-like construct.
    pub fn find(graph: &OperationGraph, await_op: OperationId) -> Option<&Operation> {
        graph
            .ancestors(await_op)
            .find(|op| op.kind.is_function_like())
    }
}

/// A function-like construct together with its callable symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionConstruct<'a> {
    LocalFunction {
        symbol: &'a MethodSymbol,
        syntax: SyntaxNodeId,
    },
    AnonymousFunction {
        symbol: &'a MethodSymbol,
        syntax: SyntaxNodeId,
    },
    /// An ordinary method body; the symbol is the block's owner
    MethodBody {
        owner: &'a MethodSymbol,
        syntax: SyntaxNodeId,
    },
}

impl<'a> FunctionConstruct<'a> {
    pub fn symbol(&self) -> &'a MethodSymbol {
        match *self {
            FunctionConstruct::LocalFunction { symbol, .. }
            | FunctionConstruct::AnonymousFunction { symbol, .. } => symbol,
            FunctionConstruct::MethodBody { owner, .. } => owner,
        }
    }

    /// Syntax node diagnostics are anchored at
    pub fn syntax(&self) -> SyntaxNodeId {
        match *self {
            FunctionConstruct::LocalFunction { syntax, .. }
            | FunctionConstruct::AnonymousFunction { syntax, .. }
            | FunctionConstruct::MethodBody { syntax, .. } => syntax,
        }
    }

    pub fn is_async(&self) -> bool {
        self.symbol().is_async
    }

    pub fn return_type(&self) -> Option<SymbolId> {
        self.symbol().return_type
    }

    /// Description for messages, e.g. "local function `Helper`"
    pub fn describe(&self) -> String {
        match self {
            FunctionConstruct::LocalFunction { symbol, .. } => {
                format!("local function `{}`", symbol.name)
            }
            FunctionConstruct::AnonymousFunction { .. } => "anonymous function".to_string(),
            FunctionConstruct::MethodBody { owner, .. } => format!("method `{}`", owner.name),
        }
    }
}

/// Maps a function-like node to its callable symbol
pub struct ConstructClassifier;

impl ConstructClassifier {
    /// Classify `node`; `owner` is the symbol owning the block under analysis
    ///
    /// A method body node carries no symbol of its own, so its callable is
    /// the block owner.
    pub fn classify<'a>(
        node: &Operation,
        owner: SymbolId,
        symbols: &'a SymbolTable,
    ) -> Result<FunctionConstruct<'a>, RuleError> {
        let lookup = |id: SymbolId, construct: &'static str| {
            symbols
                .method(id)
                .ok_or(RuleError::UnknownCallable { id, construct })
        };

        match node.kind {
            OperationKind::LocalFunction { symbol } => Ok(FunctionConstruct::LocalFunction {
                symbol: lookup(symbol, "local function")?,
                syntax: node.syntax,
            }),
            OperationKind::AnonymousFunction { symbol } => {
                Ok(FunctionConstruct::AnonymousFunction {
                    symbol: lookup(symbol, "anonymous function")?,
                    syntax: node.syntax,
                })
            }
            OperationKind::MethodBody => Ok(FunctionConstruct::MethodBody {
                owner: lookup(owner, "method body")?,
                syntax: node.syntax,
            }),
            ref other => {
                debug_assert!(
                    false,
                    "classify reached {} ({}), outside the function-like stop set",
                    node.id,
                    other.name()
                );
                Err(RuleError::NotAFunctionConstruct {
                    op: node.id,
                    kind: other.name(),
                })
            }
        }
    }
}
