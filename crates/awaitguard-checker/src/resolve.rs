//! One-time resolution of the symbols the runner rule depends on

use awaitguard_ir::SymbolId;
use awaitguard_symbols::SymbolTable;

/// Fully-qualified names the runner rule looks up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerTargets {
    /// Metadata name of the type declaring the runner method
    pub runner_type: &'static str,
    /// Simple, case-sensitive name of the runner method
    pub runner_method: &'static str,
    /// Metadata name of the task type constructs must return
    pub awaitable_type: &'static str,
}

pub const RUNNER_TARGETS: RunnerTargets = RunnerTargets {
    runner_type: "Runtime.Tasks.Runner",
    runner_method: "RunAsync",
    awaitable_type: "System.Threading.Tasks.Task",
};

/// Symbols resolved once per compilation and shared read-only by every
/// block analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompilationSymbols {
    pub runner_method: Option<SymbolId>,
    pub awaitable_return_type: Option<SymbolId>,
}

impl CompilationSymbols {
    /// Resolve `targets` against `symbols`
    ///
    /// The runner method is found only when member lookup yields exactly one
    /// candidate; overload sets are treated as not found. The awaitable type
    /// is resolved independently of the runner.
    pub fn resolve(symbols: &SymbolTable, targets: &RunnerTargets) -> Self {
        let runner_method = symbols
            .type_by_metadata_name(targets.runner_type)
            .and_then(|ty| match symbols.members(ty.id, targets.runner_method).as_slice() {
                [only] => Some(only.id),
                _ => None,
            });

        let awaitable_return_type = symbols
            .type_by_metadata_name(targets.awaitable_type)
            .map(|ty| ty.id);

        Self {
            runner_method,
            awaitable_return_type,
        }
    }

    /// Whether the rule should install block analysis for this compilation
    ///
    /// Both symbols are required; without the awaitable type every construct
    /// would fail validation.
    pub fn is_active(&self) -> bool {
        self.runner_method.is_some() && self.awaitable_return_type.is_some()
    }
}
