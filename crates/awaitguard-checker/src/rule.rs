//! Rule traits and the runner-await rule
//!
//! A rule is asked once per compilation whether it wants to run. If it does,
//! it hands back a [`BlockAnalyzer`] holding whatever it precomputed; the
//! driver then calls that analyzer for every operation block, possibly from
//! several threads at once.

use awaitguard_ir::{Operation, OperationBlock, SyntaxNodeId};
use awaitguard_symbols::{Compilation, SymbolTable};
use tracing::{debug, trace, warn};

use crate::{
    AsyncTaskValidator, AwaitMatcher, CompilationSymbols, ConstructClassifier, Diagnostic,
    DiagnosticGate, DiagnosticSink, EnclosingConstructFinder, FixSuggestion, FunctionConstruct,
    GateDecision, RuleDescriptor, RunnerTargets, RUNNER_AWAIT_RULE, RUNNER_TARGETS,
};

/// What a block analyzer sees
#[derive(Debug, Clone, Copy)]
pub struct BlockContext<'a> {
    pub compilation: &'a Compilation,
    pub block: &'a OperationBlock,
}

/// Counts of terminal states reached while analyzing blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockReport {
    pub reported: usize,
    pub suppressed: usize,
    pub skipped: usize,
}

impl BlockReport {
    pub fn record(&mut self, outcome: AwaitOutcome) {
        match outcome {
            AwaitOutcome::Reported { .. } => self.reported += 1,
            AwaitOutcome::Suppressed { .. } => self.suppressed += 1,
            AwaitOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    pub fn merge(self, other: BlockReport) -> BlockReport {
        BlockReport {
            reported: self.reported + other.reported,
            suppressed: self.suppressed + other.suppressed,
            skipped: self.skipped + other.skipped,
        }
    }
}

/// A rule that can be registered with the driver
pub trait AnalysisRule: Send + Sync {
    fn descriptor(&self) -> &RuleDescriptor;

    /// Compilation-start hook; `None` leaves the rule inert for `compilation`
    fn on_compilation_start(&self, compilation: &Compilation) -> Option<Box<dyn BlockAnalyzer>>;
}

/// Per-compilation analyzer invoked for each operation block
pub trait BlockAnalyzer: Send + Sync {
    fn analyze_block(&self, ctx: &BlockContext<'_>, sink: &dyn DiagnosticSink) -> BlockReport;
}

/// Why an await reached the `Skipped` state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The await does not invoke the runner
    NotRunner,
    /// No function-like construct encloses the await
    NoEnclosingConstruct,
    /// The enclosing construct could not be mapped to a callable symbol
    Unclassifiable,
    /// The construct is async and returns the awaitable type
    Valid,
}

/// Terminal state of one await
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwaitOutcome {
    Reported { syntax: SyntaxNodeId },
    Suppressed { syntax: SyntaxNodeId },
    Skipped(SkipReason),
}

/// Flags awaits of the runner method inside constructs that are not async
/// or do not return the awaitable task type
#[derive(Debug, Clone, Copy)]
pub struct AwaitRunnerRule {
    targets: RunnerTargets,
}

impl AwaitRunnerRule {
    pub fn new() -> Self {
        Self {
            targets: RUNNER_TARGETS,
        }
    }
}

impl Default for AwaitRunnerRule {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisRule for AwaitRunnerRule {
    fn descriptor(&self) -> &RuleDescriptor {
        &RUNNER_AWAIT_RULE
    }

    fn on_compilation_start(&self, compilation: &Compilation) -> Option<Box<dyn BlockAnalyzer>> {
        let analyzer = RunnerAnalyzer::for_compilation(compilation, self.targets)?;
        Some(Box::new(analyzer))
    }
}

/// Block analyzer of [`AwaitRunnerRule`], holding the resolved symbols
#[derive(Debug, Clone, Copy)]
pub struct RunnerAnalyzer {
    symbols: CompilationSymbols,
    matcher: AwaitMatcher,
    targets: RunnerTargets,
}

impl RunnerAnalyzer {
    /// Resolve symbols for `compilation`; `None` when the rule must stay inert
    pub fn for_compilation(compilation: &Compilation, targets: RunnerTargets) -> Option<Self> {
        let symbols = CompilationSymbols::resolve(&compilation.symbols, &targets);
        if !symbols.is_active() {
            debug!(
                compilation = %compilation.name,
                runner_found = symbols.runner_method.is_some(),
                awaitable_found = symbols.awaitable_return_type.is_some(),
                "{} inert: target symbols not resolved",
                RUNNER_AWAIT_RULE.id
            );
            return None;
        }
        let runner = symbols.runner_method?;
        Some(Self {
            symbols,
            matcher: AwaitMatcher::new(runner),
            targets,
        })
    }

    /// Drive one await through match, find, classify, validate, and gate
    pub fn analyze_await(
        &self,
        ctx: &BlockContext<'_>,
        await_op: &Operation,
        sink: &dyn DiagnosticSink,
    ) -> AwaitOutcome {
        let graph = &ctx.block.graph;
        let table = &ctx.compilation.symbols;

        if !self.matcher.matches(graph, table, await_op) {
            return AwaitOutcome::Skipped(SkipReason::NotRunner);
        }

        let Some(node) = EnclosingConstructFinder::find(graph, await_op.id) else {
            trace!(op = %await_op.id, "runner await outside any function-like construct");
            return AwaitOutcome::Skipped(SkipReason::NoEnclosingConstruct);
        };

        let construct = match ConstructClassifier::classify(node, ctx.block.owner, table) {
            Ok(construct) => construct,
            Err(error) if error.is_invariant_violation() => {
                warn!(code = error.code(), op = %node.id, "{}", error);
                return AwaitOutcome::Skipped(SkipReason::Unclassifiable);
            }
            Err(error) => {
                debug!(code = error.code(), op = %node.id, "{}", error);
                return AwaitOutcome::Skipped(SkipReason::Unclassifiable);
            }
        };

        let awaitable = self.symbols.awaitable_return_type;
        if AsyncTaskValidator::is_valid(construct.symbol(), awaitable, table) {
            return AwaitOutcome::Skipped(SkipReason::Valid);
        }

        let diagnostic = self.build_diagnostic(ctx, &construct, await_op);
        let syntax = construct.syntax();
        match DiagnosticGate::submit(sink, diagnostic) {
            GateDecision::Reported => AwaitOutcome::Reported { syntax },
            GateDecision::Suppressed => AwaitOutcome::Suppressed { syntax },
        }
    }

    fn build_diagnostic(
        &self,
        ctx: &BlockContext<'_>,
        construct: &FunctionConstruct<'_>,
        await_op: &Operation,
    ) -> Diagnostic {
        let table = &ctx.compilation.symbols;
        let what = construct.describe();
        let runner = format!(
            "{}.{}",
            short_name(self.targets.runner_type),
            self.targets.runner_method
        );
        let awaitable = self
            .symbols
            .awaitable_return_type
            .map(|id| table.display_type(id))
            .unwrap_or_else(|| self.targets.awaitable_type.to_string());
        let returns = return_type_name(table, construct);
        let returns_task = construct
            .return_type()
            .zip(self.symbols.awaitable_return_type)
            .is_some_and(|(ret, task)| table.is_assignable(task, ret));

        let message = if construct.is_async() {
            format!(
                "{} awaits `{}` but returns `{}`, which is not assignable to `{}`",
                what, runner, returns, awaitable
            )
        } else {
            format!("{} awaits `{}` but is not declared `async`", what, runner)
        };

        let mut suggestions = Vec::new();
        if !construct.is_async() {
            suggestions.push(FixSuggestion::AddAsyncModifier {
                construct: what.clone(),
            });
        }
        if !returns_task {
            suggestions.push(FixSuggestion::ChangeReturnType {
                construct: what,
                from: returns,
                to: awaitable,
            });
        }

        let syntax = construct.syntax();
        Diagnostic::new(
            RUNNER_AWAIT_RULE.id,
            RUNNER_AWAIT_RULE.default_severity,
            syntax,
            ctx.compilation.span_of(syntax),
            message,
        )
        .with_explanation(RUNNER_AWAIT_RULE.help)
        .with_suggestions(suggestions)
        .with_related(ctx.compilation.span_of(await_op.syntax), "runner awaited here")
    }
}

impl BlockAnalyzer for RunnerAnalyzer {
    fn analyze_block(&self, ctx: &BlockContext<'_>, sink: &dyn DiagnosticSink) -> BlockReport {
        let mut report = BlockReport::default();
        for await_op in ctx.block.graph.awaits() {
            let outcome = self.analyze_await(ctx, await_op, sink);
            trace!(op = %await_op.id, ?outcome, "await analyzed");
            report.record(outcome);
        }
        report
    }
}

fn short_name(metadata_name: &str) -> &str {
    metadata_name.rsplit('.').next().unwrap_or(metadata_name)
}

fn return_type_name(table: &SymbolTable, construct: &FunctionConstruct<'_>) -> String {
    construct
        .return_type()
        .map(|id| table.display_type(id))
        .unwrap_or_else(|| "void".to_string())
}
