//! awaitguard checker
//!
//! Detects awaits of the runner method inside a method, local function, or
//! lambda that is not declared async or does not return a task.
//!
//! The rule runs in four steps per await:
//! - [`AwaitMatcher`]: is the awaited expression an invocation of exactly
//!   the runner symbol resolved by [`CompilationSymbols`]?
//! - [`EnclosingConstructFinder`] and [`ConstructClassifier`]: which
//!   function-like construct owns the await, and what is its symbol?
//! - [`AsyncTaskValidator`]: is that construct async and task-returning?
//! - [`DiagnosticGate`]: has this construct already been flagged?

mod construct;
mod descriptor;
mod diagnostics;
mod driver;
mod error;
mod gate;
mod matcher;
mod resolve;
mod rule;
mod validate;

#[cfg(test)]
mod test_support;

pub use construct::{ConstructClassifier, EnclosingConstructFinder, FunctionConstruct};
pub use descriptor::{RuleDescriptor, Severity, RUNNER_AWAIT_RULE};
pub use diagnostics::{Diagnostic, DiagnosticSink, FixSuggestion, RelatedLocation, SessionSink};
pub use driver::{AnalysisDriver, AnalysisResult, AnalyzerSettings};
pub use error::RuleError;
pub use gate::{DiagnosticGate, GateDecision};
pub use matcher::AwaitMatcher;
pub use resolve::{CompilationSymbols, RunnerTargets, RUNNER_TARGETS};
pub use rule::{
    AnalysisRule, AwaitOutcome, AwaitRunnerRule, BlockAnalyzer, BlockContext, BlockReport,
    RunnerAnalyzer, SkipReason,
};
pub use validate::AsyncTaskValidator;

use awaitguard_symbols::Compilation;

/// Run the built-in rules over a compilation with default settings
pub fn check(compilation: &Compilation) -> AnalysisResult {
    AnalysisDriver::with_default_rules(AnalyzerSettings::default()).run(compilation)
}
