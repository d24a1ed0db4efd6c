//! Analysis driver
//!
//! Plays the host's part: runs every rule's compilation-start hook, feeds
//! operation blocks to the analyzers that came back, and collects what they
//! report into a fresh session sink.

use std::collections::{HashMap, HashSet};

use awaitguard_symbols::Compilation;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::{
    AnalysisRule, AwaitRunnerRule, BlockAnalyzer, BlockContext, BlockReport, Diagnostic,
    SessionSink, Severity,
};

/// Settings controlling a run
#[derive(Debug, Clone, Default)]
pub struct AnalyzerSettings {
    /// Analyze operation blocks concurrently
    pub parallel: bool,
    /// Severity to use instead of a rule's default, by rule id
    pub severity_overrides: HashMap<String, Severity>,
    /// Rules that must not run, by rule id
    pub disabled_rules: HashSet<String>,
}

/// Result of running the driver over one compilation
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    /// Reported diagnostics, ordered by location
    pub diagnostics: Vec<Diagnostic>,
    /// Blocks handed to at least one analyzer
    pub blocks_analyzed: usize,
    /// Ids of enabled rules that declined the compilation
    pub inert_rules: Vec<String>,
    pub report: BlockReport,
}

impl AnalysisResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Runs registered rules over compilations
pub struct AnalysisDriver {
    rules: Vec<Box<dyn AnalysisRule>>,
    settings: AnalyzerSettings,
}

impl AnalysisDriver {
    /// A driver with no rules registered
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self {
            rules: Vec::new(),
            settings,
        }
    }

    /// A driver with every built-in rule registered
    pub fn with_default_rules(settings: AnalyzerSettings) -> Self {
        let mut driver = Self::new(settings);
        driver.register(Box::new(AwaitRunnerRule::new()));
        driver
    }

    pub fn register(&mut self, rule: Box<dyn AnalysisRule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn AnalysisRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Analyze `compilation`
    ///
    /// Every call starts from a new session sink, so repeated runs over an
    /// unchanged compilation report the same diagnostics.
    #[instrument(skip_all, fields(compilation = %compilation.name))]
    pub fn run(&self, compilation: &Compilation) -> AnalysisResult {
        let mut result = AnalysisResult::default();
        let mut analyzers: Vec<Box<dyn BlockAnalyzer>> = Vec::new();

        for rule in &self.rules {
            let descriptor = rule.descriptor();
            if !descriptor.enabled_by_default
                || self.settings.disabled_rules.contains(descriptor.id)
            {
                debug!(rule = descriptor.id, "rule disabled");
                continue;
            }
            match rule.on_compilation_start(compilation) {
                Some(analyzer) => analyzers.push(analyzer),
                None => result.inert_rules.push(descriptor.id.to_string()),
            }
        }

        if analyzers.is_empty() {
            info!(inert = result.inert_rules.len(), "no active rules; skipping traversal");
            return result;
        }

        let sink = SessionSink::new(compilation)
            .with_severity_overrides(self.settings.severity_overrides.clone());

        let analyze = |block| {
            let ctx = BlockContext { compilation, block };
            analyzers
                .iter()
                .map(|analyzer| analyzer.analyze_block(&ctx, &sink))
                .fold(BlockReport::default(), BlockReport::merge)
        };

        result.report = if self.settings.parallel {
            compilation
                .blocks
                .par_iter()
                .map(analyze)
                .reduce(BlockReport::default, BlockReport::merge)
        } else {
            compilation
                .blocks
                .iter()
                .map(analyze)
                .fold(BlockReport::default(), BlockReport::merge)
        };
        result.blocks_analyzed = compilation.blocks.len();

        let mut diagnostics = sink.into_reported();
        diagnostics.sort_by(|a, b| {
            (a.span, &a.rule_id, a.syntax).cmp(&(b.span, &b.rule_id, b.syntax))
        });
        result.diagnostics = diagnostics;

        info!(
            blocks = result.blocks_analyzed,
            reported = result.report.reported,
            suppressed = result.report.suppressed,
            "analysis finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture;
    use crate::RUNNER_AWAIT_RULE;
    use awaitguard_ir::Span;
    use awaitguard_symbols::{CompilationBuilder, MethodSpec};

    /// Five non-async methods, each awaiting the runner twice
    fn many_blocks() -> Compilation {
        let mut f = fixture();
        for i in 0..5 {
            let start = i * 100;
            let name = format!("Work{}", i);
            let method = f
                .b
                .add_method(MethodSpec::ordinary(name.as_str()).on(f.program).returns(f.task));
            let mut block = f.b.block(method);
            let body = block.method_body(Span::new(start, start + 90), &format!("method {}", name));
            block.await_call(body, f.run, Span::new(start + 10, start + 30));
            block.await_call(body, f.run, Span::new(start + 40, start + 60));
            block.finish();
        }
        f.b.build()
    }

    #[test]
    fn test_inert_rule_skips_traversal() {
        let mut b = CompilationBuilder::new("Plain");
        let main = b.add_method(MethodSpec::ordinary("Main"));
        let mut block = b.block(main);
        block.method_body(Span::new(0, 10), "method Main");
        block.finish();
        let compilation = b.build();

        let result =
            AnalysisDriver::with_default_rules(AnalyzerSettings::default()).run(&compilation);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.blocks_analyzed, 0);
        assert_eq!(result.inert_rules, vec![RUNNER_AWAIT_RULE.id.to_string()]);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let compilation = many_blocks();

        let sequential =
            AnalysisDriver::with_default_rules(AnalyzerSettings::default()).run(&compilation);
        let parallel = AnalysisDriver::with_default_rules(AnalyzerSettings {
            parallel: true,
            ..Default::default()
        })
        .run(&compilation);

        assert_eq!(sequential.diagnostics.len(), 5);
        assert_eq!(sequential.diagnostics, parallel.diagnostics);
        assert_eq!(sequential.report, BlockReport { reported: 5, suppressed: 5, skipped: 0 });
        assert_eq!(parallel.report, sequential.report);
    }

    #[test]
    fn test_diagnostics_sorted_by_location() {
        let result =
            AnalysisDriver::with_default_rules(AnalyzerSettings::default()).run(&many_blocks());
        let starts: Vec<_> = result.diagnostics.iter().map(|d| d.span.start).collect();
        assert_eq!(starts, vec![0, 100, 200, 300, 400]);
    }

    #[test]
    fn test_severity_override() {
        let settings = AnalyzerSettings {
            severity_overrides: HashMap::from([(
                RUNNER_AWAIT_RULE.id.to_string(),
                Severity::Error,
            )]),
            ..Default::default()
        };
        let result = AnalysisDriver::with_default_rules(settings).run(&many_blocks());

        assert!(result.has_errors());
        assert!(result.diagnostics.iter().all(|d| d.severity == Severity::Error));
    }

    #[test]
    fn test_disabled_rule() {
        let settings = AnalyzerSettings {
            disabled_rules: HashSet::from([RUNNER_AWAIT_RULE.id.to_string()]),
            ..Default::default()
        };
        let result = AnalysisDriver::with_default_rules(settings).run(&many_blocks());

        assert!(result.diagnostics.is_empty());
        assert!(result.inert_rules.is_empty());
        assert_eq!(result.blocks_analyzed, 0);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let compilation = many_blocks();
        let driver = AnalysisDriver::with_default_rules(AnalyzerSettings::default());

        let first = driver.run(&compilation);
        let second = driver.run(&compilation);
        assert_eq!(first.diagnostics, second.diagnostics);
    }
}
