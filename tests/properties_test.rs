//! Property tests for the runner-await rule over generated compilations

use std::collections::HashSet;

use awaitguard::checker::{AnalysisDriver, AnalysisResult, AnalyzerSettings};
use awaitguard::ir::{OperationId, Span, SymbolId};
use awaitguard::symbols::{BlockBuilder, Compilation, CompilationBuilder, MethodSpec};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Returns {
    Void,
    Task,
    TaskOfInt,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nested {
    LocalFunction,
    Lambda,
}

/// A function-like construct with its own awaits
#[derive(Debug, Clone)]
struct ConstructShape {
    is_async: bool,
    returns: Returns,
    runner_awaits: usize,
    other_awaits: usize,
    /// Runner awaits placed under a structural wrapper node
    wrapped: bool,
}

impl ConstructShape {
    fn is_valid(&self) -> bool {
        self.is_async && matches!(self.returns, Returns::Task | Returns::TaskOfInt)
    }

    /// Whether the rule must flag this construct
    fn violates(&self) -> bool {
        self.runner_awaits > 0 && !self.is_valid()
    }
}

#[derive(Debug, Clone)]
struct MethodShape {
    body: ConstructShape,
    nested: Vec<(Nested, ConstructShape)>,
}

fn returns() -> impl Strategy<Value = Returns> {
    prop_oneof![
        Just(Returns::Void),
        Just(Returns::Task),
        Just(Returns::TaskOfInt),
        Just(Returns::Int),
    ]
}

fn construct() -> impl Strategy<Value = ConstructShape> {
    (any::<bool>(), returns(), 0usize..4, 0usize..3, any::<bool>()).prop_map(
        |(is_async, returns, runner_awaits, other_awaits, wrapped)| ConstructShape {
            is_async,
            returns,
            runner_awaits,
            other_awaits,
            wrapped,
        },
    )
}

fn method() -> impl Strategy<Value = MethodShape> {
    let nested = (prop_oneof![Just(Nested::LocalFunction), Just(Nested::Lambda)], construct());
    (construct(), prop::collection::vec(nested, 0..3))
        .prop_map(|(body, nested)| MethodShape { body, nested })
}

/// Generated compilation plus the spans the rule must report
struct Generated {
    compilation: Compilation,
    expected: Vec<Span>,
}

struct Types {
    task: SymbolId,
    task_int: SymbolId,
    int: SymbolId,
    run: SymbolId,
    other: SymbolId,
}

fn apply(spec: MethodSpec, shape: &ConstructShape, types: &Types) -> MethodSpec {
    let spec = if shape.is_async { spec.asynchronous() } else { spec };
    match shape.returns {
        Returns::Void => spec,
        Returns::Task => spec.returns(types.task),
        Returns::TaskOfInt => spec.returns(types.task_int),
        Returns::Int => spec.returns(types.int),
    }
}

fn add_awaits(
    block: &mut BlockBuilder<'_>,
    owner: OperationId,
    shape: &ConstructShape,
    types: &Types,
    next: &mut impl FnMut() -> Span,
) {
    let parent = if shape.wrapped {
        block.other(owner, "block")
    } else {
        owner
    };
    for _ in 0..shape.runner_awaits {
        block.await_call(parent, types.run, next());
    }
    for _ in 0..shape.other_awaits {
        block.await_call(owner, types.other, next());
    }
}

fn generate(methods: &[MethodShape], with_runner: bool) -> Generated {
    let mut b = CompilationBuilder::new("Generated");
    let object = b.add_type("System.Object");
    let int = b.add_type("System.Int32");
    let task = b.add_derived_type("System.Threading.Tasks.Task", object);
    let task_t = b.add_generic_type("System.Threading.Tasks.Task`1", &["TResult"], Some(task));
    let task_int = b.construct_type(task_t, &[int]);
    let runner_name = if with_runner {
        "Runtime.Tasks.Runner"
    } else {
        "Runtime.Tasks.Scheduler"
    };
    let runner = b.add_type(runner_name);
    let run = b.add_method(MethodSpec::ordinary("RunAsync").on(runner).returns(task));
    let program = b.add_type("App.Program");
    let other = b.add_method(MethodSpec::ordinary("DelayAsync").on(program).returns(task));
    let types = Types {
        task,
        task_int,
        int,
        run,
        other,
    };

    let mut cursor = 0;
    let mut next = move || {
        cursor += 10;
        Span::new(cursor, cursor + 5)
    };
    let mut expected = Vec::new();

    for (i, shape) in methods.iter().enumerate() {
        let spec = apply(MethodSpec::ordinary(format!("M{}", i)).on(program), &shape.body, &types);
        let owner = b.add_method(spec);
        let nested_symbols: Vec<SymbolId> = shape
            .nested
            .iter()
            .enumerate()
            .map(|(j, (kind, nested))| {
                let spec = match kind {
                    Nested::LocalFunction => MethodSpec::local_function(format!("L{}_{}", i, j)),
                    Nested::Lambda => MethodSpec::anonymous(),
                };
                b.add_method(apply(spec, nested, &types))
            })
            .collect();

        let mut block = b.block(owner);
        let body_span = next();
        let body = block.method_body(body_span, "method");
        if shape.body.violates() {
            expected.push(body_span);
        }
        add_awaits(&mut block, body, &shape.body, &types, &mut next);

        for ((kind, nested), symbol) in shape.nested.iter().zip(nested_symbols) {
            let span = next();
            let node = match kind {
                Nested::LocalFunction => block.local_function(body, symbol, span, "local function"),
                Nested::Lambda => {
                    let arg = block.other(body, "argument");
                    block.anonymous_function(arg, symbol, span, "lambda")
                }
            };
            if nested.violates() {
                expected.push(span);
            }
            add_awaits(&mut block, node, nested, &types, &mut next);
        }
        block.finish();
    }

    expected.sort();
    Generated {
        compilation: b.build(),
        expected: if with_runner { expected } else { Vec::new() },
    }
}

fn run(compilation: &Compilation, parallel: bool) -> AnalysisResult {
    AnalysisDriver::with_default_rules(AnalyzerSettings {
        parallel,
        ..Default::default()
    })
    .run(compilation)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_flags_exactly_the_violating_constructs(methods in prop::collection::vec(method(), 1..6)) {
        let generated = generate(&methods, true);
        prop_assert!(generated.compilation.validate().is_ok());

        let result = run(&generated.compilation, false);
        let spans: Vec<Span> = result.diagnostics.iter().map(|d| d.span).collect();
        prop_assert_eq!(spans, generated.expected);
    }

    #[test]
    fn prop_at_most_one_diagnostic_per_construct(methods in prop::collection::vec(method(), 1..6)) {
        let generated = generate(&methods, true);
        let result = run(&generated.compilation, true);

        let mut seen = HashSet::new();
        for diag in &result.diagnostics {
            prop_assert!(seen.insert(diag.syntax), "duplicate diagnostic at {}", diag.syntax);
        }
        prop_assert_eq!(result.report.reported, result.diagnostics.len());
    }

    #[test]
    fn prop_repeated_and_parallel_runs_agree(methods in prop::collection::vec(method(), 1..6)) {
        let generated = generate(&methods, true);
        let first = run(&generated.compilation, false);
        let second = run(&generated.compilation, false);
        let parallel = run(&generated.compilation, true);

        prop_assert_eq!(&first.diagnostics, &second.diagnostics);
        prop_assert_eq!(&first.diagnostics, &parallel.diagnostics);
        prop_assert_eq!(first.report, parallel.report);
    }

    #[test]
    fn prop_no_runner_means_no_work(methods in prop::collection::vec(method(), 1..6)) {
        let generated = generate(&methods, false);
        let result = run(&generated.compilation, false);

        prop_assert!(result.diagnostics.is_empty());
        prop_assert_eq!(result.blocks_analyzed, 0);
    }
}
