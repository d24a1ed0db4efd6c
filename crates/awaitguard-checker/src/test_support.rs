//! Shared fixtures for unit tests

use awaitguard_ir::SymbolId;
use awaitguard_symbols::{CompilationBuilder, MethodSpec};

/// A compilation builder preloaded with the task types and the runner
pub(crate) struct Fixture {
    pub b: CompilationBuilder,
    pub task: SymbolId,
    pub task_int: SymbolId,
    pub int: SymbolId,
    pub program: SymbolId,
    pub run: SymbolId,
}

pub(crate) fn fixture() -> Fixture {
    let mut b = CompilationBuilder::new("Tests");
    let object = b.add_type("System.Object");
    let int = b.add_type("System.Int32");
    let task = b.add_derived_type("System.Threading.Tasks.Task", object);
    let task_t = b.add_generic_type("System.Threading.Tasks.Task`1", &["TResult"], Some(task));
    let task_int = b.construct_type(task_t, &[int]);
    let runner = b.add_type("Runtime.Tasks.Runner");
    let run = b.add_method(MethodSpec::ordinary("RunAsync").on(runner).returns(task));
    let program = b.add_type("App.Program");

    Fixture {
        b,
        task,
        task_int,
        int,
        program,
        run,
    }
}
