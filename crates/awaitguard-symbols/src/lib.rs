//! awaitguard-symbols: Symbol table and compilation model
//!
//! This crate provides the host-side view of a compilation that rules query:
//! - Type and method symbols with identity by [`SymbolId`]
//! - Lookup of type definitions by fully-qualified metadata name
//! - Member lookup by simple name within a type
//! - Type conformance (`is_assignable`) over base types, interfaces, and
//!   constructed generics
//! - Loading and validating compilations from JSON
//!
//! # Example
//!
//! ```
//! use awaitguard_symbols::{CompilationBuilder, MethodSpec};
//!
//! let mut b = CompilationBuilder::new("App");
//! let task = b.add_type("System.Threading.Tasks.Task");
//! let runner = b.add_type("Runtime.Tasks.Runner");
//! b.add_method(MethodSpec::ordinary("RunAsync").on(runner).returns(task));
//!
//! let compilation = b.build();
//! let runner = compilation.symbols.type_by_metadata_name("Runtime.Tasks.Runner").unwrap();
//! assert_eq!(compilation.symbols.members(runner.id, "RunAsync").len(), 1);
//! ```

mod builder;
mod compilation;
mod error;
mod symbol;
mod table;

pub use awaitguard_ir::SymbolId;
pub use builder::{BlockBuilder, CompilationBuilder, MethodSpec};
pub use compilation::{AttachedDiagnostic, Compilation};
pub use error::SymbolError;
pub use symbol::{MethodKind, MethodSymbol, Symbol, TypeSymbol};
pub use table::SymbolTable;
