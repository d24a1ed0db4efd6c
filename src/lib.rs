//! awaitguard - flags awaits of the task runner outside async task-returning code
//!
//! This is the root workspace crate that provides integration tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use awaitguard_checker as checker;
pub use awaitguard_ir as ir;
pub use awaitguard_symbols as symbols;
