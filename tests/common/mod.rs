//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use awaitguard::checker::{AnalysisResult, Diagnostic};
use awaitguard::ir::Span;
use awaitguard::symbols::Compilation;

/// Get path to a fixture under tests/fixtures/
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load and validate a compilation fixture
pub fn load_fixture(name: &str) -> Compilation {
    let path = fixture_path(name);
    let json = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e));
    Compilation::from_json(&json)
        .unwrap_or_else(|e| panic!("Fixture {} is invalid [{}]: {}", name, e.code(), e))
}

/// Every .json fixture, sorted by name
pub fn discover_fixtures() -> Vec<PathBuf> {
    let mut fixtures: Vec<PathBuf> = fs::read_dir(fixture_path(""))
        .expect("Failed to read tests/fixtures")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
        .collect();
    fixtures.sort();
    fixtures
}

/// Source text covered by a diagnostic's primary span
pub fn flagged_text<'a>(compilation: &'a Compilation, diagnostic: &Diagnostic) -> &'a str {
    let source = compilation
        .syntax
        .source
        .as_deref()
        .expect("Expected fixture with source text");
    &source[diagnostic.span.start..diagnostic.span.end]
}

/// Assert the run reported nothing
pub fn assert_clean(result: &AnalysisResult) {
    assert!(
        result.diagnostics.is_empty(),
        "Expected no diagnostics, got:\n{}",
        result
            .diagnostics
            .iter()
            .map(|d| d.format_simple())
            .collect::<String>()
    );
}

/// Assert the run reported exactly these spans, in order
pub fn assert_flagged(result: &AnalysisResult, spans: &[Span]) {
    let actual: Vec<Span> = result.diagnostics.iter().map(|d| d.span).collect();
    assert_eq!(actual, spans, "Unexpected diagnostic locations");
}
