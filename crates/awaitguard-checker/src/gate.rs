//! Duplicate suppression before reporting

use crate::{Diagnostic, DiagnosticSink};

/// Result of submitting a diagnostic through the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Reported,
    /// The syntax node already carries a diagnostic with the same rule id
    Suppressed,
}

/// Reports a diagnostic unless its syntax node already carries one from
/// the same rule
///
/// The check reads the host's attached-diagnostic set, so it is exact for a
/// single block and best-effort across blocks analyzed concurrently.
pub struct DiagnosticGate;

impl DiagnosticGate {
    pub fn submit(sink: &dyn DiagnosticSink, diagnostic: Diagnostic) -> GateDecision {
        if sink.has_attached(diagnostic.syntax, &diagnostic.rule_id) {
            return GateDecision::Suppressed;
        }
        sink.report(diagnostic);
        GateDecision::Reported
    }
}
