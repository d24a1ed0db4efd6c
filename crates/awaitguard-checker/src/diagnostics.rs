//! Diagnostics, fix suggestions, and the reporting sink
//!
//! Rules never keep their own record of what they reported. The host owns
//! the set of diagnostics attached to each syntax node and exposes it
//! through [`DiagnosticSink`]; rules read it to avoid duplicates.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use awaitguard_ir::{Span, SyntaxNodeId};
use awaitguard_symbols::Compilation;
use serde::{Deserialize, Serialize};

use crate::Severity;

/// A diagnostic produced by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Identifier of the rule that produced it
    pub rule_id: String,
    pub severity: Severity,
    /// Syntax node the diagnostic is attached to
    pub syntax: SyntaxNodeId,
    /// Primary source span
    pub span: Span,
    /// One-line message
    pub message: String,
    /// Why this is a problem
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<FixSuggestion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedLocation>,
}

/// A related source location with context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLocation {
    pub span: Span,
    /// Label for the location (e.g., "runner awaited here")
    pub label: String,
}

/// A suggested fix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fix", rename_all = "snake_case")]
pub enum FixSuggestion {
    /// Add the `async` modifier to the construct
    AddAsyncModifier { construct: String },
    /// Change the declared return type
    ChangeReturnType {
        construct: String,
        from: String,
        to: String,
    },
}

impl FixSuggestion {
    /// Get a human-readable description of this suggestion
    pub fn description(&self) -> String {
        match self {
            FixSuggestion::AddAsyncModifier { construct } => {
                format!("Mark {} as `async`", construct)
            }
            FixSuggestion::ChangeReturnType { construct, from, to } => {
                format!("Change the return type of {} from `{}` to `{}`", construct, from, to)
            }
        }
    }
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        syntax: SyntaxNodeId,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            syntax,
            span,
            message: message.into(),
            explanation: String::new(),
            suggestions: Vec::new(),
            related: Vec::new(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    /// Add suggestions from an iterator
    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = FixSuggestion>,
    ) -> Self {
        self.suggestions.extend(suggestions);
        self
    }

    /// Add a related location
    pub fn with_related(mut self, span: Span, label: impl Into<String>) -> Self {
        self.related.push(RelatedLocation {
            span,
            label: label.into(),
        });
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Format the diagnostic as a simple string
    pub fn format_simple(&self) -> String {
        let mut output = format!(
            "{}[{}] {}..{}: {}\n",
            self.severity, self.rule_id, self.span.start, self.span.end, self.message
        );

        if !self.explanation.is_empty() {
            output.push_str(&format!("\nExplanation:\n  {}\n", self.explanation));
        }

        if !self.suggestions.is_empty() {
            output.push_str("\nSuggested fixes:\n");
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.description()));
            }
        }

        if !self.related.is_empty() {
            output.push_str("\nRelated locations:\n");
            for related in &self.related {
                output.push_str(&format!(
                    "  - {} (at {}..{})\n",
                    related.label, related.span.start, related.span.end
                ));
            }
        }

        output
    }
}

/// Host-provided reporting sink
///
/// Implementations are shared by block analyses running on different
/// threads, hence `Send + Sync`.
pub trait DiagnosticSink: Send + Sync {
    /// Rule ids of every diagnostic currently attached to `syntax`
    fn attached_rule_ids(&self, syntax: SyntaxNodeId) -> Vec<String>;

    /// Attach a diagnostic to its syntax node
    fn report(&self, diagnostic: Diagnostic);

    fn has_attached(&self, syntax: SyntaxNodeId, rule_id: &str) -> bool {
        self.attached_rule_ids(syntax).iter().any(|id| id == rule_id)
    }
}

#[derive(Debug, Default)]
struct SessionState {
    attached: HashMap<SyntaxNodeId, Vec<String>>,
    reported: Vec<Diagnostic>,
}

/// In-memory sink for one analysis session
///
/// Seeded with the compilation's pre-existing diagnostics. A fresh sink per
/// run keeps repeated runs over the same compilation independent.
#[derive(Debug, Default)]
pub struct SessionSink {
    state: Mutex<SessionState>,
    severity_overrides: HashMap<String, Severity>,
}

impl SessionSink {
    pub fn new(compilation: &Compilation) -> Self {
        let mut state = SessionState::default();
        for attached in &compilation.attached {
            state
                .attached
                .entry(attached.syntax)
                .or_default()
                .push(attached.rule_id.clone());
        }
        Self {
            state: Mutex::new(state),
            severity_overrides: HashMap::new(),
        }
    }

    /// Replace the severity of diagnostics from the given rules on report
    pub fn with_severity_overrides(mut self, overrides: HashMap<String, Severity>) -> Self {
        self.severity_overrides = overrides;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // A panicking rule must not take reporting down with it
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Diagnostics reported during this session, in report order
    pub fn reported(&self) -> Vec<Diagnostic> {
        self.lock().reported.clone()
    }

    pub fn into_reported(self) -> Vec<Diagnostic> {
        self.state
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .reported
    }
}

impl DiagnosticSink for SessionSink {
    fn attached_rule_ids(&self, syntax: SyntaxNodeId) -> Vec<String> {
        self.lock().attached.get(&syntax).cloned().unwrap_or_default()
    }

    fn report(&self, diagnostic: Diagnostic) {
        let diagnostic = match self.severity_overrides.get(&diagnostic.rule_id) {
            Some(&severity) => diagnostic.with_severity(severity),
            None => diagnostic,
        };
        let mut state = self.lock();
        state
            .attached
            .entry(diagnostic.syntax)
            .or_default()
            .push(diagnostic.rule_id.clone());
        state.reported.push(diagnostic);
    }
}
