//! Static rule descriptors and severities

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Hint => "hint",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hint" => Ok(Severity::Hint),
            "info" | "suggestion" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(format!(
                "unknown severity `{}` (expected hint, info, warning, or error)",
                other
            )),
        }
    }
}

/// Static description of a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDescriptor {
    /// Rule identifier carried by every diagnostic (e.g., "W-ASYNC-001")
    pub id: &'static str,
    pub title: &'static str,
    pub category: &'static str,
    pub default_severity: Severity,
    pub enabled_by_default: bool,
    /// Longer explanation printed by `awaitguard explain`
    pub help: &'static str,
}

/// Runner awaited outside an async, task-returning construct
pub const RUNNER_AWAIT_RULE: RuleDescriptor = RuleDescriptor {
    id: "W-ASYNC-001",
    title: "Runner awaited outside an async task-returning construct",
    category: "Usage",
    default_severity: Severity::Warning,
    enabled_by_default: true,
    help: "The runner's asynchronous entry point must be awaited from a method, local \
           function, or lambda that is declared async and returns a task. Awaiting it \
           anywhere else lets the caller continue before the runner has finished, which \
           reorders work silently at runtime. Mark the enclosing construct async and make \
           it return a task.",
};
