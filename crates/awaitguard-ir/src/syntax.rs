//! Syntax nodes that operations and diagnostics anchor to

use serde::{Deserialize, Serialize};

use crate::Span;

/// Identifier of a syntax node within a compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SyntaxNodeId(pub u32);

impl std::fmt::Display for SyntaxNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "syntax#{}", self.0)
    }
}

/// A syntax node: only its location and a short label are modelled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub id: SyntaxNodeId,
    pub span: Span,
    /// Human-readable label, e.g. `"method Load"` or `"lambda"`
    #[serde(default)]
    pub label: String,
}

/// All syntax nodes of one compilation, with the source they came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxTree {
    /// Path of the source file, used when rendering reports
    #[serde(default)]
    pub path: String,
    /// Source text, if available
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: None,
            nodes: Vec::new(),
        }
    }

    /// Add a node and return its id
    pub fn add(&mut self, span: Span, label: impl Into<String>) -> SyntaxNodeId {
        let id = SyntaxNodeId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode {
            id,
            span,
            label: label.into(),
        });
        id
    }

    pub fn get(&self, id: SyntaxNodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.0 as usize)
    }

    /// Span of a node, or a dummy span for unknown ids
    pub fn span_of(&self, id: SyntaxNodeId) -> Span {
        self.get(id).map(|n| n.span).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut tree = SyntaxTree::new("Program.cs");
        let a = tree.add(Span::new(0, 10), "method A");
        let b = tree.add(Span::new(12, 20), "method B");

        assert_eq!(a, SyntaxNodeId(0));
        assert_eq!(b, SyntaxNodeId(1));
        assert_eq!(tree.get(b).map(|n| n.label.as_str()), Some("method B"));
        assert_eq!(tree.span_of(a), Span::new(0, 10));
    }

    #[test]
    fn test_span_of_unknown_is_dummy() {
        let tree = SyntaxTree::new("empty.cs");
        assert_eq!(tree.span_of(SyntaxNodeId(3)), Span::dummy());
    }
}
