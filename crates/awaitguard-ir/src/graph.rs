//! Operation graph arena
//!
//! Operations are stored in a flat arena and refer to each other by
//! [`OperationId`]. The parent link is a plain index, so the graph owns every
//! node and walking upwards never needs shared ownership.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{IrError, Operation, OperationId, OperationKind, SymbolId, SyntaxNodeId};

/// The operation graph of one analyzable block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationGraph {
    operations: Vec<Operation>,
}

impl OperationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation and return its id
    pub fn add(
        &mut self,
        kind: OperationKind,
        parent: Option<OperationId>,
        syntax: SyntaxNodeId,
    ) -> OperationId {
        let id = OperationId(self.operations.len() as u32);
        self.operations.push(Operation {
            id,
            kind,
            parent,
            syntax,
        });
        id
    }

    /// Re-point an operation's parent link
    ///
    /// Needed when a child is created before the node that encloses it,
    /// e.g. the invocation operand of an await.
    pub fn set_parent(&mut self, id: OperationId, parent: Option<OperationId>) {
        if let Some(op) = self.operations.get_mut(id.0 as usize) {
            op.parent = parent;
        }
    }

    pub fn get(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(id.0 as usize)
    }

    /// Iterate the ancestors of `id`, nearest first, excluding `id` itself
    pub fn ancestors(&self, id: OperationId) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: self.get(id).and_then(|op| op.parent),
            remaining: self.operations.len(),
        }
    }

    /// All await operations in arena order
    pub fn awaits(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(|op| op.kind.is_await())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Check ids, links, and syntax anchors against a tree of `syntax_len` nodes
    pub fn validate(&self, syntax_len: usize) -> Result<(), IrError> {
        for (index, op) in self.operations.iter().enumerate() {
            if op.id.0 as usize != index {
                return Err(IrError::MisplacedId {
                    what: "operation",
                    found: op.id.0,
                    index,
                });
            }
            if op.syntax.0 as usize >= syntax_len {
                return Err(IrError::UnknownSyntax {
                    op: op.id,
                    syntax: op.syntax,
                });
            }
            if let Some(parent) = op.parent {
                if self.get(parent).is_none() {
                    return Err(IrError::UnknownParent { op: op.id, parent });
                }
            }
            let operands: &[OperationId] = match &op.kind {
                OperationKind::Await { operand } => std::slice::from_ref(operand),
                OperationKind::Invocation { arguments, .. } => arguments,
                _ => &[],
            };
            for &operand in operands {
                if self.get(operand).is_none() {
                    return Err(IrError::UnknownOperand { op: op.id, operand });
                }
            }
        }

        for op in &self.operations {
            let mut seen = HashSet::new();
            seen.insert(op.id);
            let mut current = op.parent;
            while let Some(id) = current {
                if !seen.insert(id) {
                    return Err(IrError::CyclicParent { op: op.id });
                }
                current = self.get(id).and_then(|p| p.parent);
            }
        }

        Ok(())
    }
}

/// Iterator over an operation's ancestor chain
pub struct Ancestors<'a> {
    graph: &'a OperationGraph,
    next: Option<OperationId>,
    /// Upper bound on steps so a malformed cyclic chain still terminates
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Operation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let op = self.graph.get(self.next?)?;
        self.next = op.parent;
        Some(op)
    }
}

/// An analyzable block: one operation graph and the symbol that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationBlock {
    /// Symbol owning the block, e.g. the method whose body this is
    pub owner: SymbolId,
    pub graph: OperationGraph,
}

impl OperationBlock {
    pub fn new(owner: SymbolId) -> Self {
        Self {
            owner,
            graph: OperationGraph::new(),
        }
    }
}
