//! A compilation unit: symbols, syntax, and operation blocks

use awaitguard_ir::{OperationBlock, OperationKind, Span, SymbolId, SyntaxNodeId, SyntaxTree};
use serde::{Deserialize, Serialize};

use crate::{MethodKind, Symbol, SymbolError, SymbolTable};

/// A diagnostic already attached to a syntax node before rules run
/// (compiler errors, or results of an earlier rule in the same session)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedDiagnostic {
    pub syntax: SyntaxNodeId,
    pub rule_id: String,
    #[serde(default)]
    pub message: String,
}

/// Everything a rule can see about one compilation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compilation {
    /// Assembly or project name
    pub name: String,
    pub symbols: SymbolTable,
    #[serde(default)]
    pub syntax: SyntaxTree,
    #[serde(default)]
    pub blocks: Vec<OperationBlock>,
    #[serde(default)]
    pub attached: Vec<AttachedDiagnostic>,
}

impl Compilation {
    /// Decode and validate a compilation from JSON
    pub fn from_json(json: &str) -> Result<Self, SymbolError> {
        let compilation: Compilation = serde_json::from_str(json)?;
        compilation.validate()?;
        Ok(compilation)
    }

    pub fn to_json_pretty(&self) -> Result<String, SymbolError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn span_of(&self, syntax: SyntaxNodeId) -> Span {
        self.syntax.span_of(syntax)
    }

    /// Check every cross reference in the compilation
    pub fn validate(&self) -> Result<(), SymbolError> {
        for (index, symbol) in self.symbols.iter().enumerate() {
            if symbol.id().0 as usize != index {
                return Err(SymbolError::MisplacedId {
                    found: symbol.id(),
                    index,
                });
            }
            self.validate_symbol(symbol)?;
        }
        self.check_type_nesting()?;

        for (index, block) in self.blocks.iter().enumerate() {
            self.expect_exists(block.owner, || format!("block {}", index))?;
            block
                .graph
                .validate(self.syntax.len())
                .map_err(|source| SymbolError::Block {
                    block: index,
                    source,
                })?;

            for op in block.graph.iter() {
                let referrer = || format!("block {} {}", index, op.id);
                match &op.kind {
                    OperationKind::Invocation { target, .. } => {
                        self.expect_method(*target, None, referrer)?;
                    }
                    OperationKind::LocalFunction { symbol } => {
                        self.expect_method(*symbol, Some(MethodKind::LocalFunction), referrer)?;
                    }
                    OperationKind::AnonymousFunction { symbol } => {
                        self.expect_method(
                            *symbol,
                            Some(MethodKind::AnonymousFunction),
                            referrer,
                        )?;
                    }
                    _ => {}
                }
            }
        }

        for attached in &self.attached {
            if self.syntax.get(attached.syntax).is_none() {
                return Err(SymbolError::UnknownAttachment {
                    rule_id: attached.rule_id.clone(),
                    syntax: attached.syntax,
                });
            }
        }

        Ok(())
    }

    fn validate_symbol(&self, symbol: &Symbol) -> Result<(), SymbolError> {
        let referrer = || format!("{} ({})", symbol.name(), symbol.id());
        match symbol {
            Symbol::Type(t) => {
                let refs = t
                    .base_type
                    .iter()
                    .chain(&t.interfaces)
                    .chain(&t.original_definition)
                    .chain(&t.type_arguments);
                for &id in refs {
                    self.expect_type(id, referrer)?;
                }
            }
            Symbol::Method(m) => {
                let refs = m
                    .containing_type
                    .iter()
                    .chain(&m.return_type)
                    .chain(&m.type_arguments);
                for &id in refs {
                    self.expect_type(id, referrer)?;
                }
                if let Some(def) = m.original_definition {
                    self.expect_method(def, None, referrer)?;
                }
            }
        }
        Ok(())
    }

    /// Constructed types must bottom out: no type may reach itself through
    /// its type arguments or its original definition
    fn check_type_nesting(&self) -> Result<(), SymbolError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            Active,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.symbols.len()];
        for root in self.symbols.iter().filter_map(Symbol::as_type) {
            if marks[root.id.0 as usize] != Mark::Unvisited {
                continue;
            }
            marks[root.id.0 as usize] = Mark::Active;
            // (type, index of the next nested type to visit)
            let mut stack = vec![(root.id, 0usize)];

            while let Some(&(id, next)) = stack.last() {
                match self.nested_type(id, next) {
                    Some(child) => {
                        if let Some(top) = stack.last_mut() {
                            top.1 += 1;
                        }
                        match marks[child.0 as usize] {
                            Mark::Active => return Err(SymbolError::CyclicType { id: child }),
                            Mark::Unvisited => {
                                marks[child.0 as usize] = Mark::Active;
                                stack.push((child, 0));
                            }
                            Mark::Done => {}
                        }
                    }
                    None => {
                        marks[id.0 as usize] = Mark::Done;
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }

    fn nested_type(&self, id: SymbolId, n: usize) -> Option<SymbolId> {
        let ty = self.symbols.type_symbol(id)?;
        ty.type_arguments
            .iter()
            .chain(&ty.original_definition)
            .nth(n)
            .copied()
    }

    fn expect_exists(
        &self,
        id: SymbolId,
        referrer: impl Fn() -> String,
    ) -> Result<&Symbol, SymbolError> {
        self.symbols.get(id).ok_or_else(|| SymbolError::UnknownSymbol {
            id,
            referrer: referrer(),
        })
    }

    fn expect_type(&self, id: SymbolId, referrer: impl Fn() -> String) -> Result<(), SymbolError> {
        match self.expect_exists(id, &referrer)? {
            Symbol::Type(_) => Ok(()),
            Symbol::Method(_) => Err(SymbolError::WrongCategory {
                id,
                referrer: referrer(),
                expected: "type",
            }),
        }
    }

    fn expect_method(
        &self,
        id: SymbolId,
        kind: Option<MethodKind>,
        referrer: impl Fn() -> String,
    ) -> Result<(), SymbolError> {
        let expected = match kind {
            Some(MethodKind::LocalFunction) => "local function",
            Some(MethodKind::AnonymousFunction) => "anonymous function",
            _ => "method",
        };
        match self.expect_exists(id, &referrer)? {
            Symbol::Method(m) if kind.map_or(true, |k| k == m.kind) => Ok(()),
            _ => Err(SymbolError::WrongCategory {
                id,
                referrer: referrer(),
                expected,
            }),
        }
    }
}
