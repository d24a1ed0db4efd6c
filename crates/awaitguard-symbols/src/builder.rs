//! Fluent construction of compilations
//!
//! Used by tests and by fixture generation. Symbols are created first; then
//! each block is built through a [`BlockBuilder`] that borrows the
//! compilation builder until [`BlockBuilder::finish`] is called.

use awaitguard_ir::{OperationBlock, OperationId, OperationKind, Span, SymbolId, SyntaxNodeId};

use crate::{AttachedDiagnostic, Compilation, MethodKind, MethodSymbol, Symbol, TypeSymbol};

/// Description of a method-like symbol to add
#[derive(Debug, Clone)]
pub struct MethodSpec {
    symbol: MethodSymbol,
}

impl MethodSpec {
    pub fn ordinary(name: impl Into<String>) -> Self {
        Self {
            symbol: MethodSymbol::new(name, MethodKind::Ordinary),
        }
    }

    pub fn local_function(name: impl Into<String>) -> Self {
        Self {
            symbol: MethodSymbol::new(name, MethodKind::LocalFunction),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            symbol: MethodSymbol::new("", MethodKind::AnonymousFunction),
        }
    }

    /// Declare on a containing type
    pub fn on(mut self, container: SymbolId) -> Self {
        self.symbol.containing_type = Some(container);
        self
    }

    pub fn asynchronous(mut self) -> Self {
        self.symbol.is_async = true;
        self
    }

    pub fn returns(mut self, ty: SymbolId) -> Self {
        self.symbol.return_type = Some(ty);
        self
    }

    pub fn type_parameters(mut self, names: &[&str]) -> Self {
        self.symbol.type_parameters = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Make this an instantiation of a generic method definition
    pub fn constructed_from(mut self, definition: SymbolId, type_arguments: &[SymbolId]) -> Self {
        self.symbol.original_definition = Some(definition);
        self.symbol.type_arguments = type_arguments.to_vec();
        self
    }
}

/// Builds a [`Compilation`]
#[derive(Debug, Default)]
pub struct CompilationBuilder {
    compilation: Compilation,
}

impl CompilationBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            compilation: Compilation {
                name: name.into(),
                ..Default::default()
            },
        }
    }

    /// Attach source text and path for rendering
    pub fn source(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.compilation.syntax.path = path.into();
        self.compilation.syntax.source = Some(text.into());
        self
    }

    pub fn add_type(&mut self, metadata_name: &str) -> SymbolId {
        self.add_type_symbol(TypeSymbol::new(metadata_name))
    }

    /// Add a type deriving from `base`
    pub fn add_derived_type(&mut self, metadata_name: &str, base: SymbolId) -> SymbolId {
        let mut ty = TypeSymbol::new(metadata_name);
        ty.base_type = Some(base);
        self.add_type_symbol(ty)
    }

    /// Add a generic type definition such as ``Task`1``
    pub fn add_generic_type(
        &mut self,
        metadata_name: &str,
        type_parameters: &[&str],
        base: Option<SymbolId>,
    ) -> SymbolId {
        let mut ty = TypeSymbol::new(metadata_name);
        ty.type_parameters = type_parameters.iter().map(|n| n.to_string()).collect();
        ty.base_type = base;
        self.add_type_symbol(ty)
    }

    /// Instantiate a generic type definition, e.g. `Task<int>`
    pub fn construct_type(
        &mut self,
        definition: SymbolId,
        type_arguments: &[SymbolId],
    ) -> SymbolId {
        let name = self
            .compilation
            .symbols
            .type_symbol(definition)
            .map(|t| t.metadata_name.clone())
            .unwrap_or_default();
        let mut ty = TypeSymbol::new(name);
        ty.original_definition = Some(definition);
        ty.type_arguments = type_arguments.to_vec();
        self.add_type_symbol(ty)
    }

    pub fn add_type_symbol(&mut self, ty: TypeSymbol) -> SymbolId {
        self.compilation.symbols.insert(Symbol::Type(ty))
    }

    pub fn add_method(&mut self, spec: MethodSpec) -> SymbolId {
        self.compilation.symbols.insert(Symbol::Method(spec.symbol))
    }

    /// Start building the operation block owned by `owner`
    pub fn block(&mut self, owner: SymbolId) -> BlockBuilder<'_> {
        BlockBuilder {
            builder: self,
            block: OperationBlock::new(owner),
        }
    }

    /// Record a diagnostic that is already attached to a syntax node
    pub fn attach(&mut self, syntax: SyntaxNodeId, rule_id: &str) {
        self.compilation.attached.push(AttachedDiagnostic {
            syntax,
            rule_id: rule_id.to_string(),
            message: String::new(),
        });
    }

    pub fn build(self) -> Compilation {
        self.compilation
    }
}

/// Builds one operation block
pub struct BlockBuilder<'a> {
    builder: &'a mut CompilationBuilder,
    block: OperationBlock,
}

impl<'a> BlockBuilder<'a> {
    fn node(&mut self, span: Span, label: &str) -> SyntaxNodeId {
        self.builder.compilation.syntax.add(span, label)
    }

    fn syntax_of(&self, op: OperationId) -> SyntaxNodeId {
        self.block
            .graph
            .get(op)
            .map(|o| o.syntax)
            .unwrap_or(SyntaxNodeId(0))
    }

    /// Root body of an ordinary method; anchored at the method declaration
    pub fn method_body(&mut self, span: Span, label: &str) -> OperationId {
        let syntax = self.node(span, label);
        self.block.graph.add(OperationKind::MethodBody, None, syntax)
    }

    pub fn local_function(
        &mut self,
        parent: OperationId,
        symbol: SymbolId,
        span: Span,
        label: &str,
    ) -> OperationId {
        let syntax = self.node(span, label);
        self.block
            .graph
            .add(OperationKind::LocalFunction { symbol }, Some(parent), syntax)
    }

    pub fn anonymous_function(
        &mut self,
        parent: OperationId,
        symbol: SymbolId,
        span: Span,
        label: &str,
    ) -> OperationId {
        let syntax = self.node(span, label);
        self.block
            .graph
            .add(OperationKind::AnonymousFunction { symbol }, Some(parent), syntax)
    }

    /// A structural node (block, return, expression statement ...) that
    /// shares its parent's syntax anchor
    pub fn other(&mut self, parent: OperationId, label: &str) -> OperationId {
        let syntax = self.syntax_of(parent);
        self.block.graph.add(
            OperationKind::Other {
                label: label.to_string(),
            },
            Some(parent),
            syntax,
        )
    }

    /// A detached root node that is not a function-like construct
    pub fn root(&mut self, span: Span, label: &str) -> OperationId {
        let syntax = self.node(span, label);
        self.block.graph.add(
            OperationKind::Other {
                label: label.to_string(),
            },
            None,
            syntax,
        )
    }

    /// Invocation of `target` that is not awaited
    pub fn call(&mut self, parent: OperationId, target: SymbolId, span: Span) -> OperationId {
        let syntax = self.node(span, "invocation");
        self.block.graph.add(
            OperationKind::Invocation {
                target,
                arguments: Vec::new(),
            },
            Some(parent),
            syntax,
        )
    }

    /// `await target(...)`; returns the await operation
    pub fn await_call(&mut self, parent: OperationId, target: SymbolId, span: Span) -> OperationId {
        let call = self.call(parent, target, span);
        let await_op = self.await_operand(parent, call, span);
        self.block.graph.set_parent(call, Some(await_op));
        await_op
    }

    /// `await <operand>` for an operand that is not an invocation
    pub fn await_value(&mut self, parent: OperationId, label: &str, span: Span) -> OperationId {
        let value = self.other(parent, label);
        let await_op = self.await_operand(parent, value, span);
        self.block.graph.set_parent(value, Some(await_op));
        await_op
    }

    fn await_operand(
        &mut self,
        parent: OperationId,
        operand: OperationId,
        span: Span,
    ) -> OperationId {
        let syntax = self.node(span, "await");
        self.block
            .graph
            .add(OperationKind::Await { operand }, Some(parent), syntax)
    }

    /// Syntax anchor of an operation built so far
    pub fn syntax(&self, op: OperationId) -> SyntaxNodeId {
        self.syntax_of(op)
    }

    /// Push the block into the compilation
    pub fn finish(self) {
        self.builder.compilation.blocks.push(self.block);
    }
}
