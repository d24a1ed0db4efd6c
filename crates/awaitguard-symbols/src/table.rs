//! Symbol table: lookup by metadata name and member name, and type conformance

use std::collections::{HashMap, HashSet, VecDeque};

use awaitguard_ir::SymbolId;
use serde::{Deserialize, Serialize};

use crate::{MethodSymbol, Symbol, TypeSymbol};

/// All symbols of a compilation, indexed for the queries rules need
///
/// Serializes as the plain list of symbols; indexes are rebuilt on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    /// Definitions only; constructed types are not found by name
    by_metadata_name: HashMap<String, Vec<SymbolId>>,
    /// (containing type, simple name) -> member methods
    members: HashMap<(SymbolId, String), Vec<SymbolId>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol, assigning it the next id
    pub fn insert(&mut self, mut symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        symbol.set_id(id);
        self.index(&symbol);
        self.symbols.push(symbol);
        id
    }

    fn index(&mut self, symbol: &Symbol) {
        match symbol {
            Symbol::Type(t) if !t.is_constructed() => {
                self.by_metadata_name
                    .entry(t.metadata_name.clone())
                    .or_default()
                    .push(t.id);
            }
            Symbol::Method(m) if m.is_member() => {
                if let Some(container) = m.containing_type {
                    self.members
                        .entry((container, m.name.clone()))
                        .or_default()
                        .push(m.id);
                }
            }
            _ => {}
        }
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn type_symbol(&self, id: SymbolId) -> Option<&TypeSymbol> {
        self.get(id).and_then(Symbol::as_type)
    }

    pub fn method(&self, id: SymbolId) -> Option<&MethodSymbol> {
        self.get(id).and_then(Symbol::as_method)
    }

    /// Look up a type definition by fully-qualified metadata name
    ///
    /// Returns `None` when no definition or more than one definition
    /// carries the name.
    pub fn type_by_metadata_name(&self, name: &str) -> Option<&TypeSymbol> {
        match self.by_metadata_name.get(name).map(Vec::as_slice) {
            Some([id]) => self.type_symbol(*id),
            _ => None,
        }
    }

    /// Member methods of `container` named exactly `name`
    pub fn members(&self, container: SymbolId, name: &str) -> Vec<&MethodSymbol> {
        self.members
            .get(&(container, name.to_string()))
            .map(|ids| ids.iter().filter_map(|&id| self.method(id)).collect())
            .unwrap_or_default()
    }

    /// Whether a value of type `source` can be used where `target` is expected
    ///
    /// Walks identity, base types, and implemented interfaces. A constructed
    /// generic also conforms to everything its definition conforms to, so
    /// `Task<int>` is assignable to `Task` when `Task<T>` derives from it.
    pub fn is_assignable(&self, target: SymbolId, source: SymbolId) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([source]);

        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            let Some(ty) = self.type_symbol(current) else {
                continue;
            };
            queue.extend(ty.base_type);
            queue.extend(ty.interfaces.iter().copied());
            if let Some(def) = ty.original_definition {
                if let Some(def) = self.type_symbol(def) {
                    queue.extend(def.base_type);
                    queue.extend(def.interfaces.iter().copied());
                }
            }
        }

        false
    }

    /// Render a type for messages, e.g. `System.Threading.Tasks.Task<System.Int32>`
    ///
    /// A type that reaches itself through its own type arguments is cut off
    /// as `<cyclic #id>`; unvalidated tables may contain one.
    pub fn display_type(&self, id: SymbolId) -> String {
        self.display_nested(id, &mut Vec::new())
    }

    fn display_nested(&self, id: SymbolId, path: &mut Vec<SymbolId>) -> String {
        let Some(ty) = self.type_symbol(id) else {
            return format!("<unknown {}>", id);
        };
        if ty.type_arguments.is_empty() {
            return ty.metadata_name.clone();
        }
        if path.contains(&id) {
            return format!("<cyclic {}>", id);
        }
        let base = ty
            .metadata_name
            .split('`')
            .next()
            .unwrap_or(&ty.metadata_name);

        path.push(id);
        let args: Vec<String> = ty
            .type_arguments
            .iter()
            .map(|&arg| self.display_nested(arg, path))
            .collect();
        path.pop();

        format!("{}<{}>", base, args.join(", "))
    }

    /// Iterate over all symbols
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl From<Vec<Symbol>> for SymbolTable {
    fn from(symbols: Vec<Symbol>) -> Self {
        let mut table = SymbolTable {
            symbols: Vec::with_capacity(symbols.len()),
            ..Default::default()
        };
        // Ids are kept as stored; Compilation::validate reports misplaced ones
        for symbol in symbols {
            table.index(&symbol);
            table.symbols.push(symbol);
        }
        table
    }
}

impl From<SymbolTable> for Vec<Symbol> {
    fn from(table: SymbolTable) -> Self {
        table.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MethodKind;

    fn ty(name: &str) -> Symbol {
        Symbol::Type(TypeSymbol::new(name))
    }

    /// object <- Task <- Task`1, and Task<int> constructed from Task`1
    fn task_hierarchy() -> (SymbolTable, SymbolId, SymbolId, SymbolId, SymbolId) {
        let mut table = SymbolTable::new();
        let object = table.insert(ty("System.Object"));
        let int = table.insert(ty("System.Int32"));

        let mut task = TypeSymbol::new("System.Threading.Tasks.Task");
        task.base_type = Some(object);
        let task = table.insert(Symbol::Type(task));

        let mut task_t = TypeSymbol::new("System.Threading.Tasks.Task`1");
        task_t.base_type = Some(task);
        task_t.type_parameters = vec!["TResult".into()];
        let task_t = table.insert(Symbol::Type(task_t));

        let mut task_int = TypeSymbol::new("System.Threading.Tasks.Task`1");
        task_int.original_definition = Some(task_t);
        task_int.type_arguments = vec![int];
        let task_int = table.insert(Symbol::Type(task_int));

        (table, object, task, task_t, task_int)
    }

    #[test]
    fn test_lookup_by_metadata_name() {
        let (table, _, task, task_t, _) = task_hierarchy();
        assert_eq!(
            table.type_by_metadata_name("System.Threading.Tasks.Task").map(|t| t.id),
            Some(task)
        );
        // The constructed Task<int> shares the name but is not a definition
        assert_eq!(
            table.type_by_metadata_name("System.Threading.Tasks.Task`1").map(|t| t.id),
            Some(task_t)
        );
        assert!(table.type_by_metadata_name("System.Threading.Tasks.ValueTask").is_none());
    }

    #[test]
    fn test_ambiguous_metadata_name_is_not_found() {
        let mut table = SymbolTable::new();
        table.insert(ty("Runtime.Tasks.Runner"));
        table.insert(ty("Runtime.Tasks.Runner"));
        assert!(table.type_by_metadata_name("Runtime.Tasks.Runner").is_none());
    }

    #[test]
    fn test_members_case_sensitive() {
        let mut table = SymbolTable::new();
        let runner = table.insert(ty("Runtime.Tasks.Runner"));
        let mut run = MethodSymbol::new("RunAsync", MethodKind::Ordinary);
        run.containing_type = Some(runner);
        let run = table.insert(Symbol::Method(run));

        let found: Vec<_> = table.members(runner, "RunAsync").iter().map(|m| m.id).collect();
        assert_eq!(found, vec![run]);
        assert!(table.members(runner, "runasync").is_empty());
    }

    #[test]
    fn test_assignability() {
        let (table, object, task, task_t, task_int) = task_hierarchy();

        assert!(table.is_assignable(task, task));
        assert!(table.is_assignable(task, task_t));
        assert!(table.is_assignable(task, task_int), "Task<int> conforms to Task");
        assert!(table.is_assignable(object, task_int));
        assert!(!table.is_assignable(task_int, task), "no narrowing");
        assert!(!table.is_assignable(task, object));
    }

    #[test]
    fn test_interface_assignability() {
        let mut table = SymbolTable::new();
        let awaitable = table.insert(ty("Runtime.IAwaitable"));
        let mut custom = TypeSymbol::new("App.CustomTask");
        custom.interfaces = vec![awaitable];
        let custom = table.insert(Symbol::Type(custom));

        assert!(table.is_assignable(awaitable, custom));
    }

    #[test]
    fn test_display_constructed_type() {
        let (table, _, _, _, task_int) = task_hierarchy();
        assert_eq!(
            table.display_type(task_int),
            "System.Threading.Tasks.Task<System.Int32>"
        );
    }

    #[test]
    fn test_display_self_referential_type_terminates() {
        let mut table = SymbolTable::new();
        let mut boxed = TypeSymbol::new("App.Box`1");
        boxed.type_arguments = vec![SymbolId(0)];
        let boxed = table.insert(Symbol::Type(boxed));

        assert_eq!(table.display_type(boxed), "App.Box<<cyclic #0>>");
    }

    #[test]
    fn test_display_repeated_argument_is_not_cyclic() {
        let (mut table, _, _, task_t, task_int) = task_hierarchy();
        let mut pair = TypeSymbol::new("System.ValueTuple`2");
        pair.original_definition = Some(task_t);
        pair.type_arguments = vec![task_int, task_int];
        let pair = table.insert(Symbol::Type(pair));

        assert_eq!(
            table.display_type(pair),
            "System.ValueTuple<System.Threading.Tasks.Task<System.Int32>, \
             System.Threading.Tasks.Task<System.Int32>>"
        );
    }

    #[test]
    fn test_reindex_from_vec() {
        let (table, _, task, _, _) = task_hierarchy();
        let symbols: Vec<Symbol> = table.clone().into();
        let rebuilt = SymbolTable::from(symbols);
        assert_eq!(rebuilt, table);
        assert_eq!(
            rebuilt.type_by_metadata_name("System.Threading.Tasks.Task").map(|t| t.id),
            Some(task)
        );
    }
}
