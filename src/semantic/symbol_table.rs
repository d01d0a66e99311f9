//! Scoped symbol table
//!
//! A stack of lexical scopes. The outermost scope holds the global functions
//! and is never popped; each function adds a parameter scope and a body scope
//! on top of it while it is analyzed.
//!
//! Scopes keep their bindings in a hash map plus the order they were bound
//! in, so iteration and dumps are deterministic.

use super::annotation::Annotation;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolTableError {
    #[error("Symbol {0} is already bound in the current scope")]
    Duplicate(String),
}

/// Where a symbol was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Local,
    Param,
    Global,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Local => f.write_str("Local"),
            SymbolKind::Param => f.write_str("Param"),
            SymbolKind::Global => f.write_str("Global"),
        }
    }
}

/// A named entity with its type and call-graph edges
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Annotation,
    /// Functions this function calls
    pub forward_refs: BTreeSet<String>,
    /// Functions that call this function
    pub backward_refs: BTreeSet<String>,
    /// Parameters, for function symbols only
    pub parameters: Option<Vec<Symbol>>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, ty: Annotation) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            forward_refs: BTreeSet::new(),
            backward_refs: BTreeSet::new(),
            parameters: None,
        }
    }

    /// Global function symbol; its type is built from the parameters.
    pub fn function(name: impl Into<String>, parameters: Vec<Symbol>, returns: Annotation) -> Self {
        let ty = Annotation::function(
            parameters.iter().map(|parameter| parameter.ty.clone()).collect(),
            returns,
        );
        Self {
            parameters: Some(parameters),
            ..Symbol::new(name, SymbolKind::Global, ty)
        }
    }

    pub fn is_function(&self) -> bool {
        self.ty.is_function()
    }

    /// Declared parameter types, if this is a function
    pub fn parameter_types(&self) -> Option<&[Annotation]> {
        match &self.ty {
            Annotation::Function(parameters, _) => Some(parameters),
            _ => None,
        }
    }
}

fn names(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        "none".to_string()
    } else {
        set.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Multi-line record used by the symbol table dump
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Symbol {}", self.name)?;
        writeln!(f, "  kind: {}", self.kind)?;
        writeln!(f, "  type: {}", self.ty)?;
        if let Some(parameters) = &self.parameters {
            let listed: Vec<String> = parameters
                .iter()
                .map(|parameter| format!("{}: {}", parameter.name, parameter.ty))
                .collect();
            if listed.is_empty() {
                writeln!(f, "  parameters: none")?;
            } else {
                writeln!(f, "  parameters: {}", listed.join(", "))?;
            }
        }
        writeln!(f, "  forward references: {}", names(&self.forward_refs))?;
        write!(f, "  backward references: {}", names(&self.backward_refs))
    }
}

#[derive(Debug, Clone, Default)]
struct Scope {
    symbols: FxHashMap<String, Symbol>,
    insertion_order: Vec<String>, // Binding order, for deterministic iteration
}

impl Scope {
    fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.symbols.get(name))
    }
}

/// Stack of lexical scopes
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// A table holding only the empty global scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    /// Number of active scopes, including the global one
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pop the innermost scope, returning its symbols in binding order. The
    /// global scope is never popped.
    pub fn exit_scope(&mut self) -> Option<Vec<Symbol>> {
        if self.scopes.len() <= 1 {
            return None;
        }
        let mut scope = self.scopes.pop()?;
        let symbols = scope
            .insertion_order
            .iter()
            .filter_map(|name| scope.symbols.remove(name))
            .collect();
        Some(symbols)
    }

    /// Bind a symbol in the current scope. Fails if the current scope already
    /// has a symbol with that name; outer scopes may be shadowed freely.
    pub fn bind(&mut self, symbol: Symbol) -> Result<(), SymbolTableError> {
        let scope = self.current_mut();
        if scope.symbols.contains_key(&symbol.name) {
            return Err(SymbolTableError::Duplicate(symbol.name));
        }
        scope.insertion_order.push(symbol.name.clone());
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Innermost binding of `name`
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.symbols.get_mut(name))
    }

    /// Binding of `name` in the current scope only
    pub fn lookup_current(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().and_then(|scope| scope.symbols.get(name))
    }

    /// Every symbol in every active scope, oldest scope first
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.scopes.iter().flat_map(|scope| scope.iter())
    }

    fn current_mut(&mut self) -> &mut Scope {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::default());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, symbol) in self.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integer(name: &str, kind: SymbolKind) -> Symbol {
        Symbol::new(name, kind, Annotation::Integer)
    }

    #[test]
    fn test_bind_and_lookup() {
        let mut table = SymbolTable::new();
        table.bind(integer("x", SymbolKind::Global)).unwrap();
        assert_eq!(table.lookup("x").map(|s| s.kind), Some(SymbolKind::Global));
        assert!(table.lookup("y").is_none());
    }

    #[test]
    fn test_duplicate_in_current_scope() {
        let mut table = SymbolTable::new();
        table.bind(integer("x", SymbolKind::Global)).unwrap();
        assert_eq!(
            table.bind(integer("x", SymbolKind::Global)),
            Err(SymbolTableError::Duplicate("x".to_string()))
        );
    }

    #[test]
    fn test_shadowing() {
        let mut table = SymbolTable::new();
        table.bind(integer("x", SymbolKind::Global)).unwrap();
        table.enter_scope();
        assert!(table.lookup_current("x").is_none());
        table.bind(integer("x", SymbolKind::Param)).unwrap();
        assert_eq!(table.lookup("x").map(|s| s.kind), Some(SymbolKind::Param));

        let popped = table.exit_scope().unwrap();
        assert_eq!(popped.len(), 1);
        assert_eq!(table.lookup("x").map(|s| s.kind), Some(SymbolKind::Global));
    }

    #[test]
    fn test_global_scope_is_never_popped() {
        let mut table = SymbolTable::new();
        assert!(table.exit_scope().is_none());
        assert_eq!(table.depth(), 1);
        table.bind(integer("x", SymbolKind::Global)).unwrap();
        assert!(table.lookup("x").is_some());
    }

    #[test]
    fn test_iter_oldest_scope_first_in_binding_order() {
        let mut table = SymbolTable::new();
        for name in ["zeta", "alpha", "mid"] {
            table.bind(integer(name, SymbolKind::Global)).unwrap();
        }
        table.enter_scope();
        table.bind(integer("inner", SymbolKind::Param)).unwrap();

        let names: Vec<&str> = table.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid", "inner"]);
    }

    #[test]
    fn test_lookup_mut_updates_edges() {
        let mut table = SymbolTable::new();
        table
            .bind(Symbol::function("f", vec![], Annotation::Integer))
            .unwrap();
        if let Some(symbol) = table.lookup_mut("f") {
            symbol.forward_refs.insert("g".to_string());
        }
        assert!(table.lookup("f").unwrap().forward_refs.contains("g"));
    }

    #[test]
    fn test_dump() {
        let mut table = SymbolTable::new();
        let mut f = Symbol::function(
            "f",
            vec![Symbol::new("a", SymbolKind::Param, Annotation::Integer)],
            Annotation::Boolean,
        );
        f.backward_refs.insert("main".to_string());
        table.bind(f).unwrap();
        table
            .bind(Symbol::function("main", vec![], Annotation::Integer))
            .unwrap();

        let expected = "\
Symbol f
  kind: Global
  type: (Integer) -> Boolean
  parameters: a: Integer
  forward references: none
  backward references: main

Symbol main
  kind: Global
  type: () -> Integer
  parameters: none
  forward references: none
  backward references: none
";
        assert_eq!(table.to_string(), expected);
    }
}
