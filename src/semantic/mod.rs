//! Semantic analysis
//!
//! Annotates the parsed program in place and builds the symbol table:
//! - [`annotation`]: the types attached to AST nodes
//! - [`symbol_table`]: scoped symbols and call-graph edges
//! - [`diagnostics`]: issue collection and the aggregate failure
//! - [`analyzer`]: the analysis pass itself

pub mod analyzer;
pub mod annotation;
pub mod diagnostics;
pub mod symbol_table;

pub use analyzer::analyze;
pub use annotation::Annotation;
pub use diagnostics::{Diagnostics, Issue, SemanticError, Severity};
pub use symbol_table::{Symbol, SymbolKind, SymbolTable};
