//! Klein parser
//!
//! This module turns the token stream into an Abstract Syntax Tree (AST):
//! - [`grammar`]: the LL(1) table (nonterminal × lookahead → production)
//! - [`parse`]: the pushdown automaton driving the scanner and the table
//! - [`actions`]: the semantic value stack and node constructors
//! - [`ast`]: AST node definitions
//! - [`printer`]: text and DOT listings of the tree
//!
//! # Parser Implementation
//!
//! Table-driven rather than recursive descent: the grammar lives entirely in
//! [`GrammarTable::klein`](grammar::GrammarTable::klein) and the parser loop
//! knows nothing about Klein beyond the start symbol.

pub mod actions;
pub mod ast;
pub mod grammar;
pub mod parse;
pub mod printer;

pub use parse::{ParseError, Parser};
