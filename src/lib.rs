//! # Introduction
//!
//! kleinc compiles Klein, a small expression language of integer and boolean
//! functions, into assembly for the TM register machine.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Source → Scanner → Parser → AST → Semantic analysis → Code generation → Listing
//! ```
//!
//! 1. [`scanner`]: a hand-written DFA that hands out tokens on demand.
//! 2. [`parser`]: a table-driven LL(1) parser that builds the AST with a
//!    semantic value stack, plus text and DOT listings of the tree.
//! 3. [`semantic`]: annotates every node with its type, builds the symbol
//!    table and call graph, and collects errors and warnings.
//! 4. [`codegen`]: lays out the program as TM instructions under a fixed
//!    stack-frame calling convention.
//!
//! Lexical and parse errors stop compilation at once. Semantic analysis keeps
//! going after an error so every issue is reported, then fails as a whole.
//! [`errors::CompileError::render`] turns any failure into the text a user
//! sees.
//!
//! ## Example
//!
//! ```
//! use kleinc::{compile, config::Config};
//!
//! let compilation = compile("function main(): integer 7", &Config::default()).unwrap();
//! assert!(compilation
//!     .listing
//!     .instructions()
//!     .any(|instruction| instruction.to_string() == "LDC 4,7(0)"));
//! ```
//!
//! The library never installs a logger; every stage reports its progress
//! through the [`log`] facade.

pub mod codegen;
pub mod config;
pub mod errors;
pub mod parser;
pub mod scanner;
pub mod semantic;

use codegen::Listing;
use config::Config;
use errors::CompileError;
use parser::ast::Program;
use parser::{ParseError, Parser};
use scanner::token::Token;
use scanner::{LexicalError, Scanner};
use semantic::{Diagnostics, Issue, Severity, SymbolTable};

/// A program that made it through semantic analysis
#[derive(Debug)]
pub struct Analysis {
    pub program: Program,
    pub symbol_table: SymbolTable,
    /// Warnings found along the way, if the config asks for them
    pub issues: Vec<Issue>,
}

/// The result of a successful compilation
#[derive(Debug)]
pub struct Compilation {
    pub program: Program,
    pub symbol_table: SymbolTable,
    pub issues: Vec<Issue>,
    pub listing: Listing,
}

/// Scan the whole source, end of file included.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexicalError> {
    let tokens = Scanner::new(source).collect::<Result<Vec<_>, _>>()?;
    log::debug!("scanned {} token(s)", tokens.len());
    Ok(tokens)
}

/// Parse the source into an unannotated AST.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let program = Parser::new(source).parse_program()?;
    log::info!(
        "parsed {} definition(s)",
        program.definitions.definitions.len()
    );
    Ok(program)
}

/// Parse and analyze the source.
///
/// On a semantic failure the returned error carries every issue found,
/// warnings included.
pub fn analyze(source: &str, config: &Config) -> Result<Analysis, CompileError> {
    let program = parse(source)?;

    let mut diagnostics = Diagnostics::new();
    match semantic::analyze(&program, &mut diagnostics) {
        Ok(symbol_table) => {
            let issues = diagnostics
                .into_issues()
                .into_iter()
                .filter(|issue| config.emit_warnings || issue.severity != Severity::Warning)
                .collect();
            Ok(Analysis {
                program,
                symbol_table,
                issues,
            })
        }
        Err(error) => Err(CompileError::Semantic {
            error,
            issues: diagnostics.into_issues(),
        }),
    }
}

/// Run every stage over the source and produce its TM listing.
pub fn compile(source: &str, config: &Config) -> Result<Compilation, CompileError> {
    let Analysis {
        program,
        symbol_table,
        issues,
    } = analyze(source, config)?;

    let listing = codegen::generate(&program, &symbol_table)?;
    Ok(Compilation {
        program,
        symbol_table,
        issues,
        listing,
    })
}
