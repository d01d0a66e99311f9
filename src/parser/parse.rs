//! Table-driven parser
//!
//! This module provides the [`Parser`] struct and its error type. The parser
//! is a pushdown automaton over a [`GrammarTable`]: it keeps an explicit stack
//! of grammar symbols seeded with `[END_OF_FILE, start]` and a separate
//! [`SemanticStack`] of built nodes.
//!
//! - Terminal on top: consume a token, which must match.
//! - Nonterminal on top: peek a token and expand the table entry for it,
//!   pushing the production in reverse.
//! - Semantic action on top: run the node constructor.
//!
//! Tokens are pulled from the [`Scanner`] on demand.

use super::actions::{Node, SemanticStack};
use super::ast::Program;
use super::grammar::{GrammarSymbol, GrammarTable, NonTerminal};
use crate::errors::InternalError;
use crate::scanner::position::Position;
use crate::scanner::token::{Token, TokenKind};
use crate::scanner::{LexicalError, Scanner};
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Klein Parse Error at {position}: Expected {expected} and received {found}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        position: Position,
    },

    #[error(
        "Klein Parse Error at {position}: Invalid transition from {nonterminal} to {found}.\n{}",
        describe_expected(.expected)
    )]
    NoTransition {
        nonterminal: NonTerminal,
        found: TokenKind,
        expected: Vec<TokenKind>,
        position: Position,
    },

    #[error(
        "Klein Parse Error at {position}: Expected 1 value in semantic stack when done parsing. Instead encountered {count} items"
    )]
    UnbalancedStack { count: usize, position: Position },

    #[error(transparent)]
    Lexical(#[from] LexicalError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl ParseError {
    /// Get the source position of this error, if it has one
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::NoTransition { position, .. }
            | ParseError::UnbalancedStack { position, .. } => Some(*position),
            ParseError::Lexical(err) => Some(err.position),
            ParseError::Internal(_) => None,
        }
    }

    /// The message without its stage and position prefix
    pub fn message(&self) -> String {
        match self {
            ParseError::UnexpectedToken {
                expected, found, ..
            } => format!("Expected {} and received {}", expected, found),
            ParseError::NoTransition {
                nonterminal,
                found,
                expected,
                ..
            } => format!(
                "Invalid transition from {} to {}.\n{}",
                nonterminal,
                found,
                describe_expected(expected)
            ),
            ParseError::UnbalancedStack { count, .. } => format!(
                "Expected 1 value in semantic stack when done parsing. Instead encountered {} items",
                count
            ),
            ParseError::Lexical(err) => err.kind.to_string(),
            ParseError::Internal(err) => err.message(),
        }
    }
}

fn describe_expected(expected: &[TokenKind]) -> String {
    match expected {
        [] => "Expected nothing.".to_string(),
        [only] => format!("Expected {}.", only),
        options => {
            let names: Vec<String> = options.iter().map(|kind| kind.to_string()).collect();
            format!(
                "Expected one of the following options: {}.",
                names.join(", ")
            )
        }
    }
}

/// Table-driven LL(1) parser for Klein
pub struct Parser {
    scanner: Scanner,
    table: GrammarTable,
    /// Most recently consumed or peeked token, read by semantic actions
    last_token: Option<Token>,
}

impl Parser {
    /// Parser for `source` using the Klein grammar.
    pub fn new(source: &str) -> Self {
        Self::with_table(source, GrammarTable::klein())
    }

    pub fn with_table(source: &str, table: GrammarTable) -> Self {
        Self {
            scanner: Scanner::new(source),
            table,
            last_token: None,
        }
    }

    /// Parse the entire program
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut stack = vec![
            GrammarSymbol::Terminal(TokenKind::EndOfFile),
            GrammarSymbol::NonTerminal(self.table.start()),
        ];
        let mut semantic = SemanticStack::new();

        while let Some(symbol) = stack.pop() {
            log::trace!("parser stack top {} (depth {})", symbol, stack.len());

            match symbol {
                GrammarSymbol::Terminal(expected) => {
                    let token = self.scanner.next_token()?;
                    if !token.is(expected) {
                        return Err(ParseError::UnexpectedToken {
                            expected,
                            found: token.kind,
                            position: token.position,
                        });
                    }
                    self.last_token = Some(token);
                }
                GrammarSymbol::NonTerminal(nonterminal) => {
                    let token = self.scanner.peek_token()?;
                    match self.table.lookup(nonterminal, token.kind) {
                        Some(production) => stack.extend(production.iter().rev().copied()),
                        None => {
                            return Err(ParseError::NoTransition {
                                nonterminal,
                                found: token.kind,
                                expected: self.table.expected_terminals(nonterminal),
                                position: token.position,
                            })
                        }
                    }
                    self.last_token = Some(token);
                }
                GrammarSymbol::Action(action) => {
                    semantic.apply(action, self.last_token.as_ref())?;
                }
            }
        }

        let position = self.scanner.position();
        match semantic.into_root() {
            Ok(Node::Program(program)) => {
                log::debug!(
                    "parsed {} definition(s)",
                    program.definitions.definitions.len()
                );
                Ok(program)
            }
            Ok(other) => Err(ParseError::Internal(InternalError::UnexpectedNode {
                expected: "Program",
                found: other.name(),
            })),
            Err(count) => Err(ParseError::UnbalancedStack { count, position }),
        }
    }
}
