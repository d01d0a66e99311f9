//! Token definitions produced by the [`Scanner`](super::Scanner).

use super::position::Position;
use std::fmt;

/// Every kind of token the scanner can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    // Literals and names
    Integer,
    Identifier,
    Boolean,

    // Keywords
    KeywordInteger,
    KeywordBoolean,
    KeywordIf,
    KeywordThen,
    KeywordElse,
    KeywordNot,
    KeywordAnd,
    KeywordOr,
    KeywordFunction,
    KeywordPrint,

    // Punctuation
    LeftParen,  // (
    RightParen, // )
    Comma,      // ,
    Colon,      // :

    // Operators
    Plus,     // +
    Minus,    // -
    Times,    // *
    Divide,   // /
    LessThan, // <
    Equal,    // =

    EndOfFile,
}

impl TokenKind {
    /// All token kinds in declaration order.
    pub const ALL: [TokenKind; 24] = [
        TokenKind::Integer,
        TokenKind::Identifier,
        TokenKind::Boolean,
        TokenKind::KeywordInteger,
        TokenKind::KeywordBoolean,
        TokenKind::KeywordIf,
        TokenKind::KeywordThen,
        TokenKind::KeywordElse,
        TokenKind::KeywordNot,
        TokenKind::KeywordAnd,
        TokenKind::KeywordOr,
        TokenKind::KeywordFunction,
        TokenKind::KeywordPrint,
        TokenKind::LeftParen,
        TokenKind::RightParen,
        TokenKind::Comma,
        TokenKind::Colon,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Times,
        TokenKind::Divide,
        TokenKind::LessThan,
        TokenKind::Equal,
        TokenKind::EndOfFile,
    ];

    /// Classify a complete word. Reserved words get their own kinds; anything
    /// else is a plain identifier.
    pub fn from_word(word: &str) -> TokenKind {
        match word {
            "integer" => TokenKind::KeywordInteger,
            "boolean" => TokenKind::KeywordBoolean,
            "if" => TokenKind::KeywordIf,
            "then" => TokenKind::KeywordThen,
            "else" => TokenKind::KeywordElse,
            "not" => TokenKind::KeywordNot,
            "and" => TokenKind::KeywordAnd,
            "or" => TokenKind::KeywordOr,
            "function" => TokenKind::KeywordFunction,
            "print" => TokenKind::KeywordPrint,
            "true" | "false" => TokenKind::Boolean,
            _ => TokenKind::Identifier,
        }
    }

    /// Whether tokens of this kind keep the text they were scanned from.
    pub fn has_lexeme(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer | TokenKind::Identifier | TokenKind::Boolean
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Integer => "INTEGER",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::KeywordInteger => "KEYWORD_INTEGER",
            TokenKind::KeywordBoolean => "KEYWORD_BOOLEAN",
            TokenKind::KeywordIf => "KEYWORD_IF",
            TokenKind::KeywordThen => "KEYWORD_THEN",
            TokenKind::KeywordElse => "KEYWORD_ELSE",
            TokenKind::KeywordNot => "KEYWORD_NOT",
            TokenKind::KeywordAnd => "KEYWORD_AND",
            TokenKind::KeywordOr => "KEYWORD_OR",
            TokenKind::KeywordFunction => "KEYWORD_FUNCTION",
            TokenKind::KeywordPrint => "KEYWORD_PRINT",
            TokenKind::LeftParen => "LEFT_PAREN",
            TokenKind::RightParen => "RIGHT_PAREN",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Divide => "DIVIDE",
            TokenKind::LessThan => "LESS_THAN",
            TokenKind::Equal => "EQUAL",
            TokenKind::EndOfFile => "END_OF_FILE",
        };
        f.write_str(name)
    }
}

/// A scanned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Option<String>,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: Option<String>, position: Position) -> Self {
        Self {
            kind,
            lexeme,
            position,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Renders the token listing form `KIND[:lexeme]`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lexeme {
            Some(lexeme) => write!(f, "{}:{}", self.kind, lexeme),
            None => write!(f, "{}", self.kind),
        }
    }
}
