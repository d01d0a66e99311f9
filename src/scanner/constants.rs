// Lexical limits of the Klein language

/// Longest identifier the scanner accepts
pub const MAX_IDENTIFIER_LENGTH: usize = 256;

/// Largest integer literal the scanner accepts (2^31 - 1)
pub const MAX_INTEGER_LITERAL: i64 = i32::MAX as i64;

/// Single-character operators
pub const OPERATORS: &str = "+-*/<=";

/// Punctuation, including the parenthesis that may also open a comment
pub const PUNCTUATION: &str = "(),:";
