//! Scanner (tokenizer) for Klein source code
//!
//! Converts raw source text into [`Token`]s on demand. The parser pulls one
//! token at a time with [`Scanner::next_token`] and looks ahead with
//! [`Scanner::peek_token`]; nothing is buffered in advance.
//!
//! The scanner is a hand-written DFA. Every call restarts the automaton from
//! the last committed position, skips whitespace and `(* ... *)` comments, and
//! classifies a word only once a delimiter is reached.

pub mod constants;
pub mod position;
pub mod token;

use constants::{MAX_IDENTIFIER_LENGTH, MAX_INTEGER_LITERAL, OPERATORS, PUNCTUATION};
use position::Position;
use thiserror::Error;
use token::{Token, TokenKind};

/// Reasons a scan can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexicalErrorKind {
    #[error("Illegal character \"{}\" when looking for next token.", describe_char(.0))]
    IllegalCharacter(char),

    #[error(
        "Invalid character \"{}\" in identifier. Only alphanumeric characters and underscores allowed.",
        describe_char(.0)
    )]
    InvalidIdentifierCharacter(char),

    #[error("Identifiers cannot be longer than 256 characters")]
    IdentifierTooLong,

    #[error("Integer cannot start with leading 0")]
    LeadingZero,

    #[error("Invalid character \"{}\" in integer", describe_char(.0))]
    InvalidIntegerCharacter(char),

    #[error("Integer literal must be bounded between 0 (incl) and 2147483647 (incl).")]
    IntegerOutOfRange,

    #[error("All comments must be terminated before program ends")]
    UnterminatedComment,

    #[error("Cannot call next on a terminated scanner")]
    TerminatedScanner,
}

/// A fatal scanning error anchored at a source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Klein Lexical Error at {position}: {kind}")]
pub struct LexicalError {
    pub kind: LexicalErrorKind,
    pub position: Position,
}

impl LexicalError {
    pub fn new(kind: LexicalErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// Printable form of a character for error messages.
fn describe_char(ch: &char) -> String {
    if ch.is_control() {
        format!("utf8:{}", *ch as u32)
    } else {
        ch.to_string()
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

fn is_operator(ch: char) -> bool {
    OPERATORS.contains(ch)
}

fn is_punctuation(ch: char) -> bool {
    PUNCTUATION.contains(ch)
}

fn is_delimiter(ch: char) -> bool {
    is_whitespace(ch) || is_operator(ch) || is_punctuation(ch)
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Pull-based scanner for Klein source code
pub struct Scanner {
    input: Vec<char>,
    /// Position after the last token handed out by `next_token`
    committed: Position,
    /// Position of the automaton while a token is being scanned
    working: Position,
    terminated: bool,
    failed: bool,
}

impl Scanner {
    /// Create a new scanner for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            committed: Position::start(),
            working: Position::start(),
            terminated: false,
            failed: false,
        }
    }

    /// Return the next token and advance past it.
    ///
    /// End of file is returned exactly once; any later call fails with
    /// [`LexicalErrorKind::TerminatedScanner`].
    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        self.scan(true)
    }

    /// Return the next token without advancing.
    pub fn peek_token(&mut self) -> Result<Token, LexicalError> {
        self.scan(false)
    }

    /// Whether a token (possibly end of file) is still available.
    pub fn has_next(&self) -> bool {
        !self.terminated
    }

    /// The committed position.
    pub fn position(&self) -> Position {
        self.committed
    }

    /// Text of a 1-based source line, without its line terminator.
    pub fn source_line(&self, line: usize) -> Option<String> {
        source_line(&self.input.iter().collect::<String>(), line)
    }

    fn scan(&mut self, commit: bool) -> Result<Token, LexicalError> {
        if self.terminated {
            return Err(LexicalError::new(
                LexicalErrorKind::TerminatedScanner,
                self.committed,
            ));
        }

        self.working.load(&self.committed);
        let result = self.scan_token();

        match &result {
            Ok(token) if commit => {
                self.committed.load(&self.working);
                self.terminated = token.is(TokenKind::EndOfFile);
                log::debug!("scanned {} at {}", token, token.position);
            }
            _ => self.working.load(&self.committed),
        }

        result
    }

    /// Run the automaton until it produces a token. Whitespace and comments
    /// are accepted states that yield nothing, so the loop restarts.
    fn scan_token(&mut self) -> Result<Token, LexicalError> {
        loop {
            let start = self.working;
            let ch = match self.current() {
                Some(ch) => ch,
                None => return Ok(Token::new(TokenKind::EndOfFile, None, start)),
            };

            let token = if ch.is_ascii_alphabetic() {
                Some(self.scan_word(start)?)
            } else if ch == '0' {
                Some(self.scan_zero(start)?)
            } else if ch.is_ascii_digit() {
                Some(self.scan_number(start)?)
            } else if is_operator(ch) {
                self.bump();
                Some(Token::new(operator_kind(ch), None, start))
            } else if ch == '(' {
                self.scan_paren(start)?
            } else if is_whitespace(ch) {
                self.bump();
                None
            } else if is_punctuation(ch) {
                self.bump();
                Some(Token::new(punctuation_kind(ch), None, start))
            } else {
                return Err(LexicalError::new(
                    LexicalErrorKind::IllegalCharacter(ch),
                    start,
                ));
            };

            if let Some(token) = token {
                return Ok(token);
            }
        }
    }

    /// Identifier, keyword, or boolean literal
    fn scan_word(&mut self, start: Position) -> Result<Token, LexicalError> {
        let mut word = String::new();

        while let Some(ch) = self.current() {
            if is_identifier_char(ch) {
                word.push(ch);
                self.bump();
            } else if is_delimiter(ch) {
                break;
            } else {
                return Err(LexicalError::new(
                    LexicalErrorKind::InvalidIdentifierCharacter(ch),
                    self.working,
                ));
            }
        }

        if word.chars().count() > MAX_IDENTIFIER_LENGTH {
            return Err(LexicalError::new(
                LexicalErrorKind::IdentifierTooLong,
                self.working,
            ));
        }

        let kind = TokenKind::from_word(&word);
        let lexeme = kind.has_lexeme().then_some(word);
        Ok(Token::new(kind, lexeme, start))
    }

    /// A lone `0` is a complete literal; anything glued to it is an error.
    fn scan_zero(&mut self, start: Position) -> Result<Token, LexicalError> {
        self.bump();

        match self.current() {
            None => Ok(Token::new(TokenKind::Integer, Some("0".to_string()), start)),
            Some(ch) if is_delimiter(ch) => {
                Ok(Token::new(TokenKind::Integer, Some("0".to_string()), start))
            }
            Some(ch) if ch.is_ascii_digit() => Err(LexicalError::new(
                LexicalErrorKind::LeadingZero,
                self.working,
            )),
            Some(ch) => Err(LexicalError::new(
                LexicalErrorKind::InvalidIntegerCharacter(ch),
                self.working,
            )),
        }
    }

    /// Integer literal starting with a non-zero digit
    fn scan_number(&mut self, start: Position) -> Result<Token, LexicalError> {
        let mut digits = String::new();

        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.bump();
            } else if is_delimiter(ch) {
                break;
            } else {
                return Err(LexicalError::new(
                    LexicalErrorKind::InvalidIntegerCharacter(ch),
                    self.working,
                ));
            }
        }

        match digits.parse::<i64>() {
            Ok(value) if value <= MAX_INTEGER_LITERAL => {
                Ok(Token::new(TokenKind::Integer, Some(digits), start))
            }
            _ => Err(LexicalError::new(
                LexicalErrorKind::IntegerOutOfRange,
                self.working,
            )),
        }
    }

    /// `(` either opens a comment or is a plain parenthesis.
    fn scan_paren(&mut self, start: Position) -> Result<Option<Token>, LexicalError> {
        self.bump();

        if self.current() == Some('*') {
            self.bump();
            self.skip_comment()?;
            return Ok(None);
        }

        Ok(Some(Token::new(TokenKind::LeftParen, None, start)))
    }

    /// Skip the rest of a `(* ... *)` comment, opening already consumed.
    fn skip_comment(&mut self) -> Result<(), LexicalError> {
        let mut after_star = false;

        loop {
            let ch = self.bump().ok_or_else(|| {
                LexicalError::new(LexicalErrorKind::UnterminatedComment, self.working)
            })?;

            if after_star && ch == ')' {
                return Ok(());
            }
            after_star = ch == '*';
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.working.absolute()).copied()
    }

    /// Consume one character, keeping line and column in step.
    fn bump(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.working.advance(1);
        if ch == '\n' {
            self.working.newline();
        }
        Some(ch)
    }
}

impl Iterator for Scanner {
    type Item = Result<Token, LexicalError>;

    /// Yields every token up to and including end of file, or up to the
    /// first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.terminated || self.failed {
            return None;
        }
        let result = self.next_token();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Text of a 1-based line of `source`.
pub fn source_line(source: &str, line: usize) -> Option<String> {
    if line == 0 {
        return None;
    }
    source
        .split('\n')
        .nth(line - 1)
        .map(|text| text.trim_end_matches('\r').to_string())
}

fn operator_kind(ch: char) -> TokenKind {
    match ch {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Times,
        '/' => TokenKind::Divide,
        '<' => TokenKind::LessThan,
        _ => TokenKind::Equal,
    }
}

fn punctuation_kind(ch: char) -> TokenKind {
    match ch {
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        ',' => TokenKind::Comma,
        _ => TokenKind::Colon,
    }
}
