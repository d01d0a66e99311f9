//! Compiler-wide error types and diagnostic rendering
//!
//! Each stage owns its error type. This module adds:
//! - [`InternalError`]: a broken invariant inside the compiler itself, kept
//!   apart from errors in the program being compiled
//! - [`CompileError`]: whatever stopped a compilation, from any stage
//! - [`Diagnostic`]: the user-facing text of one error, optionally quoting
//!   the source line with a caret under the offending column

use crate::codegen::CodeGenerationError;
use crate::config::Config;
use crate::parser::ParseError;
use crate::scanner::position::Position;
use crate::scanner::token::TokenKind;
use crate::scanner::{source_line, LexicalError};
use crate::semantic::{Issue, SemanticError, Severity};
use std::fmt;
use thiserror::Error;

/// Compiler invariant violations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    /// The semantic stack held a different node than the action needed
    UnexpectedNode {
        expected: &'static str,
        found: &'static str,
    },

    /// An action needed a node but the semantic stack was empty
    EmptySemanticStack { expected: &'static str },

    /// A token that should carry text had none
    MissingLexeme { kind: TokenKind },

    /// An action needed the last token before any was read
    NoToken,
}

impl InternalError {
    /// The message without its stage prefix
    pub fn message(&self) -> String {
        match self {
            InternalError::UnexpectedNode { expected, found } => format!(
                "Expected {} on the semantic stack but found {}",
                expected, found
            ),
            InternalError::EmptySemanticStack { expected } => {
                format!("Expected {} but the semantic stack is empty", expected)
            }
            InternalError::MissingLexeme { kind } => {
                format!("Token {} has no lexeme", kind)
            }
            InternalError::NoToken => "No token has been read yet".to_string(),
        }
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Klein Internal Error: {}", self.message())
    }
}

impl std::error::Error for InternalError {}

/// Pipeline stage an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexical,
    Parse,
    Semantic,
    CodeGeneration,
    Internal,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Lexical => f.write_str("Lexical"),
            Stage::Parse => f.write_str("Parse"),
            Stage::Semantic => f.write_str("Semantic"),
            Stage::CodeGeneration => f.write_str("Code Generation"),
            Stage::Internal => f.write_str("Internal"),
        }
    }
}

/// One renderable error message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub position: Option<Position>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(stage: Stage, position: Option<Position>, message: impl Into<String>) -> Self {
        Self {
            stage,
            position,
            message: message.into(),
        }
    }

    /// Headline without wrapping or source context
    pub fn headline(&self) -> String {
        match self.position {
            Some(position) => format!(
                "Klein {} Error at {}: {}",
                self.stage, position, self.message
            ),
            None => format!("Klein {} Error: {}", self.stage, self.message),
        }
    }

    /// Wrapped headline, followed by the quoted source line and a caret when
    /// both the position and the line are known.
    pub fn render(&self, source: &str, config: &Config) -> String {
        let mut lines = wrap(&self.headline(), config.wrap_width);

        if config.show_source_line {
            if let Some(position) = self.position {
                if let Some(text) = source_line(source, position.line()) {
                    let gutter = format!("{}|", position.line());
                    let caret = " ".repeat(gutter.len() + position.column());
                    lines.push(format!("{}{}", gutter, text));
                    lines.push(format!("{}^", caret));
                }
            }
        }
        lines.join("\n")
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.headline())
    }
}

/// Word-wrap `text` at `width` columns.
///
/// Explicit newlines are kept, blank lines are dropped, and a word longer
/// than the width stays whole on its own line.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();

    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        let mut current = String::new();
        for word in line.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > width {
                wrapped.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        wrapped.push(current);
    }
    wrapped
}

/// Reason a compilation stopped
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),

    #[error(transparent)]
    Parse(ParseError),

    /// Every issue analysis found, warnings included, in production order
    #[error("Klein Semantic Error: {error}")]
    Semantic {
        error: SemanticError,
        issues: Vec<Issue>,
    },

    #[error(transparent)]
    CodeGeneration(#[from] CodeGenerationError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Lexical and internal failures that surface through the parser keep their
/// own stage.
impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Lexical(err) => CompileError::Lexical(err),
            ParseError::Internal(err) => CompileError::Internal(err),
            other => CompileError::Parse(other),
        }
    }
}

impl CompileError {
    pub fn stage(&self) -> Stage {
        match self {
            CompileError::Lexical(_) => Stage::Lexical,
            CompileError::Parse(_) => Stage::Parse,
            CompileError::Semantic { .. } => Stage::Semantic,
            CompileError::CodeGeneration(_) => Stage::CodeGeneration,
            CompileError::Internal(_) => Stage::Internal,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            CompileError::Lexical(err) => Some(err.position),
            CompileError::Parse(err) => err.position(),
            CompileError::CodeGeneration(err) => err.position(),
            CompileError::Semantic { .. } | CompileError::Internal(_) => None,
        }
    }

    pub fn diagnostic(&self) -> Diagnostic {
        let message = match self {
            CompileError::Lexical(err) => err.kind.to_string(),
            CompileError::Parse(err) => err.message(),
            CompileError::Semantic { error, .. } => error.to_string(),
            CompileError::CodeGeneration(err) => err.message(),
            CompileError::Internal(err) => err.message(),
        };
        Diagnostic::new(self.stage(), self.position(), message)
    }

    /// User-visible report. A semantic failure lists every issue ahead of
    /// the aggregate line; warnings are left out unless the config asks for
    /// them.
    pub fn render(&self, source: &str, config: &Config) -> String {
        let mut lines = Vec::new();
        if let CompileError::Semantic { issues, .. } = self {
            for issue in issues {
                if issue.severity == Severity::Warning && !config.emit_warnings {
                    continue;
                }
                lines.extend(wrap(&issue.to_string(), config.wrap_width));
            }
        }
        lines.push(self.diagnostic().render(source, config));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::LexicalErrorKind;

    #[test]
    fn test_wrap_keeps_long_words() {
        let long = "x".repeat(12);
        let text = format!("one two {} three", long);
        assert_eq!(wrap(&text, 8), vec!["one two", long.as_str(), "three"]);
    }

    #[test]
    fn test_wrap_drops_blank_lines() {
        assert_eq!(wrap("first\n\n  \nsecond", 80), vec!["first", "second"]);
    }

    #[test]
    fn test_caret_under_column() {
        let source = "function main(): integer\n  1 $";
        let diagnostic = Diagnostic::new(
            Stage::Lexical,
            Some(Position::new(2, 4, 29)),
            "Illegal character \"$\" when looking for next token.",
        );

        let rendered = diagnostic.render(source, &Config::default());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines[0],
            "Klein Lexical Error at Line 2 Position 4: Illegal character \"$\" when looking for"
        );
        assert_eq!(lines[1], "next token.");
        assert_eq!(lines[2], "2|  1 $");
        assert_eq!(lines[3], "      ^");
    }

    #[test]
    fn test_source_line_can_be_hidden() {
        let diagnostic = Diagnostic::new(Stage::Parse, Some(Position::start()), "oops");
        let config = Config::default().with_source_line(false);
        assert_eq!(
            diagnostic.render("function", &config),
            "Klein Parse Error at Line 1 Position 0: oops"
        );
    }

    #[test]
    fn test_parse_error_unwraps_lexical() {
        let lexical = LexicalError::new(LexicalErrorKind::UnterminatedComment, Position::start());
        let err = CompileError::from(ParseError::Lexical(lexical.clone()));
        assert!(matches!(err, CompileError::Lexical(ref inner) if *inner == lexical));
        assert_eq!(err.stage(), Stage::Lexical);

        let err = CompileError::from(ParseError::Internal(InternalError::NoToken));
        assert_eq!(err.stage(), Stage::Internal);
        assert_eq!(
            err.to_string(),
            "Klein Internal Error: No token has been read yet"
        );
    }

    #[test]
    fn test_semantic_render_lists_issues() {
        let err = CompileError::Semantic {
            error: SemanticError { count: 1 },
            issues: vec![
                Issue {
                    severity: Severity::Warning,
                    message: "Unused function helper".to_string(),
                },
                Issue {
                    severity: Severity::Error,
                    message: "Missing a main function".to_string(),
                },
            ],
        };

        assert_eq!(
            err.render("", &Config::default()),
            "Klein Semantic Warning: Unused function helper\n\
             Klein Semantic Error: Missing a main function\n\
             Klein Semantic Error: Semantic analysis failed with 1 error(s)"
        );
        assert_eq!(
            err.render("", &Config::default().with_warnings(false)),
            "Klein Semantic Error: Missing a main function\n\
             Klein Semantic Error: Semantic analysis failed with 1 error(s)"
        );
    }

    #[test]
    fn test_code_generation_render() {
        let err = CompileError::from(CodeGenerationError::MissingFunction {
            name: "main".to_string(),
        });
        assert_eq!(err.position(), None);
        assert_eq!(
            err.render("", &Config::default()),
            "Klein Code Generation Error: Missing main function"
        );
    }
}
