//! Source positions tracked by the scanner.

use std::fmt;

/// A location in the source text.
///
/// Lines start at 1 and columns at 0. `absolute` counts every character
/// consumed so far and never decreases while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    line: usize,
    column: usize,
    absolute: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, absolute: usize) -> Self {
        Self {
            line,
            column,
            absolute,
        }
    }

    /// The position of the first character of a source file.
    pub fn start() -> Self {
        Self::new(1, 0, 0)
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn absolute(&self) -> usize {
        self.absolute
    }

    /// Move forward `count` characters on the current line.
    pub fn advance(&mut self, count: usize) {
        self.column += count;
        self.absolute += count;
    }

    /// Start a new line. The newline character itself must already have been
    /// counted with [`Position::advance`].
    pub fn newline(&mut self) {
        self.line += 1;
        self.column = 0;
    }

    /// Overwrite this position with another one.
    pub fn load(&mut self, other: &Position) {
        *self = *other;
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {} Position {}", self.line, self.column)
    }
}
