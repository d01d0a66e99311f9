//! Issue collection for semantic analysis
//!
//! Analysis keeps going after a problem so that one mistake does not hide
//! the next. Problems are recorded in a [`Diagnostics`] collector passed down
//! the pass; once the pass is over, any recorded error becomes a single
//! [`SemanticError`].

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One semantic problem, in the order it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "Klein Semantic Error: {}", self.message),
            Severity::Warning => write!(f, "Klein Semantic Warning: {}", self.message),
        }
    }
}

/// Aggregate failure raised after analysis recorded at least one error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Semantic analysis failed with {count} error(s)")]
pub struct SemanticError {
    pub count: usize,
}

/// Collector threaded through the analysis pass
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("semantic error: {}", message);
        self.issues.push(Issue {
            severity: Severity::Error,
            message,
        });
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.issues.push(Issue {
            severity: Severity::Warning,
            message,
        });
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|issue| issue.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }

    /// Convert recorded errors into the aggregate failure.
    pub fn check(&self) -> Result<(), SemanticError> {
        match self.error_count() {
            0 => Ok(()),
            count => Err(SemanticError { count }),
        }
    }
}
