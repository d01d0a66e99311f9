//! Type annotations inferred by semantic analysis

use crate::parser::ast::TypeKind;
use std::fmt;

/// Type attached to an AST node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Integer,
    Boolean,
    /// No value, e.g. the result of `print`
    Empty,
    /// The node failed to type check; an issue has already been recorded
    Error,
    Sequence(Vec<Annotation>),
    Function(Vec<Annotation>, Box<Annotation>),
    /// One of several types, e.g. an `if` whose branches differ
    Union(Vec<Annotation>),
}

impl Annotation {
    pub fn from_type(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Integer => Annotation::Integer,
            TypeKind::Boolean => Annotation::Boolean,
        }
    }

    pub fn function(parameters: Vec<Annotation>, returns: Annotation) -> Self {
        Annotation::Function(parameters, Box::new(returns))
    }

    /// Union of two types. Nested unions are flattened and repeated members
    /// dropped, keeping first-seen order.
    pub fn union(first: Annotation, second: Annotation) -> Self {
        let mut members: Vec<Annotation> = Vec::new();
        for annotation in [first, second] {
            let flattened = match annotation {
                Annotation::Union(inner) => inner,
                other => vec![other],
            };
            for member in flattened {
                if !members.contains(&member) {
                    members.push(member);
                }
            }
        }
        Annotation::Union(members)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Annotation::Error)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Annotation::Function(..))
    }

    /// Whether a value of type `actual` may be used where `self` is expected.
    ///
    /// An expected union takes anything one of its members takes, including
    /// an actual union whose members it all takes. A non-union never takes a
    /// union, even one that contains it.
    pub fn accepts(&self, actual: &Annotation) -> bool {
        match (self, actual) {
            (Annotation::Union(_), Annotation::Union(members)) => {
                members.iter().all(|member| self.accepts(member))
            }
            (Annotation::Union(options), actual) => {
                options.iter().any(|option| option.accepts(actual))
            }
            (_, Annotation::Union(_)) => false,
            (Annotation::Sequence(expected), Annotation::Sequence(actual)) => {
                accepts_all(expected, actual)
            }
            (
                Annotation::Function(expected_params, expected_return),
                Annotation::Function(actual_params, actual_return),
            ) => accepts_all(expected_params, actual_params) && expected_return.accepts(actual_return),
            (expected, actual) => expected == actual,
        }
    }
}

fn accepts_all(expected: &[Annotation], actual: &[Annotation]) -> bool {
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual)
            .all(|(expected, actual)| expected.accepts(actual))
}

fn join(annotations: &[Annotation], separator: &str) -> String {
    annotations
        .iter()
        .map(|annotation| annotation.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Integer => f.write_str("Integer"),
            Annotation::Boolean => f.write_str("Boolean"),
            Annotation::Empty => f.write_str("None"),
            Annotation::Error => f.write_str("Error"),
            Annotation::Sequence(items) => write!(f, "({})", join(items, ", ")),
            Annotation::Function(parameters, returns) => {
                write!(f, "({}) -> {}", join(parameters, ", "), returns)
            }
            Annotation::Union(members) => write!(f, "{{{}}}", join(members, " OR ")),
        }
    }
}
