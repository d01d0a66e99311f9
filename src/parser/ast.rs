// AST definitions for Klein programs
//
// Every node owns its children. Nodes carry no positions; each one has a
// write-once type slot that only semantic analysis fills in.

use crate::semantic::annotation::Annotation;
use std::cell::OnceCell;
use std::fmt;

/// Write-once type annotation attached to an AST node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSlot(OnceCell<Annotation>);

impl TypeSlot {
    pub fn new() -> Self {
        TypeSlot::default()
    }

    /// Read the annotation.
    ///
    /// # Panics
    ///
    /// Panics if semantic analysis has not annotated the node yet. Reading an
    /// unset slot is a bug in the caller, never a property of the input.
    pub fn get(&self) -> &Annotation {
        match self.0.get() {
            Some(annotation) => annotation,
            None => panic!("type annotation read before semantic analysis set it"),
        }
    }

    pub fn try_get(&self) -> Option<&Annotation> {
        self.0.get()
    }

    pub fn is_set(&self) -> bool {
        self.0.get().is_some()
    }

    /// Store the annotation.
    ///
    /// # Panics
    ///
    /// Panics if the slot was already set.
    pub fn set(&self, annotation: Annotation) {
        if self.0.set(annotation).is_err() {
            panic!("type annotation set twice on the same node");
        }
    }
}

/// Declared type of a parameter or return value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Integer,
    Boolean,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Integer => f.write_str("Integer"),
            TypeKind::Boolean => f.write_str("Boolean"),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Plus,
    Minus,
    Times,
    Divide,
    // Comparison
    LessThan,
    Equals,
    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Name of the expression node this operator builds
    pub fn node_name(&self) -> &'static str {
        match self {
            BinaryOp::Plus => "PlusExpression",
            BinaryOp::Minus => "MinusExpression",
            BinaryOp::Times => "TimesExpression",
            BinaryOp::Divide => "DivideExpression",
            BinaryOp::LessThan => "LessThanExpression",
            BinaryOp::Equals => "EqualsExpression",
            BinaryOp::And => "AndExpression",
            BinaryOp::Or => "OrExpression",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,    // not x
    Negate, // -x
}

impl UnaryOp {
    pub fn node_name(&self) -> &'static str {
        match self {
            UnaryOp::Not => "NotExpression",
            UnaryOp::Negate => "UnaryMinusExpression",
        }
    }
}

/// Root of a parsed program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub definitions: DefinitionList,
    pub annotation: TypeSlot,
}

impl Program {
    pub fn new(definitions: DefinitionList) -> Self {
        Self {
            definitions,
            annotation: TypeSlot::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionList {
    pub definitions: Vec<Definition>,
    pub annotation: TypeSlot,
}

impl DefinitionList {
    pub fn new(definitions: Vec<Definition>) -> Self {
        Self {
            definitions,
            annotation: TypeSlot::new(),
        }
    }
}

/// `function name(parameters): return_type body`
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: Identifier,
    pub parameters: ParameterList,
    pub return_type: TypeNode,
    pub body: Body,
    pub annotation: TypeSlot,
}

impl Definition {
    pub fn new(
        name: Identifier,
        parameters: ParameterList,
        return_type: TypeNode,
        body: Body,
    ) -> Self {
        Self {
            name,
            parameters,
            return_type,
            body,
            annotation: TypeSlot::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterList {
    pub parameters: Vec<IdWithType>,
    pub annotation: TypeSlot,
}

impl ParameterList {
    pub fn new(parameters: Vec<IdWithType>) -> Self {
        Self {
            parameters,
            annotation: TypeSlot::new(),
        }
    }
}

/// A parameter declaration `name: type`
#[derive(Debug, Clone, PartialEq)]
pub struct IdWithType {
    pub name: Identifier,
    pub ty: TypeNode,
    pub annotation: TypeSlot,
}

impl IdWithType {
    pub fn new(name: Identifier, ty: TypeNode) -> Self {
        Self {
            name,
            ty,
            annotation: TypeSlot::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub annotation: TypeSlot,
}

impl TypeNode {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            annotation: TypeSlot::new(),
        }
    }
}

/// Zero or more `print(...)` calls followed by the value of the function
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub prints: Vec<FunctionCall>,
    pub tail: Expr,
    pub annotation: TypeSlot,
}

impl Body {
    pub fn new(prints: Vec<FunctionCall>, tail: Expr) -> Self {
        Self {
            prints,
            tail,
            annotation: TypeSlot::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub annotation: TypeSlot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub annotation: TypeSlot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub consequent: Box<Expr>,
    pub alternative: Box<Expr>,
    pub annotation: TypeSlot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: Identifier,
    pub arguments: ArgumentList,
    pub annotation: TypeSlot,
}

impl FunctionCall {
    pub fn new(name: Identifier, arguments: ArgumentList) -> Self {
        Self {
            name,
            arguments,
            annotation: TypeSlot::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentList {
    pub arguments: Vec<Argument>,
    pub annotation: TypeSlot,
}

impl ArgumentList {
    pub fn new(arguments: Vec<Argument>) -> Self {
        Self {
            arguments,
            annotation: TypeSlot::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub value: Expr,
    pub annotation: TypeSlot,
}

impl Argument {
    pub fn new(value: Expr) -> Self {
        Self {
            value,
            annotation: TypeSlot::new(),
        }
    }
}

/// Literal text as it appeared in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub text: String,
    pub annotation: TypeSlot,
}

impl Literal {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            annotation: TypeSlot::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub annotation: TypeSlot,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: TypeSlot::new(),
        }
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    If(IfExpr),
    Call(FunctionCall),
    IntegerLiteral(Literal),
    BooleanLiteral(Literal),
    Identifier(Identifier),
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            annotation: TypeSlot::new(),
        })
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            annotation: TypeSlot::new(),
        })
    }

    pub fn if_then_else(condition: Expr, consequent: Expr, alternative: Expr) -> Self {
        Expr::If(IfExpr {
            condition: Box::new(condition),
            consequent: Box::new(consequent),
            alternative: Box::new(alternative),
            annotation: TypeSlot::new(),
        })
    }

    pub fn call(name: &str, arguments: Vec<Expr>) -> Self {
        Expr::Call(FunctionCall::new(
            Identifier::new(name),
            ArgumentList::new(arguments.into_iter().map(Argument::new).collect()),
        ))
    }

    pub fn integer(text: &str) -> Self {
        Expr::IntegerLiteral(Literal::new(text))
    }

    pub fn boolean(text: &str) -> Self {
        Expr::BooleanLiteral(Literal::new(text))
    }

    pub fn identifier(name: &str) -> Self {
        Expr::Identifier(Identifier::new(name))
    }

    /// The node's type slot
    pub fn annotation(&self) -> &TypeSlot {
        match self {
            Expr::Binary(binary) => &binary.annotation,
            Expr::Unary(unary) => &unary.annotation,
            Expr::If(if_expr) => &if_expr.annotation,
            Expr::Call(call) => &call.annotation,
            Expr::IntegerLiteral(literal) | Expr::BooleanLiteral(literal) => &literal.annotation,
            Expr::Identifier(identifier) => &identifier.annotation,
        }
    }

    pub fn node_name(&self) -> &'static str {
        match self {
            Expr::Binary(binary) => binary.op.node_name(),
            Expr::Unary(unary) => unary.op.node_name(),
            Expr::If(_) => "IfExpression",
            Expr::Call(_) => "FunctionCallExpression",
            Expr::IntegerLiteral(_) => "IntegerLiteral",
            Expr::BooleanLiteral(_) => "BooleanLiteral",
            Expr::Identifier(_) => "Identifier",
        }
    }

    /// Literals and identifiers print inline as a single line.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Expr::IntegerLiteral(_) | Expr::BooleanLiteral(_) | Expr::Identifier(_)
        )
    }
}

/// Single-line label, used for leaves and node headers in listings.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntegerLiteral(literal) => write!(f, "IntegerLiteral {}", literal.text),
            Expr::BooleanLiteral(literal) => write!(f, "BooleanLiteral {}", literal.text),
            Expr::Identifier(identifier) => write!(f, "Identifier {}", identifier.name),
            other => f.write_str(other.node_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_slot_set_once() {
        let slot = TypeSlot::new();
        assert!(!slot.is_set());
        slot.set(Annotation::Integer);
        assert_eq!(slot.get(), &Annotation::Integer);
        assert_eq!(slot.try_get(), Some(&Annotation::Integer));
    }

    #[test]
    #[should_panic(expected = "before semantic analysis")]
    fn test_type_slot_read_before_set_panics() {
        let slot = TypeSlot::new();
        let _ = slot.get();
    }

    #[test]
    #[should_panic(expected = "set twice")]
    fn test_type_slot_double_set_panics() {
        let slot = TypeSlot::new();
        slot.set(Annotation::Integer);
        slot.set(Annotation::Boolean);
    }

    #[test]
    fn test_expression_labels() {
        assert_eq!(Expr::integer("7").to_string(), "IntegerLiteral 7");
        assert_eq!(Expr::boolean("true").to_string(), "BooleanLiteral true");
        assert_eq!(Expr::identifier("x").to_string(), "Identifier x");
        let sum = Expr::binary(BinaryOp::Plus, Expr::integer("1"), Expr::integer("2"));
        assert_eq!(sum.to_string(), "PlusExpression");
        assert!(!sum.is_leaf());
        let negated = Expr::unary(UnaryOp::Negate, Expr::integer("1"));
        assert_eq!(negated.node_name(), "UnaryMinusExpression");
    }
}
