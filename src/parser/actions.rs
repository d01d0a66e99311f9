//! Semantic value stack and the node constructors run by semantic actions
//!
//! Each constructor pops the children it needs (rightmost child first), builds
//! one node and pushes it back. Finding a node of the wrong variant on the
//! stack means the grammar table and the constructors disagree; that is an
//! [`InternalError`], never a parse error.

use super::ast::*;
use super::grammar::SemanticAction;
use crate::errors::InternalError;
use crate::scanner::token::{Token, TokenKind};

/// Values held on the semantic stack between actions
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Program(Program),
    DefinitionList(DefinitionList),
    Definition(Definition),
    ParameterList(ParameterList),
    IdWithType(IdWithType),
    Type(TypeNode),
    Body(Body),
    Expr(Expr),
    ArgumentList(ArgumentList),
    Argument(Argument),
}

impl Node {
    pub fn name(&self) -> &'static str {
        match self {
            Node::Program(_) => "Program",
            Node::DefinitionList(_) => "DefinitionList",
            Node::Definition(_) => "Definition",
            Node::ParameterList(_) => "ParameterList",
            Node::IdWithType(_) => "IdWithType",
            Node::Type(_) => "Type",
            Node::Body(_) => "Body",
            Node::Expr(expr) => expr.node_name(),
            Node::ArgumentList(_) => "ArgumentList",
            Node::Argument(_) => "Argument",
        }
    }
}

/// Pop the top node, requiring a specific variant.
macro_rules! pop_variant {
    ($stack:expr, $variant:ident, $name:expr) => {
        match $stack.pop_any($name)? {
            Node::$variant(inner) => Ok(inner),
            other => Err(InternalError::UnexpectedNode {
                expected: $name,
                found: other.name(),
            }),
        }
    };
}

/// LIFO stack of already-built nodes
#[derive(Debug, Default)]
pub struct SemanticStack {
    nodes: Vec<Node>,
}

impl SemanticStack {
    pub fn new() -> Self {
        SemanticStack::default()
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn peek(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// Remove and return the single remaining node, if exactly one is left.
    pub fn into_root(mut self) -> Result<Node, usize> {
        if self.nodes.len() == 1 {
            if let Some(root) = self.nodes.pop() {
                return Ok(root);
            }
        }
        Err(self.nodes.len())
    }

    fn pop_any(&mut self, expected: &'static str) -> Result<Node, InternalError> {
        self.nodes
            .pop()
            .ok_or(InternalError::EmptySemanticStack { expected })
    }

    fn pop_expr(&mut self) -> Result<Expr, InternalError> {
        pop_variant!(self, Expr, "Expression")
    }

    fn pop_identifier(&mut self) -> Result<Identifier, InternalError> {
        match self.pop_expr()? {
            Expr::Identifier(identifier) => Ok(identifier),
            other => Err(InternalError::UnexpectedNode {
                expected: "Identifier",
                found: other.node_name(),
            }),
        }
    }

    /// Pop nodes while the top matches `take`, returning them in source order.
    fn pop_while<T>(&mut self, mut take: impl FnMut(&Node) -> bool, unwrap: impl Fn(Node) -> Option<T>) -> Vec<T> {
        let mut items = Vec::new();
        while self.peek().is_some_and(&mut take) {
            if let Some(item) = self.nodes.pop().and_then(&unwrap) {
                items.push(item);
            }
        }
        items.reverse();
        items
    }

    /// Run one semantic action. `token` is the most recently scanned token.
    pub fn apply(&mut self, action: SemanticAction, token: Option<&Token>) -> Result<(), InternalError> {
        let node = match action {
            SemanticAction::MakeProgram => {
                let definitions = pop_variant!(self, DefinitionList, "DefinitionList")?;
                Node::Program(Program::new(definitions))
            }
            SemanticAction::MakeDefinitionList => {
                let definitions = self.pop_while(
                    |node| matches!(node, Node::Definition(_)),
                    |node| match node {
                        Node::Definition(definition) => Some(definition),
                        _ => None,
                    },
                );
                Node::DefinitionList(DefinitionList::new(definitions))
            }
            SemanticAction::MakeDefinition => {
                let body = pop_variant!(self, Body, "Body")?;
                let return_type = pop_variant!(self, Type, "Type")?;
                let parameters = pop_variant!(self, ParameterList, "ParameterList")?;
                let name = self.pop_identifier()?;
                Node::Definition(Definition::new(name, parameters, return_type, body))
            }
            SemanticAction::MakeIdentifier => {
                Node::Expr(Expr::Identifier(Identifier::new(identifier_text(token)?)))
            }
            SemanticAction::MakeParameterList => {
                let parameters = self.pop_while(
                    |node| matches!(node, Node::IdWithType(_)),
                    |node| match node {
                        Node::IdWithType(parameter) => Some(parameter),
                        _ => None,
                    },
                );
                Node::ParameterList(ParameterList::new(parameters))
            }
            SemanticAction::MakeIdWithType => {
                let ty = pop_variant!(self, Type, "Type")?;
                let name = self.pop_identifier()?;
                Node::IdWithType(IdWithType::new(name, ty))
            }
            SemanticAction::MakeIntegerType => Node::Type(TypeNode::new(TypeKind::Integer)),
            SemanticAction::MakeBooleanType => Node::Type(TypeNode::new(TypeKind::Boolean)),
            SemanticAction::MakeBody => {
                let tail = self.pop_expr()?;
                let prints = self.pop_while(
                    |node| matches!(node, Node::Expr(Expr::Call(_))),
                    |node| match node {
                        Node::Expr(Expr::Call(call)) => Some(call),
                        _ => None,
                    },
                );
                Node::Body(Body::new(prints, tail))
            }
            SemanticAction::MakeFunctionCall => {
                let arguments = pop_variant!(self, ArgumentList, "ArgumentList")?;
                let name = self.pop_identifier()?;
                Node::Expr(Expr::Call(FunctionCall::new(name, arguments)))
            }
            SemanticAction::MakeArgumentList => {
                let arguments = self.pop_while(
                    |node| matches!(node, Node::Argument(_)),
                    |node| match node {
                        Node::Argument(argument) => Some(argument),
                        _ => None,
                    },
                );
                Node::ArgumentList(ArgumentList::new(arguments))
            }
            SemanticAction::MakeArgument => Node::Argument(Argument::new(self.pop_expr()?)),
            SemanticAction::MakeEquals => self.binary(BinaryOp::Equals)?,
            SemanticAction::MakeLessThan => self.binary(BinaryOp::LessThan)?,
            SemanticAction::MakeOr => self.binary(BinaryOp::Or)?,
            SemanticAction::MakePlus => self.binary(BinaryOp::Plus)?,
            SemanticAction::MakeMinus => self.binary(BinaryOp::Minus)?,
            SemanticAction::MakeTimes => self.binary(BinaryOp::Times)?,
            SemanticAction::MakeDivide => self.binary(BinaryOp::Divide)?,
            SemanticAction::MakeAnd => self.binary(BinaryOp::And)?,
            SemanticAction::MakeNot => Node::Expr(Expr::unary(UnaryOp::Not, self.pop_expr()?)),
            SemanticAction::MakeUnaryMinus => {
                Node::Expr(Expr::unary(UnaryOp::Negate, self.pop_expr()?))
            }
            SemanticAction::MakeIf => {
                let alternative = self.pop_expr()?;
                let consequent = self.pop_expr()?;
                let condition = self.pop_expr()?;
                Node::Expr(Expr::if_then_else(condition, consequent, alternative))
            }
            SemanticAction::MakeIntegerLiteral => {
                Node::Expr(Expr::IntegerLiteral(Literal::new(lexeme(token)?)))
            }
            SemanticAction::MakeBooleanLiteral => {
                Node::Expr(Expr::BooleanLiteral(Literal::new(lexeme(token)?)))
            }
        };

        log::trace!("semantic action {:?} built {}", action, node.name());
        self.push(node);
        Ok(())
    }

    /// Right operand is on top of the stack, left operand below it.
    fn binary(&mut self, op: BinaryOp) -> Result<Node, InternalError> {
        let right = self.pop_expr()?;
        let left = self.pop_expr()?;
        Ok(Node::Expr(Expr::binary(op, left, right)))
    }
}

fn lexeme(token: Option<&Token>) -> Result<String, InternalError> {
    let token = token.ok_or(InternalError::NoToken)?;
    token
        .lexeme
        .clone()
        .ok_or(InternalError::MissingLexeme { kind: token.kind })
}

/// `print` is scanned as a keyword but named like any other function.
fn identifier_text(token: Option<&Token>) -> Result<String, InternalError> {
    match token {
        Some(token) if token.is(TokenKind::KeywordPrint) => Ok("print".to_string()),
        _ => lexeme(token),
    }
}
