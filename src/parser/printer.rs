//! Text and DOT listings of a parsed program
//!
//! Neither listing depends on type annotations, so both work on the output of
//! the parser directly.

use super::ast::*;

const INDENT: &str = "  ";

/// Indented listing, one construct per line
pub fn to_text(program: &Program) -> String {
    let mut printer = TextPrinter::default();
    printer.line(0, "Program");
    for definition in &program.definitions.definitions {
        printer.definition(definition, 1);
    }
    printer.out
}

#[derive(Default)]
struct TextPrinter {
    out: String,
}

impl TextPrinter {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn definition(&mut self, definition: &Definition, depth: usize) {
        self.line(depth, "Definition");
        self.line(depth + 1, &format!("name {}", definition.name.name));
        self.line(depth + 1, "parameters");
        for parameter in &definition.parameters.parameters {
            self.line(
                depth + 2,
                &format!("{} {}", parameter.ty.kind, parameter.name.name),
            );
        }
        self.line(depth + 1, &format!("returns {}", definition.return_type.kind));
        self.line(depth + 1, "body");
        for print in &definition.body.prints {
            self.call(print, depth + 2);
        }
        self.expr(&definition.body.tail, depth + 2);
    }

    fn call(&mut self, call: &FunctionCall, depth: usize) {
        self.line(depth, "function call");
        self.line(depth + 1, &format!("name {}", call.name.name));
        if call.arguments.arguments.is_empty() {
            return;
        }
        self.line(depth + 1, "arguments");
        for argument in &call.arguments.arguments {
            self.expr(&argument.value, depth + 2);
        }
    }

    /// A child labelled by its role; leaves share the role's line.
    fn child(&mut self, role: &str, expr: &Expr, depth: usize) {
        if expr.is_leaf() {
            self.line(depth, &format!("{} {}", role, expr));
        } else {
            self.line(depth, role);
            self.expr(expr, depth + 1);
        }
    }

    fn expr(&mut self, expr: &Expr, depth: usize) {
        match expr {
            Expr::Binary(binary) => {
                self.line(depth, binary.op.node_name());
                self.child("left_side", &binary.left, depth + 1);
                self.child("right_side", &binary.right, depth + 1);
            }
            Expr::Unary(unary) => {
                self.line(depth, unary.op.node_name());
                self.child("value", &unary.operand, depth + 1);
            }
            Expr::If(if_expr) => {
                self.line(depth, "IfExpression");
                self.line(depth + 1, "condition");
                self.expr(&if_expr.condition, depth + 2);
                self.line(depth + 1, "consequent");
                self.expr(&if_expr.consequent, depth + 2);
                self.line(depth + 1, "alternative");
                self.expr(&if_expr.alternative, depth + 2);
            }
            Expr::Call(call) => self.call(call, depth),
            leaf => self.line(depth, &leaf.to_string()),
        }
    }
}

/// Graphviz listing of the tree
pub fn to_dot(program: &Program) -> String {
    let arena = Arena::build(program);
    let mut out = String::from("digraph ast {\n");
    for (index, node) in arena.nodes.iter().enumerate() {
        out.push_str(&format!("{} [label = \"{}\"]\n", index, node.label));
        for (target, role) in &node.edges {
            match role {
                Some(role) => out.push_str(&format!("{} -> {} [label = \"{}\"]\n", index, target, role)),
                None => out.push_str(&format!("{} -> {}\n", index, target)),
            }
        }
    }
    out.push_str("}\n");
    out
}

/// Nodes of the tree flattened in preorder, addressed by index
#[derive(Debug, Default)]
pub struct Arena {
    pub nodes: Vec<ArenaNode>,
}

#[derive(Debug)]
pub struct ArenaNode {
    pub label: String,
    pub edges: Vec<(usize, Option<&'static str>)>,
}

impl Arena {
    pub fn build(program: &Program) -> Self {
        let mut arena = Arena::default();
        let root = arena.add("Program".to_string());
        let list = arena.add("DefinitionList".to_string());
        arena.link(root, list, None);
        for definition in &program.definitions.definitions {
            let index = arena.definition(definition);
            arena.link(list, index, None);
        }
        arena
    }

    fn add(&mut self, label: String) -> usize {
        self.nodes.push(ArenaNode {
            label,
            edges: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn link(&mut self, from: usize, to: usize, role: Option<&'static str>) {
        if let Some(node) = self.nodes.get_mut(from) {
            node.edges.push((to, role));
        }
    }

    fn definition(&mut self, definition: &Definition) -> usize {
        let index = self.add(format!(
            "Definition\\nname {}\\nreturns {}",
            definition.name.name, definition.return_type.kind
        ));

        let parameters = self.add("ParameterList".to_string());
        self.link(index, parameters, Some("parameters"));
        for parameter in &definition.parameters.parameters {
            let child = self.add(format!(
                "name {}\\ntype {}",
                parameter.name.name, parameter.ty.kind
            ));
            self.link(parameters, child, None);
        }

        let body = self.add("Body".to_string());
        self.link(index, body, Some("body"));
        for print in &definition.body.prints {
            let child = self.call(print);
            self.link(body, child, None);
        }
        let tail = self.expr(&definition.body.tail);
        self.link(body, tail, None);

        index
    }

    fn call(&mut self, call: &FunctionCall) -> usize {
        let index = self.add(format!("FunctionCallExpression\\n{}", call.name.name));
        let list = self.add("ArgumentList".to_string());
        self.link(index, list, None);
        for argument in &call.arguments.arguments {
            let child = self.add("Argument".to_string());
            self.link(list, child, None);
            let value = self.expr(&argument.value);
            self.link(child, value, None);
        }
        index
    }

    fn expr(&mut self, expr: &Expr) -> usize {
        match expr {
            Expr::Binary(binary) => {
                let index = self.add(binary.op.node_name().to_string());
                let left = self.expr(&binary.left);
                self.link(index, left, Some("left_side"));
                let right = self.expr(&binary.right);
                self.link(index, right, Some("right_side"));
                index
            }
            Expr::Unary(unary) => {
                let index = self.add(unary.op.node_name().to_string());
                let operand = self.expr(&unary.operand);
                self.link(index, operand, None);
                index
            }
            Expr::If(if_expr) => {
                let index = self.add("IfExpression".to_string());
                let condition = self.expr(&if_expr.condition);
                self.link(index, condition, Some("condition"));
                let consequent = self.expr(&if_expr.consequent);
                self.link(index, consequent, Some("consequent"));
                let alternative = self.expr(&if_expr.alternative);
                self.link(index, alternative, Some("alternative"));
                index
            }
            Expr::Call(call) => self.call(call),
            leaf => self.add(leaf.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse(source: &str) -> Program {
        Parser::new(source).parse_program().unwrap()
    }

    #[test]
    fn test_text_listing() {
        let program = parse(
            "function main(x: integer): integer
               print(x)
               if x < 1 then -x else x + 1",
        );
        let expected = "\
Program
  Definition
    name main
    parameters
      Integer x
    returns Integer
    body
      function call
        name print
        arguments
          Identifier x
      IfExpression
        condition
          LessThanExpression
            left_side Identifier x
            right_side IntegerLiteral 1
        consequent
          UnaryMinusExpression
            value Identifier x
        alternative
          PlusExpression
            left_side Identifier x
            right_side IntegerLiteral 1
";
        assert_eq!(to_text(&program), expected);
    }

    #[test]
    fn test_text_nested_operands() {
        let program = parse("function main(): integer (1 + 2) * f()");
        let text = to_text(&program);
        assert!(text.contains(
            "      TimesExpression
        left_side
          PlusExpression
"
        ));
        assert!(text.contains(
            "        right_side
          function call
            name f
"
        ));
        assert!(!text.contains("arguments"));
    }

    #[test]
    fn test_dot_listing() {
        let program = parse("function main(): boolean not true");
        let expected = "\
digraph ast {
0 [label = \"Program\"]
0 -> 1
1 [label = \"DefinitionList\"]
1 -> 2
2 [label = \"Definition\\nname main\\nreturns Boolean\"]
2 -> 3 [label = \"parameters\"]
2 -> 4 [label = \"body\"]
3 [label = \"ParameterList\"]
4 [label = \"Body\"]
4 -> 5
5 [label = \"NotExpression\"]
5 -> 6
6 [label = \"BooleanLiteral true\"]
}
";
        assert_eq!(to_dot(&program), expected);
    }

    #[test]
    fn test_empty_program_listings() {
        let program = parse("");
        assert_eq!(to_text(&program), "Program\n");
        let arena = Arena::build(&program);
        assert_eq!(arena.nodes.len(), 2);
    }
}
