//! Type checking and call-graph construction
//!
//! Analysis runs in two passes over the program:
//! 1. Every definition is registered as a global function symbol, next to the
//!    built-in `print`, so calls may refer to functions defined later.
//! 2. Each definition is walked depth first. Every node gets its annotation,
//!    parameters are checked for use, and each call to a known function adds
//!    an edge to the call graph.
//!
//! Once both passes are done, backward edges are derived from the forward
//! ones and every function nobody calls is reported as unused.

use super::annotation::Annotation;
use super::diagnostics::{Diagnostics, SemanticError};
use super::symbol_table::{Symbol, SymbolKind, SymbolTable};
use crate::parser::ast::*;
use rustc_hash::FxHashSet;

/// Name of the built-in output function
pub const PRINT: &str = "print";

/// Name of the entry point every program must define
pub const MAIN: &str = "main";

/// Annotate `program` in place and build its symbol table.
///
/// Every issue found is recorded in `diagnostics`, errors and warnings alike.
/// If any of them is an error, the aggregate [`SemanticError`] is returned
/// instead of the table.
pub fn analyze(program: &Program, diagnostics: &mut Diagnostics) -> Result<SymbolTable, SemanticError> {
    let mut analyzer = Analyzer::new(diagnostics);
    analyzer.program(program);
    let table = analyzer.finish();

    log::info!(
        "semantic analysis finished with {} error(s) and {} warning(s)",
        diagnostics.error_count(),
        diagnostics.warning_count()
    );
    diagnostics.check()?;
    Ok(table)
}

/// The function whose body is being analyzed
struct FunctionContext {
    name: String,
    used_parameters: FxHashSet<String>,
}

struct Analyzer<'d> {
    table: SymbolTable,
    diagnostics: &'d mut Diagnostics,
    /// Caller/callee pairs, applied to the global symbols at the end
    calls: Vec<(String, String)>,
    current: Option<FunctionContext>,
}

impl<'d> Analyzer<'d> {
    fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            table: SymbolTable::new(),
            diagnostics,
            calls: Vec::new(),
            current: None,
        }
    }

    // ===== Issue helpers =====

    /// Record an error found inside the current function.
    fn function_error(&mut self, message: String) {
        match &self.current {
            Some(context) => {
                let message = format!("Function {}: {}", context.name, message);
                self.diagnostics.error(message);
            }
            None => self.diagnostics.error(message),
        }
    }

    fn function_warning(&mut self, function: &str, message: String) {
        self.diagnostics
            .warning(format!("Function {}: {}", function, message));
    }

    // ===== Pass 1: global functions =====

    fn program(&mut self, program: &Program) {
        self.bind_print();
        self.register_definitions(&program.definitions);

        let mut definition_types = Vec::new();
        for definition in &program.definitions.definitions {
            definition_types.push(self.definition(definition));
        }
        program
            .definitions
            .annotation
            .set(Annotation::Sequence(definition_types));
        program.annotation.set(Annotation::Empty);
    }

    fn bind_print(&mut self) {
        let value = Symbol::new(
            "value",
            SymbolKind::Param,
            Annotation::union(Annotation::Integer, Annotation::Boolean),
        );
        let print = Symbol::function(PRINT, vec![value], Annotation::Empty);
        if self.table.bind(print).is_err() {
            log::warn!("built-in {} was already bound", PRINT);
        }
    }

    fn register_definitions(&mut self, definitions: &DefinitionList) {
        for definition in &definitions.definitions {
            let name = &definition.name.name;
            if self.table.lookup_current(name).is_some() {
                self.diagnostics
                    .error(format!("Duplicated function name {}", name));
                continue;
            }

            let parameters = definition
                .parameters
                .parameters
                .iter()
                .map(|parameter| {
                    Symbol::new(
                        parameter.name.name.clone(),
                        SymbolKind::Param,
                        Annotation::from_type(parameter.ty.kind),
                    )
                })
                .collect();
            let returns = Annotation::from_type(definition.return_type.kind);
            if let Err(err) = self.table.bind(Symbol::function(name.clone(), parameters, returns)) {
                log::warn!("{}", err);
            }
        }

        let has_main = self
            .table
            .lookup_current(MAIN)
            .is_some_and(|symbol| symbol.is_function());
        if !has_main {
            self.diagnostics.error("Missing a main function");
        }
    }

    // ===== Pass 2: definitions and expressions =====

    fn definition(&mut self, definition: &Definition) -> Annotation {
        let name = definition.name.name.clone();

        // Parameter scope
        self.table.enter_scope();
        let mut parameter_types = Vec::new();
        for parameter in &definition.parameters.parameters {
            let ty = Annotation::from_type(parameter.ty.kind);
            parameter.ty.annotation.set(ty.clone());
            parameter.name.annotation.set(ty.clone());
            parameter.annotation.set(ty.clone());

            let symbol = Symbol::new(parameter.name.name.clone(), SymbolKind::Param, ty.clone());
            if self.table.bind(symbol).is_err() {
                self.diagnostics.error(format!(
                    "Function {}: Duplicated parameter name {}",
                    name, parameter.name.name
                ));
            }
            parameter_types.push(ty);
        }
        definition
            .parameters
            .annotation
            .set(Annotation::Sequence(parameter_types.clone()));

        let declared = Annotation::from_type(definition.return_type.kind);
        definition.return_type.annotation.set(declared.clone());

        // Body scope
        self.table.enter_scope();
        self.current = Some(FunctionContext {
            name: name.clone(),
            used_parameters: FxHashSet::default(),
        });
        let body_type = self.body(&definition.body);
        self.table.exit_scope();

        let context = self.current.take();
        let parameters = self.table.exit_scope().unwrap_or_default();
        for parameter in parameters {
            let used = context
                .as_ref()
                .is_some_and(|context| context.used_parameters.contains(&parameter.name));
            if !used {
                self.function_warning(&name, format!("Unused parameter {}", parameter.name));
            }
        }

        let function_type = Annotation::function(parameter_types, declared.clone());
        definition.name.annotation.set(function_type.clone());
        definition.annotation.set(function_type.clone());

        if !declared.accepts(&body_type) {
            self.diagnostics.error(format!(
                "Expected function {} to return {} instead found {}",
                name, declared, body_type
            ));
        }

        function_type
    }

    fn body(&mut self, body: &Body) -> Annotation {
        for print in &body.prints {
            let ty = self.call(print);
            print.annotation.set(ty);
        }
        let ty = self.expr(&body.tail);
        body.annotation.set(ty.clone());
        ty
    }

    /// Annotate an expression and return its type.
    fn expr(&mut self, expr: &Expr) -> Annotation {
        let ty = match expr {
            Expr::IntegerLiteral(_) => Annotation::Integer,
            Expr::BooleanLiteral(_) => Annotation::Boolean,
            Expr::Identifier(identifier) => self.identifier(identifier),
            Expr::Call(call) => self.call(call),
            Expr::Binary(binary) => self.binary(binary),
            Expr::Unary(unary) => self.unary(unary),
            Expr::If(if_expr) => self.if_expr(if_expr),
        };
        expr.annotation().set(ty.clone());
        ty
    }

    fn identifier(&mut self, identifier: &Identifier) -> Annotation {
        let (kind, ty) = match self.table.lookup(&identifier.name) {
            Some(symbol) => (symbol.kind, symbol.ty.clone()),
            None => {
                self.function_error(format!("Missing identifier {} referenced", identifier.name));
                return Annotation::Error;
            }
        };

        if ty.is_function() {
            self.function_error(format!(
                "Attempted to use function {} as identifier",
                identifier.name
            ));
            return Annotation::Error;
        }

        if kind == SymbolKind::Param {
            if let Some(context) = self.current.as_mut() {
                context.used_parameters.insert(identifier.name.clone());
            }
        }
        ty
    }

    fn call(&mut self, call: &FunctionCall) -> Annotation {
        let mut arguments = Vec::new();
        for argument in &call.arguments.arguments {
            let ty = self.expr(&argument.value);
            argument.annotation.set(ty.clone());
            arguments.push(ty);
        }
        call.arguments
            .annotation
            .set(Annotation::Sequence(arguments.clone()));

        let callee = &call.name.name;
        let (kind, callee_type) = match self.table.lookup(callee) {
            Some(symbol) => (symbol.kind, symbol.ty.clone()),
            None => {
                call.name.annotation.set(Annotation::Error);
                self.function_error(format!("Attempted to call non-existent function {}", callee));
                return Annotation::Error;
            }
        };
        call.name.annotation.set(callee_type.clone());

        let (parameters, returns) = match callee_type {
            Annotation::Function(parameters, returns) => (parameters, *returns),
            _ => {
                let message = match kind {
                    SymbolKind::Param => format!("Attempted to call parameter {} as a function", callee),
                    _ => format!("Attempted to call {} which is not a function", callee),
                };
                self.function_error(message);
                return Annotation::Error;
            }
        };

        if let Some(context) = &self.current {
            self.calls.push((context.name.clone(), callee.clone()));
        }

        if arguments.len() > parameters.len() {
            self.function_error(format!(
                "Too many arguments passed to {}. Expected {} and received {}",
                callee,
                parameters.len(),
                arguments.len()
            ));
            return Annotation::Error;
        }
        if arguments.len() < parameters.len() {
            self.function_error(format!(
                "Too few arguments passed to {}. Expected {} and received {}",
                callee,
                parameters.len(),
                arguments.len()
            ));
            return Annotation::Error;
        }

        let expected = Annotation::Sequence(parameters);
        let received = Annotation::Sequence(arguments);
        if !expected.accepts(&received) {
            self.function_error(format!(
                "Mismatched argument types passed to {}. Expected {} and received {}",
                callee, expected, received
            ));
            return Annotation::Error;
        }

        returns
    }

    fn binary(&mut self, binary: &BinaryExpr) -> Annotation {
        let left = self.expr(&binary.left);
        let right = self.expr(&binary.right);
        let node = binary.op.node_name();

        match binary.op {
            BinaryOp::Equals => {
                if left.is_error() || right.is_error() {
                    Annotation::Error
                } else {
                    Annotation::Boolean
                }
            }
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Times | BinaryOp::Divide => {
                self.operands(node, Annotation::Integer, &left, &right, Annotation::Integer)
            }
            BinaryOp::LessThan => {
                self.operands(node, Annotation::Integer, &left, &right, Annotation::Boolean)
            }
            BinaryOp::And | BinaryOp::Or => {
                self.operands(node, Annotation::Boolean, &left, &right, Annotation::Boolean)
            }
        }
    }

    /// Check both operands against `required`; each side reports on its own.
    fn operands(
        &mut self,
        node: &str,
        required: Annotation,
        left: &Annotation,
        right: &Annotation,
        result: Annotation,
    ) -> Annotation {
        let mut valid = true;
        for (side, actual) in [("left side", left), ("right side", right)] {
            if !required.accepts(actual) {
                self.function_error(format!(
                    "Expected {} of {} to be {} instead found {}",
                    side, node, required, actual
                ));
                valid = false;
            }
        }
        if valid {
            result
        } else {
            Annotation::Error
        }
    }

    fn unary(&mut self, unary: &UnaryExpr) -> Annotation {
        let operand = self.expr(&unary.operand);
        let required = match unary.op {
            UnaryOp::Not => Annotation::Boolean,
            UnaryOp::Negate => Annotation::Integer,
        };

        if required.accepts(&operand) {
            required
        } else {
            self.function_error(format!(
                "Expected value of {} to be {} instead found {}",
                unary.op.node_name(),
                required,
                operand
            ));
            Annotation::Error
        }
    }

    fn if_expr(&mut self, if_expr: &IfExpr) -> Annotation {
        let condition = self.expr(&if_expr.condition);
        let valid_condition = Annotation::Boolean.accepts(&condition);
        if !valid_condition {
            self.function_error(format!(
                "Expected condition of IfExpression to be Boolean instead found {}",
                condition
            ));
        }

        let consequent = self.expr(&if_expr.consequent);
        let alternative = self.expr(&if_expr.alternative);

        if !valid_condition {
            Annotation::Error
        } else if consequent == alternative {
            consequent
        } else {
            Annotation::union(consequent, alternative)
        }
    }

    // ===== Call graph =====

    /// Apply recorded calls to the global symbols, warn about unused
    /// functions and hand back the table.
    fn finish(mut self) -> SymbolTable {
        for (caller, callee) in std::mem::take(&mut self.calls) {
            if let Some(symbol) = self.table.lookup_mut(&caller) {
                symbol.forward_refs.insert(callee.clone());
            }
            if let Some(symbol) = self.table.lookup_mut(&callee) {
                symbol.backward_refs.insert(caller);
            }
        }

        let unused: Vec<String> = self
            .table
            .iter()
            .filter(|symbol| symbol.kind == SymbolKind::Global && symbol.is_function())
            .filter(|symbol| symbol.name != MAIN && symbol.name != PRINT)
            .filter(|symbol| symbol.backward_refs.is_empty())
            .map(|symbol| symbol.name.clone())
            .collect();
        for name in unused {
            self.diagnostics.warning(format!("Unused function {}", name));
        }

        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::semantic::diagnostics::Issue;

    fn parse(source: &str) -> Program {
        Parser::new(source).parse_program().unwrap()
    }

    /// Run analysis, returning the outcome and every rendered issue.
    fn run(source: &str) -> (Result<SymbolTable, SemanticError>, Vec<String>) {
        let _ = env_logger::builder().is_test(true).try_init();
        let program = parse(source);
        let mut diagnostics = Diagnostics::new();
        let result = analyze(&program, &mut diagnostics);
        let issues = diagnostics.issues().iter().map(Issue::to_string).collect();
        (result, issues)
    }

    fn assert_fails(source: &str, expected: &[&str]) {
        let (result, issues) = run(source);
        assert!(result.is_err(), "analysis should fail for {source}");
        assert_eq!(issues, expected);
    }

    fn assert_passes(source: &str, expected: &[&str]) {
        let (result, issues) = run(source);
        assert!(result.is_ok(), "analysis should pass, issues: {issues:?}");
        assert_eq!(issues, expected);
    }

    const PRINT_MISMATCH: &str = "Klein Semantic Error: Function main: Mismatched argument types passed to print. Expected ({Integer OR Boolean}) and received (Error)";

    #[test]
    fn test_annotates_every_node() {
        let program = parse(
            "function main(x: integer): boolean
               print(x)
               if x < 1 then true else not false",
        );
        let mut diagnostics = Diagnostics::new();
        analyze(&program, &mut diagnostics).unwrap();

        let definition = &program.definitions.definitions[0];
        assert_eq!(
            definition.annotation.get(),
            &Annotation::function(vec![Annotation::Integer], Annotation::Boolean)
        );
        assert_eq!(definition.body.prints[0].annotation.get(), &Annotation::Empty);
        assert_eq!(definition.body.annotation.get(), &Annotation::Boolean);
        match &definition.body.tail {
            Expr::If(if_expr) => {
                assert_eq!(if_expr.condition.annotation().get(), &Annotation::Boolean);
                assert_eq!(if_expr.alternative.annotation().get(), &Annotation::Boolean);
            }
            other => panic!("expected if expression, found {other}"),
        }
        assert!(program.annotation.is_set());
    }

    #[test]
    fn test_warns_on_unused() {
        assert_passes(
            "function unused_fun(unused_arg: integer): integer
                 1
             function main(): integer
                 1",
            &[
                "Klein Semantic Warning: Function unused_fun: Unused parameter unused_arg",
                "Klein Semantic Warning: Unused function unused_fun",
            ],
        );
    }

    #[test]
    fn test_wrong_return_type() {
        assert_fails(
            "function main(): integer true",
            &["Klein Semantic Error: Expected function main to return Integer instead found Boolean"],
        );
        assert_fails(
            "function main(): boolean 1",
            &["Klein Semantic Error: Expected function main to return Boolean instead found Integer"],
        );
        assert_fails(
            "function returns_int(): integer 1
             function main(): boolean returns_int()",
            &["Klein Semantic Error: Expected function main to return Boolean instead found Integer"],
        );
    }

    #[test]
    fn test_duplicated_function_name() {
        let (result, issues) = run(
            "function twice(): integer 1
             function twice(): integer 1
             function main(): integer twice() + twice()",
        );
        assert_eq!(
            issues,
            vec!["Klein Semantic Error: Duplicated function name twice"]
        );
        assert_eq!(result.unwrap_err().count, 1);
    }

    #[test]
    fn test_duplicate_keeps_first_signature() {
        assert_fails(
            "function f(): integer 1
             function f(): boolean true
             function main(): integer f()",
            &["Klein Semantic Error: Duplicated function name f"],
        );
    }

    #[test]
    fn test_duplicated_parameter_name() {
        assert_fails(
            "function main(dup: integer, dup: integer): integer dup",
            &["Klein Semantic Error: Function main: Duplicated parameter name dup"],
        );
    }

    #[test]
    fn test_missing_main_only() {
        assert_fails(
            "function missing_main(a: integer): integer
                 if a = 0 then 1 else missing_main(a - 1)",
            &["Klein Semantic Error: Missing a main function"],
        );
    }

    #[test]
    fn test_operand_errors() {
        assert_fails(
            "function main(): boolean
                 print(1 + true)
                 print(not 1)
                 print(true and 3)
                 true",
            &[
                "Klein Semantic Error: Function main: Expected right side of PlusExpression to be Integer instead found Boolean",
                PRINT_MISMATCH,
                "Klein Semantic Error: Function main: Expected value of NotExpression to be Boolean instead found Integer",
                PRINT_MISMATCH,
                "Klein Semantic Error: Function main: Expected right side of AndExpression to be Boolean instead found Integer",
                PRINT_MISMATCH,
            ],
        );
    }

    #[test]
    fn test_both_sides_reported() {
        assert_fails(
            "function main(): boolean false < true",
            &[
                "Klein Semantic Error: Function main: Expected left side of LessThanExpression to be Integer instead found Boolean",
                "Klein Semantic Error: Function main: Expected right side of LessThanExpression to be Integer instead found Boolean",
                "Klein Semantic Error: Expected function main to return Boolean instead found Error",
            ],
        );
    }

    #[test]
    fn test_errors_bubble_up() {
        assert_fails(
            "function main(): integer false + 2 + 3",
            &[
                "Klein Semantic Error: Function main: Expected left side of PlusExpression to be Integer instead found Boolean",
                "Klein Semantic Error: Function main: Expected left side of PlusExpression to be Integer instead found Error",
                "Klein Semantic Error: Expected function main to return Integer instead found Error",
            ],
        );
    }

    #[test]
    fn test_equality_accepts_any_types() {
        assert_passes("function main(): boolean 1 = true", &[]);
        assert_fails(
            "function main(): boolean missing = 1",
            &[
                "Klein Semantic Error: Function main: Missing identifier missing referenced",
                "Klein Semantic Error: Expected function main to return Boolean instead found Error",
            ],
        );
    }

    #[test]
    fn test_if_condition_must_be_boolean() {
        assert_fails(
            "function main(): integer if 1 then 2 else false",
            &[
                "Klein Semantic Error: Function main: Expected condition of IfExpression to be Boolean instead found Integer",
                "Klein Semantic Error: Expected function main to return Integer instead found Error",
            ],
        );
    }

    #[test]
    fn test_indeterminate_if() {
        assert_fails(
            "function main(): integer if true then 2 else false",
            &["Klein Semantic Error: Expected function main to return Integer instead found {Integer OR Boolean}"],
        );
        assert_passes(
            "function main(): integer
                 print(if true then 1 else false)
                 print(if true then false else 1)
                 1",
            &[],
        );
    }

    #[test]
    fn test_call_errors() {
        assert_fails(
            "function main(): integer nonexistent_fun()",
            &[
                "Klein Semantic Error: Function main: Attempted to call non-existent function nonexistent_fun",
                "Klein Semantic Error: Expected function main to return Integer instead found Error",
            ],
        );
        assert_fails(
            "function main(int_param: integer): integer int_param()",
            &[
                "Klein Semantic Error: Function main: Attempted to call parameter int_param as a function",
                "Klein Semantic Warning: Function main: Unused parameter int_param",
                "Klein Semantic Error: Expected function main to return Integer instead found Error",
            ],
        );
    }

    #[test]
    fn test_function_used_as_identifier() {
        assert_fails(
            "function my_fun(): integer 1
             function main(): integer 1 + my_fun",
            &[
                "Klein Semantic Error: Function main: Attempted to use function my_fun as identifier",
                "Klein Semantic Error: Function main: Expected right side of PlusExpression to be Integer instead found Error",
                "Klein Semantic Error: Expected function main to return Integer instead found Error",
                "Klein Semantic Warning: Unused function my_fun",
            ],
        );
    }

    #[test]
    fn test_wrong_function_arguments() {
        assert_fails(
            "function main(): integer
                 print(bool_typing(1))
                 print(one_param(1, 2))
                 print(three_params(1, 2))
                 1
             function bool_typing(flag: boolean): boolean flag
             function one_param(param: integer): integer param
             function three_params(a: integer, b: integer, c: integer): integer a + b + c",
            &[
                "Klein Semantic Error: Function main: Mismatched argument types passed to bool_typing. Expected (Boolean) and received (Integer)",
                PRINT_MISMATCH,
                "Klein Semantic Error: Function main: Too many arguments passed to one_param. Expected 1 and received 2",
                PRINT_MISMATCH,
                "Klein Semantic Error: Function main: Too few arguments passed to three_params. Expected 3 and received 2",
                PRINT_MISMATCH,
            ],
        );
    }

    #[test]
    fn test_argument_type_mismatch_names_function() {
        assert_fails(
            "function f(x: integer): integer x
             function main(): integer f(true)",
            &["Klein Semantic Error: Function main: Mismatched argument types passed to f. Expected (Integer) and received (Boolean)"],
        );
    }

    #[test]
    fn test_recursion() {
        assert_passes(
            "function recursive_fun(a: integer): integer
                 if a < 1 then a else a + recursive_fun(a - 1)
             function main(a: integer): integer recursive_fun(a)",
            &[],
        );
        assert_fails(
            "function recursive_fun(a: integer): integer
                 if a < 1 then a else a + recursive_fun(if true then a else false)
             function main(a: integer): integer recursive_fun(a)",
            &[
                "Klein Semantic Error: Function recursive_fun: Mismatched argument types passed to recursive_fun. Expected (Integer) and received ({Integer OR Boolean})",
                "Klein Semantic Error: Function recursive_fun: Expected right side of PlusExpression to be Integer instead found Error",
                "Klein Semantic Error: Expected function recursive_fun to return Integer instead found {Integer OR Error}",
            ],
        );
    }

    #[test]
    fn test_call_graph_edges() {
        let (result, issues) = run(
            "function helper(): integer 1
             function main(): integer print(helper()) helper()",
        );
        assert!(issues.is_empty());
        let table = result.unwrap();

        let main = table.lookup("main").unwrap();
        assert!(main.forward_refs.contains("helper"));
        assert!(main.forward_refs.contains("print"));
        let helper = table.lookup("helper").unwrap();
        assert_eq!(helper.backward_refs.iter().collect::<Vec<_>>(), vec!["main"]);

        let names: Vec<&str> = table.iter().map(|symbol| symbol.name.as_str()).collect();
        assert_eq!(names, vec!["print", "helper", "main"]);
    }

    #[test]
    fn test_parameter_shadows_function() {
        assert_fails(
            "function g(): integer 1
             function main(g: integer): integer g + g()",
            &[
                "Klein Semantic Error: Function main: Attempted to call parameter g as a function",
                "Klein Semantic Error: Function main: Expected right side of PlusExpression to be Integer instead found Error",
                "Klein Semantic Error: Expected function main to return Integer instead found Error",
                "Klein Semantic Warning: Unused function g",
            ],
        );
    }
}
