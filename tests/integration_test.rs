// Integration tests for the full compilation pipeline

use kleinc::config::Config;
use kleinc::errors::{CompileError, Stage};
use kleinc::parser::printer;
use kleinc::semantic::Severity;
use kleinc::{analyze, compile, parse, tokenize};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_token_listing() {
    init();
    let tokens: Vec<String> = tokenize("function main(): integer 1")
        .expect("Scanning failed")
        .iter()
        .map(|token| token.to_string())
        .collect();

    assert_eq!(
        tokens,
        vec![
            "KEYWORD_FUNCTION",
            "IDENTIFIER:main",
            "LEFT_PAREN",
            "RIGHT_PAREN",
            "COLON",
            "KEYWORD_INTEGER",
            "INTEGER:1",
            "END_OF_FILE",
        ]
    );
}

#[test]
fn test_literal_program_compiles() {
    init();
    let compilation = compile("function main(): integer 5", &Config::default())
        .expect("Compilation failed");

    assert!(compilation.issues.is_empty());
    assert_eq!(compilation.listing.instruction_count(), 34);
    let main = compilation
        .symbol_table
        .lookup("main")
        .expect("main should be bound");
    assert!(main.is_function());
    assert_eq!(main.ty.to_string(), "() -> Integer");

    let rendered = compilation.listing.to_string();
    assert!(rendered.contains("LDC  4,5(0)"));
    assert!(rendered.contains("OUT  4,0,0"));
}

#[test]
fn test_precedence_in_text_listing() {
    init();
    let program = parse("function main(): integer 1 + 2 * 3").expect("Parsing failed");

    assert_eq!(
        printer::to_text(&program),
        "Program\n\
         \x20 Definition\n\
         \x20   name main\n\
         \x20   parameters\n\
         \x20   returns Integer\n\
         \x20   body\n\
         \x20     PlusExpression\n\
         \x20       left_side IntegerLiteral 1\n\
         \x20       right_side\n\
         \x20         TimesExpression\n\
         \x20           left_side IntegerLiteral 2\n\
         \x20           right_side IntegerLiteral 3\n"
    );
}

#[test]
fn test_dot_listing_is_a_digraph() {
    init();
    let program = parse("function main(): boolean true").expect("Parsing failed");
    let dot = printer::to_dot(&program);

    assert!(dot.starts_with("digraph ast {\n"));
    assert!(dot.trim_end().ends_with('}'));
    assert!(dot.contains("BooleanLiteral"));
}

#[test]
fn test_analysis_keeps_warnings() {
    init();
    let source = "
        function helper(x: integer): integer 2
        function main(): integer 1
    ";

    let analysis = analyze(source, &Config::default()).expect("Analysis failed");
    let rendered: Vec<String> = analysis.issues.iter().map(|i| i.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "Klein Semantic Warning: Function helper: Unused parameter x",
            "Klein Semantic Warning: Unused function helper",
        ]
    );

    let quiet = analyze(source, &Config::default().with_warnings(false)).expect("Analysis failed");
    assert!(quiet.issues.is_empty());
}

#[test]
fn test_symbol_table_dump() {
    init();
    let analysis = analyze("function main(): integer 1", &Config::default()).expect("Analysis failed");

    assert_eq!(
        analysis.symbol_table.to_string(),
        "Symbol print\n\
         \x20 kind: Global\n\
         \x20 type: ({Integer OR Boolean}) -> None\n\
         \x20 parameters: value: {Integer OR Boolean}\n\
         \x20 forward references: none\n\
         \x20 backward references: none\n\
         \n\
         Symbol main\n\
         \x20 kind: Global\n\
         \x20 type: () -> Integer\n\
         \x20 parameters: none\n\
         \x20 forward references: none\n\
         \x20 backward references: none\n"
    );
}

#[test]
fn test_lexical_error_rendering() {
    init();
    let source = "function main(): integer\n  1 $";
    let err = compile(source, &Config::default()).unwrap_err();

    assert_eq!(err.stage(), Stage::Lexical);
    assert_eq!(
        err.render(source, &Config::default().with_wrap_width(120)),
        "Klein Lexical Error at Line 2 Position 4: Illegal character \"$\" when looking for next token.\n\
         2|  1 $\n\
         \x20     ^"
    );
}

#[test]
fn test_parse_error_rendering() {
    init();
    let source = "function main(): integer";
    let err = compile(source, &Config::default()).unwrap_err();

    assert!(matches!(err, CompileError::Parse(_)));
    let rendered = err.render(source, &Config::default().with_wrap_width(200));
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(
        lines[0],
        "Klein Parse Error at Line 1 Position 24: Invalid transition from BODY to END_OF_FILE."
    );
    assert!(lines[1].starts_with("Expected one of the following options: "));
    assert_eq!(lines[2], "1|function main(): integer");
    assert_eq!(lines[3], format!("{}^", " ".repeat(26)));
}

#[test]
fn test_semantic_failure_reports_every_issue() {
    init();
    let source = "function main(): integer true";
    let err = compile(source, &Config::default()).unwrap_err();

    match &err {
        CompileError::Semantic { error, issues } => {
            assert_eq!(error.count, 1);
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].severity, Severity::Error);
        }
        other => panic!("expected a semantic failure, got {:?}", other),
    }
    assert_eq!(
        err.render(source, &Config::default().with_wrap_width(120)),
        "Klein Semantic Error: Expected function main to return Integer instead found Boolean\n\
         Klein Semantic Error: Semantic analysis failed with 1 error(s)"
    );
}

#[test]
fn test_unsupported_expression_fails_fast() {
    init();
    let err = compile("function main(): integer 1 - 1", &Config::default()).unwrap_err();

    assert_eq!(err.stage(), Stage::CodeGeneration);
    assert_eq!(
        err.to_string(),
        "Klein Code Generation Error: Generating code for expression of type MinusExpression is not yet implemented"
    );
}
