use kleinc::config::Config;
use kleinc::errors::CompileError;
use kleinc::{analyze, compile};
use std::fs;
use std::path::Path;

fn read_demo(name: &str) -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = Path::new("demos").join(name);
    fs::read_to_string(path).expect("Failed to read demo program")
}

#[test]
fn test_print_and_return() {
    let source = read_demo("print_and_return.kln");
    let compilation = compile(&source, &Config::default()).expect("Compilation failed");
    let code: Vec<String> = compilation
        .listing
        .instructions()
        .map(|instruction| instruction.to_string())
        .collect();

    // prologue 0..11, print 12..22, main 23..53
    assert_eq!(code.len(), 54);
    assert_eq!(code[9], "LDC 7,23(0)");
    assert_eq!(code[26], "LDC 1,1(0)");
    assert_eq!(code[35], "LDC 7,12(0)");
    assert_eq!(code[36], "LDC 1,2(0)");
    assert_eq!(code[45], "LDC 7,12(0)");
    assert_eq!(code[46], "LDC 4,3(0)");
    assert_eq!(code[47], "ST 4,-1(5)");
    assert_eq!(code[53], "LD 7,1(6)");

    let print = compilation
        .symbol_table
        .lookup("print")
        .expect("print should be bound");
    assert!(print.backward_refs.contains("main"));
}

#[test]
fn test_circle_analyzes_cleanly() {
    let source = read_demo("circle.kln");
    let analysis = analyze(&source, &Config::default()).expect("Analysis failed");
    assert!(analysis.issues.is_empty());

    let inside = analysis
        .symbol_table
        .lookup("inside")
        .expect("inside should be bound");
    assert_eq!(inside.ty.to_string(), "(Integer, Integer, Integer) -> Boolean");
    assert!(inside.forward_refs.contains("square"));
    assert!(inside.backward_refs.contains("main"));
}

#[test]
fn test_circle_needs_more_than_literals() {
    let source = read_demo("circle.kln");
    let err = compile(&source, &Config::default()).unwrap_err();

    // square comes first and multiplies
    assert!(matches!(
        err,
        CompileError::CodeGeneration(ref inner) if inner.message().contains("TimesExpression")
    ));
}

#[test]
fn test_type_errors_are_all_reported() {
    let source = read_demo("type_errors.kln");
    let err = analyze(&source, &Config::default()).unwrap_err();

    let issues = match &err {
        CompileError::Semantic { error, issues } => {
            assert_eq!(error.count, 6);
            issues
        }
        other => panic!("expected a semantic failure, got {:?}", other),
    };
    let rendered: Vec<String> = issues.iter().map(|issue| issue.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "Klein Semantic Warning: Function twice: Unused parameter unused",
            "Klein Semantic Error: Function broken: Expected left side of PlusExpression to be Integer instead found Boolean",
            "Klein Semantic Error: Expected function broken to return Integer instead found Error",
            "Klein Semantic Error: Function main: Too few arguments passed to twice. Expected 2 and received 1",
            "Klein Semantic Error: Function main: Mismatched argument types passed to print. Expected ({Integer OR Boolean}) and received (Error)",
            "Klein Semantic Error: Function main: Attempted to call non-existent function missing",
            "Klein Semantic Error: Expected function main to return Boolean instead found Error",
            "Klein Semantic Warning: Unused function broken",
        ]
    );

    let report = err.render(&source, &Config::default().with_warnings(false));
    assert!(!report.contains("Warning"));
    assert!(report.ends_with("Klein Semantic Error: Semantic analysis failed with 6 error(s)"));
}
