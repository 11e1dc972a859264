//! End-to-end scenarios
//!
//! Small programs compiled through the public entry point, checked against
//! their emitted text and diagnostics.

use sylva::util::diagnostic::Level;
use sylva::{compile, CompilationOutput};

fn errors(output: &CompilationOutput) -> Vec<&str> {
    output
        .diagnostics
        .iter()
        .filter(|d| d.level == Level::Error)
        .map(|d| d.message.as_str())
        .collect()
}

#[test]
fn test_arithmetic_folds_to_literal() {
    let output = compile("function f() : int { return 2 + 3 * 4; }");
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    assert!(output.emitted_text.contains("return 14;"));
}

#[test]
fn test_integer_zero_division() {
    let output = compile("function f() : int { return 1 / 0; }");
    assert_eq!(errors(&output), vec!["division by integer zero is forbidden"]);
    assert_eq!(output.diagnostics.len(), 1);
    // 占位符是返回类型的默认值
    assert!(output.emitted_text.contains("return 0;"));
}

#[test]
fn test_real_zero_division_is_not_an_error() {
    let output = compile("function f() : real { return 5.0 / 0; }");
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    assert!(output.emitted_text.contains("return double.PositiveInfinity;"));
}

#[test]
fn test_overload_prefers_exact_match() {
    let output = compile(
        "function f(int x) : int { return x; }
         function f(real x) : real { return x; }
         function g() : int { return f(2); }",
    );
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    assert!(output.emitted_text.contains("return Module.f(2);"));
}

#[test]
fn test_multiconst_purity() {
    let output = compile(
        "multiconst function g(int x) : int { return h(x) + 1; }
         function h(int x) : int { return x * 2; }",
    );
    assert_eq!(
        errors(&output),
        vec!["multiconst function 'g' cannot call non-multiconst function 'h'"]
    );
    assert!(!output.emitted_text.contains("Module.h("));
}

#[test]
fn test_diagnostic_rendering() {
    let output = compile("function f() : int {\n    return 1 / 0;\n}");
    let rendered = output.render_diagnostics();
    assert!(
        rendered.starts_with("Error in line 2 at position "),
        "{}",
        rendered
    );
    assert!(rendered.trim_end().ends_with(": division by integer zero is forbidden"));
}

#[test]
fn test_shadowing_is_reported() {
    let output = compile("function f() { int x = 1; if (true) { int x = 2; } }");
    assert_eq!(
        errors(&output),
        vec!["a local variable named 'x' is already defined in this scope"]
    );
}

#[test]
fn test_forward_reference_across_namespaces() {
    let output = compile(
        "namespace A { function f() : int { return B.g(); } }
         namespace B { function g() : int { return 7; } }",
    );
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    assert!(output.emitted_text.contains("return B.Module.g();"));
}
