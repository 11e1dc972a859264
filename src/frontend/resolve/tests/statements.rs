//! Statement checking tests

use super::*;

#[test]
fn test_unreachable_code_warns_once() {
    let outcome = resolve_source("function f() : int { return 1; int a = 2; int b = 3; }");
    assert_eq!(outcome.warnings(), vec!["unreachable code detected"]);
}

#[test]
fn test_missing_return() {
    let outcome = resolve_source("function f(bool c) : int { if (c) return 1; }");
    assert_eq!(outcome.errors(), vec!["'f': not all code paths return a value"]);
}

#[test]
fn test_both_branches_return() {
    let outcome = resolve_source("function f(bool c) : int { if (c) return 1; else return 2; }");
    outcome.assert_clean();
}

#[test]
fn test_infinite_loop_needs_no_return() {
    let outcome = resolve_source("function f() : int { while (true) { } }");
    outcome.assert_clean();
}

#[test]
fn test_loop_with_break_can_complete() {
    let outcome = resolve_source("function f() : int { while (true) { break; } }");
    assert_eq!(outcome.errors(), vec!["'f': not all code paths return a value"]);
}

#[test]
fn test_break_outside_loop() {
    let outcome = in_body("break;");
    assert_eq!(
        outcome.errors(),
        vec!["no enclosing loop out of which to break or continue"]
    );
}

#[test]
fn test_condition_must_be_bool() {
    let outcome = in_body("if (1) { }");
    assert_eq!(outcome.errors(), vec!["cannot convert 'int' to 'bool'"]);
}

#[test]
fn test_void_function_returning_value() {
    let outcome = in_body("return 1;");
    assert_eq!(
        outcome.errors(),
        vec!["since 'f' returns void, a return keyword must not be followed by an object expression"]
    );
}

#[test]
fn test_return_without_value() {
    let outcome = resolve_source("function f() : int { return; }");
    assert_eq!(
        outcome.errors(),
        vec!["an object of a type convertible to 'int' is required"]
    );
}

#[test]
fn test_assignment_needs_place() {
    let outcome = resolve_source("function f(int a) { 1 = a; }");
    assert_eq!(
        outcome.errors(),
        vec!["the left-hand side of an assignment must be a variable, property or indexer"]
    );
}

#[test]
fn test_compound_assignment_and_steps() {
    let outcome = resolve_source("function f(int a) { a += 2; a++; a--; }");
    outcome.assert_clean();
    assert!(outcome.text.contains("a += 2;"), "{}", outcome.text);
    assert!(outcome.text.contains("a++;"), "{}", outcome.text);
    assert!(outcome.text.contains("a--;"), "{}", outcome.text);
}

#[test]
fn test_step_needs_numeric() {
    let outcome = resolve_source("function f(string s) { s++; }");
    assert_eq!(
        outcome.errors(),
        vec!["operator '++' cannot be applied to operand of type 'string'"]
    );
}

#[test]
fn test_expression_statement_must_act() {
    let outcome = resolve_source("function f(int a) { a + 1; }");
    assert_eq!(
        outcome.errors(),
        vec!["only assignment, call, increment, decrement and new object expressions can be used as a statement"]
    );
}

#[test]
fn test_for_loop_emission() {
    let outcome = in_body("for (int i = 0; i < 3; i++) { }");
    outcome.assert_clean();
    assert!(outcome.text.contains("for (int i = 0; i < 3; i++)"), "{}", outcome.text);
}

#[test]
fn test_for_variable_is_scoped_to_loop() {
    let outcome = in_body("for (int i = 0; i < 3; i++) { } int i = 4;");
    outcome.assert_clean();
}
