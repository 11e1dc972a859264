//! Name lookup, overload and purity tests

use super::*;

#[test]
fn test_undefined_name() {
    let outcome = in_body("int x = y;");
    assert_eq!(outcome.errors(), vec!["name 'y' does not exist in the current context"]);
}

#[test]
fn test_shadowing_is_an_error() {
    let outcome = in_body("int x = 1; { int x = 2; }");
    assert_eq!(
        outcome.errors(),
        vec!["a local variable named 'x' is already defined in this scope"]
    );
}

#[test]
fn test_sibling_blocks_may_reuse_names() {
    let outcome = in_body("{ int x = 1; } { int x = 2; }");
    outcome.assert_clean();
}

#[test]
fn test_parameter_shadowing() {
    let outcome = resolve_source("function f(int a) { int a = 2; }");
    assert_eq!(
        outcome.errors(),
        vec!["a local variable named 'a' is already defined in this scope"]
    );
}

#[test]
fn test_forward_reference() {
    let outcome = resolve_source(
        "function a() : int { return b(); }
         function b() : int { return 1; }",
    );
    outcome.assert_clean();
    assert!(outcome.text.contains("return Module.b();"), "{}", outcome.text);
}

#[test]
fn test_exact_overload_wins() {
    let outcome = resolve_source(
        "function f(int x) : int { return x; }
         function f(real x) : real { return x; }
         function g() : int { return f(2); }",
    );
    outcome.assert_clean();
    assert!(outcome.text.contains("return Module.f(2);"), "{}", outcome.text);
}

#[test]
fn test_ambiguous_overload() {
    let outcome = resolve_source(
        "function f(int a, real b) { }
         function f(real a, int b) { }
         function g() { f(1, 2); }",
    );
    assert_eq!(outcome.errors().len(), 1);
    assert!(outcome.errors()[0].starts_with("the call is ambiguous between"));
}

#[test]
fn test_no_overload_takes_arity() {
    let outcome = resolve_source(
        "function f(int a) { }
         function g() { f(1, 2); }",
    );
    assert_eq!(outcome.errors(), vec!["no overload for method 'f' takes 2 arguments"]);
}

#[test]
fn test_multiconst_calling_sibling() {
    let outcome = resolve_source(
        "multiconst function g(int x) : int { return h(x); }
         function h(int x) : int { return x; }",
    );
    assert_eq!(
        outcome.errors(),
        vec!["multiconst function 'g' cannot call non-multiconst function 'h'"]
    );
    assert!(!outcome.text.contains("Module.h("), "{}", outcome.text);
}

#[test]
fn test_multiconst_may_call_builtins() {
    let outcome = resolve_source("multiconst function g(real x) : real { return sqrt(x) + abs(x); }");
    outcome.assert_clean();
}

#[test]
fn test_multiconst_outer_state() {
    let outcome = resolve_source(
        "int counter = 1;
         multiconst function g() : int { return counter; }",
    );
    assert_eq!(
        outcome.errors(),
        vec!["multiconst function 'g' cannot reference outer state 'counter'"]
    );
}

#[test]
fn test_static_context_rejects_instance_property() {
    let outcome = resolve_source(
        "class Counter {
             int count = 0;
             static function Read() : int { return count; }
         }",
    );
    assert_eq!(
        outcome.errors(),
        vec!["an object reference is required for the non-static member 'Counter.count'"]
    );
}

#[test]
fn test_private_property_is_inaccessible() {
    let outcome = resolve_source(
        "class Box { int size = 1; }
         function f(Box b) : int { return b.size; }",
    );
    assert_eq!(
        outcome.errors(),
        vec!["'Box.size' is inaccessible due to its protection level"]
    );
}

#[test]
fn test_this_in_static_function() {
    let outcome = resolve_source(
        "class Box {
             public int size = 1;
             static function f() : int { return this.size; }
         }",
    );
    assert_eq!(outcome.errors().len(), 1);
    assert!(outcome.errors()[0].contains("is not valid in a static member"));
}

#[test]
fn test_var_needs_non_null_initialiser() {
    let outcome = in_body("var a; var b = null;");
    assert_eq!(
        outcome.errors(),
        vec![
            "implicitly-typed variables must be initialized",
            "cannot assign 'null' to an implicitly-typed variable",
        ]
    );
}

#[test]
fn test_var_infers_type() {
    let outcome = in_body("var a = 2.5;");
    outcome.assert_clean();
    assert!(outcome.text.contains("double a = 2.5;"), "{}", outcome.text);
}
