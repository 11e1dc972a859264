//! Constant folding tests

use super::*;

#[test]
fn test_return_folds_to_literal() {
    let outcome = resolve_source("function f() : int { return 2 + 3 * 4; }");
    outcome.assert_clean();
    assert!(outcome.text.contains("return 14;"), "{}", outcome.text);
}

#[test]
fn test_integer_division_by_zero() {
    let outcome = resolve_source("function f() : int { return 1 / 0; }");
    assert_eq!(outcome.errors(), vec!["division by integer zero is forbidden"]);
    assert!(outcome.text.contains("return 0;"), "{}", outcome.text);
}

#[test]
fn test_remainder_by_zero() {
    let outcome = in_body("long n = 7L % 0;");
    assert_eq!(outcome.errors(), vec!["division by integer zero is forbidden"]);
}

#[test]
fn test_real_division_by_zero_is_infinite() {
    let outcome = in_body("real y = 5.0 / 0;");
    outcome.assert_clean();
    assert!(outcome.text.contains("double y = double.PositiveInfinity;"), "{}", outcome.text);
}

#[test]
fn test_fold_off_keeps_runtime_text() {
    let config = CompileConfig::new().with_fold_constants(false);
    let outcome = resolve_with(config, "function f() { int x = 2 + 3; }");
    outcome.assert_clean();
    assert!(outcome.text.contains("int x = 2 + 3;"), "{}", outcome.text);
}

#[test]
fn test_literal_ternary_folds() {
    let outcome = in_body("int x = true ? 1 : 2;");
    outcome.assert_clean();
    assert!(outcome.text.contains("int x = 1;"), "{}", outcome.text);
}

#[test]
fn test_string_length_folds() {
    let outcome = in_body("int n = \"abc\".length;");
    outcome.assert_clean();
    assert!(outcome.text.contains("int n = 3;"), "{}", outcome.text);
}

#[test]
fn test_variables_are_not_folded() {
    let outcome = resolve_source("function f(int a) : int { return a + 1; }");
    outcome.assert_clean();
    assert!(outcome.text.contains("return a + 1;"), "{}", outcome.text);
}

#[test]
fn test_narrowing_initialiser_warns() {
    let outcome = resolve_source("function f(long a) { int x = a; }");
    assert_eq!(outcome.warnings(), vec!["narrowing conversion from 'long' to 'int'"]);
    assert!(outcome.text.contains("int x = (int)a;"), "{}", outcome.text);
}

#[test]
fn test_incompatible_initialiser() {
    let outcome = in_body("int x = \"text\";");
    assert_eq!(outcome.errors(), vec!["cannot convert 'string' to 'int'"]);
}

#[test]
fn test_builtin_folds() {
    let outcome = in_body("real r = sqrt(16.0);");
    outcome.assert_clean();
    assert!(outcome.text.contains("double r = 4.0;"), "{}", outcome.text);
}

#[test]
fn test_power_emits_helper() {
    let outcome = resolve_source("function f(real a) : real { return a ** 2.0; }");
    outcome.assert_clean();
    assert!(outcome.text.contains("Runtime.Pow(a, 2.0)"), "{}", outcome.text);
    assert!(outcome.auxiliary.contains("public static class Runtime"));
}
