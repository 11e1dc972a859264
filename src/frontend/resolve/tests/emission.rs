//! Host text emission tests

use super::*;

#[test]
fn test_free_functions_go_into_host_module() {
    let outcome = resolve_source("function f() : int { return 1; }");
    outcome.assert_clean();
    assert_eq!(
        outcome.text,
        "public static partial class Module\n{\n    public static int f()\n    {\n        return 1;\n    }\n}"
    );
    assert!(outcome.auxiliary.is_empty());
}

#[test]
fn test_host_module_is_configurable() {
    let config = CompileConfig::new().with_host_module("Program").with_indent_width(2);
    let outcome = resolve_with(config, "int answer = 42;");
    outcome.assert_clean();
    assert_eq!(
        outcome.text,
        "public static partial class Program\n{\n  public static int answer = 42;\n}"
    );
}

#[test]
fn test_namespace_wraps_members() {
    let outcome = resolve_source("namespace Geo { class Point { public real x = 0.0; } }");
    outcome.assert_clean();
    assert!(outcome.text.starts_with("namespace Geo\n{"), "{}", outcome.text);
    assert!(outcome.text.contains("public class Point"), "{}", outcome.text);
    assert!(outcome.text.contains("public double x = 0.0;"), "{}", outcome.text);
}

#[test]
fn test_namespace_property_is_qualified() {
    let outcome = resolve_source(
        "namespace Config {
             int limit = 3;
             function Twice() : int { return limit * 2; }
         }",
    );
    outcome.assert_clean();
    assert!(outcome.text.contains("return Config.Module.limit * 2;"), "{}", outcome.text);
}

#[test]
fn test_string_repeat_helper() {
    let outcome = resolve_source("function f(string s) : string { return s * 3; }");
    outcome.assert_clean();
    assert!(outcome.text.contains("Runtime.Repeat(s, 3)"), "{}", outcome.text);
    assert!(outcome.auxiliary.contains("public static string Repeat(string s, long n)"));
}

#[test]
fn test_params_arguments_are_packed() {
    let outcome = resolve_source(
        "function sum(params int[] xs) : int { return 0; }
         function g() : int { return sum(1, 2, 3); }",
    );
    outcome.assert_clean();
    assert!(
        outcome.text.contains("Module.sum(new List<int> { 1, 2, 3 })"),
        "{}",
        outcome.text
    );
}

#[test]
fn test_resolution_is_repeatable() {
    let source = "class A { public virtual function f(int x) : int { return x + 2 * 3; } }";
    let lexemes = scan(source).unwrap();
    let mut ctx = CompilationContext::new(CompileConfig::new());
    ctx.analyse(&lexemes).unwrap();
    let first = resolve(&mut ctx).unwrap();
    let second = resolve(&mut ctx).unwrap();
    assert_eq!(first.emitted_text, second.emitted_text);
    assert_eq!(first.diagnostics, second.diagnostics);
    assert!(first.emitted_text.contains("return x + 6;"), "{}", first.emitted_text);
}

#[test]
fn test_constructor_is_emitted() {
    let outcome = resolve_source("class A { public int v; public constructor(int x) { v = x; } }");
    outcome.assert_clean();
    assert!(outcome.text.contains("public A(int x)"), "{}", outcome.text);
    assert!(outcome.text.contains("v = x;"), "{}", outcome.text);
}

#[test]
fn test_constructor_with_base_call_is_emitted() {
    let outcome = resolve_source(
        "class A { public constructor(int x) { } }
         class B : A { public constructor() : base(3) { } }",
    );
    outcome.assert_clean();
    assert!(outcome.text.contains("public B() : base(3)"), "{}", outcome.text);
}

#[test]
fn test_type_members_keep_source_order() {
    let outcome = resolve_source(
        "class Outer {
            public int first;
            public class Inner { }
            public function last() : int { return 1; }
        }",
    );
    outcome.assert_clean();
    let first = outcome.text.find("int first").expect("property emitted");
    let inner = outcome.text.find("class Inner").expect("nested type emitted");
    let last = outcome.text.find("int last()").expect("function emitted");
    assert!(first < inner && inner < last, "{}", outcome.text);
}
