//! Types, members and value-producing expressions

use sylva::compile;
use sylva::util::diagnostic::Level;

#[test]
fn test_struct_with_constructor() {
    let output = compile(
        "struct Point {
             public int x = 0;
             public int y = 0;
             public constructor(int x0, int y0) { x = x0; y = y0; }
             public function Sum() : int { return x + y; }
         }
         function make() : int {
             Point p = new Point(1, 2);
             return p.Sum();
         }",
    );
    assert!(output.diagnostics.is_empty(), "{}", output.render_diagnostics());
    assert!(output.emitted_text.contains("public struct Point"));
    assert!(output.emitted_text.contains("public Point(int x0, int y0)"));
    assert!(output.emitted_text.contains("Point p = new Point(1, 2);"));
    assert!(output.emitted_text.contains("return p.Sum();"));
}

#[test]
fn test_interface_members_have_no_modifiers() {
    let output = compile(
        "interface INamed { function Name() : string; }
         class Tag : INamed { public function Name() : string { return \"tag\"; } }",
    );
    assert!(output.diagnostics.is_empty(), "{}", output.render_diagnostics());
    assert!(output.emitted_text.contains("public interface INamed\n{\n    string Name();\n}"));
    assert!(output.emitted_text.contains("public class Tag : INamed"));
}

#[test]
fn test_list_literal_and_indexing() {
    let output = compile(
        "function first() : int {
             int[] xs = [1, 2, 3];
             return xs[0] + [4, 5][1];
         }",
    );
    assert!(output.diagnostics.is_empty(), "{}", output.render_diagnostics());
    assert!(output.emitted_text.contains("List<int> xs = new List<int> { 1, 2, 3 };"));
    assert!(output.emitted_text.contains("return xs[0] + 5;"));
}

#[test]
fn test_literal_index_out_of_range() {
    let output = compile("function f() : int { return [1, 2][5]; }");
    let errors: Vec<_> = output
        .diagnostics
        .iter()
        .filter(|d| d.level == Level::Error)
        .map(|d| d.message.clone())
        .collect();
    assert_eq!(errors, vec!["index 5 is out of range for length 2"]);
}

#[test]
fn test_conversion_calls_fold() {
    let output = compile(
        "function f() : string {
             int n = int(2.7);
             return string(n + 40);
         }",
    );
    assert!(output.diagnostics.is_empty(), "{}", output.render_diagnostics());
    assert!(output.emitted_text.contains("int n = 2;"));
    assert!(output.emitted_text.contains("return Convert.ToString(n + 40);"));
}

#[test]
fn test_string_concatenation_folds() {
    let output = compile("function f() : string { return \"a\" + 1 + true; }");
    assert!(output.diagnostics.is_empty(), "{}", output.render_diagnostics());
    assert!(output.emitted_text.contains("return \"a1true\";"), "{}", output.emitted_text);
}

#[test]
fn test_static_members_through_type_name() {
    let output = compile(
        "class Counter {
             public static int total = 0;
             public static function Bump() : int { total += 1; return total; }
         }
         function f() : int { return Counter.Bump() + Counter.total; }",
    );
    assert!(output.diagnostics.is_empty(), "{}", output.render_diagnostics());
    assert!(output.emitted_text.contains("public static int total = 0;"));
    assert!(output.emitted_text.contains("return Counter.Bump() + Counter.total;"));
}

#[test]
fn test_tuple_items() {
    let output = compile(
        "function f((int, string) pair) : string { return pair[1]; }",
    );
    assert!(output.diagnostics.is_empty(), "{}", output.render_diagnostics());
    assert!(output.emitted_text.contains("return pair.Item2;"));
}
