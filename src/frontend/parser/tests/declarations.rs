//! Declaration tests

use super::*;
use crate::frontend::parser::Annotation;

fn labels(
    parsed: &ParsedProgram,
    id: BranchId,
) -> Vec<Label> {
    parsed
        .tree
        .children(id)
        .iter()
        .map(|c| parsed.tree.get(*c).label)
        .collect()
}

const GEOMETRY: &str = "
namespace Geo {
    public class Point : Shape {
        private int x = 1;
        constructor(int x) : base(x) { }
        public function Len(int a, params int[] rest) : real { return 0.0; }
    }
    class Shape {
        constructor(int seed) { }
    }
}";

#[test]
fn test_namespace_and_class_members() {
    let parsed = parse_source(GEOMETRY);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);

    let namespace = last(&parsed, Label::Namespace);
    assert_eq!(parsed.tree.get(namespace).text, "Geo");
    assert_eq!(labels(&parsed, namespace), vec![Label::Class, Label::Class]);

    let point = parsed.tree.children(namespace)[0];
    assert_eq!(parsed.tree.get(point).text, "Point");
    assert_eq!(
        labels(&parsed, point),
        vec![
            Label::Modifiers,
            Label::TypeName,
            Label::Property,
            Label::Constructor,
            Label::Function
        ]
    );
    let children = parsed.tree.children(point);
    assert_eq!(parsed.tree.get(children[0]).text, "public");
    assert_eq!(parsed.tree.get(children[1]).text, "Shape");
    assert_eq!(parsed.tree.scope_of(point).to_string(), "Geo.Point");
}

#[test]
fn test_constructor_with_base_call() {
    let parsed = parse_source(GEOMETRY);
    let point = parsed.tree.children(last(&parsed, Label::Namespace))[0];
    let constructor = parsed.tree.children(point)[3];
    assert_eq!(
        parsed.tree.dump(constructor),
        "Constructor Point
  Modifiers
  Parameters
    Parameter x
      TypeName int
  BaseCall base
    Name x
  Block
"
    );
}

#[test]
fn test_function_header_parts() {
    let parsed = parse_source(GEOMETRY);
    let point = parsed.tree.children(last(&parsed, Label::Namespace))[0];
    let len = parsed.tree.children(point)[4];
    assert_eq!(parsed.tree.get(len).text, "Len");
    let parts = parsed.tree.children(len);
    assert_eq!(parsed.tree.get(parts[2]).text, "real");
    assert_eq!(parsed.tree.get(parts[3]).label, Label::Block);

    let params = parsed.tree.children(parts[1]);
    assert_eq!(params.len(), 2);
    let rest = parsed.tree.get(params[1]);
    assert_eq!(rest.text, "rest");
    assert_eq!(
        rest.annotation,
        Annotation::ParameterFlags {
            optional: false,
            variadic: true
        }
    );
    let list = parsed.tree.get(rest.children[0]);
    assert_eq!(list.label, Label::ListOf);
    assert_eq!(parsed.tree.get(list.children[0]).text, "int");
}

#[test]
fn test_optional_parameter() {
    let parsed = parse_source("function f(int a, int b = 2 + 3) { }");
    let params = parsed.tree.children(last(&parsed, Label::Parameters));
    let b = parsed.tree.get(params[1]);
    assert_eq!(
        b.annotation,
        Annotation::ParameterFlags {
            optional: true,
            variadic: false
        }
    );
    assert_eq!(b.children.len(), 2);
}

#[test]
fn test_bodiless_interface_function() {
    let parsed = parse_source("interface IShape { function Area() : real; }");
    assert!(parsed.diagnostics.is_empty());
    let interface = last(&parsed, Label::Interface);
    assert_eq!(
        parsed.tree.dump(interface),
        "Interface IShape
  Modifiers
  Empty
  Function Area
    Modifiers
    Parameters
    TypeName real
    Empty
"
    );
}

#[test]
fn test_void_return_is_implicit() {
    let parsed = parse_source("function f() { }");
    let function = last(&parsed, Label::Function);
    let returns = parsed.tree.children(function)[2];
    assert_eq!(parsed.tree.get(returns).text, "void");
}

#[test]
fn test_property_forms() {
    let parsed = parse_source("class A { public static int[] xs; (int, real) pair = (1, 2.0); }");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let class = last(&parsed, Label::Class);
    let children = parsed.tree.children(class);
    let xs = parsed.tree.get(children[2]);
    assert_eq!(xs.text, "xs");
    assert_eq!(parsed.tree.get(xs.children[0]).text, "public static");
    let pair = parsed.tree.get(children[3]);
    assert_eq!(pair.children.len(), 3);
    assert_eq!(parsed.tree.get(pair.children[1]).text, "tuple");
}

#[test]
fn test_type_suffixes_in_locals() {
    let parsed = in_body("int[3] a; Geo.Point p; var v = 1;");
    assert!(parsed.diagnostics.is_empty());
    let decls: Vec<BranchId> = (0..parsed.tree.len())
        .map(|i| BranchId(i as u32))
        .filter(|id| parsed.tree.get(*id).label == Label::VarDecl)
        .collect();
    let type_of = |decl: BranchId| parsed.tree.get(parsed.tree.children(decl)[0]);
    assert_eq!(type_of(decls[0]).label, Label::ListOf);
    assert_eq!(type_of(decls[0]).text, "3");
    assert_eq!(type_of(decls[1]).text, "Geo.Point");
    assert_eq!(type_of(decls[2]).text, "var");
}

#[test]
fn test_trailing_comma_in_parameters() {
    let parsed = parse_source("function f(int a,) { }");
    assert!(messages(&parsed)
        .iter()
        .any(|m| m.contains("expected a parameter after ','")));
}

#[test]
fn test_empty_program() {
    let parsed = parse_source("");
    assert!(parsed.tree.get(parsed.program).children.is_empty());
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn test_parameter_list() {
    let parsed = parse_source("function f(int a, real b) { }");
    assert!(parsed.diagnostics.is_empty(), "{:?}", messages(&parsed));
    let parameters = last(&parsed, Label::Parameters);
    assert_eq!(labels(&parsed, parameters), vec![Label::Parameter, Label::Parameter]);
    let names: Vec<&str> = parsed
        .tree
        .children(parameters)
        .iter()
        .map(|p| parsed.tree.get(*p).text.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_single_parameter() {
    let parsed = parse_source("function f(int x) : int { return x; }");
    assert!(parsed.diagnostics.is_empty(), "{:?}", messages(&parsed));
    assert_eq!(parsed.tree.children(last(&parsed, Label::Parameters)).len(), 1);
}
