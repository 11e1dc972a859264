//! Inheritance and member declaration tests

use super::*;

#[test]
fn test_sealed_base() {
    let outcome = resolve_source("sealed class A { } class B : A { }");
    assert_eq!(outcome.errors(), vec!["'B': cannot derive from sealed type 'A'"]);
}

#[test]
fn test_struct_base() {
    let outcome = resolve_source("struct S { } class C : S { }");
    assert_eq!(outcome.errors(), vec!["'C': cannot derive from struct type 'S'"]);
}

#[test]
fn test_circular_bases() {
    let outcome = resolve_source("class A : B { } class B : A { }");
    assert_eq!(outcome.errors().len(), 2);
    assert!(outcome.errors().iter().all(|m| m.starts_with("circular base type dependency")));
}

#[test]
fn test_override_needs_virtual_base() {
    let outcome = resolve_source(
        "class A { public function f() { } }
         class B : A { public override function f() { } }",
    );
    assert_eq!(
        outcome.errors(),
        vec!["'B.f': cannot override inherited member 'A.f' because it is not marked virtual, abstract, or override"]
    );
}

#[test]
fn test_override_without_base() {
    let outcome = resolve_source("class A { public override function f() { } }");
    assert_eq!(outcome.errors(), vec!["'A.f': no suitable method found to override"]);
}

#[test]
fn test_valid_override_emits_modifiers() {
    let outcome = resolve_source(
        "class A { public virtual function f() : int { return 1; } }
         class B : A { public override function f() : int { return 2; } }",
    );
    outcome.assert_clean();
    assert!(outcome.text.contains("public virtual int f()"), "{}", outcome.text);
    assert!(outcome.text.contains("public override int f()"), "{}", outcome.text);
    assert!(outcome.text.contains("public class B : A"), "{}", outcome.text);
}

#[test]
fn test_hiding_warns() {
    let outcome = resolve_source(
        "class A { public function f() { } }
         class B : A { public function f() { } }",
    );
    assert_eq!(outcome.warnings().len(), 1);
    assert!(outcome.warnings()[0].starts_with("'B.f' hides inherited member 'A.f'"));
}

#[test]
fn test_new_suppresses_hiding_warning() {
    let outcome = resolve_source(
        "class A { public function f() { } }
         class B : A { public new function f() { } }",
    );
    outcome.assert_clean();
}

#[test]
fn test_abstract_member_rules() {
    let outcome = resolve_source("class A { public abstract function f(); }");
    assert_eq!(
        outcome.errors(),
        vec!["'A.f' is abstract but it is contained in non-abstract type 'A'"]
    );
}

#[test]
fn test_unimplemented_abstract_member() {
    let outcome = resolve_source(
        "abstract class Shape { public abstract function Area() : real; }
         class Square : Shape { }",
    );
    assert_eq!(
        outcome.errors(),
        vec!["'Square' does not implement inherited abstract member 'Shape.Area()'"]
    );
}

#[test]
fn test_interface_implementation() {
    let outcome = resolve_source(
        "interface IShape { function Area() : real; }
         class Unit : IShape { public function Area() : real { return 1.0; } }
         class Broken : IShape { }",
    );
    assert_eq!(
        outcome.errors(),
        vec!["'Broken' does not implement interface member 'IShape.Area()'"]
    );
}

#[test]
fn test_duplicate_signature() {
    let outcome = resolve_source(
        "function f(int a) { }
         function f(int b) { }",
    );
    assert_eq!(
        outcome.errors(),
        vec!["'<global>' already defines a member called 'f' with the same parameter types"]
    );
}

#[test]
fn test_abstract_class_cannot_be_instantiated() {
    let outcome = resolve_source(
        "abstract class Shape { }
         function f() { Shape s = new Shape(); }",
    );
    assert_eq!(
        outcome.errors(),
        vec!["cannot create an instance of the abstract type or interface 'Shape'"]
    );
}

#[test]
fn test_base_constructor_call() {
    let outcome = resolve_source(
        "class A { public constructor(int x) { } }
         class B : A { public constructor() : base(3) { } }",
    );
    outcome.assert_clean();
    assert!(outcome.text.contains("public B() : base(3)"), "{}", outcome.text);
}

#[test]
fn test_missing_parameterless_base_constructor() {
    let outcome = resolve_source(
        "class A { public constructor(int x) { } }
         class B : A { public constructor() { } }",
    );
    assert_eq!(
        outcome.errors(),
        vec!["'A' does not contain a constructor that takes 0 arguments"]
    );
}
