//! Statement tests

use super::*;

#[test]
fn test_statement_kinds() {
    let parsed = in_body(
        "int y = 3;
         y = 5;
         y += 2;
         y++;
         for (int i = 0; i < 3; i++) { }
         while (true) break;
         if (y > 1) return; else { }",
    );
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let body = last(&parsed, Label::Block);
    let labels: Vec<Label> = parsed
        .tree
        .children(body)
        .iter()
        .map(|id| parsed.tree.get(*id).label)
        .collect();
    assert_eq!(
        labels,
        vec![
            Label::VarDecl,
            Label::Assignment,
            Label::Assignment,
            Label::Step,
            Label::For,
            Label::While,
            Label::If,
        ]
    );
}

#[test]
fn test_for_loop_shape() {
    let parsed = in_body("for (int i = 0; i < 3; i++) { }");
    assert_eq!(
        dump_last(&parsed, Label::For),
        "For
  VarDecl i
    TypeName int
    Literal 0
  Chain(Relational)
    Name i
    Operator <
    Literal 3
  Step ++
    Name i
  Block
"
    );
}

#[test]
fn test_for_loop_with_empty_clauses() {
    let parsed = in_body("for (;;) { break; }");
    assert!(parsed.diagnostics.is_empty());
    let labels: Vec<Label> = parsed
        .tree
        .children(last(&parsed, Label::For))
        .iter()
        .map(|id| parsed.tree.get(*id).label)
        .collect();
    assert_eq!(labels, vec![Label::Empty, Label::Empty, Label::Empty, Label::Block]);
}

#[test]
fn test_nested_blocks_get_fresh_scopes() {
    let parsed = in_body("{ int a; } { int a; }");
    let decls: Vec<BranchId> = (0..parsed.tree.len())
        .map(|i| BranchId(i as u32))
        .filter(|id| parsed.tree.get(*id).label == Label::VarDecl)
        .collect();
    assert_eq!(decls.len(), 2);
    let first = parsed.tree.scope_of(decls[0]);
    let second = parsed.tree.scope_of(decls[1]);
    assert_ne!(first, second);
    assert_eq!(first.parent(), second.parent());
}

#[test]
fn test_failed_statement_recovers_at_semicolon() {
    let parsed = in_body("int x = ; return 1;");
    assert_eq!(parsed.diagnostics.len(), 1);
    assert!(messages(&parsed)[0].contains("expected an expression but found ';'"));
    let body = last(&parsed, Label::Block);
    let children = parsed.tree.children(body);
    assert_eq!(children.len(), 1);
    assert_eq!(parsed.tree.get(children[0]).label, Label::Return);
}

#[test]
fn test_missing_semicolon() {
    let parsed = in_body("x = 1 return 2;");
    assert!(!parsed.diagnostics.is_empty());
    assert!(messages(&parsed)[0].contains("expected ';'"));
}

#[test]
fn test_statement_at_member_level_is_an_error() {
    let parsed = parse_source("x = 1; function f() { }");
    assert_eq!(
        messages(&parsed),
        vec!["statements are not allowed outside of a function body".to_string()]
    );
    let program = parsed.tree.get(parsed.program);
    assert_eq!(program.children.len(), 1);
}
