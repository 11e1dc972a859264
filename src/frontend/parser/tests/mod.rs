//! Parser tests module

mod declarations;
mod statements;

use crate::frontend::lexer::scan;
use crate::frontend::parser::{parse, BranchId, Label, ParsedProgram};

pub(super) fn parse_source(source: &str) -> ParsedProgram {
    parse(&scan(source).unwrap(), 10_000).unwrap()
}

/// Wrap statements into a function body
pub(super) fn in_body(statements: &str) -> ParsedProgram {
    parse_source(&format!("function f() {{ {} }}", statements))
}

/// Last allocated branch with `label` (the outermost one for nested labels)
pub(super) fn last(
    parsed: &ParsedProgram,
    label: Label,
) -> BranchId {
    (0..parsed.tree.len())
        .rev()
        .map(|i| BranchId(i as u32))
        .find(|id| parsed.tree.get(*id).label == label)
        .unwrap_or_else(|| panic!("no {:?} branch in\n{}", label, parsed.tree.dump(parsed.program)))
}

pub(super) fn dump_last(
    parsed: &ParsedProgram,
    label: Label,
) -> String {
    parsed.tree.dump(last(parsed, label))
}

pub(super) fn messages(parsed: &ParsedProgram) -> Vec<String> {
    parsed.diagnostics.iter().map(|d| d.message.clone()).collect()
}
