//! Stack-machine parser
//!
//! Consumes the lexemes plus the pre-scanned block table and builds the
//! syntax tree arena: one branch per declaration, owned by its container,
//! under an aggregate program branch.
//!
//! Parsing runs in two phases. Headers first (parameter lists, return and
//! base types, base-constructor calls) so declarations can be registered;
//! then member lists and bodies, where call sites are narrowed against the
//! registered functions. Forward references therefore work in any order.

mod declarations;
mod expressions;
pub mod extra;
mod machine;
mod statements;
pub mod tree;
mod types;

#[cfg(test)]
mod tests;

pub use extra::Extra;
pub use machine::Outcome;
pub use tree::{Annotation, Branch, BranchId, Label, Level, ScopeId, SyntaxTree};

use std::collections::HashMap;
use tracing::debug;

use crate::frontend::lexer::Lexeme;
use crate::frontend::prescan::BlockTable;
use crate::frontend::symbols::scope::BlockKind;
use crate::frontend::symbols::SymbolTables;
use crate::util::diagnostic::{Diagnostic, Wreck};
use declarations::MembersState;
use expressions::ArgsState;
use machine::Task;
use types::TypeNameState;

/// Branches parsed from a declaration header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderParts {
    /// `Parameters` branch of a function or constructor
    pub params: Option<BranchId>,
    /// Base type, return type or `BaseCall`
    pub annotation: Option<BranchId>,
}

/// Parser over one lexeme stream
pub struct Parser<'a> {
    lexemes: &'a [Lexeme],
    table: &'a BlockTable,
    symbols: Option<&'a SymbolTables>,
    tree: &'a mut SyntaxTree,
    pos: usize,
    max_depth: usize,
    headers: Vec<HeaderParts>,
    /// Next anonymous-block generation per parent scope
    unnamed: HashMap<ScopeId, u32>,
}

impl<'a> Parser<'a> {
    pub fn new(
        lexemes: &'a [Lexeme],
        table: &'a BlockTable,
        tree: &'a mut SyntaxTree,
        max_depth: usize,
    ) -> Self {
        Self {
            lexemes,
            table,
            symbols: None,
            tree,
            pos: 0,
            max_depth: max_depth.max(1),
            headers: Vec::new(),
            unnamed: HashMap::new(),
        }
    }

    /// Enable call-site narrowing against registered declarations
    pub fn with_symbols(
        mut self,
        symbols: &'a SymbolTables,
    ) -> Self {
        self.symbols = Some(symbols);
        self
    }

    /// Phase one: parse every entry's header parts
    pub fn parse_headers(&mut self) -> Result<(Vec<HeaderParts>, Vec<Diagnostic>), Wreck> {
        let mut headers = Vec::with_capacity(self.table.len());
        let mut diagnostics = Vec::new();
        let table = self.table;

        for entry in table.iter() {
            let scope = self.tree.intern(entry.scope.clone());
            let mut parts = HeaderParts::default();

            if let Some((open, close)) = entry.params {
                self.pos = open + 1;
                let task = Task::Parameters(declarations::ParametersState::default());
                parts.params = self.run_collect(task, close, scope, &mut diagnostics)?;
            }

            if let Some((start, end)) = entry.annotation {
                self.pos = start;
                if start >= end {
                    diagnostics.push(Diagnostic::error(
                        self.span_at(start.saturating_sub(1)),
                        "expected a type after ':'",
                    ));
                } else if entry.kind == BlockKind::Constructor {
                    if self.lexemes[start].is_keyword("base") {
                        self.pos = start + 1;
                        let task = Task::Arguments(ArgsState::new(Label::BaseCall, "base"));
                        parts.annotation = self.run_collect(task, end, scope, &mut diagnostics)?;
                    } else {
                        diagnostics.push(Diagnostic::error(
                            self.span_at(start),
                            "expected 'base(...)' after ':' in a constructor header",
                        ));
                    }
                } else {
                    let task = Task::TypeName(TypeNameState::default());
                    parts.annotation = self.run_collect(task, end, scope, &mut diagnostics)?;
                }
                if parts.annotation.is_some() && self.pos < end {
                    diagnostics.push(Diagnostic::error(
                        self.span_at(self.pos),
                        format!("unexpected '{}' in declaration header", self.lexemes[self.pos].text),
                    ));
                }
            }
            headers.push(parts);
        }
        debug!("parsed {} declaration headers", headers.len());
        Ok((headers, diagnostics))
    }

    /// Phase two: parse the whole program, jumping into declarations through
    /// the block table
    pub fn parse_program(
        &mut self,
        headers: Vec<HeaderParts>,
    ) -> Result<(BranchId, Vec<Diagnostic>), Wreck> {
        self.headers = headers;
        self.pos = 0;
        let root = self.tree.intern(Default::default());
        let mut diagnostics = Vec::new();
        let end = self.lexemes.len();
        let program = self.run_collect(Task::Members(MembersState::program()), end, root, &mut diagnostics)?;
        let program = match program {
            Some(id) => id,
            None => return Err(Wreck::internal("program member list failed")),
        };
        self.tree.program = Some(program);
        debug!(
            "parsed program: {} branches, {} diagnostics",
            self.tree.len(),
            diagnostics.len()
        );
        Ok((program, diagnostics))
    }

    fn run_collect(
        &mut self,
        task: Task,
        end: usize,
        scope: ScopeId,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Option<BranchId>, Wreck> {
        let (outcome, kept) = self.run(task, end, scope)?;
        diagnostics.extend(kept);
        Ok(match outcome {
            Outcome::Success(id) => Some(id),
            Outcome::Failure(reason) => {
                diagnostics.extend(reason);
                None
            }
        })
    }
}

/// Parse result without declaration registration
#[derive(Debug)]
pub struct ParsedProgram {
    pub tree: SyntaxTree,
    pub table: BlockTable,
    pub headers: Vec<HeaderParts>,
    pub program: BranchId,
    pub diagnostics: Vec<Diagnostic>,
}

/// Pre-scan and parse a lexeme slice in one go (no call-site narrowing)
pub fn parse(
    lexemes: &[Lexeme],
    max_depth: usize,
) -> Result<ParsedProgram, Wreck> {
    let table = crate::frontend::prescan::prescan(lexemes)?;
    let mut tree = SyntaxTree::new();
    let (headers, mut diagnostics, program) = {
        let mut parser = Parser::new(lexemes, &table, &mut tree, max_depth);
        let (headers, mut diagnostics) = parser.parse_headers()?;
        let (program, more) = parser.parse_program(headers.clone())?;
        diagnostics.extend(more);
        (headers, diagnostics, program)
    };
    diagnostics.sort_by_key(|d| (d.line, d.position));
    Ok(ParsedProgram {
        tree,
        table,
        headers,
        program,
        diagnostics,
    })
}
