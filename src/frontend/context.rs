//! 编译上下文
//!
//! Everything one compilation owns: configuration, the block table, the
//! syntax tree arena, the symbol tables, declared types and the diagnostics
//! gathered so far. Every compilation builds a fresh context, so nothing
//! survives into the next one and independent compilations never share state.

use std::collections::HashMap;
use tracing::debug;

use super::config::CompileConfig;
use super::lexer::Lexeme;
use super::parser::{BranchId, HeaderParts, Parser, SyntaxTree};
use super::prescan::{prescan, BlockTable};
use super::resolve::declare;
use super::symbols::types::TypeDescriptor;
use super::symbols::SymbolTables;
use crate::util::diagnostic::{Diagnostic, Diagnostics, Wreck};

/// Types resolved from `TypeName` / `ListOf` branches; `None` stands for `var`
pub type TypeCache = HashMap<BranchId, Option<TypeDescriptor>>;

/// Per-compilation state threaded through pre-scan, parse and resolution
#[derive(Debug, Default)]
pub struct CompilationContext {
    pub config: CompileConfig,
    pub table: BlockTable,
    pub tree: SyntaxTree,
    pub symbols: SymbolTables,
    pub types: TypeCache,
    pub headers: Vec<HeaderParts>,
    pub program: Option<BranchId>,
    pub diagnostics: Diagnostics,
}

impl CompilationContext {
    pub fn new(config: CompileConfig) -> Self {
        Self {
            config,
            tree: SyntaxTree::new(),
            ..Self::default()
        }
    }

    /// Pre-scan, parse and register declarations.
    ///
    /// Headers are parsed first so functions and types can be registered
    /// before any body is parsed; call sites in bodies are then narrowed
    /// against the complete declaration set.
    pub fn analyse(
        &mut self,
        lexemes: &[Lexeme],
    ) -> Result<(), Wreck> {
        self.table = prescan(lexemes)?;
        debug!("block table: {} entries", self.table.len());
        let depth = self.config.max_nesting_depth;

        let (headers, mut found) = Parser::new(lexemes, &self.table, &mut self.tree, depth).parse_headers()?;
        sort_by_position(&mut found);
        self.diagnostics.extend(found);
        self.headers = headers;

        declare::register_declarations(self, lexemes);

        let (program, mut found) = Parser::new(lexemes, &self.table, &mut self.tree, depth)
            .with_symbols(&self.symbols)
            .parse_program(self.headers.clone())?;
        sort_by_position(&mut found);
        self.diagnostics.extend(found);
        self.program = Some(program);

        declare::register_properties(self);
        debug!(
            "registered {} types, {} functions, {} properties",
            self.symbols.types().count(),
            self.symbols.functions().count(),
            self.symbols.properties().count()
        );
        Ok(())
    }
}

fn sort_by_position(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by_key(|d| (d.line, d.position));
}
