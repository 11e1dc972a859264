//! Resolver tests module

mod classes;
mod emission;
mod folding;
mod names;
mod statements;

use crate::frontend::config::CompileConfig;
use crate::frontend::context::CompilationContext;
use crate::frontend::lexer::scan;
use crate::frontend::resolve::resolve;
use crate::util::diagnostic::{Diagnostic, Level};

pub(super) struct Outcome {
    pub text: String,
    pub auxiliary: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    pub fn messages(
        &self,
        level: Level,
    ) -> Vec<String> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == level)
            .map(|d| d.message.clone())
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Level::Error)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(Level::Warning)
    }

    pub fn assert_clean(&self) {
        assert!(self.diagnostics.is_empty(), "{:#?}\n{}", self.diagnostics, self.text);
    }
}

pub(super) fn resolve_with(
    config: CompileConfig,
    source: &str,
) -> Outcome {
    let lexemes = scan(source).unwrap();
    let mut ctx = CompilationContext::new(config);
    ctx.analyse(&lexemes).unwrap();
    let mut diagnostics = ctx.diagnostics.clone().into_vec();
    let resolved = resolve(&mut ctx).unwrap();
    diagnostics.extend(resolved.diagnostics);
    Outcome {
        text: resolved.emitted_text,
        auxiliary: resolved.auxiliary_declarations,
        diagnostics,
    }
}

pub(super) fn resolve_source(source: &str) -> Outcome {
    resolve_with(CompileConfig::new(), source)
}

/// Statements inside a void function `f`
pub(super) fn in_body(statements: &str) -> Outcome {
    resolve_source(&format!("function f() {{ {} }}", statements))
}
