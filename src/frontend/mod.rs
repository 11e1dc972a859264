//! Frontend compilation pipeline
//!
//! This module contains the reference scanner, the declaration pre-scanner,
//! the stack-machine parser and the semantic resolver. The frontend turns a
//! lexeme stream into host text plus diagnostics.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use anyhow::Context as _;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::util::diagnostic::{Diagnostic, Level, Wreck};

pub mod config;
pub mod const_eval;
pub mod context;
pub mod lexer;
pub mod parser;
pub mod prescan;
pub mod resolve;
pub mod symbols;

pub use config::{CompileConfig, ConfigError};
pub use context::CompilationContext;
pub use lexer::{Lexeme, LexemeKind, LexemeStream};

/// Downstream result of one compilation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompilationOutput {
    /// Host text; empty after a Wreck
    pub emitted_text: String,
    /// Diagnostics in discovery order
    pub diagnostics: Vec<Diagnostic>,
    /// Runtime helpers the emitted text calls into
    pub auxiliary_declarations: String,
}

impl CompilationOutput {
    fn wrecked(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            emitted_text: String::new(),
            diagnostics,
            auxiliary_declarations: String::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level >= Level::Error)
    }

    pub fn is_wrecked(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level.is_fatal())
    }

    /// Diagnostics of one level
    pub fn count(
        &self,
        level: Level,
    ) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }

    /// Diagnostics rendered one per line
    pub fn render_diagnostics(&self) -> String {
        crate::util::diagnostic::render_all(&self.diagnostics)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Compiler context
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompileConfig,
}

impl Compiler {
    /// Create a new compiler with the default configuration
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CompileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Compile source text with the reference scanner
    pub fn compile(
        &self,
        source: &str,
    ) -> CompilationOutput {
        debug!("compiling source ({} bytes)", source.len());
        self.guarded(|| {
            let lexemes = lexer::scan(source)?;
            Ok(run_pipeline(&self.config, &lexemes))
        })
    }

    /// Compile an upstream lexeme stream
    pub fn compile_lexemes(
        &self,
        stream: &LexemeStream,
    ) -> CompilationOutput {
        debug!("compiling {} lexemes", stream.lexemes.len());
        self.guarded(|| Ok(run_pipeline(&self.config, &stream.lexemes)))
    }

    /// Read and compile a file
    pub fn compile_file(
        &self,
        path: &Path,
    ) -> anyhow::Result<CompilationOutput> {
        let source =
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(self.compile(&source))
    }

    /// Compile independent sources in parallel, one context each
    pub fn compile_many<S>(
        &self,
        sources: &[S],
    ) -> Vec<CompilationOutput>
    where
        S: AsRef<str> + Sync,
    {
        debug!("compiling {} sources in parallel", sources.len());
        sources.par_iter().map(|s| self.compile(s.as_ref())).collect()
    }

    /// Run one compilation, turning a Wreck or a panic into a wrecked output
    fn guarded(
        &self,
        run: impl FnOnce() -> Result<CompilationOutput, Wreck>,
    ) -> CompilationOutput {
        let output = match panic::catch_unwind(AssertUnwindSafe(run)) {
            Ok(Ok(output)) => output,
            Ok(Err(wreck)) => CompilationOutput::wrecked(vec![wreck.0]),
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                CompilationOutput::wrecked(vec![Diagnostic::internal(message)])
            }
        };
        self.filter(output)
    }

    fn filter(
        &self,
        mut output: CompilationOutput,
    ) -> CompilationOutput {
        if !self.config.report_warnings {
            output.diagnostics.retain(|d| d.level != Level::Warning);
        }
        output
    }
}

/// Pre-scan, parse, declare and resolve in a fresh context
fn run_pipeline(
    config: &CompileConfig,
    lexemes: &[Lexeme],
) -> CompilationOutput {
    let mut ctx = CompilationContext::new(config.clone());
    if let Err(wreck) = ctx.analyse(lexemes) {
        let mut diagnostics = std::mem::take(&mut ctx.diagnostics).into_vec();
        diagnostics.push(wreck.0);
        return CompilationOutput::wrecked(diagnostics);
    }
    let mut diagnostics = std::mem::take(&mut ctx.diagnostics).into_vec();
    if diagnostics.iter().any(|d| d.level.is_fatal()) {
        return CompilationOutput::wrecked(diagnostics);
    }
    match resolve::resolve(&mut ctx) {
        Ok(resolved) => {
            diagnostics.extend(resolved.diagnostics);
            debug!("compilation finished with {} diagnostics", diagnostics.len());
            if diagnostics.iter().any(|d| d.level.is_fatal()) {
                return CompilationOutput::wrecked(diagnostics);
            }
            CompilationOutput {
                emitted_text: resolved.emitted_text,
                diagnostics,
                auxiliary_declarations: resolved.auxiliary_declarations,
            }
        }
        Err(wreck) => {
            diagnostics.push(wreck.0);
            CompilationOutput::wrecked(diagnostics)
        }
    }
}
