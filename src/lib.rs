//! Sylva translating front end
//!
//! Turns a lexeme stream into C#-flavoured host text: a declaration
//! pre-scanner, a stack-machine parser and a semantic resolver with constant
//! folding over a universal value.
//!
//! # Example
//!
//! ```
//! let output = sylva::compile("function Twice(int x) : int { return x * (1 + 1); }");
//! assert!(output.diagnostics.is_empty());
//! assert!(output.emitted_text.contains("return x * 2;"));
//! ```

#![warn(rust_2018_idioms)]

// Public modules
pub mod frontend;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use frontend::{CompilationOutput, CompileConfig, Compiler};
pub use thiserror::Error;

use tracing::debug;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Front end name
pub const NAME: &str = "Sylva";

/// Compile source text with the default configuration
pub fn compile(source: &str) -> CompilationOutput {
    debug!("compile called");
    Compiler::new().compile(source)
}

use ::std::path::Path;

/// Compile a file with the default configuration
pub fn compile_file(path: &Path) -> Result<CompilationOutput> {
    debug!("compile_file called for {}", path.display());
    Compiler::new().compile_file(path)
}
