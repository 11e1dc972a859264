//! 编译配置
//!
//! Options of one compilation: constant folding, warning reporting, parser
//! nesting bound and emission layout. Loaded from TOML; every field has a
//! default and unknown keys are rejected.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// 编译配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompileConfig {
    /// Emit folded literals for constant subexpressions
    #[serde(default = "default_true")]
    pub fold_constants: bool,

    /// Keep Warning diagnostics in the output
    #[serde(default = "default_true")]
    pub report_warnings: bool,

    /// Parser frame-stack bound
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,

    /// Spaces per indentation level in emitted text
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// Host static class holding free functions and namespace variables
    #[serde(default = "default_host_module")]
    pub host_module: String,
}

fn default_true() -> bool {
    true
}

fn default_max_nesting_depth() -> usize {
    100_000
}

fn default_indent_width() -> usize {
    4
}

fn default_host_module() -> String {
    "Module".to_string()
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            fold_constants: true,
            report_warnings: true,
            max_nesting_depth: default_max_nesting_depth(),
            indent_width: default_indent_width(),
            host_module: default_host_module(),
        }
    }
}

impl CompileConfig {
    /// 创建默认配置
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: CompileConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_nesting_depth == 0 {
            return Err(ConfigError::Invalid("max_nesting_depth must be positive".into()));
        }
        let valid_name = self
            .host_module
            .chars()
            .next()
            .map_or(false, |c| c == '_' || unicode_ident::is_xid_start(c))
            && self
                .host_module
                .chars()
                .all(|c| c == '_' || unicode_ident::is_xid_continue(c));
        if !valid_name {
            return Err(ConfigError::Invalid(format!(
                "host_module '{}' is not an identifier",
                self.host_module
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn with_fold_constants(
        mut self,
        fold: bool,
    ) -> Self {
        self.fold_constants = fold;
        self
    }

    #[inline]
    pub fn with_report_warnings(
        mut self,
        report: bool,
    ) -> Self {
        self.report_warnings = report;
        self
    }

    #[inline]
    pub fn with_max_nesting_depth(
        mut self,
        depth: usize,
    ) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    #[inline]
    pub fn with_indent_width(
        mut self,
        width: usize,
    ) -> Self {
        self.indent_width = width;
        self
    }

    #[inline]
    pub fn with_host_module(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.host_module = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompileConfig::from_toml_str("").unwrap();
        assert_eq!(config, CompileConfig::default());
        assert!(config.fold_constants);
        assert_eq!(config.max_nesting_depth, 100_000);
        assert_eq!(config.host_module, "Module");
    }

    #[test]
    fn test_partial_document() {
        let config = CompileConfig::from_toml_str("fold_constants = false\nindent_width = 2\n").unwrap();
        assert!(!config.fold_constants);
        assert_eq!(config.indent_width, 2);
        assert!(config.report_warnings);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = CompileConfig::from_toml_str("optimise = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            CompileConfig::from_toml_str("max_nesting_depth = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CompileConfig::from_toml_str("host_module = \"9lives\""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sylva.toml");
        fs::write(&path, "host_module = \"Program\"").unwrap();
        let config = CompileConfig::load(&path).unwrap();
        assert_eq!(config.host_module, "Program");
        assert!(matches!(
            CompileConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
