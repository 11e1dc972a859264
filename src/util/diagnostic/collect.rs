//! 诊断收集
//!
//! 按发现顺序（从左到右、深度优先）收集一次编译的全部诊断。

use super::error::{Diagnostic, Level, Wreck};
use crate::util::span::Span;

/// 诊断收集器
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        diagnostic: Diagnostic,
    ) {
        tracing::trace!("diagnostic: {}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn warning(
        &mut self,
        span: Span,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic::warning(span, message));
    }

    pub fn error(
        &mut self,
        span: Span,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic::error(span, message));
    }

    /// 记录致命诊断并返回可传播的 [`Wreck`]
    pub fn wreck(
        &mut self,
        span: Span,
        message: impl Into<String>,
    ) -> Wreck {
        let wreck = Wreck::at(span, message);
        self.push(wreck.0.clone());
        wreck
    }

    /// 追加一批诊断（帧边界处的显式拼接）
    pub fn extend(
        &mut self,
        diagnostics: impl IntoIterator<Item = Diagnostic>,
    ) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn has_wreck(&self) -> bool {
        self.items.iter().any(|d| d.level.is_fatal())
    }

    pub fn count(
        &self,
        level: Level,
    ) -> usize {
        self.items.iter().filter(|d| d.level == level).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Level::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Level::Warning)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
