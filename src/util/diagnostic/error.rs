//! 诊断数据结构
//!
//! 诊断是编译结果的一部分（数据），而不是 Rust 错误。
//! 唯一会沿调用栈传播的错误是 [`Wreck`]：它携带一条致命诊断，
//! 由流水线顶层捕获后清空输出。
//!
//! 输出格式固定为：
//!
//! ```text
//! <Level> in line <N> at position <P>: <message>
//! ```

use serde::Serialize;

use crate::util::span::Span;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Level {
    /// 非阻塞提示：窄化转换、不可达代码等
    Warning,
    /// 当前构造无法解析，使用占位符继续
    Error,
    /// 致命错误，终止整个编译
    Wreck,
}

impl Level {
    /// 是否阻止生成输出
    pub fn is_fatal(&self) -> bool {
        matches!(self, Level::Wreck)
    }
}

impl std::fmt::Display for Level {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Level::Warning => write!(f, "Warning"),
            Level::Error => write!(f, "Error"),
            Level::Wreck => write!(f, "Wreck"),
        }
    }
}

/// 一条诊断信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 严重级别
    pub level: Level,
    /// 行号（1 起）
    pub line: usize,
    /// 行内位置（1 起）
    pub position: usize,
    /// 消息正文
    pub message: String,
}

impl Diagnostic {
    /// 在指定位置创建诊断
    pub fn new(
        level: Level,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            line: span.start.line,
            position: span.start.column,
            message: message.into(),
        }
    }

    pub fn warning(
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Level::Warning, span, message)
    }

    pub fn error(
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Level::Error, span, message)
    }

    pub fn wreck(
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Level::Wreck, span, message)
    }

    /// 内部错误（没有源码位置）
    pub fn internal(message: impl std::fmt::Display) -> Self {
        Self {
            level: Level::Wreck,
            line: 0,
            position: 0,
            message: format!("internal error: {}", message),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{} in line {} at position {}: {}",
            self.level, self.line, self.position, self.message
        )
    }
}

/// 致命错误：终止编译并丢弃部分输出
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Wreck(pub Diagnostic);

impl Wreck {
    pub fn at(
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Wreck(Diagnostic::wreck(span, message))
    }

    pub fn internal(message: impl std::fmt::Display) -> Self {
        Wreck(Diagnostic::internal(message))
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.0
    }
}

impl From<Wreck> for Diagnostic {
    fn from(wreck: Wreck) -> Self {
        wreck.0
    }
}
