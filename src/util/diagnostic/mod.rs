//! 统一诊断系统
//!
//! # 模块结构
//!
//! - [`error`] - 诊断数据结构 (Diagnostic, Level, Wreck)
//! - [`collect`] - 诊断收集器
//!
//! # 示例
//!
//! ```
//! use sylva::util::diagnostic::{Diagnostic, Level};
//! use sylva::util::span::{Position, Span};
//!
//! let span = Span::point(Position::new(3, 14));
//! let diagnostic = Diagnostic::error(span, "division by integer zero is forbidden");
//! assert_eq!(diagnostic.level, Level::Error);
//! assert_eq!(
//!     diagnostic.to_string(),
//!     "Error in line 3 at position 14: division by integer zero is forbidden"
//! );
//! ```

pub mod collect;
pub mod error;

// 重新导出
pub use collect::Diagnostics;
pub use error::{Diagnostic, Level, Wreck};

/// 统一结果类型：只有致命错误会以 `Err` 传播
pub type Result<T, E = Wreck> = std::result::Result<T, E>;

/// 把诊断列表渲染为逐行文本
pub fn render_all<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> String {
    let mut output = String::new();
    for diagnostic in diagnostics {
        output.push_str(&diagnostic.to_string());
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::span::{Position, Span};

    #[test]
    fn test_format_is_verbatim() {
        let span = Span::point(Position::new(7, 12));
        let warning = Diagnostic::warning(span, "unreachable code detected");
        assert_eq!(
            warning.to_string(),
            "Warning in line 7 at position 12: unreachable code detected"
        );
        let wreck = Diagnostic::wreck(span, "unmatched closing brace");
        assert_eq!(
            wreck.to_string(),
            "Wreck in line 7 at position 12: unmatched closing brace"
        );
    }

    #[test]
    fn test_collector_counts_and_order() {
        let mut diagnostics = Diagnostics::new();
        let span = Span::point(Position::new(1, 1));
        diagnostics.warning(span, "first");
        diagnostics.error(span, "second");
        diagnostics.error(span, "third");
        assert_eq!(diagnostics.error_count(), 2);
        assert_eq!(diagnostics.warning_count(), 1);
        assert!(!diagnostics.has_wreck());
        let messages: Vec<_> = diagnostics
            .as_slice()
            .iter()
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_wreck_is_recorded_and_returned() {
        let mut diagnostics = Diagnostics::new();
        let wreck = diagnostics.wreck(Span::point(Position::new(2, 3)), "missing closing brace");
        assert!(diagnostics.has_wreck());
        assert_eq!(wreck.diagnostic().level, Level::Wreck);
        assert_eq!(render_all(diagnostics.as_slice()).lines().count(), 1);
    }

    #[test]
    fn test_internal_error_message() {
        let diagnostic = Diagnostic::internal("frame stack underflow");
        assert_eq!(diagnostic.message, "internal error: frame stack underflow");
        assert!(diagnostic.level.is_fatal());
    }
}
