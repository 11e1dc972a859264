//! Universal Value Engine
//!
//! 编译期常量求值：统一值表示、按范围表的类型转换、二元/一元运算与内置函数。
//! 只在翻译期使用，不参与运行时。

pub mod builtins;
pub mod coerce;
pub mod ops;
pub mod value;

#[cfg(test)]
mod tests;

pub use ops::{binary, fit_integer, index, length, unary, values_equal, BinaryOp, UnaryOp};
pub use value::{Data, Value};

use thiserror::Error;

/// Compile-time evaluation failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FoldError {
    #[error("division by integer zero is forbidden")]
    DivisionByIntegerZero,

    #[error("integer power with a negative exponent")]
    NegativeExponent,

    #[error("argument is outside the domain of '{0}'")]
    Domain(String),

    #[error("operator '{op}' cannot be applied to operands of type '{left}' and '{right}'")]
    InvalidOperands {
        op: String,
        left: String,
        right: String,
    },

    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("{0}")]
    Unsupported(String),
}
