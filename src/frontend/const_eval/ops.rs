//! Operators over Universal Values
//!
//! Each binary operator resolves the operand kinds to one operation kind,
//! coerces both sides, performs the native operation and wraps the result.

use std::cmp::Ordering;
use std::fmt;

use super::value::{Data, Value};
use super::FoldError;
use crate::frontend::symbols::types::{arithmetic_kind, Primitive, TypeDescriptor, INTEGER_CHAIN};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Xor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "**" => BinaryOp::Pow,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            "^^" => BinaryOp::Xor,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            _ => return None,
        };
        Some(op)
    }

    /// Operator of a compound assignment (`+=` gives `+`)
    pub fn from_assignment(symbol: &str) -> Option<Self> {
        symbol.strip_suffix('=').and_then(Self::from_symbol)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Xor => "^^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Xor)
    }

    pub fn is_commutative(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Mul
                | BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::And
                | BinaryOp::Or
                | BinaryOp::Xor
                | BinaryOp::BitAnd
                | BinaryOp::BitOr
                | BinaryOp::BitXor
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

impl UnaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(UnaryOp::Neg),
            "+" => Some(UnaryOp::Plus),
            "!" => Some(UnaryOp::Not),
            "~" => Some(UnaryOp::BitNot),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

fn invalid(
    op: &str,
    lhs: &Value,
    rhs: &Value,
) -> FoldError {
    FoldError::InvalidOperands {
        op: op.to_string(),
        left: lhs.ty.to_string(),
        right: rhs.ty.to_string(),
    }
}

/// Fit an exact integer result into `kind`.
///
/// In range: wrap. Out of range: truncate when pinned, otherwise widen to the
/// narrowest chain kind at or above `kind` that holds it, then to `real`.
pub fn fit_integer(
    n: i128,
    kind: Primitive,
    fixed: bool,
) -> Value {
    let in_range = |k: Primitive| {
        k.integer_range()
            .map_or(false, |(min, max)| n >= min && n <= max)
    };
    if in_range(kind) || fixed {
        return Value::new(Data::truncated(n, kind));
    }
    let rank = kind.rank().unwrap_or(0);
    for candidate in INTEGER_CHAIN {
        if candidate.rank().unwrap_or(0) >= rank && in_range(candidate) {
            return Value::new(Data::truncated(n, candidate));
        }
    }
    Value::real(n as f64)
}

fn pinned_in(
    value: &Value,
    kind: Primitive,
) -> bool {
    value.fixed && value.kind() == kind
}

/// Evaluate `lhs op rhs`
pub fn binary(
    lhs: &Value,
    op: BinaryOp,
    rhs: &Value,
) -> Result<Value, FoldError> {
    tracing::trace!("fold {} {} {}", lhs, op, rhs);
    let (lk, rk) = (lhs.kind(), rhs.kind());

    if op.is_logical() {
        return match (&lhs.data, &rhs.data) {
            (Data::Bool(a), Data::Bool(b)) => Ok(Value::bool(match op {
                BinaryOp::And => *a && *b,
                BinaryOp::Or => *a || *b,
                _ => *a ^ *b,
            })),
            _ => Err(invalid(op.symbol(), lhs, rhs)),
        };
    }

    if op.is_comparison() {
        return compare(lhs, op, rhs);
    }

    match op {
        BinaryOp::Add if lk == Primitive::String || rk == Primitive::String => {
            return Ok(Value::string(format!(
                "{}{}",
                lhs.to_display_string(),
                rhs.to_display_string()
            )));
        }
        BinaryOp::Add if lk == Primitive::List && rk == Primitive::List => {
            if let (Data::List(a), Data::List(b)) = (&lhs.data, &rhs.data) {
                let element = lhs
                    .ty
                    .element()
                    .cloned()
                    .unwrap_or_else(TypeDescriptor::unknown);
                let items = a.iter().chain(b.iter()).cloned().collect();
                return Ok(Value::list(items, element));
            }
        }
        BinaryOp::Mul if lk == Primitive::String || rk == Primitive::String => {
            let (text, count) = match (&lhs.data, &rhs.data) {
                (Data::Str(s), other) | (other, Data::Str(s)) if other.kind().is_integer() => {
                    (s, other.integer().unwrap_or(0))
                }
                _ => return Err(invalid(op.symbol(), lhs, rhs)),
            };
            if count < 0 {
                return Err(FoldError::Domain("string repetition".to_string()));
            }
            return Ok(Value::string(text.repeat(count as usize)));
        }
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor
            if lk == Primitive::Bool && rk == Primitive::Bool =>
        {
            let (a, b) = (lhs.to_bool(), rhs.to_bool());
            return Ok(Value::bool(match op {
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                _ => a ^ b,
            }));
        }
        _ => {}
    }

    let kind = arithmetic_kind(lk, rk).ok_or_else(|| invalid(op.symbol(), lhs, rhs))?;
    let fixed = pinned_in(lhs, kind) || pinned_in(rhs, kind);

    if kind == Primitive::Real {
        let (a, b) = (lhs.to_real(), rhs.to_real());
        let r = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Rem => a % b,
            BinaryOp::Pow => a.powf(b),
            _ => return Err(invalid(op.symbol(), lhs, rhs)),
        };
        let mut value = Value::real(r);
        value.fixed = fixed;
        return Ok(value);
    }

    let (a, b) = (lhs.to_integer(kind), rhs.to_integer(kind));
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::Rem if b == 0 => return Err(FoldError::DivisionByIntegerZero),
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        BinaryOp::Pow => {
            if b < 0 {
                return Err(FoldError::NegativeExponent);
            }
            match u32::try_from(b).ok().and_then(|e| a.checked_pow(e)) {
                Some(n) => n,
                None if fixed => wrapping_pow(a, b, kind),
                None => return Ok(Value::real((a as f64).powf(b as f64))),
            }
        }
        BinaryOp::Shl | BinaryOp::Shr => {
            let left = lhs.kind();
            if !left.is_integer() && left != Primitive::Char || !rk.is_integer() && rk != Primitive::Char {
                return Err(invalid(op.symbol(), lhs, rhs));
            }
            let bits = left.bit_width().max(32);
            let count = (b as u32) & (bits - 1);
            let value = lhs.to_integer(left);
            let shifted = if op == BinaryOp::Shl {
                value << count
            } else {
                value >> count
            };
            let kind = if left == Primitive::Char {
                Primitive::Int
            } else {
                left
            };
            let mut out = Value::new(Data::truncated(shifted, kind));
            out.fixed = lhs.fixed;
            return Ok(out);
        }
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
            let n = match op {
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                _ => a ^ b,
            };
            let mut out = Value::new(Data::truncated(n, kind));
            out.fixed = fixed;
            return Ok(out);
        }
        _ => return Err(invalid(op.symbol(), lhs, rhs)),
    };
    let mut value = fit_integer(result, kind, fixed);
    value.fixed = fixed;
    Ok(value)
}

/// Square-and-multiply, truncating to `kind` after every step
fn wrapping_pow(
    base: i128,
    exponent: i128,
    kind: Primitive,
) -> i128 {
    let wrap = |n: i128| Data::truncated(n, kind).integer().unwrap_or(0);
    let (mut acc, mut base, mut e) = (1i128, wrap(base), exponent);
    while e > 0 {
        if e & 1 == 1 {
            acc = wrap(acc.wrapping_mul(base));
        }
        base = wrap(base.wrapping_mul(base));
        e >>= 1;
    }
    acc
}

fn ordering_of(
    lhs: &Value,
    rhs: &Value,
) -> Option<Ordering> {
    let (lk, rk) = (lhs.kind(), rhs.kind());
    match (&lhs.data, &rhs.data) {
        (Data::Str(a), Data::Str(b)) => Some(a.cmp(b)),
        _ => match arithmetic_kind(lk, rk)? {
            Primitive::Real => lhs.to_real().partial_cmp(&rhs.to_real()),
            kind => Some(lhs.to_integer(kind).cmp(&rhs.to_integer(kind))),
        },
    }
}

/// Structural equality used by `==` and `!=`
pub fn values_equal(
    lhs: &Value,
    rhs: &Value,
) -> Option<bool> {
    match (&lhs.data, &rhs.data) {
        (Data::Null, Data::Null) => Some(true),
        (Data::Null, _) | (_, Data::Null) => Some(false),
        (Data::Bool(a), Data::Bool(b)) => Some(a == b),
        (Data::Str(a), Data::Str(b)) => Some(a == b),
        (Data::List(a), Data::List(b)) | (Data::Tuple(a), Data::Tuple(b)) => {
            if a.len() != b.len() {
                return Some(false);
            }
            for (x, y) in a.iter().zip(b.iter()) {
                if !values_equal(x, y)? {
                    return Some(false);
                }
            }
            Some(true)
        }
        _ => ordering_of(lhs, rhs).map(|o| o == Ordering::Equal).or_else(|| {
            // NaN 与任何值都不相等
            if lhs.kind().is_numeric() && rhs.kind().is_numeric() {
                Some(false)
            } else {
                None
            }
        }),
    }
}

fn compare(
    lhs: &Value,
    op: BinaryOp,
    rhs: &Value,
) -> Result<Value, FoldError> {
    let result = match op {
        BinaryOp::Eq => values_equal(lhs, rhs),
        BinaryOp::Ne => values_equal(lhs, rhs).map(|b| !b),
        _ => {
            let numeric = lhs.kind().is_numeric() && rhs.kind().is_numeric();
            let strings = lhs.kind() == Primitive::String && rhs.kind() == Primitive::String;
            if !numeric && !strings {
                return Err(invalid(op.symbol(), lhs, rhs));
            }
            Some(match ordering_of(lhs, rhs) {
                Some(ordering) => match op {
                    BinaryOp::Lt => ordering == Ordering::Less,
                    BinaryOp::Le => ordering != Ordering::Greater,
                    BinaryOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                },
                None => false,
            })
        }
    };
    result
        .map(Value::bool)
        .ok_or_else(|| invalid(op.symbol(), lhs, rhs))
}

/// Evaluate a prefix operator
pub fn unary(
    op: UnaryOp,
    operand: &Value,
) -> Result<Value, FoldError> {
    let kind = operand.kind();
    let bad = || FoldError::InvalidOperands {
        op: op.symbol().to_string(),
        left: operand.ty.to_string(),
        right: String::new(),
    };
    match op {
        UnaryOp::Not => match operand.data {
            Data::Bool(b) => Ok(Value::bool(!b)),
            _ => Err(bad()),
        },
        UnaryOp::Plus if kind.is_numeric() => {
            if kind == Primitive::Char {
                return Ok(Value::int(operand.to_integer(kind) as i32));
            }
            Ok(operand.clone())
        }
        UnaryOp::Neg if kind == Primitive::Real => {
            let mut value = Value::real(-operand.to_real());
            value.fixed = operand.fixed;
            Ok(value)
        }
        UnaryOp::Neg if kind.is_numeric() => {
            let target = if kind == Primitive::Char {
                Primitive::Int
            } else {
                kind
            };
            let mut value = fit_integer(-operand.to_integer(kind), target, operand.fixed);
            value.fixed = operand.fixed;
            Ok(value)
        }
        UnaryOp::BitNot if kind.is_integer() => {
            let mut value = Value::new(Data::truncated(!operand.to_integer(kind), kind));
            value.fixed = operand.fixed;
            Ok(value)
        }
        _ => Err(bad()),
    }
}

/// `value[index]` over lists, tuples and strings
pub fn index(
    value: &Value,
    position: &Value,
) -> Result<Value, FoldError> {
    if !position.kind().is_integer() {
        return Err(invalid("[]", value, position));
    }
    let i = position.to_integer(Primitive::Long);
    let fetch = |len: usize| -> Result<usize, FoldError> {
        if i < 0 || i >= len as i128 {
            Err(FoldError::IndexOutOfRange {
                index: i as i64,
                len,
            })
        } else {
            Ok(i as usize)
        }
    };
    match &value.data {
        Data::List(items) | Data::Tuple(items) => Ok(items[fetch(items.len())?].clone()),
        Data::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(Value::char(chars[fetch(chars.len())?]))
        }
        _ => Err(invalid("[]", value, position)),
    }
}

/// `length` of a string or list
pub fn length(value: &Value) -> Option<Value> {
    let n = match &value.data {
        Data::Str(s) => s.chars().count(),
        Data::List(items) => items.len(),
        _ => return None,
    };
    Some(Value::int(n as i32))
}
