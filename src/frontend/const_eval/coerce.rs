//! Coercions
//!
//! Per-kind range table: integer to integer truncates along the canonical
//! chain, real and string sources that do not fit the target become zero.

use super::value::{real_text, Data, Value};
use super::FoldError;
use crate::frontend::symbols::types::{Primitive, TypeDescriptor};

impl Value {
    pub fn to_bool(&self) -> bool {
        match &self.data {
            Data::Bool(b) => *b,
            Data::Real(r) => *r != 0.0 && !r.is_nan(),
            Data::Str(s) => s.eq_ignore_ascii_case("true"),
            Data::Null => false,
            other => other.integer().map_or(false, |n| n != 0),
        }
    }

    pub fn to_real(&self) -> f64 {
        match &self.data {
            Data::Real(r) => *r,
            Data::Str(s) => s.trim().parse().unwrap_or(0.0),
            other => other.integer().map_or(0.0, |n| n as f64),
        }
    }

    /// Integer view in the given kind's range
    pub fn to_integer(
        &self,
        kind: Primitive,
    ) -> i128 {
        let (min, max) = kind.integer_range().unwrap_or((i64::MIN as i128, i64::MAX as i128));
        match &self.data {
            Data::Real(r) => {
                let t = r.trunc();
                if t.is_finite() && t >= min as f64 && t <= max as f64 {
                    t as i128
                } else {
                    0
                }
            }
            Data::Str(s) => match s.trim().parse::<i128>() {
                Ok(n) if n >= min && n <= max => n,
                _ => 0,
            },
            other => other.integer().unwrap_or(0),
        }
    }

    pub fn to_i64(&self) -> i64 {
        self.to_integer(Primitive::Long) as i64
    }

    pub fn to_char(&self) -> char {
        match &self.data {
            Data::Char(c) => *c,
            Data::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => '\0',
                }
            }
            _ => {
                let n = self.to_integer(Primitive::Char);
                char::from_u32(n as u16 as u32).unwrap_or('\0')
            }
        }
    }

    /// Text used by string concatenation and `string(x)`
    pub fn to_display_string(&self) -> String {
        match &self.data {
            Data::Real(r) => real_text(*r),
            _ => self.to_string(),
        }
    }

    /// Convert into a scalar kind following the range table.
    ///
    /// Containers convert only to their own kind.
    pub fn convert_to(
        &self,
        kind: Primitive,
    ) -> Result<Value, FoldError> {
        if self.kind() == kind {
            return Ok(self.clone());
        }
        let data = match kind {
            Primitive::Bool => Data::Bool(self.to_bool()),
            Primitive::Real => Data::Real(self.to_real()),
            Primitive::Char => Data::Char(self.to_char()),
            Primitive::String => Data::Str(self.to_display_string()),
            k if k.is_integer() => match &self.data {
                Data::Real(_) | Data::Str(_) => Data::truncated(self.to_integer(k), k),
                other => match other.integer() {
                    Some(n) => Data::truncated(n, k),
                    None => return Err(self.unsupported(kind)),
                },
            },
            _ => return Err(self.unsupported(kind)),
        };
        if matches!(self.data, Data::Null | Data::List(_) | Data::Tuple(_) | Data::Record(_)) {
            return Err(self.unsupported(kind));
        }
        Ok(Value::with_type(data, TypeDescriptor::primitive(kind)))
    }

    fn unsupported(
        &self,
        kind: Primitive,
    ) -> FoldError {
        FoldError::Unsupported(format!(
            "cannot convert '{}' to '{}'",
            self.ty,
            kind.name()
        ))
    }
}
