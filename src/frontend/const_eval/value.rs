//! Universal Value
//!
//! 编译期常量的统一表示：带类型描述符与 `fixed` 标记的动态值。

use serde::Serialize;
use std::fmt;

use crate::frontend::symbols::types::{Primitive, TypeDescriptor};

/// Payload of a compile-time value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Data {
    Null,
    Bool(bool),
    SByte(i8),
    Byte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Char(char),
    Real(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Named fields of a decomposed struct value
    Record(Vec<(String, Value)>),
}

impl Data {
    /// Kind tag of the payload
    pub fn kind(&self) -> Primitive {
        match self {
            Data::Null => Primitive::Null,
            Data::Bool(_) => Primitive::Bool,
            Data::SByte(_) => Primitive::SByte,
            Data::Byte(_) => Primitive::Byte,
            Data::Short(_) => Primitive::Short,
            Data::UShort(_) => Primitive::UShort,
            Data::Int(_) => Primitive::Int,
            Data::UInt(_) => Primitive::UInt,
            Data::Long(_) => Primitive::Long,
            Data::ULong(_) => Primitive::ULong,
            Data::Char(_) => Primitive::Char,
            Data::Real(_) => Primitive::Real,
            Data::Str(_) => Primitive::String,
            Data::List(_) => Primitive::List,
            Data::Tuple(_) => Primitive::Tuple,
            Data::Record(_) => Primitive::Unknown,
        }
    }

    /// Exact integer view of integer, `char` and `bool` payloads
    pub fn integer(&self) -> Option<i128> {
        let n = match self {
            Data::Bool(b) => *b as i128,
            Data::SByte(v) => *v as i128,
            Data::Byte(v) => *v as i128,
            Data::Short(v) => *v as i128,
            Data::UShort(v) => *v as i128,
            Data::Int(v) => *v as i128,
            Data::UInt(v) => *v as i128,
            Data::Long(v) => *v as i128,
            Data::ULong(v) => *v as i128,
            Data::Char(c) => *c as u32 as i128,
            _ => return None,
        };
        Some(n)
    }

    /// Wrap an integer into `kind`, truncating to the kind's width
    pub fn truncated(
        n: i128,
        kind: Primitive,
    ) -> Data {
        match kind {
            Primitive::Bool => Data::Bool(n != 0),
            Primitive::SByte => Data::SByte(n as i8),
            Primitive::Byte => Data::Byte(n as u8),
            Primitive::Short => Data::Short(n as i16),
            Primitive::UShort => Data::UShort(n as u16),
            Primitive::Int => Data::Int(n as i32),
            Primitive::UInt => Data::UInt(n as u32),
            Primitive::Long => Data::Long(n as i64),
            Primitive::ULong => Data::ULong(n as u64),
            Primitive::Char => Data::Char(char::from_u32(n as u16 as u32).unwrap_or('\0')),
            Primitive::Real => Data::Real(n as f64),
            _ => Data::Null,
        }
    }
}

/// A compile-time value: payload, its type and whether the kind is pinned
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Value {
    pub data: Data,
    pub ty: TypeDescriptor,
    /// Kind was pinned by a conversion; derived results keep it instead of widening
    pub fixed: bool,
}

impl Value {
    /// Value whose type is derived from its payload
    pub fn new(data: Data) -> Self {
        let ty = type_of(&data);
        Self {
            data,
            ty,
            fixed: false,
        }
    }

    pub fn with_type(
        data: Data,
        ty: TypeDescriptor,
    ) -> Self {
        Self {
            data,
            ty,
            fixed: false,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn null() -> Self {
        Self::new(Data::Null)
    }

    pub fn bool(b: bool) -> Self {
        Self::new(Data::Bool(b))
    }

    pub fn int(n: i32) -> Self {
        Self::new(Data::Int(n))
    }

    pub fn long(n: i64) -> Self {
        Self::new(Data::Long(n))
    }

    pub fn real(r: f64) -> Self {
        Self::new(Data::Real(r))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::new(Data::Str(s.into()))
    }

    pub fn char(c: char) -> Self {
        Self::new(Data::Char(c))
    }

    pub fn list(
        items: Vec<Value>,
        element: TypeDescriptor,
    ) -> Self {
        Self::with_type(Data::List(items), TypeDescriptor::list_of(element))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Self::new(Data::Tuple(items))
    }

    pub fn kind(&self) -> Primitive {
        self.data.kind()
    }

    pub fn is_null(&self) -> bool {
        matches!(self.data, Data::Null)
    }

    /// Zero of a type, used as the placeholder for failed folds
    pub fn default_of(ty: &TypeDescriptor) -> Self {
        let data = match ty.as_primitive() {
            Some(Primitive::Bool) => Data::Bool(false),
            Some(Primitive::Char) => Data::Char('\0'),
            Some(Primitive::Real) => Data::Real(0.0),
            Some(p) if p.is_integer() => Data::truncated(0, p),
            _ => Data::Null,
        };
        Self::with_type(data, ty.clone())
    }

    /// Integer literal as scanned: narrowest of int, uint, long, ulong
    pub fn integer_literal(
        text: &str,
        long: bool,
    ) -> Option<Self> {
        let n: u128 = text.parse().ok()?;
        let data = if !long && n <= i32::MAX as u128 {
            Data::Int(n as i32)
        } else if !long && n <= u32::MAX as u128 {
            Data::UInt(n as u32)
        } else if n <= i64::MAX as u128 {
            Data::Long(n as i64)
        } else if n <= u64::MAX as u128 {
            Data::ULong(n as u64)
        } else {
            return None;
        };
        Some(Self::new(data))
    }
}

/// Type derived from a payload; list elements take the first element's type
fn type_of(data: &Data) -> TypeDescriptor {
    match data {
        Data::List(items) => {
            let element = items
                .first()
                .map(|v| v.ty.clone())
                .unwrap_or_else(TypeDescriptor::unknown);
            TypeDescriptor::list_of(element)
        }
        Data::Tuple(items) => TypeDescriptor::tuple(items.iter().map(|v| v.ty.clone()).collect()),
        other => TypeDescriptor::primitive(other.kind()),
    }
}

/// Real text: integral values keep a fractional digit, infinities spell out
pub(crate) fn real_text(r: f64) -> String {
    if r.is_nan() {
        "NaN".to_string()
    } else if r.is_infinite() {
        if r > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{}", r)
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.data {
            Data::Null => f.write_str("null"),
            Data::Bool(b) => write!(f, "{}", b),
            Data::Real(r) => f.write_str(&real_text(*r)),
            Data::Char(c) => write!(f, "{}", c),
            Data::Str(s) => f.write_str(s),
            Data::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Data::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            Data::Record(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(name, v)| format!("{} = {}", name, v))
                    .collect();
                write!(f, "{{ {} }}", parts.join(", "))
            }
            other => match other.integer() {
                Some(n) => write!(f, "{}", n),
                None => Ok(()),
            },
        }
    }
}

fn escape_host(
    text: &str,
    quote: char,
) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            '\\' => out.push_str("\\\\"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

impl Value {
    /// Host literal spelling of this value
    pub fn to_host_literal(&self) -> String {
        match &self.data {
            Data::Null => "null".to_string(),
            Data::Bool(b) => b.to_string(),
            Data::SByte(v) => format!("(sbyte){}", v),
            Data::Byte(v) => format!("(byte){}", v),
            Data::Short(v) => format!("(short){}", v),
            Data::UShort(v) => format!("(ushort){}", v),
            Data::Int(v) => v.to_string(),
            Data::UInt(v) => format!("{}u", v),
            Data::Long(v) => format!("{}L", v),
            Data::ULong(v) => format!("{}UL", v),
            Data::Char(c) => format!("'{}'", escape_host(&c.to_string(), '\'')),
            Data::Real(r) => {
                if r.is_nan() {
                    "double.NaN".to_string()
                } else if r.is_infinite() {
                    if *r > 0.0 {
                        "double.PositiveInfinity".to_string()
                    } else {
                        "double.NegativeInfinity".to_string()
                    }
                } else {
                    format!("{:?}", r)
                }
            }
            Data::Str(s) => format!("\"{}\"", escape_host(s, '"')),
            Data::List(items) => {
                let element = self
                    .ty
                    .element()
                    .map(|e| e.host_name())
                    .unwrap_or_else(|| "object".to_string());
                let parts: Vec<String> = items.iter().map(|v| v.to_host_literal()).collect();
                if parts.is_empty() {
                    format!("new List<{}>()", element)
                } else {
                    format!("new List<{}> {{ {} }}", element, parts.join(", "))
                }
            }
            Data::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_host_literal()).collect();
                format!("({})", parts.join(", "))
            }
            Data::Record(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(name, v)| format!("{} = {}", name, v.to_host_literal()))
                    .collect();
                format!("new {} {{ {} }}", self.ty.host_name(), parts.join(", "))
            }
        }
    }
}
