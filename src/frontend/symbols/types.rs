//! 类型描述符与数值提升
//!
//! A type is a scope path ending in its defining block plus ordered extra
//! arguments. Primitive kinds live under a single `Primitive` block; lists and
//! tuples carry their element types (and a fixed length) as extra arguments.

use serde::Serialize;
use std::fmt;

use super::scope::{Block, BlockKind, ScopePath};

/// Built-in kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Primitive {
    Void,
    Null,
    Bool,
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Char,
    Real,
    String,
    List,
    Tuple,
    /// Placeholder type of an expression that already produced an error
    Unknown,
}

/// Integer kinds in promotion order
pub const INTEGER_CHAIN: [Primitive; 8] = [
    Primitive::SByte,
    Primitive::Byte,
    Primitive::Short,
    Primitive::UShort,
    Primitive::Int,
    Primitive::UInt,
    Primitive::Long,
    Primitive::ULong,
];

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "void" => Primitive::Void,
            "null" => Primitive::Null,
            "bool" => Primitive::Bool,
            "sbyte" => Primitive::SByte,
            "byte" => Primitive::Byte,
            "short" => Primitive::Short,
            "ushort" => Primitive::UShort,
            "int" => Primitive::Int,
            "uint" => Primitive::UInt,
            "long" => Primitive::Long,
            "ulong" => Primitive::ULong,
            "char" => Primitive::Char,
            "real" => Primitive::Real,
            "string" => Primitive::String,
            "list" => Primitive::List,
            "tuple" => Primitive::Tuple,
            "?" => Primitive::Unknown,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Void => "void",
            Primitive::Null => "null",
            Primitive::Bool => "bool",
            Primitive::SByte => "sbyte",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::UShort => "ushort",
            Primitive::Int => "int",
            Primitive::UInt => "uint",
            Primitive::Long => "long",
            Primitive::ULong => "ulong",
            Primitive::Char => "char",
            Primitive::Real => "real",
            Primitive::String => "string",
            Primitive::List => "list",
            Primitive::Tuple => "tuple",
            Primitive::Unknown => "?",
        }
    }

    /// Host spelling of a scalar kind
    pub fn host_name(&self) -> &'static str {
        match self {
            Primitive::Real => "double",
            Primitive::Null | Primitive::Unknown => "object",
            other => other.name(),
        }
    }

    /// Position in the promotion lattice; `None` for non-numeric kinds
    pub fn rank(&self) -> Option<u8> {
        let rank = match self {
            Primitive::Bool => 0,
            Primitive::SByte => 1,
            Primitive::Byte => 2,
            Primitive::Short => 3,
            Primitive::UShort => 4,
            Primitive::Int | Primitive::Char => 5,
            Primitive::UInt => 6,
            Primitive::Long => 7,
            Primitive::ULong => 8,
            Primitive::Real => 9,
            _ => return None,
        };
        Some(rank)
    }

    pub fn is_integer(&self) -> bool {
        INTEGER_CHAIN.contains(self)
    }

    /// Arithmetic operand kinds: integers, `char` and `real`
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Primitive::Char | Primitive::Real)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            Primitive::Byte | Primitive::UShort | Primitive::UInt | Primitive::ULong
        )
    }

    /// Inclusive value range of an integer kind
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        let range = match self {
            Primitive::SByte => (i8::MIN as i128, i8::MAX as i128),
            Primitive::Byte => (0, u8::MAX as i128),
            Primitive::Short => (i16::MIN as i128, i16::MAX as i128),
            Primitive::UShort => (0, u16::MAX as i128),
            Primitive::Int => (i32::MIN as i128, i32::MAX as i128),
            Primitive::UInt => (0, u32::MAX as i128),
            Primitive::Long => (i64::MIN as i128, i64::MAX as i128),
            Primitive::ULong => (0, u64::MAX as i128),
            Primitive::Char => (0, u16::MAX as i128),
            Primitive::Bool => (0, 1),
            _ => return None,
        };
        Some(range)
    }

    pub fn bit_width(&self) -> u32 {
        match self {
            Primitive::SByte | Primitive::Byte | Primitive::Bool => 8,
            Primitive::Short | Primitive::UShort | Primitive::Char => 16,
            Primitive::Int | Primitive::UInt => 32,
            _ => 64,
        }
    }
}

/// Least common kind of two lattice members.
///
/// The lattice is a total order, so the result is the maximum of both ranks;
/// `char` sits at the rank of `int` and promotes to `int`. Returns `None`
/// when either side is outside the lattice.
pub fn promote(
    a: Primitive,
    b: Primitive,
) -> Option<Primitive> {
    let (ra, rb) = (a.rank()?, b.rank()?);
    let top = if ra >= rb { a } else { b };
    if top == Primitive::Char || (ra == rb && a != b) {
        return Some(Primitive::Int);
    }
    Some(top)
}

/// Operation kind of a binary arithmetic operator: `real` dominates, otherwise
/// the promoted integer kind (bool is not arithmetic).
pub fn arithmetic_kind(
    a: Primitive,
    b: Primitive,
) -> Option<Primitive> {
    if !a.is_numeric() || !b.is_numeric() {
        return None;
    }
    if a == Primitive::Real || b == Primitive::Real {
        return Some(Primitive::Real);
    }
    promote(a, b)
}

/// Extra argument of a type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeArgument {
    Type(TypeDescriptor),
    Literal(i64),
}

/// Structural type: defining path plus extra arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeDescriptor {
    #[serde(serialize_with = "serialize_path")]
    pub main: ScopePath,
    pub extra: Vec<TypeArgument>,
}

fn serialize_path<S: serde::Serializer>(
    path: &ScopePath,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string())
}

impl TypeDescriptor {
    pub fn primitive(kind: Primitive) -> Self {
        Self {
            main: ScopePath::root().child(Block::primitive(kind.name())),
            extra: Vec::new(),
        }
    }

    pub fn void() -> Self {
        Self::primitive(Primitive::Void)
    }

    pub fn unknown() -> Self {
        Self::primitive(Primitive::Unknown)
    }

    /// Open list `T[]`
    pub fn list_of(element: TypeDescriptor) -> Self {
        Self {
            main: ScopePath::root().child(Block::primitive("list")),
            extra: vec![TypeArgument::Type(element)],
        }
    }

    /// Fixed-length list `T[n]`
    pub fn fixed_list(
        element: TypeDescriptor,
        length: i64,
    ) -> Self {
        Self {
            main: ScopePath::root().child(Block::primitive("list")),
            extra: vec![TypeArgument::Type(element), TypeArgument::Literal(length)],
        }
    }

    pub fn tuple(items: Vec<TypeDescriptor>) -> Self {
        Self {
            main: ScopePath::root().child(Block::primitive("tuple")),
            extra: items.into_iter().map(TypeArgument::Type).collect(),
        }
    }

    /// A user-declared class, struct or interface
    pub fn user(path: ScopePath) -> Self {
        Self {
            main: path,
            extra: Vec::new(),
        }
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self.main.blocks() {
            [only] if only.kind == BlockKind::Primitive => Primitive::from_name(&only.name),
            _ => None,
        }
    }

    pub fn is(
        &self,
        kind: Primitive,
    ) -> bool {
        self.as_primitive() == Some(kind)
    }

    pub fn is_unknown(&self) -> bool {
        self.is(Primitive::Unknown)
    }

    pub fn is_void(&self) -> bool {
        self.is(Primitive::Void)
    }

    pub fn is_numeric(&self) -> bool {
        self.as_primitive().map_or(false, |p| p.is_numeric())
    }

    pub fn is_integer(&self) -> bool {
        self.as_primitive().map_or(false, |p| p.is_integer())
    }

    pub fn is_list(&self) -> bool {
        self.is(Primitive::List)
    }

    pub fn is_tuple(&self) -> bool {
        self.is(Primitive::Tuple)
    }

    /// Declared type (class/struct/interface path)
    pub fn is_user(&self) -> bool {
        self.main.last().map_or(false, |b| b.kind.is_type())
    }

    /// Types that accept `null`
    pub fn is_reference(&self) -> bool {
        match self.as_primitive() {
            Some(Primitive::String | Primitive::List | Primitive::Null | Primitive::Unknown) => {
                true
            }
            Some(_) => false,
            None => self.main.last().map_or(false, |b| b.kind != BlockKind::Struct),
        }
    }

    /// Element type of a list
    pub fn element(&self) -> Option<&TypeDescriptor> {
        if !self.is_list() {
            return None;
        }
        match self.extra.first() {
            Some(TypeArgument::Type(t)) => Some(t),
            _ => None,
        }
    }

    /// Fixed length of a `T[n]` list
    pub fn fixed_length(&self) -> Option<i64> {
        if !self.is_list() {
            return None;
        }
        self.extra.iter().find_map(|a| match a {
            TypeArgument::Literal(n) => Some(*n),
            TypeArgument::Type(_) => None,
        })
    }

    /// Same list with the fixed length dropped
    pub fn opened(&self) -> TypeDescriptor {
        match self.element() {
            Some(element) => TypeDescriptor::list_of(element.clone()),
            None => self.clone(),
        }
    }

    pub fn tuple_items(&self) -> Vec<&TypeDescriptor> {
        if !self.is_tuple() {
            return Vec::new();
        }
        self.extra
            .iter()
            .filter_map(|a| match a {
                TypeArgument::Type(t) => Some(t),
                TypeArgument::Literal(_) => None,
            })
            .collect()
    }

    /// Host language spelling (`double`, `List<int>`, `(int, string)`)
    pub fn host_name(&self) -> String {
        match self.as_primitive() {
            Some(Primitive::List) => {
                let element = self
                    .element()
                    .map(|e| e.host_name())
                    .unwrap_or_else(|| "object".to_string());
                format!("List<{}>", element)
            }
            Some(Primitive::Tuple) => {
                let items: Vec<String> = self.tuple_items().iter().map(|t| t.host_name()).collect();
                format!("({})", items.join(", "))
            }
            Some(p) => p.host_name().to_string(),
            None => self.main.dotted(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.as_primitive() {
            Some(Primitive::List) => {
                let element = self.element().map(|e| e.to_string()).unwrap_or_default();
                match self.fixed_length() {
                    Some(n) => write!(f, "{}[{}]", element, n),
                    None => write!(f, "{}[]", element),
                }
            }
            Some(Primitive::Tuple) => {
                let items: Vec<String> = self.tuple_items().iter().map(|t| t.to_string()).collect();
                write!(f, "({})", items.join(", "))
            }
            Some(p) => f.write_str(p.name()),
            None => f.write_str(&self.main.dotted()),
        }
    }
}

/// Implicit conversion strength, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Conversion {
    Exact,
    Widening,
    Narrowing,
    Incompatible,
}

/// Conversion between two primitive scalar kinds
pub fn classify_primitive(
    from: Primitive,
    to: Primitive,
) -> Conversion {
    if from == to {
        return Conversion::Exact;
    }
    if from == Primitive::Unknown || to == Primitive::Unknown {
        return Conversion::Widening;
    }
    if from.is_numeric() && to.is_numeric() {
        // 整数到 char 只能显式转换
        if to == Primitive::Char {
            return Conversion::Narrowing;
        }
        let (rf, rt) = (from.rank().unwrap_or(0), to.rank().unwrap_or(0));
        return if rf <= rt {
            Conversion::Widening
        } else {
            Conversion::Narrowing
        };
    }
    Conversion::Incompatible
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promote_is_max_of_lattice() {
        assert_eq!(promote(Primitive::Byte, Primitive::Short), Some(Primitive::Short));
        assert_eq!(promote(Primitive::Int, Primitive::UInt), Some(Primitive::UInt));
        assert_eq!(promote(Primitive::Char, Primitive::Byte), Some(Primitive::Int));
        assert_eq!(promote(Primitive::Char, Primitive::Char), Some(Primitive::Int));
        assert_eq!(promote(Primitive::ULong, Primitive::Real), Some(Primitive::Real));
        assert_eq!(promote(Primitive::String, Primitive::Int), None);
    }

    #[test]
    fn test_promote_symmetry_over_lattice() {
        let all = [
            Primitive::Bool,
            Primitive::SByte,
            Primitive::Byte,
            Primitive::Short,
            Primitive::UShort,
            Primitive::Int,
            Primitive::UInt,
            Primitive::Long,
            Primitive::ULong,
            Primitive::Char,
            Primitive::Real,
        ];
        for a in all {
            for b in all {
                assert_eq!(promote(a, b), promote(b, a), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_descriptor_spelling() {
        let int = TypeDescriptor::primitive(Primitive::Int);
        assert_eq!(TypeDescriptor::list_of(int.clone()).to_string(), "int[]");
        assert_eq!(TypeDescriptor::fixed_list(int.clone(), 3).to_string(), "int[3]");
        assert_eq!(
            TypeDescriptor::list_of(TypeDescriptor::primitive(Primitive::Real)).host_name(),
            "List<double>"
        );
        let pair = TypeDescriptor::tuple(vec![int.clone(), TypeDescriptor::primitive(Primitive::String)]);
        assert_eq!(pair.to_string(), "(int, string)");
        assert_eq!(pair.host_name(), "(int, string)");
    }

    #[test]
    fn test_structural_equality_includes_extra() {
        let int = TypeDescriptor::primitive(Primitive::Int);
        assert_ne!(
            TypeDescriptor::fixed_list(int.clone(), 3),
            TypeDescriptor::list_of(int.clone())
        );
        assert_eq!(TypeDescriptor::fixed_list(int.clone(), 3).opened(), TypeDescriptor::list_of(int));
    }

    #[test]
    fn test_classify_primitive() {
        assert_eq!(classify_primitive(Primitive::Int, Primitive::Long), Conversion::Widening);
        assert_eq!(classify_primitive(Primitive::Real, Primitive::Int), Conversion::Narrowing);
        assert_eq!(classify_primitive(Primitive::Int, Primitive::Char), Conversion::Narrowing);
        assert_eq!(classify_primitive(Primitive::Bool, Primitive::Int), Conversion::Incompatible);
        assert_eq!(classify_primitive(Primitive::String, Primitive::Int), Conversion::Incompatible);
    }
}
