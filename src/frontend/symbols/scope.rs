//! Blocks and scope paths
//!
//! A scope path is the ordered chain of blocks from the outermost declaration
//! to the innermost one. It is half of every symbol-table key, so it compares
//! structurally.

use smallvec::SmallVec;
use std::fmt;

/// Block classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockKind {
    Namespace,
    Class,
    Struct,
    Interface,
    Function,
    Constructor,
    Unnamed,
    Primitive,
    Extra,
}

impl BlockKind {
    /// Kinds that define a type
    pub fn is_type(&self) -> bool {
        matches!(self, BlockKind::Class | BlockKind::Struct | BlockKind::Interface)
    }

    /// Kinds that own executable code
    pub fn is_callable(&self) -> bool {
        matches!(self, BlockKind::Function | BlockKind::Constructor)
    }

    /// Kinds that hold members (types and namespaces)
    pub fn is_container(&self) -> bool {
        self.is_type() || matches!(self, BlockKind::Namespace)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let text = match self {
            BlockKind::Namespace => "namespace",
            BlockKind::Class => "class",
            BlockKind::Struct => "struct",
            BlockKind::Interface => "interface",
            BlockKind::Function => "function",
            BlockKind::Constructor => "constructor",
            BlockKind::Unnamed => "block",
            BlockKind::Primitive => "primitive",
            BlockKind::Extra => "extra",
        };
        f.write_str(text)
    }
}

/// One step of a scope path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Block {
    pub kind: BlockKind,
    pub name: String,
    /// Distinguishes anonymous blocks and function overloads sharing a parent
    pub generation: u32,
}

impl Block {
    pub fn new(
        kind: BlockKind,
        name: impl Into<String>,
        generation: u32,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            generation,
        }
    }

    pub fn unnamed(generation: u32) -> Self {
        Self::new(BlockKind::Unnamed, "", generation)
    }

    pub fn primitive(name: &str) -> Self {
        Self::new(BlockKind::Primitive, name, 0)
    }
}

/// Ordered block sequence, outermost first
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ScopePath(SmallVec<[Block; 4]>);

impl ScopePath {
    /// The global scope
    pub fn root() -> Self {
        Self(SmallVec::new())
    }

    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        Self(blocks.into_iter().collect())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.0
    }

    pub fn last(&self) -> Option<&Block> {
        self.0.last()
    }

    /// New path one block deeper
    pub fn child(
        &self,
        block: Block,
    ) -> Self {
        let mut blocks = self.0.clone();
        blocks.push(block);
        Self(blocks)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        let mut blocks = self.0.clone();
        blocks.pop();
        Some(Self(blocks))
    }

    pub fn starts_with(
        &self,
        prefix: &ScopePath,
    ) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// This path and every enclosing path, innermost first, ending at root
    pub fn ancestors(&self) -> impl Iterator<Item = ScopePath> + '_ {
        (0..=self.0.len())
            .rev()
            .map(move |n| Self(self.0[..n].iter().cloned().collect()))
    }

    /// Innermost enclosing function or constructor path
    pub fn enclosing_callable(&self) -> Option<ScopePath> {
        let index = self.0.iter().rposition(|b| b.kind.is_callable())?;
        Some(Self(self.0[..=index].iter().cloned().collect()))
    }

    /// Innermost enclosing class/struct/interface path
    pub fn enclosing_type(&self) -> Option<ScopePath> {
        let index = self.0.iter().rposition(|b| b.kind.is_type())?;
        Some(Self(self.0[..=index].iter().cloned().collect()))
    }

    /// Innermost enclosing type or namespace (the member container)
    pub fn enclosing_container(&self) -> ScopePath {
        match self.0.iter().rposition(|b| b.kind.is_container()) {
            Some(index) => Self(self.0[..=index].iter().cloned().collect()),
            None => Self::root(),
        }
    }

    /// Dotted name over named blocks only (`Geo.Point`)
    pub fn dotted(&self) -> String {
        self.0
            .iter()
            .filter(|b| b.kind != BlockKind::Unnamed)
            .map(|b| b.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for ScopePath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<global>");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|b| match b.kind {
                BlockKind::Unnamed => format!("{{{}}}", b.generation),
                _ => b.name.clone(),
            })
            .collect();
        f.write_str(&parts.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo_point() -> ScopePath {
        ScopePath::root()
            .child(Block::new(BlockKind::Namespace, "Geo", 0))
            .child(Block::new(BlockKind::Class, "Point", 0))
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(geo_point(), geo_point());
        let other = ScopePath::root().child(Block::new(BlockKind::Namespace, "Geo", 1));
        assert_ne!(geo_point().parent().unwrap(), other);
    }

    #[test]
    fn test_ancestors_innermost_first() {
        let names: Vec<String> = geo_point().ancestors().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["Geo.Point", "Geo", "<global>"]);
    }

    #[test]
    fn test_enclosing_lookups() {
        let body = geo_point()
            .child(Block::new(BlockKind::Function, "Len", 0))
            .child(Block::unnamed(2));
        assert_eq!(body.enclosing_type(), Some(geo_point()));
        assert_eq!(
            body.enclosing_callable().unwrap().last().unwrap().name,
            "Len"
        );
        assert_eq!(body.enclosing_container(), geo_point());
        assert_eq!(body.dotted(), "Geo.Point.Len");
        assert_eq!(body.to_string(), "Geo.Point.Len.{2}");
    }
}
