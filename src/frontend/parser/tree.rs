//! Syntax tree arena
//!
//! Branches live in one arena per compilation and refer to their children by
//! id; a branch owns its children. Backtracking truncates the arena back to a
//! mark, so ids allocated by a failed alternative are never observed.

use indexmap::IndexSet;
use smallvec::SmallVec;
use std::fmt;

use super::extra::Extra;
use crate::frontend::const_eval::Value;
use crate::frontend::symbols::scope::ScopePath;
use crate::frontend::symbols::types::TypeDescriptor;
use crate::util::span::Span;

/// Arena index of a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(pub u32);

impl BranchId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interned scope path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// Precedence levels of the expression grammar, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Ternary,
    LogicalOr,
    LogicalXor,
    LogicalAnd,
    Equality,
    Relational,
    BitOr,
    BitXor,
    BitAnd,
    Shift,
    Additive,
    Multiplicative,
    Power,
    Unary,
    Postfix,
}

impl Level {
    /// Level of a binary operator, if it is one
    pub fn of_operator(op: &str) -> Option<Level> {
        let level = match op {
            "||" => Level::LogicalOr,
            "^^" => Level::LogicalXor,
            "&&" => Level::LogicalAnd,
            "==" | "!=" => Level::Equality,
            "<" | "<=" | ">" | ">=" => Level::Relational,
            "|" => Level::BitOr,
            "^" => Level::BitXor,
            "&" => Level::BitAnd,
            "<<" | ">>" => Level::Shift,
            "+" | "-" => Level::Additive,
            "*" | "/" | "%" => Level::Multiplicative,
            "**" => Level::Power,
            _ => return None,
        };
        Some(level)
    }

    pub fn is_right_associative(&self) -> bool {
        matches!(self, Level::Power | Level::Ternary)
    }
}

/// Grammar tag of a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    // declarations
    Program,
    Namespace,
    Class,
    Struct,
    Interface,
    Function,
    Constructor,
    Property,
    Modifiers,
    TypeName,
    ListOf,
    Parameters,
    Parameter,
    BaseCall,
    // statements
    Block,
    VarDecl,
    Assignment,
    Step,
    If,
    While,
    For,
    Return,
    Break,
    Continue,
    Empty,
    Evaluate,
    // expressions
    Ternary,
    Chain(Level),
    Power,
    Operator,
    Unary,
    Literal,
    Name,
    This,
    Base,
    AccessChain,
    Call,
    Index,
    Member,
    New,
    Conversion,
    List,
    Tuple,
}

impl Label {
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Label::Namespace
                | Label::Class
                | Label::Struct
                | Label::Interface
                | Label::Function
                | Label::Constructor
                | Label::Property
        )
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            Label::Block
                | Label::VarDecl
                | Label::Assignment
                | Label::Step
                | Label::If
                | Label::While
                | Label::For
                | Label::Return
                | Label::Break
                | Label::Continue
                | Label::Empty
                | Label::Evaluate
        )
    }
}

/// Result attached to a branch
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Annotation {
    #[default]
    None,
    ResolvedType(TypeDescriptor),
    ParameterFlags { optional: bool, variadic: bool },
    /// Payload narrowed by the parser (call candidates, static heads)
    Narrowed(Extra),
    Literal(Value),
}

/// One parse-tree node
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub label: Label,
    /// Operator text, identifier, type name or declaration name
    pub text: String,
    pub children: SmallVec<[BranchId; 4]>,
    pub span: Span,
    pub scope: ScopeId,
    pub annotation: Annotation,
}

impl Branch {
    pub fn new(
        label: Label,
        text: impl Into<String>,
        span: Span,
        scope: ScopeId,
    ) -> Self {
        Self {
            label,
            text: text.into(),
            children: SmallVec::new(),
            span,
            scope,
            annotation: Annotation::None,
        }
    }

    pub fn with_children(
        mut self,
        children: impl IntoIterator<Item = BranchId>,
    ) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_annotation(
        mut self,
        annotation: Annotation,
    ) -> Self {
        self.annotation = annotation;
        self
    }
}

/// Branch arena plus the interned scopes branches refer to
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    branches: Vec<Branch>,
    scopes: IndexSet<ScopePath>,
    /// Aggregate program branch
    pub program: Option<BranchId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        let mut tree = Self::default();
        tree.intern(ScopePath::root());
        tree
    }

    pub fn alloc(
        &mut self,
        branch: Branch,
    ) -> BranchId {
        let id = BranchId(self.branches.len() as u32);
        self.branches.push(branch);
        id
    }

    #[inline]
    pub fn get(
        &self,
        id: BranchId,
    ) -> &Branch {
        &self.branches[id.index()]
    }

    #[inline]
    pub fn get_mut(
        &mut self,
        id: BranchId,
    ) -> &mut Branch {
        &mut self.branches[id.index()]
    }

    pub fn children(
        &self,
        id: BranchId,
    ) -> &[BranchId] {
        &self.branches[id.index()].children
    }

    pub fn child(
        &self,
        id: BranchId,
        n: usize,
    ) -> Option<BranchId> {
        self.branches[id.index()].children.get(n).copied()
    }

    pub fn push_child(
        &mut self,
        parent: BranchId,
        child: BranchId,
    ) {
        self.branches[parent.index()].children.push(child);
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Current allocation mark
    pub fn mark(&self) -> usize {
        self.branches.len()
    }

    /// Drop every branch allocated after `mark`
    pub fn truncate(
        &mut self,
        mark: usize,
    ) {
        self.branches.truncate(mark);
    }

    pub fn intern(
        &mut self,
        path: ScopePath,
    ) -> ScopeId {
        let (index, _) = self.scopes.insert_full(path);
        ScopeId(index as u32)
    }

    pub fn scope(
        &self,
        id: ScopeId,
    ) -> &ScopePath {
        &self.scopes[id.0 as usize]
    }

    pub fn scope_of(
        &self,
        branch: BranchId,
    ) -> &ScopePath {
        self.scope(self.get(branch).scope)
    }

    /// Indented outline of a subtree, for tests and debugging
    pub fn dump(
        &self,
        root: BranchId,
    ) -> String {
        let mut out = String::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let branch = self.get(id);
            out.push_str(&"  ".repeat(depth));
            out.push_str(&format!("{}", DumpLabel(branch)));
            out.push('\n');
            for child in branch.children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }
}

struct DumpLabel<'a>(&'a Branch);

impl fmt::Display for DumpLabel<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let branch = self.0;
        match branch.label {
            Label::Chain(level) => write!(f, "Chain({:?})", level)?,
            label => write!(f, "{:?}", label)?,
        }
        if !branch.text.is_empty() {
            write!(f, " {}", branch.text)?;
        }
        Ok(())
    }
}
