//! 符号表
//!
//! Per-compilation registries of types, namespaces, functions, constructors,
//! properties and local variables, all keyed by scope path. Built once per
//! compilation and dropped with its context.

pub mod scope;
pub mod types;

use indexmap::IndexMap;
use std::fmt;

use crate::frontend::parser::tree::BranchId;
use crate::util::span::Span;
use scope::{BlockKind, ScopePath};
use types::TypeDescriptor;

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        })
    }
}

/// Declaration flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub visibility: Visibility,
    /// Visibility was written explicitly
    pub explicit_visibility: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_sealed: bool,
    pub is_new: bool,
    pub is_multiconst: bool,
}

impl Modifiers {
    /// Parse modifier words; `container` decides the default visibility
    pub fn from_words<'a>(
        words: impl IntoIterator<Item = &'a str>,
        container: Option<BlockKind>,
    ) -> Self {
        let default = match container {
            Some(BlockKind::Class) | Some(BlockKind::Struct) => Visibility::Private,
            _ => Visibility::Public,
        };
        let mut modifiers = Modifiers {
            visibility: default,
            explicit_visibility: false,
            is_static: false,
            is_abstract: false,
            is_virtual: false,
            is_override: false,
            is_sealed: false,
            is_new: false,
            is_multiconst: false,
        };
        for word in words {
            match word {
                "public" => modifiers.set_visibility(Visibility::Public),
                "protected" => modifiers.set_visibility(Visibility::Protected),
                "private" => modifiers.set_visibility(Visibility::Private),
                "static" => modifiers.is_static = true,
                "abstract" => modifiers.is_abstract = true,
                "virtual" => modifiers.is_virtual = true,
                "override" => modifiers.is_override = true,
                "sealed" => modifiers.is_sealed = true,
                "new" => modifiers.is_new = true,
                "multiconst" => modifiers.is_multiconst = true,
                _ => {}
            }
        }
        if container == Some(BlockKind::Interface) {
            modifiers.is_abstract = true;
        }
        modifiers
    }

    fn set_visibility(
        &mut self,
        visibility: Visibility,
    ) {
        self.visibility = visibility;
        self.explicit_visibility = true;
    }

    pub fn is_polymorphic(&self) -> bool {
        self.is_virtual || self.is_abstract || self.is_override
    }
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    pub ty: TypeDescriptor,
    pub optional: bool,
    pub variadic: bool,
    pub default: Option<BranchId>,
    pub span: Span,
}

/// Function or constructor descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    /// The function's own scope (owner plus a block carrying the overload ordinal)
    pub path: ScopePath,
    /// Enclosing type or namespace
    pub owner: ScopePath,
    pub kind: BlockKind,
    pub name: String,
    pub modifiers: Modifiers,
    pub params: Vec<ParameterInfo>,
    pub return_type: TypeDescriptor,
    pub has_body: bool,
    pub span: Span,
}

impl FunctionInfo {
    /// Number of parameters a call must supply
    pub fn required_arity(&self) -> usize {
        self.params
            .iter()
            .filter(|p| !p.optional && !p.variadic)
            .count()
    }

    pub fn is_variadic(&self) -> bool {
        self.params.last().map_or(false, |p| p.variadic)
    }

    /// Whether `count` arguments can be bound to this signature
    pub fn accepts_arity(
        &self,
        count: usize,
    ) -> bool {
        count >= self.required_arity() && (self.is_variadic() || count <= self.params.len())
    }

    /// Parameter types only
    pub fn signature(&self) -> Vec<&TypeDescriptor> {
        self.params.iter().map(|p| &p.ty).collect()
    }

    /// `Name(int, real)` for diagnostics
    pub fn display_signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// Class, struct or interface descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub path: ScopePath,
    pub kind: BlockKind,
    pub name: String,
    pub modifiers: Modifiers,
    pub base: Option<ScopePath>,
    pub span: Span,
}

/// Property descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub owner: ScopePath,
    pub name: String,
    pub modifiers: Modifiers,
    pub ty: TypeDescriptor,
    pub span: Span,
}

/// Local variable or parameter, recorded per function scope
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub function: ScopePath,
    pub name: String,
    pub ty: TypeDescriptor,
    pub span: Span,
}

/// Registries for one compilation
#[derive(Debug, Clone, Default)]
pub struct SymbolTables {
    types: IndexMap<ScopePath, TypeInfo>,
    namespaces: IndexMap<ScopePath, Span>,
    /// (parent, name) → type or namespace path
    named: IndexMap<(ScopePath, String), ScopePath>,
    functions: IndexMap<ScopePath, FunctionInfo>,
    /// (owner, name) → overload paths in declaration order
    overloads: IndexMap<(ScopePath, String), Vec<ScopePath>>,
    constructors: IndexMap<ScopePath, Vec<ScopePath>>,
    properties: IndexMap<(ScopePath, String), PropertyInfo>,
    variables: IndexMap<(ScopePath, String), Vec<VariableInfo>>,
}

impl SymbolTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace; re-opening an existing one is allowed
    pub fn add_namespace(
        &mut self,
        path: ScopePath,
        span: Span,
    ) {
        if let (Some(parent), Some(block)) = (path.parent(), path.last()) {
            self.named
                .entry((parent, block.name.clone()))
                .or_insert_with(|| path.clone());
        }
        self.namespaces.entry(path).or_insert(span);
    }

    /// Register a type; returns false when the name is already taken
    pub fn add_type(
        &mut self,
        info: TypeInfo,
    ) -> bool {
        let parent = info.path.parent().unwrap_or_default();
        let key = (parent, info.name.clone());
        if self.named.contains_key(&key) {
            return false;
        }
        self.named.insert(key, info.path.clone());
        self.types.insert(info.path.clone(), info);
        true
    }

    pub fn set_base(
        &mut self,
        path: &ScopePath,
        base: Option<ScopePath>,
    ) {
        if let Some(info) = self.types.get_mut(path) {
            info.base = base;
        }
    }

    pub fn add_function(
        &mut self,
        info: FunctionInfo,
    ) {
        if info.kind == BlockKind::Constructor {
            self.constructors
                .entry(info.owner.clone())
                .or_default()
                .push(info.path.clone());
        } else {
            self.overloads
                .entry((info.owner.clone(), info.name.clone()))
                .or_default()
                .push(info.path.clone());
        }
        self.functions.insert(info.path.clone(), info);
    }

    /// Register a property; returns false on a duplicate name in the same owner
    pub fn add_property(
        &mut self,
        info: PropertyInfo,
    ) -> bool {
        let key = (info.owner.clone(), info.name.clone());
        if self.properties.contains_key(&key) {
            return false;
        }
        self.properties.insert(key, info);
        true
    }

    pub fn add_variable(
        &mut self,
        info: VariableInfo,
    ) {
        self.variables
            .entry((info.function.clone(), info.name.clone()))
            .or_default()
            .push(info);
    }

    /// Forget recorded locals before a function set is resolved again
    pub fn clear_variables(&mut self) {
        self.variables.clear();
    }

    pub fn type_info(
        &self,
        path: &ScopePath,
    ) -> Option<&TypeInfo> {
        self.types.get(path)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.values()
    }

    pub fn is_namespace(
        &self,
        path: &ScopePath,
    ) -> bool {
        self.namespaces.contains_key(path)
    }

    pub fn function(
        &self,
        path: &ScopePath,
    ) -> Option<&FunctionInfo> {
        self.functions.get(path)
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionInfo> {
        self.functions.values()
    }

    /// Overloads declared directly in `owner`
    pub fn overloads(
        &self,
        owner: &ScopePath,
        name: &str,
    ) -> Vec<&FunctionInfo> {
        self.overloads
            .get(&(owner.clone(), name.to_string()))
            .map(|paths| paths.iter().filter_map(|p| self.functions.get(p)).collect())
            .unwrap_or_default()
    }

    pub fn constructors(
        &self,
        owner: &ScopePath,
    ) -> Vec<&FunctionInfo> {
        self.constructors
            .get(owner)
            .map(|paths| paths.iter().filter_map(|p| self.functions.get(p)).collect())
            .unwrap_or_default()
    }

    pub fn property(
        &self,
        owner: &ScopePath,
        name: &str,
    ) -> Option<&PropertyInfo> {
        self.properties.get(&(owner.clone(), name.to_string()))
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyInfo> {
        self.properties.values()
    }

    pub fn variables(
        &self,
        function: &ScopePath,
        name: &str,
    ) -> &[VariableInfo] {
        self.variables
            .get(&(function.clone(), name.to_string()))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Type or namespace named `name` directly inside `parent`
    pub fn child_named(
        &self,
        parent: &ScopePath,
        name: &str,
    ) -> Option<&ScopePath> {
        self.named.get(&(parent.clone(), name.to_string()))
    }

    /// Nearest type or namespace called `name`, searching outward from `from`
    pub fn find_named(
        &self,
        from: &ScopePath,
        name: &str,
    ) -> Option<ScopePath> {
        from.ancestors()
            .find_map(|scope| self.child_named(&scope, name).cloned())
    }

    /// Resolve a dotted name (`Geo.Point`) outward from `from`
    pub fn resolve_dotted(
        &self,
        from: &ScopePath,
        parts: &[&str],
    ) -> Option<ScopePath> {
        let (first, rest) = parts.split_first()?;
        let mut path = self.find_named(from, first)?;
        for part in rest {
            path = self.child_named(&path, part)?.clone();
        }
        Some(path)
    }

    /// Base chain of a type, nearest first, stopping at a cycle
    pub fn bases(
        &self,
        path: &ScopePath,
    ) -> Vec<ScopePath> {
        let mut chain = Vec::new();
        let mut current = self.types.get(path).and_then(|t| t.base.clone());
        while let Some(base) = current {
            if &base == path || chain.contains(&base) {
                break;
            }
            current = self.types.get(&base).and_then(|t| t.base.clone());
            chain.push(base);
        }
        chain
    }

    /// The type itself followed by its bases
    pub fn lineage(
        &self,
        path: &ScopePath,
    ) -> Vec<ScopePath> {
        let mut chain = vec![path.clone()];
        chain.extend(self.bases(path));
        chain
    }

    pub fn is_subtype(
        &self,
        derived: &ScopePath,
        base: &ScopePath,
    ) -> bool {
        derived == base || self.bases(derived).contains(base)
    }

    /// Overloads named `name` visible from `from`: the innermost container
    /// level (type plus its bases, or namespace) that declares any wins.
    pub fn visible_functions(
        &self,
        from: &ScopePath,
        name: &str,
    ) -> Vec<&FunctionInfo> {
        for scope in from.ancestors() {
            let is_type = scope.last().map_or(false, |b| b.kind.is_type());
            let is_container = scope.is_root() || scope.last().map_or(false, |b| b.kind.is_container());
            if !is_container {
                continue;
            }
            let owners = if is_type {
                self.lineage(&scope)
            } else {
                vec![scope.clone()]
            };
            let found: Vec<&FunctionInfo> = owners
                .iter()
                .flat_map(|owner| self.overloads(owner, name))
                .collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// Functions named `name` on a type and its bases
    pub fn member_functions(
        &self,
        owner: &ScopePath,
        name: &str,
    ) -> Vec<&FunctionInfo> {
        self.lineage(owner)
            .iter()
            .flat_map(|o| self.overloads(o, name))
            .collect()
    }

    /// Property `name` on a type or its bases
    pub fn member_property(
        &self,
        owner: &ScopePath,
        name: &str,
    ) -> Option<&PropertyInfo> {
        self.lineage(owner)
            .iter()
            .find_map(|o| self.property(o, name))
    }
}

#[cfg(test)]
mod tests;
