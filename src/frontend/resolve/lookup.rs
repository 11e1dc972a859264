//! 名字查找
//!
//! Identifier lookup order: locals and parameters (innermost block first),
//! properties (own type and its bases, then enclosing namespaces), function
//! groups (same order, then built-ins), and finally types and namespaces.

use super::declare::owner_name;
use super::{Resolution, Resolver, Role};
use crate::frontend::const_eval::builtins;
use crate::frontend::parser::{BranchId, Extra, Label};
use crate::frontend::symbols::scope::{BlockKind, ScopePath};
use crate::frontend::symbols::types::TypeDescriptor;
use crate::frontend::symbols::{FunctionInfo, Modifiers, PropertyInfo, SymbolTables, Visibility};
use crate::util::span::Span;

/// Whether `path` names a class, struct or interface
pub(super) fn is_type_path(path: &ScopePath) -> bool {
    path.last().map_or(false, |b| b.kind.is_type())
}

/// `Type.f(int)` or `f(int)` for free functions at global scope
pub(super) fn qualified_signature(info: &FunctionInfo) -> String {
    if info.owner.is_root() {
        info.display_signature()
    } else {
        format!("{}.{}", info.owner.dotted(), info.display_signature())
    }
}

/// Member visibility check from code located at `from`
pub(super) fn accessible(
    symbols: &SymbolTables,
    owner: &ScopePath,
    modifiers: &Modifiers,
    from: &ScopePath,
) -> bool {
    match modifiers.visibility {
        Visibility::Public => true,
        Visibility::Private => from.starts_with(owner),
        Visibility::Protected => {
            from.starts_with(owner)
                || from
                    .enclosing_type()
                    .map_or(false, |t| symbols.is_subtype(&t, owner))
        }
    }
}

impl<'c> Resolver<'c> {
    /// Host class path holding the free functions and variables of `owner`
    pub(super) fn module_path(
        &self,
        owner: &ScopePath,
    ) -> String {
        if owner.is_root() {
            self.config.host_module.clone()
        } else {
            format!("{}.{}", owner.dotted(), self.config.host_module)
        }
    }

    pub(super) fn local(
        &self,
        name: &str,
    ) -> Option<&TypeDescriptor> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Property visible by simple name from `scope`
    fn visible_property(
        &self,
        scope: &ScopePath,
        name: &str,
    ) -> Option<PropertyInfo> {
        for container in scope.ancestors() {
            let found = match container.last().map(|b| b.kind) {
                Some(kind) if kind.is_type() => self.symbols.member_property(&container, name),
                Some(BlockKind::Namespace) | None => self.symbols.property(&container, name),
                Some(_) => continue,
            };
            if let Some(property) = found {
                return Some(property.clone());
            }
        }
        None
    }

    /// `Name` leaf
    pub(super) fn name(
        &mut self,
        id: BranchId,
        role: Role,
    ) -> Resolution {
        let tree = self.tree;
        let branch = tree.get(id);
        let name = branch.text.as_str();
        let scope = tree.scope(branch.scope);
        let resolution = self.lookup(scope, name, branch.span);
        if role == Role::Value {
            self.require_value(resolution, branch.span)
        } else {
            resolution
        }
    }

    fn lookup(
        &mut self,
        scope: &ScopePath,
        name: &str,
        span: Span,
    ) -> Resolution {
        if let Some(ty) = self.local(name) {
            let ty = ty.clone();
            return Resolution::new(ty.clone(), name)
                .placed()
                .with_target(Extra::Variable {
                    name: name.to_string(),
                    ty,
                });
        }

        let mut hidden = None;
        if let Some(property) = self.visible_property(scope, name) {
            if accessible(self.symbols, &property.owner, &property.modifiers, scope) {
                return self.implicit_property(&property, span);
            }
            hidden = Some(format!("'{}' is inaccessible due to its protection level", name));
        }

        let functions = self.symbols.visible_functions(scope, name);
        if !functions.is_empty() {
            let candidates = functions.iter().map(|f| f.path.clone()).collect();
            return Resolution::new(TypeDescriptor::unknown(), name).with_target(Extra::FunctionOverloads {
                name: name.to_string(),
                candidates,
            });
        }
        if builtins::lookup(name).is_some() {
            return Resolution::new(TypeDescriptor::unknown(), name).with_target(Extra::FunctionOverloads {
                name: name.to_string(),
                candidates: Vec::new(),
            });
        }

        if let Some(path) = self.symbols.find_named(scope, name) {
            let code = path.dotted();
            return Resolution::new(TypeDescriptor::unknown(), code).with_target(Extra::StaticMember(path));
        }

        let message = hidden.unwrap_or_else(|| format!("name '{}' does not exist in the current context", name));
        self.error(span, message);
        Resolution::unknown()
    }

    /// Property referenced by simple name inside its container
    fn implicit_property(
        &mut self,
        property: &PropertyInfo,
        span: Span,
    ) -> Resolution {
        let is_instance = is_type_path(&property.owner) && !property.modifiers.is_static;
        if !self.check_state_access(&property.name, span) {
            return Resolution::new(property.ty.clone(), property.name.clone());
        }
        if is_instance && self.context().is_static {
            self.error(
                span,
                format!(
                    "an object reference is required for the non-static member '{}.{}'",
                    property.owner.dotted(),
                    property.name
                ),
            );
            return Resolution::new(property.ty.clone(), property.name.clone());
        }
        let code = if is_instance {
            property.name.clone()
        } else if is_type_path(&property.owner) {
            format!("{}.{}", property.owner.dotted(), property.name)
        } else {
            format!("{}.{}", self.module_path(&property.owner), property.name)
        };
        Resolution::new(property.ty.clone(), code)
            .placed()
            .with_target(Extra::Property {
                owner: property.owner.clone(),
                name: property.name.clone(),
            })
    }

    /// Multiconst functions cannot touch state outside their own frame
    pub(super) fn check_state_access(
        &mut self,
        name: &str,
        span: Span,
    ) -> bool {
        if !self.context().multiconst {
            return true;
        }
        let function = self
            .context()
            .function
            .as_ref()
            .map(|f| f.name.clone())
            .unwrap_or_default();
        self.error(
            span,
            format!(
                "multiconst function '{}' cannot reference outer state '{}'",
                function, name
            ),
        );
        false
    }

    /// Reject method groups, types and namespaces where a value is needed
    pub(super) fn require_value(
        &mut self,
        resolution: Resolution,
        span: Span,
    ) -> Resolution {
        match &resolution.target {
            Some(Extra::FunctionOverloads { name, .. }) => {
                let message = format!("method group '{}' cannot be used as a value", name);
                self.error(span, message);
                Resolution::unknown()
            }
            Some(Extra::StaticMember(path)) | Some(Extra::ConstructorOverloads { owner: path, .. }) => {
                let what = if self.symbols.is_namespace(path) {
                    "namespace"
                } else {
                    "type"
                };
                let message = format!("'{}' is a {} but is used like a variable", path.dotted(), what);
                self.error(span, message);
                Resolution::unknown()
            }
            _ => resolution,
        }
    }

    /// `this` and `base` leaves
    pub(super) fn this_or_base(
        &mut self,
        id: BranchId,
    ) -> Resolution {
        let tree = self.tree;
        let branch = tree.get(id);
        let keyword = if branch.label == Label::This { "this" } else { "base" };
        let span = branch.span;
        let owner = match self.context().owner_type.clone() {
            Some(owner) if self.context().function.is_some() => owner,
            _ => {
                self.error(span, format!("keyword '{}' is not available in the current context", keyword));
                return Resolution::unknown();
            }
        };
        if self.context().is_static {
            self.error(span, format!("keyword '{}' is not valid in a static member", keyword));
            return Resolution::unknown();
        }
        if !self.check_state_access(keyword, span) {
            return Resolution::unknown();
        }
        if branch.label == Label::This {
            return Resolution::new(TypeDescriptor::user(owner), "this");
        }
        match self.symbols.type_info(&owner).and_then(|t| t.base.clone()) {
            Some(base) => Resolution::new(TypeDescriptor::user(base), "base"),
            None => {
                self.error(
                    span,
                    format!("'{}' has no base type", owner_name(&owner)),
                );
                Resolution::unknown()
            }
        }
    }
}
