//! 函数、构造函数、属性与参数

use super::emit::host_modifiers;
use super::lookup::accessible;
use super::operators::foldable;
use super::{Resolution, Resolver};
use crate::frontend::const_eval::Value;
use crate::frontend::parser::{BranchId, Label};
use crate::frontend::symbols::scope::{BlockKind, ScopePath};
use crate::frontend::symbols::FunctionInfo;
use crate::util::diagnostic::Wreck;

impl<'c> Resolver<'c> {
    /// `Function` `[Modifiers, Parameters, TypeName, body | Empty]` or
    /// `Constructor` `[Modifiers, Parameters, BaseCall | Empty, body | Empty]`
    pub(super) fn callable(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let branch = tree.get(id);
        let path = tree.scope(branch.scope);
        let info = self
            .symbols
            .function(path)
            .cloned()
            .ok_or_else(|| Wreck::internal(format!("function '{}' was never registered", path)))?;
        let parameters = self.child(id, 1)?;
        let third = self.child(id, 2)?;
        let body = self.child(id, 3)?;

        let params: Vec<String> = tree.children(parameters).iter().map(|p| self.take_code(*p)).collect();
        let container = info.owner.last().map(|b| b.kind);
        let mut header = host_modifiers(&info.modifiers, container);

        if info.kind == BlockKind::Constructor {
            let name = info.owner.last().map(|b| b.name.clone()).unwrap_or_default();
            header.push_str(&format!("{}({})", name, params.join(", ")));
            if tree.get(third).label == Label::BaseCall {
                header.push_str(" : ");
                header.push_str(&self.take_code(third));
            } else {
                self.implicit_base_call(&info);
            }
        } else {
            header.push_str(&format!(
                "{} {}({})",
                info.return_type.host_name(),
                info.name,
                params.join(", ")
            ));
        }

        if tree.get(body).label == Label::Empty {
            return Ok(Resolution::statement(format!("{};", header), false));
        }
        let ends = self.res(body).ends;
        let code = self.take_code(body);
        let returns_value = info.kind == BlockKind::Function && !info.return_type.is_void() && !info.return_type.is_unknown();
        if returns_value && !ends {
            self.error(
                branch.span,
                format!("'{}': not all code paths return a value", info.name),
            );
        }
        Ok(Resolution::statement(format!("{}\n{}", header, code), false))
    }

    /// Constructor without `: base(...)` needs a parameterless base constructor
    fn implicit_base_call(
        &mut self,
        info: &FunctionInfo,
    ) {
        let base = match self.symbols.type_info(&info.owner).and_then(|t| t.base.clone()) {
            Some(base) => base,
            None => return,
        };
        let constructors = self.symbols.constructors(&base);
        if constructors.is_empty() || constructors.iter().any(|c| c.accepts_arity(0)) {
            return;
        }
        self.error(
            info.span,
            format!("'{}' does not contain a constructor that takes 0 arguments", base.dotted()),
        );
    }

    /// `Parameter` (name) `[TypeName, default?]`
    pub(super) fn parameter(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let branch = tree.get(id);
        let name = branch.text.as_str();
        let function = self.scope_of(id);
        let info = self
            .symbols
            .function(function)
            .and_then(|f| f.params.iter().find(|p| p.name == name))
            .cloned()
            .ok_or_else(|| Wreck::internal(format!("parameter '{}' was never registered", name)))?;

        if let Some(frame) = self.frames.first_mut() {
            frame.insert(name.to_string(), info.ty.clone());
        }

        let mut code = format!("{} {}", info.ty.host_name(), name);
        if let Some(default) = branch.children.get(1) {
            let value = self.res(*default).clone();
            if foldable(&value).is_none() && !value.ty.is_unknown() {
                self.error(
                    self.span(*default),
                    format!("default value for parameter '{}' must be a compile-time constant", name),
                );
            } else {
                let converted = self.convert(&value, &info.ty, self.span(*default));
                let literal = match &converted.value {
                    Some(value) => value.to_host_literal(),
                    None => Value::default_of(&info.ty).to_host_literal(),
                };
                code.push_str(" = ");
                code.push_str(&literal);
            }
        }
        Ok(Resolution::statement(code, false))
    }

    /// `Property` (name) `[Modifiers, TypeName, init?]`
    pub(super) fn property(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let branch = tree.get(id);
        let owner = self.scope_of(id);
        let info = match self.symbols.property(owner, &branch.text) {
            Some(info) => info.clone(),
            // 重复声明已在登记阶段报告
            None => return Ok(Resolution::statement(String::new(), false)),
        };
        let mut code = host_modifiers(&info.modifiers, owner.last().map(|b| b.kind));
        code.push_str(&format!("{} {}", info.ty.host_name(), info.name));
        if let Some(init) = branch.children.get(2) {
            let value = self.res(*init).clone();
            let converted = self.convert(&value, &info.ty, self.span(*init));
            code.push_str(" = ");
            code.push_str(&self.emit(&converted));
        }
        code.push(';');
        Ok(Resolution::statement(code, false))
    }

    /// `BaseCall` `[args...]` of a constructor
    pub(super) fn base_call(
        &mut self,
        id: BranchId,
    ) -> Resolution {
        let span = self.span(id);
        let owner = match self.context().owner_type.clone() {
            Some(owner) => owner,
            None => return Resolution::statement(String::new(), false),
        };
        let base = match self.symbols.type_info(&owner).and_then(|t| t.base.clone()) {
            Some(base) => base,
            None => {
                self.error(span, format!("'{}' has no base type", owner.dotted()));
                return Resolution::statement(String::new(), false);
            }
        };

        let tree = self.tree;
        let ids = tree.children(id);
        let from = self.scope_of(id);
        let all: Vec<ScopePath> = self.symbols.constructors(&base).iter().map(|c| c.path.clone()).collect();
        if all.is_empty() {
            if !ids.is_empty() {
                self.error(
                    span,
                    format!("'{}' does not contain a constructor that takes {} arguments", base.dotted(), ids.len()),
                );
            }
            return Resolution::statement("base()", false);
        }
        let visible: Vec<ScopePath> = all
            .iter()
            .filter(|path| {
                self.symbols
                    .function(path)
                    .map_or(false, |f| accessible(self.symbols, &base, &f.modifiers, from))
            })
            .cloned()
            .collect();
        if visible.is_empty() {
            self.error(span, format!("'{}' is inaccessible due to its protection level", base.dotted()));
            return Resolution::statement(String::new(), false);
        }

        let name = base.last().map(|b| b.name.clone()).unwrap_or_default();
        let args: Vec<Resolution> = ids.iter().map(|a| self.res(*a).clone()).collect();
        match self.choose_overload(&name, &visible, &args, span) {
            Some((info, ranking)) => {
                let rendered = self.arguments(&info, &ranking, id);
                Resolution::statement(format!("base({})", rendered.join(", ")), false)
            }
            None => Resolution::statement(String::new(), false),
        }
    }
}
