//! 语句检查
//!
//! Statements carry `ends` when control never leaves them normally; blocks
//! use it for reachability and functions for the missing-return check.

use super::emit::{braced, indent};
use super::operators::foldable;
use super::{Resolution, Resolver};
use super::conversions::classify;
use crate::frontend::const_eval::{BinaryOp, Data, Value};
use crate::frontend::parser::{BranchId, Label};
use crate::frontend::symbols::scope::{BlockKind, ScopePath};
use crate::frontend::symbols::types::{Conversion, Primitive, TypeDescriptor};
use crate::frontend::symbols::VariableInfo;
use crate::util::diagnostic::Wreck;

/// Literal `true` / `false` condition
fn literal_condition(condition: &Resolution) -> Option<bool> {
    match foldable(condition).map(|v| &v.data) {
        Some(Data::Bool(b)) => Some(*b),
        _ => None,
    }
}

/// `for` header part without its statement terminator
fn header_part(code: &str) -> &str {
    code.strip_suffix(';').unwrap_or(code)
}

impl<'c> Resolver<'c> {
    /// Body of `if`, `while` and `for` on its own line
    fn nested(
        &mut self,
        id: BranchId,
    ) -> String {
        let code = self.take_code(id);
        if code.is_empty() {
            indent(";")
        } else if code.starts_with('{') {
            code
        } else {
            indent(&code)
        }
    }

    pub(super) fn block(
        &mut self,
        id: BranchId,
    ) -> Resolution {
        let tree = self.tree;
        let mut lines = Vec::new();
        let mut ends = false;
        let mut warned = false;
        for item in tree.children(id) {
            let item_ends = self.res(*item).ends;
            let code = self.take_code(*item);
            if ends && !warned && tree.get(*item).label != Label::Empty {
                self.warning(self.span(*item), "unreachable code detected");
                warned = true;
            }
            if !code.is_empty() {
                lines.push(code);
            }
            ends |= item_ends;
        }
        Resolution::statement(braced("", &lines.join("\n")), ends)
    }

    /// `VarDecl` (name) `[type, init?]`
    pub(super) fn var_decl(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let branch = tree.get(id);
        let name = branch.text.as_str();
        let span = branch.span;
        let declared = self.declared_type(self.child(id, 0)?);
        let init = branch.children.get(1).map(|i| (self.res(*i).clone(), self.span(*i)));

        let ty = match declared {
            Some(ty) if ty.is_void() => {
                self.error(span, "keyword 'void' cannot be used in this context");
                TypeDescriptor::unknown()
            }
            Some(ty) => ty,
            None => match &init {
                None => {
                    self.error(span, "implicitly-typed variables must be initialized");
                    TypeDescriptor::unknown()
                }
                Some((value, _)) if value.ty.is(Primitive::Null) => {
                    self.error(span, "cannot assign 'null' to an implicitly-typed variable");
                    TypeDescriptor::unknown()
                }
                Some((value, _)) if value.ty.is_void() => {
                    self.error(span, "cannot assign 'void' to an implicitly-typed variable");
                    TypeDescriptor::unknown()
                }
                Some((value, _)) => value.ty.clone(),
            },
        };

        let value = match init {
            Some((value, at)) => {
                let converted = self.convert(&value, &ty, at);
                self.emit(&converted)
            }
            None => Value::default_of(&ty).to_host_literal(),
        };

        if self.local(name).is_some() {
            self.error(
                span,
                format!("a local variable named '{}' is already defined in this scope", name),
            );
        } else if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), ty.clone());
        }
        let function = self
            .scope_of(id)
            .enclosing_callable()
            .unwrap_or_else(ScopePath::root);
        self.symbols.add_variable(VariableInfo {
            function,
            name: name.to_string(),
            ty: ty.clone(),
            span,
        });

        let code = format!("{} {} = {};", ty.host_name(), name, value);
        Ok(Resolution::statement(code, false))
    }

    /// `Assignment` (op) `[target, value]`
    pub(super) fn assignment(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let branch = tree.get(id);
        let op = branch.text.as_str();
        let span = branch.span;
        let target_id = self.child(id, 0)?;
        let value_id = self.child(id, 1)?;
        let target = self.res(target_id).clone();
        let value = self.res(value_id).clone();

        if !target.place {
            if !target.ty.is_unknown() || target.target.is_some() {
                self.error(
                    self.span(target_id),
                    "the left-hand side of an assignment must be a variable, property or indexer",
                );
            }
            return Ok(Resolution::statement(String::new(), false));
        }

        if op == "=" {
            let converted = self.convert(&value, &target.ty, self.span(value_id));
            let code = format!("{} = {};", target.code, self.emit(&converted));
            return Ok(Resolution::statement(code, false));
        }

        let binary = BinaryOp::from_assignment(op)
            .ok_or_else(|| Wreck::internal(format!("unknown assignment operator '{}'", op)))?;
        let mut current = target.clone();
        current.value = None;
        let combined = self.apply_binary(current, binary, &value, span);
        if combined.ty.is_unknown() {
            return Ok(Resolution::statement(String::new(), false));
        }
        let conversion = classify(self.symbols, &combined.ty, None, &target.ty);
        if conversion == Conversion::Incompatible {
            self.error(span, format!("cannot convert '{}' to '{}'", combined.ty, target.ty));
            return Ok(Resolution::statement(String::new(), false));
        }
        let code = if binary == BinaryOp::Pow || combined.code.contains("Runtime.") {
            if combined.ty == target.ty {
                format!("{} = {};", target.code, combined.code)
            } else {
                format!("{} = ({})({});", target.code, target.ty.host_name(), combined.code)
            }
        } else {
            format!("{} {} {};", target.code, op, self.emit(&value))
        };
        Ok(Resolution::statement(code, false))
    }

    /// `Step` (`++` / `--`) `[target]`
    pub(super) fn step(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let branch = tree.get(id);
        let target_id = self.child(id, 0)?;
        let target = self.res(target_id).clone();
        if target.ty.is_unknown() && target.target.is_none() {
            return Ok(Resolution::statement(String::new(), false));
        }
        if !target.place {
            self.error(
                branch.span,
                "the operand of an increment or decrement operator must be a variable, property or indexer",
            );
            return Ok(Resolution::statement(String::new(), false));
        }
        if !target.ty.is_numeric() && !target.ty.is_unknown() {
            self.error(
                branch.span,
                format!("operator '{}' cannot be applied to operand of type '{}'", branch.text, target.ty),
            );
            return Ok(Resolution::statement(String::new(), false));
        }
        Ok(Resolution::statement(format!("{}{};", target.code, branch.text), false))
    }

    /// Expression statement: only calls and object creation qualify
    pub(super) fn evaluate(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let expression = self.child(id, 0)?;
        let branch = tree.get(expression);
        let is_call = match branch.label {
            Label::New => true,
            Label::AccessChain => branch
                .children
                .last()
                .map_or(false, |last| tree.get(*last).label == Label::Call),
            _ => false,
        };
        if !is_call {
            self.error(
                branch.span,
                "only assignment, call, increment, decrement and new object expressions can be used as a statement",
            );
            return Ok(Resolution::statement(String::new(), false));
        }
        let resolution = self.res(expression);
        if resolution.code.is_empty() || resolution.is_constant() || resolution.code == "default" {
            return Ok(Resolution::statement(String::new(), false));
        }
        Ok(Resolution::statement(format!("{};", resolution.code), false))
    }

    /// `If` `[condition, then, else?]`
    pub(super) fn if_statement(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let condition_id = self.child(id, 0)?;
        let then_id = self.child(id, 1)?;
        let otherwise_id = tree.child(id, 2);
        let condition = self.res(condition_id).clone();
        self.check_condition(&condition, self.span(condition_id));

        let then_ends = self.res(then_id).ends;
        let otherwise_ends = otherwise_id.map(|e| self.res(e).ends);
        let ends = match literal_condition(&condition) {
            Some(true) => then_ends,
            Some(false) => otherwise_ends.unwrap_or(false),
            None => then_ends && otherwise_ends.unwrap_or(false),
        };

        let then = self.nested(then_id);
        let mut code = format!("if ({})\n{}", self.emit(&condition), then);
        if let Some(otherwise_id) = otherwise_id {
            code.push_str("\nelse\n");
            let otherwise = self.nested(otherwise_id);
            code.push_str(&otherwise);
        }
        Ok(Resolution::statement(code, ends))
    }

    /// `While` `[condition, body]`
    pub(super) fn while_loop(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let condition_id = self.child(id, 0)?;
        let body_id = self.child(id, 1)?;
        let condition = self.res(condition_id).clone();
        self.check_condition(&condition, self.span(condition_id));
        let broke = self.loops.last().copied().unwrap_or(false);
        let ends = literal_condition(&condition) == Some(true) && !broke;
        let body = self.nested(body_id);
        let code = format!("while ({})\n{}", self.emit(&condition), body);
        Ok(Resolution::statement(code, ends))
    }

    /// `For` `[init, condition, update, body]`
    pub(super) fn for_loop(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let init = self.child(id, 0)?;
        let condition_id = self.child(id, 1)?;
        let update = self.child(id, 2)?;
        let body_id = self.child(id, 3)?;

        let forever = if tree.get(condition_id).label == Label::Empty {
            true
        } else {
            let condition = self.res(condition_id).clone();
            self.check_condition(&condition, self.span(condition_id));
            literal_condition(&condition) == Some(true)
        };
        let broke = self.loops.last().copied().unwrap_or(false);

        let condition = if tree.get(condition_id).label == Label::Empty {
            String::new()
        } else {
            self.text(condition_id)
        };
        let (init, update) = (self.take_code(init), self.take_code(update));
        let body = self.nested(body_id);
        let code = format!(
            "for ({}; {}; {})\n{}",
            header_part(&init),
            condition,
            header_part(&update),
            body
        );
        Ok(Resolution::statement(code, forever && !broke))
    }

    /// `Return` `[value?]`
    pub(super) fn return_statement(
        &mut self,
        id: BranchId,
    ) -> Resolution {
        let span = self.span(id);
        let value_id = self.tree.child(id, 0);
        let function = match self.context().function.clone() {
            Some(function) => function,
            None => {
                self.error(span, "a return statement is only valid inside a function body");
                return Resolution::statement("return;", true);
            }
        };
        let expected = if function.kind == BlockKind::Constructor {
            TypeDescriptor::void()
        } else {
            function.return_type.clone()
        };
        match value_id {
            Some(_) if expected.is_void() => {
                self.error(
                    span,
                    format!(
                        "since '{}' returns void, a return keyword must not be followed by an object expression",
                        function.name
                    ),
                );
                Resolution::statement("return;", true)
            }
            Some(value_id) => {
                let value = self.res(value_id).clone();
                let converted = self.convert(&value, &expected, self.span(value_id));
                Resolution::statement(format!("return {};", self.emit(&converted)), true)
            }
            None if !expected.is_void() && !expected.is_unknown() => {
                self.error(
                    span,
                    format!("an object of a type convertible to '{}' is required", expected),
                );
                let placeholder = Value::default_of(&expected).to_host_literal();
                Resolution::statement(format!("return {};", placeholder), true)
            }
            None => Resolution::statement("return;", true),
        }
    }

    /// `break` / `continue`
    pub(super) fn jump(
        &mut self,
        id: BranchId,
    ) -> Resolution {
        if self.loops.is_empty() {
            self.error(self.span(id), "no enclosing loop out of which to break or continue");
            return Resolution::statement(String::new(), false);
        }
        if self.tree.get(id).label == Label::Break {
            if let Some(flag) = self.loops.last_mut() {
                *flag = true;
            }
            Resolution::statement("break;", true)
        } else {
            Resolution::statement("continue;", true)
        }
    }
}

