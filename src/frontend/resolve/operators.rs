//! 运算符类型规则与折叠
//!
//! Operator chains are folded left to right: each step combines the
//! accumulated operand with the next one, folding when both are constant and
//! emitting runtime code otherwise.

use super::emit::Helper;
use super::{Resolution, Resolver};
use crate::frontend::const_eval::{self, BinaryOp, UnaryOp, Value};
use crate::frontend::parser::{BranchId, Label};
use crate::frontend::symbols::types::{arithmetic_kind, Primitive, TypeDescriptor};
use crate::frontend::symbols::SymbolTables;
use crate::util::diagnostic::Wreck;
use crate::util::span::Span;

fn primitive(kind: Primitive) -> TypeDescriptor {
    TypeDescriptor::primitive(kind)
}

/// Integer-like operand of bitwise and shift operators
fn is_integral(ty: &TypeDescriptor) -> bool {
    ty.is_integer() || ty.is(Primitive::Char)
}

/// Static result type of `lhs op rhs`; `None` when the operator does not apply
pub(super) fn binary_type(
    symbols: &SymbolTables,
    op: BinaryOp,
    lhs: &TypeDescriptor,
    rhs: &TypeDescriptor,
) -> Option<TypeDescriptor> {
    if lhs.is_unknown() || rhs.is_unknown() {
        return Some(if op.is_comparison() || op.is_logical() {
            primitive(Primitive::Bool)
        } else {
            TypeDescriptor::unknown()
        });
    }
    if lhs.is_void() || rhs.is_void() {
        return None;
    }
    let arithmetic = || {
        let kind = arithmetic_kind(lhs.as_primitive()?, rhs.as_primitive()?)?;
        Some(primitive(kind))
    };
    match op {
        BinaryOp::Add if lhs.is(Primitive::String) || rhs.is(Primitive::String) => {
            Some(primitive(Primitive::String))
        }
        BinaryOp::Add if lhs.is_list() && rhs.is_list() => {
            let (a, b) = (lhs.element()?, rhs.element()?);
            match (a.is_unknown(), b.is_unknown()) {
                (true, _) => Some(rhs.opened()),
                (_, true) => Some(lhs.opened()),
                _ if a == b => Some(lhs.opened()),
                _ => None,
            }
        }
        BinaryOp::Mul
            if (lhs.is(Primitive::String) && rhs.is_integer())
                || (lhs.is_integer() && rhs.is(Primitive::String)) =>
        {
            Some(primitive(Primitive::String))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem | BinaryOp::Pow => {
            arithmetic()
        }
        BinaryOp::Shl | BinaryOp::Shr if is_integral(lhs) && is_integral(rhs) => {
            if lhs.is(Primitive::Char) {
                Some(primitive(Primitive::Int))
            } else {
                Some(lhs.clone())
            }
        }
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
            if lhs.is(Primitive::Bool) && rhs.is(Primitive::Bool) {
                Some(primitive(Primitive::Bool))
            } else if is_integral(lhs) && is_integral(rhs) {
                arithmetic()
            } else {
                None
            }
        }
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor
            if lhs.is(Primitive::Bool) && rhs.is(Primitive::Bool) =>
        {
            Some(primitive(Primitive::Bool))
        }
        BinaryOp::Eq | BinaryOp::Ne if equality_applies(symbols, lhs, rhs) => Some(primitive(Primitive::Bool)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
            if (lhs.is_numeric() && rhs.is_numeric())
                || (lhs.is(Primitive::String) && rhs.is(Primitive::String)) =>
        {
            Some(primitive(Primitive::Bool))
        }
        _ => None,
    }
}

fn equality_applies(
    symbols: &SymbolTables,
    lhs: &TypeDescriptor,
    rhs: &TypeDescriptor,
) -> bool {
    if lhs.is_numeric() && rhs.is_numeric() {
        return true;
    }
    if lhs.is(Primitive::Null) || rhs.is(Primitive::Null) {
        return lhs.is_reference() && rhs.is_reference();
    }
    if lhs.is_user() && rhs.is_user() {
        return symbols.is_subtype(&lhs.main, &rhs.main) || symbols.is_subtype(&rhs.main, &lhs.main);
    }
    if lhs.is_list() && rhs.is_list() {
        return match (lhs.element(), rhs.element()) {
            (Some(a), Some(b)) => a.is_unknown() || b.is_unknown() || a == b,
            _ => false,
        };
    }
    lhs == rhs && matches!(lhs.as_primitive(), Some(Primitive::Bool | Primitive::String | Primitive::Tuple))
}

/// Static result type of a prefix operator
pub(super) fn unary_type(
    op: UnaryOp,
    operand: &TypeDescriptor,
) -> Option<TypeDescriptor> {
    if operand.is_unknown() {
        return Some(TypeDescriptor::unknown());
    }
    match op {
        UnaryOp::Not if operand.is(Primitive::Bool) => Some(operand.clone()),
        UnaryOp::Neg | UnaryOp::Plus if operand.is(Primitive::Char) => Some(primitive(Primitive::Int)),
        UnaryOp::Neg | UnaryOp::Plus if operand.is_numeric() => Some(operand.clone()),
        UnaryOp::BitNot if operand.is_integer() => Some(operand.clone()),
        _ => None,
    }
}

/// Common type of two branches (ternary arms, list items)
pub(super) fn common_type(
    symbols: &SymbolTables,
    a: &TypeDescriptor,
    b: &TypeDescriptor,
) -> Option<TypeDescriptor> {
    if a == b {
        return Some(a.clone());
    }
    if a.is_unknown() {
        return Some(b.clone());
    }
    if b.is_unknown() {
        return Some(a.clone());
    }
    if a.is_numeric() && b.is_numeric() {
        return arithmetic_kind(a.as_primitive()?, b.as_primitive()?).map(primitive);
    }
    if a.is(Primitive::Null) && b.is_reference() {
        return Some(b.clone());
    }
    if b.is(Primitive::Null) && a.is_reference() {
        return Some(a.clone());
    }
    if a.is_user() && b.is_user() {
        if symbols.is_subtype(&a.main, &b.main) {
            return Some(b.clone());
        }
        if symbols.is_subtype(&b.main, &a.main) {
            return Some(a.clone());
        }
    }
    if a.is_list() && b.is_list() && a.element() == b.element() {
        return Some(a.opened());
    }
    None
}

/// Literal integer zero
fn is_integer_zero(resolution: &Resolution) -> bool {
    resolution
        .value
        .as_ref()
        .map_or(false, |v| v.kind().is_integer() && v.data.integer() == Some(0))
}

/// Value that can take part in a fold: a `null` standing in for a
/// non-reference type is a placeholder, not a constant
pub(super) fn foldable(resolution: &Resolution) -> Option<&Value> {
    resolution
        .value
        .as_ref()
        .filter(|v| !(v.is_null() && !resolution.ty.is_reference()))
}

impl<'c> Resolver<'c> {
    /// `Chain(level)` or `Power`: `[operand, Operator, operand, ...]`
    pub(super) fn chain(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let children = tree.children(id);
        if children.len() < 3 || children.len() % 2 == 0 {
            return Err(Wreck::internal("malformed operator chain"));
        }
        let mut acc = self.res(children[0]).clone();
        for pair in children[1..].chunks(2) {
            let operator = tree.get(pair[0]);
            if operator.label != Label::Operator {
                return Err(Wreck::internal("operator chain without an operator"));
            }
            let op = BinaryOp::from_symbol(&operator.text)
                .ok_or_else(|| Wreck::internal(format!("unknown operator '{}'", operator.text)))?;
            let rhs = self.res(pair[1]).clone();
            acc = self.apply_binary(acc, op, &rhs, operator.span);
        }
        Ok(acc)
    }

    /// One step of a chain
    pub(super) fn apply_binary(
        &mut self,
        lhs: Resolution,
        op: BinaryOp,
        rhs: &Resolution,
        span: Span,
    ) -> Resolution {
        let ty = match binary_type(self.symbols, op, &lhs.ty, &rhs.ty) {
            Some(ty) => ty,
            None => {
                self.error(
                    span,
                    format!(
                        "operator '{}' cannot be applied to operands of type '{}' and '{}'",
                        op, lhs.ty, rhs.ty
                    ),
                );
                return Resolution::unknown();
            }
        };
        if matches!(op, BinaryOp::Div | BinaryOp::Rem) && ty.is_integer() && is_integer_zero(rhs) {
            self.error(span, "division by integer zero is forbidden");
            return Resolution::constant(Value::default_of(&ty));
        }

        if let (Some(a), Some(b)) = (foldable(&lhs), foldable(rhs)) {
            match const_eval::binary(a, op, b) {
                Ok(value) => {
                    let mut folded = Resolution::constant(value);
                    if !self.config.fold_constants {
                        folded.code = self.binary_code(op, &lhs, rhs, &ty);
                        folded.compound = true;
                    }
                    return folded;
                }
                Err(err) => {
                    self.error(span, err.to_string());
                    return Resolution::constant(Value::default_of(&ty));
                }
            }
        }
        let code = self.binary_code(op, &lhs, rhs, &ty);
        Resolution::new(ty, code).compound()
    }

    /// Runtime host text of `lhs op rhs`
    fn binary_code(
        &mut self,
        op: BinaryOp,
        lhs: &Resolution,
        rhs: &Resolution,
        ty: &TypeDescriptor,
    ) -> String {
        let (a, b) = (self.operand(lhs), self.operand(rhs));
        match op {
            BinaryOp::Pow if ty.is(Primitive::Real) => {
                self.helpers.insert(Helper::Pow);
                format!("Runtime.Pow({}, {})", self.emit(lhs), self.emit(rhs))
            }
            BinaryOp::Pow if ty.is_integer() => {
                self.helpers.insert(Helper::IntPow);
                format!("({})Runtime.IntPow({}, {})", ty.host_name(), self.emit(lhs), self.emit(rhs))
            }
            BinaryOp::Mul if ty.is(Primitive::String) => {
                self.helpers.insert(Helper::Repeat);
                let (text, count) = if lhs.ty.is(Primitive::String) {
                    (lhs, rhs)
                } else {
                    (rhs, lhs)
                };
                format!("Runtime.Repeat({}, {})", self.emit(text), self.emit(count))
            }
            BinaryOp::Add if ty.is_list() => {
                self.helpers.insert(Helper::Concat);
                format!("Runtime.Concat({}, {})", self.emit(lhs), self.emit(rhs))
            }
            BinaryOp::Xor => format!("{} ^ {}", a, b),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge if lhs.ty.is(Primitive::String) => {
                format!("string.CompareOrdinal({}, {}) {} 0", self.emit(lhs), self.emit(rhs), op)
            }
            _ => format!("{} {} {}", a, op, b),
        }
    }

    /// `Unary` (op text) `[operand]`
    pub(super) fn unary(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let branch = tree.get(id);
        let op = UnaryOp::from_symbol(&branch.text)
            .ok_or_else(|| Wreck::internal(format!("unknown prefix operator '{}'", branch.text)))?;
        let operand = self.res(self.child(id, 0)?).clone();
        let ty = match unary_type(op, &operand.ty) {
            Some(ty) => ty,
            None => {
                self.error(
                    branch.span,
                    format!("operator '{}' cannot be applied to operand of type '{}'", op.symbol(), operand.ty),
                );
                return Ok(Resolution::unknown());
            }
        };
        let code = format!("{}{}", op.symbol(), self.operand(&operand));
        if let Some(value) = foldable(&operand) {
            return Ok(match const_eval::unary(op, value) {
                Ok(value) => {
                    let mut folded = Resolution::constant(value);
                    if !self.config.fold_constants {
                        folded.code = code;
                        folded.compound = true;
                    }
                    folded
                }
                Err(err) => {
                    self.error(branch.span, err.to_string());
                    Resolution::constant(Value::default_of(&ty))
                }
            });
        }
        Ok(Resolution::new(ty, code).compound())
    }

    /// `Ternary [condition, then, else]`
    pub(super) fn ternary(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let condition = self.res(self.child(id, 0)?).clone();
        let yes = self.res(self.child(id, 1)?).clone();
        let no = self.res(self.child(id, 2)?).clone();
        let span = self.span(id);
        self.check_condition(&condition, self.span(self.child(id, 0)?));

        let ty = match common_type(self.symbols, &yes.ty, &no.ty) {
            Some(ty) => ty,
            None => {
                self.error(
                    span,
                    format!(
                        "type of conditional expression cannot be determined because there is no implicit conversion between '{}' and '{}'",
                        yes.ty, no.ty
                    ),
                );
                return Ok(Resolution::unknown());
            }
        };
        let yes = self.convert(&yes, &ty, span);
        let no = self.convert(&no, &ty, span);

        let code = format!(
            "{} ? {} : {}",
            self.operand(&condition),
            self.operand(&yes),
            self.operand(&no)
        );
        if let Some(choice) = condition.value.as_ref().map(Value::to_bool) {
            let mut folded = if choice { yes } else { no };
            if !self.config.fold_constants {
                folded.code = code;
                folded.compound = true;
            }
            folded.place = false;
            folded.target = None;
            return Ok(folded);
        }
        Ok(Resolution::new(ty, code).compound())
    }

    /// Conditions of `if`, loops and ternaries must be `bool`
    pub(super) fn check_condition(
        &mut self,
        condition: &Resolution,
        span: Span,
    ) {
        if !condition.ty.is(Primitive::Bool) && !condition.ty.is_unknown() {
            self.error(span, format!("cannot convert '{}' to 'bool'", condition.ty));
        }
    }
}
