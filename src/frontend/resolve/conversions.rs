//! 隐式转换
//!
//! Classifies assignment-style conversions and converts folded values to the
//! target type so the emitted literal already has the target's spelling.

use super::{Resolution, Resolver};
use crate::frontend::const_eval::{Data, Value};
use crate::frontend::symbols::types::{classify_primitive, Conversion, Primitive, TypeDescriptor};
use crate::frontend::symbols::SymbolTables;
use crate::util::span::Span;

/// Strength of the implicit conversion of an expression to `to`.
///
/// `value` is the folded value of the expression, if any: integer literals
/// that fit the target and list or tuple literals are judged by their items.
pub(super) fn classify(
    symbols: &SymbolTables,
    from: &TypeDescriptor,
    value: Option<&Value>,
    to: &TypeDescriptor,
) -> Conversion {
    if from == to {
        return Conversion::Exact;
    }
    if from.is_unknown() || to.is_unknown() {
        return Conversion::Widening;
    }
    if from.is(Primitive::Null) || value.map_or(false, Value::is_null) {
        return if to.is_reference() {
            Conversion::Widening
        } else {
            Conversion::Incompatible
        };
    }
    if from.is_list() && to.is_list() {
        return classify_list(symbols, from, value, to);
    }
    if from.is_tuple() && to.is_tuple() {
        return classify_tuple(symbols, from, value, to);
    }
    if from.is_user() && to.is_user() {
        return if symbols.is_subtype(&from.main, &to.main) {
            Conversion::Widening
        } else {
            Conversion::Incompatible
        };
    }
    match (from.as_primitive(), to.as_primitive()) {
        (Some(f), Some(t)) if is_scalar(f) && is_scalar(t) => {
            if t.is_integer() && value.map_or(false, |v| fits(v, t)) {
                return Conversion::Widening;
            }
            classify_primitive(f, t)
        }
        _ => Conversion::Incompatible,
    }
}

fn is_scalar(kind: Primitive) -> bool {
    !matches!(kind, Primitive::List | Primitive::Tuple | Primitive::Void)
}

/// Integer literal that lies inside the target's range
fn fits(
    value: &Value,
    target: Primitive,
) -> bool {
    if !value.kind().is_integer() {
        return false;
    }
    match (value.data.integer(), target.integer_range()) {
        (Some(n), Some((min, max))) => n >= min && n <= max,
        _ => false,
    }
}

fn classify_list(
    symbols: &SymbolTables,
    from: &TypeDescriptor,
    value: Option<&Value>,
    to: &TypeDescriptor,
) -> Conversion {
    let target = match to.element() {
        Some(element) => element,
        None => return Conversion::Incompatible,
    };
    if let Some(Value {
        data: Data::List(items),
        ..
    }) = value
    {
        if let Some(length) = to.fixed_length() {
            if items.len() as i64 != length {
                return Conversion::Incompatible;
            }
        }
        let worst = items
            .iter()
            .map(|item| classify(symbols, &item.ty, Some(item), target))
            .max()
            .unwrap_or(Conversion::Exact);
        return worst.max(Conversion::Widening);
    }
    let source = match from.element() {
        Some(element) => element,
        None => return Conversion::Incompatible,
    };
    if source.is_unknown() {
        return Conversion::Widening;
    }
    if source != target {
        return Conversion::Incompatible;
    }
    match (from.fixed_length(), to.fixed_length()) {
        (_, None) => Conversion::Widening,
        (None, Some(_)) => Conversion::Narrowing,
        (Some(_), Some(_)) => Conversion::Incompatible,
    }
}

fn classify_tuple(
    symbols: &SymbolTables,
    from: &TypeDescriptor,
    value: Option<&Value>,
    to: &TypeDescriptor,
) -> Conversion {
    let (sources, targets) = (from.tuple_items(), to.tuple_items());
    if sources.len() != targets.len() {
        return Conversion::Incompatible;
    }
    let items = match value {
        Some(Value {
            data: Data::Tuple(items),
            ..
        }) => Some(items),
        _ => None,
    };
    let worst = sources
        .iter()
        .zip(targets.iter())
        .enumerate()
        .map(|(i, (source, target))| {
            let item = items.and_then(|items| items.get(i));
            classify(symbols, source, item, target)
        })
        .max()
        .unwrap_or(Conversion::Exact);
    worst.max(Conversion::Widening)
}

/// Folded value retyped as `to`; `None` when it cannot be expressed
pub(super) fn convert_value(
    value: &Value,
    to: &TypeDescriptor,
) -> Option<Value> {
    if value.ty == *to {
        return Some(value.clone());
    }
    match &value.data {
        Data::Null => Some(Value::with_type(Data::Null, to.clone())),
        Data::List(items) => {
            let element = to.element()?;
            let items = items
                .iter()
                .map(|item| convert_value(item, element))
                .collect::<Option<Vec<_>>>()?;
            Some(Value::with_type(Data::List(items), to.clone()))
        }
        Data::Tuple(items) => {
            let targets = to.tuple_items();
            if targets.len() != items.len() {
                return None;
            }
            let items = items
                .iter()
                .zip(targets)
                .map(|(item, target)| convert_value(item, target))
                .collect::<Option<Vec<_>>>()?;
            Some(Value::with_type(Data::Tuple(items), to.clone()))
        }
        _ => {
            let kind = to.as_primitive()?;
            let mut converted = value.convert_to(kind).ok()?;
            converted.fixed = value.fixed;
            Some(converted)
        }
    }
}

impl<'c> Resolver<'c> {
    /// Convert an expression to `to`, reporting narrowing and incompatible
    /// conversions. Incompatible sources become the target's default value.
    pub(super) fn convert(
        &mut self,
        source: &Resolution,
        to: &TypeDescriptor,
        span: Span,
    ) -> Resolution {
        if to.is_unknown() || source.ty.is_unknown() {
            let mut converted = source.clone();
            converted.ty = to.clone();
            return converted;
        }
        let conversion = classify(self.symbols, &source.ty, source.value.as_ref(), to);
        match conversion {
            Conversion::Exact => source.clone(),
            Conversion::Incompatible => {
                self.error(span, format!("cannot convert '{}' to '{}'", source.ty, to));
                Resolution::constant(Value::default_of(to))
            }
            Conversion::Widening | Conversion::Narrowing => {
                if conversion == Conversion::Narrowing {
                    self.warning(
                        span,
                        format!("narrowing conversion from '{}' to '{}'", source.ty, to),
                    );
                }
                self.retype(source, to, conversion)
            }
        }
    }

    /// Retype without diagnostics: folded values are converted, runtime code
    /// gets an explicit cast where the host needs one
    pub(super) fn retype(
        &self,
        source: &Resolution,
        to: &TypeDescriptor,
        conversion: Conversion,
    ) -> Resolution {
        let mut converted = Resolution::new(to.clone(), source.code.clone());
        converted.compound = source.compound;
        if let Some(value) = &source.value {
            if let Some(value) = convert_value(value, to) {
                if !self.config.fold_constants && conversion == Conversion::Narrowing {
                    converted.code = format!("({}){}", to.host_name(), self.operand(source));
                    converted.compound = true;
                } else if !self.config.fold_constants {
                    converted.code = source.code.clone();
                } else {
                    converted.code = value.to_host_literal();
                }
                converted.value = Some(value);
                return converted;
            }
        }
        if conversion == Conversion::Narrowing {
            converted.code = format!("({}){}", to.host_name(), self.operand(source));
            converted.compound = true;
        }
        converted
    }
}
