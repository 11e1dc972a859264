//! 访问链：成员、调用、索引与构造
//!
//! An access chain is a head followed by `.name`, `(args)` and `[index]`
//! segments. A cursor walks the segments and tracks what the prefix denotes
//! so far: a value, a type, a namespace, `base`, or a method group waiting
//! for its argument list.

use super::declare::owner_name;
use super::lookup::{accessible, is_type_path, qualified_signature};
use super::operators::{common_type, foldable};
use super::overload::Ranking;
use super::{Resolution, Resolver};
use crate::frontend::const_eval::builtins::{self, Builtin};
use crate::frontend::const_eval::{self, Data, Value};
use crate::frontend::parser::{Annotation, BranchId, Extra, Label};
use crate::frontend::symbols::scope::{BlockKind, ScopePath};
use crate::frontend::symbols::types::{Primitive, TypeDescriptor};
use crate::frontend::symbols::FunctionInfo;
use crate::util::diagnostic::Wreck;
use crate::util::span::Span;

/// What a method group is called on
#[derive(Debug, Clone)]
enum Receiver {
    /// Simple name resolved from the enclosing containers
    Implicit,
    Instance { code: String },
    Base,
    /// Type or namespace qualifier
    Static(ScopePath),
}

#[derive(Debug, Clone)]
enum Cursor {
    Value(Resolution),
    Base(ScopePath),
    Namespace(ScopePath),
    Type(ScopePath),
    Group {
        name: String,
        candidates: Vec<ScopePath>,
        receiver: Receiver,
    },
    /// An error was already reported for this prefix
    Failed,
}

fn real() -> TypeDescriptor {
    TypeDescriptor::primitive(Primitive::Real)
}

/// Placeholder of a failed built-in call
fn null_real() -> Resolution {
    Resolution::constant(Value::with_type(Data::Null, real()))
}

/// Stand-in for a call that is reported but not emitted
fn placeholder(ty: &TypeDescriptor) -> Resolution {
    if ty.is_void() {
        Resolution::void()
    } else {
        Resolution::constant(Value::default_of(ty))
    }
}

/// Scalar kinds a conversion call accepts on both sides
fn is_convertible(kind: Primitive) -> bool {
    kind.is_numeric() || matches!(kind, Primitive::Bool | Primitive::String)
}

/// `System.Convert` method suffix
fn convert_method(kind: Primitive) -> &'static str {
    match kind {
        Primitive::Bool => "Boolean",
        Primitive::SByte => "SByte",
        Primitive::Byte => "Byte",
        Primitive::Short => "Int16",
        Primitive::UShort => "UInt16",
        Primitive::Int => "Int32",
        Primitive::UInt => "UInt32",
        Primitive::Long => "Int64",
        Primitive::ULong => "UInt64",
        Primitive::Char => "Char",
        Primitive::Real => "Double",
        _ => "String",
    }
}

impl<'c> Resolver<'c> {
    /// `AccessChain`: `[head, segment...]`
    pub(super) fn access_chain(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let (head, segments) = tree
            .children(id)
            .split_first()
            .ok_or_else(|| Wreck::internal("empty access chain"))?;
        let mut cursor = self.head_cursor(*head);
        for segment in segments {
            cursor = match tree.get(*segment).label {
                Label::Member => self.member(cursor, *segment),
                Label::Call => self.call(cursor, *segment),
                Label::Index => self.index(cursor, *segment)?,
                other => {
                    return Err(Wreck::internal(format!("unexpected {:?} in an access chain", other)));
                }
            };
        }
        Ok(self.finish(cursor, tree.get(id).span))
    }

    fn head_cursor(
        &self,
        head: BranchId,
    ) -> Cursor {
        let resolution = self.res(head).clone();
        if self.tree.get(head).label == Label::Base {
            return if resolution.ty.is_unknown() {
                Cursor::Failed
            } else {
                Cursor::Base(resolution.ty.main)
            };
        }
        match resolution.target {
            Some(Extra::FunctionOverloads { name, candidates }) => Cursor::Group {
                name,
                candidates,
                receiver: Receiver::Implicit,
            },
            Some(Extra::StaticMember(path)) => {
                if self.symbols.is_namespace(&path) {
                    Cursor::Namespace(path)
                } else {
                    Cursor::Type(path)
                }
            }
            None if resolution.ty.is_unknown() && resolution.value.is_none() => Cursor::Failed,
            _ => Cursor::Value(resolution),
        }
    }

    /// Chain result used as a value
    fn finish(
        &mut self,
        cursor: Cursor,
        span: Span,
    ) -> Resolution {
        let message = match cursor {
            Cursor::Value(resolution) => return resolution,
            Cursor::Failed => return Resolution::unknown(),
            Cursor::Group { name, .. } => format!("method group '{}' cannot be used as a value", name),
            Cursor::Type(path) => format!("'{}' is a type but is used like a variable", path.dotted()),
            Cursor::Namespace(path) => format!("'{}' is a namespace but is used like a variable", path.dotted()),
            Cursor::Base(_) => "use of keyword 'base' is not valid in this context".to_string(),
        };
        self.error(span, message);
        Resolution::unknown()
    }

    /// `.name` segment
    fn member(
        &mut self,
        cursor: Cursor,
        segment: BranchId,
    ) -> Cursor {
        let tree = self.tree;
        let branch = tree.get(segment);
        let name = branch.text.as_str();
        let span = branch.span;
        let from = self.scope_of(segment);
        match cursor {
            Cursor::Failed => Cursor::Failed,
            Cursor::Value(value) => self.instance_member(value, name, from, span),
            Cursor::Base(path) => self.base_member(&path, name, from, span),
            Cursor::Namespace(path) | Cursor::Type(path) => self.static_member(&path, name, from, span),
            Cursor::Group { name: group, .. } => {
                self.error(span, format!("method group '{}' cannot be used as a value", group));
                Cursor::Failed
            }
        }
    }

    fn instance_member(
        &mut self,
        value: Resolution,
        name: &str,
        from: &ScopePath,
        span: Span,
    ) -> Cursor {
        if value.ty.is_unknown() {
            return Cursor::Failed;
        }
        let is_string = value.ty.is(Primitive::String);
        if name == "length" && (is_string || value.ty.is_list()) {
            let suffix = if is_string { "Length" } else { "Count" };
            let code = format!("{}.{}", self.operand(&value), suffix);
            let folded = foldable(&value).and_then(const_eval::length);
            let resolution = match folded {
                Some(length) => {
                    let mut resolution = Resolution::constant(length);
                    if !self.config.fold_constants {
                        resolution.code = code;
                    }
                    resolution
                }
                None => Resolution::new(TypeDescriptor::primitive(Primitive::Int), code),
            };
            return Cursor::Value(resolution);
        }
        if value.ty.is_user() {
            let owner = value.ty.main.clone();
            if let Some(property) = self.symbols.member_property(&owner, name).cloned() {
                if !accessible(self.symbols, &property.owner, &property.modifiers, from) {
                    self.error(span, format!("'{}.{}' is inaccessible due to its protection level", owner_name(&property.owner), name));
                    return Cursor::Failed;
                }
                if property.modifiers.is_static {
                    self.error(
                        span,
                        format!(
                            "member '{}.{}' cannot be accessed with an instance reference; qualify it with a type name instead",
                            property.owner.dotted(),
                            name
                        ),
                    );
                    return Cursor::Failed;
                }
                let code = format!("{}.{}", self.operand(&value), name);
                return Cursor::Value(Resolution::new(property.ty.clone(), code).placed().with_target(
                    Extra::Property {
                        owner: property.owner,
                        name: name.to_string(),
                    },
                ));
            }
            let candidates: Vec<ScopePath> = self
                .symbols
                .member_functions(&owner, name)
                .iter()
                .map(|f| f.path.clone())
                .collect();
            if !candidates.is_empty() {
                return Cursor::Group {
                    name: name.to_string(),
                    candidates,
                    receiver: Receiver::Instance {
                        code: self.operand(&value),
                    },
                };
            }
        }
        self.error(span, format!("'{}' does not contain a definition for '{}'", value.ty, name));
        Cursor::Failed
    }

    fn base_member(
        &mut self,
        base: &ScopePath,
        name: &str,
        from: &ScopePath,
        span: Span,
    ) -> Cursor {
        if let Some(property) = self.symbols.member_property(base, name).cloned() {
            if !accessible(self.symbols, &property.owner, &property.modifiers, from) {
                self.error(span, format!("'{}.{}' is inaccessible due to its protection level", owner_name(&property.owner), name));
                return Cursor::Failed;
            }
            let code = if property.modifiers.is_static {
                format!("{}.{}", property.owner.dotted(), name)
            } else {
                format!("base.{}", name)
            };
            return Cursor::Value(Resolution::new(property.ty.clone(), code).placed().with_target(
                Extra::Property {
                    owner: property.owner,
                    name: name.to_string(),
                },
            ));
        }
        let candidates: Vec<ScopePath> = self
            .symbols
            .member_functions(base, name)
            .iter()
            .map(|f| f.path.clone())
            .collect();
        if candidates.is_empty() {
            self.error(span, format!("'{}' does not contain a definition for '{}'", base.dotted(), name));
            return Cursor::Failed;
        }
        Cursor::Group {
            name: name.to_string(),
            candidates,
            receiver: Receiver::Base,
        }
    }

    /// Member of a type or namespace qualifier
    fn static_member(
        &mut self,
        owner: &ScopePath,
        name: &str,
        from: &ScopePath,
        span: Span,
    ) -> Cursor {
        if let Some(child) = self.symbols.child_named(owner, name) {
            let child = child.clone();
            return if self.symbols.is_namespace(&child) {
                Cursor::Namespace(child)
            } else {
                Cursor::Type(child)
            };
        }
        let is_type = is_type_path(owner);
        let property = if is_type {
            self.symbols.member_property(owner, name)
        } else {
            self.symbols.property(owner, name)
        };
        if let Some(property) = property.cloned() {
            if !accessible(self.symbols, &property.owner, &property.modifiers, from) {
                self.error(span, format!("'{}.{}' is inaccessible due to its protection level", owner_name(&property.owner), name));
                return Cursor::Failed;
            }
            if is_type && !property.modifiers.is_static {
                self.error(
                    span,
                    format!(
                        "an object reference is required for the non-static member '{}.{}'",
                        property.owner.dotted(),
                        name
                    ),
                );
                return Cursor::Failed;
            }
            if !self.check_state_access(name, span) {
                return Cursor::Failed;
            }
            let code = if is_type {
                format!("{}.{}", property.owner.dotted(), name)
            } else {
                format!("{}.{}", self.module_path(&property.owner), name)
            };
            return Cursor::Value(Resolution::new(property.ty.clone(), code).placed().with_target(
                Extra::Property {
                    owner: property.owner,
                    name: name.to_string(),
                },
            ));
        }
        let functions = if is_type {
            self.symbols.member_functions(owner, name)
        } else {
            self.symbols.overloads(owner, name)
        };
        let candidates: Vec<ScopePath> = functions.iter().map(|f| f.path.clone()).collect();
        if candidates.is_empty() {
            self.error(span, format!("'{}' does not contain a definition for '{}'", owner.dotted(), name));
            return Cursor::Failed;
        }
        Cursor::Group {
            name: name.to_string(),
            candidates,
            receiver: Receiver::Static(owner.clone()),
        }
    }

    /// Parser-narrowed candidates of a call segment, when usable
    fn narrowed(
        &self,
        segment: BranchId,
        group: &[ScopePath],
    ) -> Option<Vec<ScopePath>> {
        match &self.tree.get(segment).annotation {
            Annotation::Narrowed(Extra::FunctionOverloads { candidates, .. })
            | Annotation::Narrowed(Extra::ConstructorOverloads { candidates, .. })
                if !candidates.is_empty() && candidates.iter().all(|c| group.contains(c)) =>
            {
                Some(candidates.clone())
            }
            _ => None,
        }
    }

    /// `(args)` segment
    fn call(
        &mut self,
        cursor: Cursor,
        segment: BranchId,
    ) -> Cursor {
        let span = self.span(segment);
        match cursor {
            Cursor::Failed => Cursor::Failed,
            Cursor::Group {
                name,
                candidates,
                receiver,
            } => {
                let candidates = self.narrowed(segment, &candidates).unwrap_or(candidates);
                match self.invoke(segment, &name, &candidates, receiver) {
                    Some(resolution) => Cursor::Value(resolution),
                    None => Cursor::Failed,
                }
            }
            Cursor::Type(path) => match self.construct(&path, segment) {
                Some(resolution) => Cursor::Value(resolution),
                None => Cursor::Failed,
            },
            Cursor::Value(value) => {
                if !value.ty.is_unknown() {
                    self.error(span, format!("a value of type '{}' cannot be called", value.ty));
                }
                Cursor::Failed
            }
            Cursor::Namespace(path) => {
                self.error(span, format!("'{}' is a namespace but is used like a method", path.dotted()));
                Cursor::Failed
            }
            Cursor::Base(_) => {
                self.error(span, "use of keyword 'base' is not valid in this context");
                Cursor::Failed
            }
        }
    }

    /// Resolve and emit a call of a method group
    fn invoke(
        &mut self,
        call: BranchId,
        name: &str,
        candidates: &[ScopePath],
        receiver: Receiver,
    ) -> Option<Resolution> {
        let span = self.span(call);
        if candidates.is_empty() {
            if let Some(builtin) = builtins::lookup(name) {
                return Some(self.call_builtin(builtin, call));
            }
            self.error(span, format!("name '{}' does not exist in the current context", name));
            return None;
        }

        let from = self.scope_of(call);
        let visible: Vec<ScopePath> = candidates
            .iter()
            .filter(|path| {
                self.symbols
                    .function(path)
                    .map_or(false, |f| accessible(self.symbols, &f.owner, &f.modifiers, from))
            })
            .cloned()
            .collect();
        if visible.is_empty() {
            self.error(span, format!("'{}' is inaccessible due to its protection level", name));
            return None;
        }

        let args: Vec<Resolution> = self.tree.children(call).iter().map(|a| self.res(*a).clone()).collect();
        let (info, ranking) = self.choose_overload(name, &visible, &args, span)?;

        let member = is_type_path(&info.owner);
        let is_instance = member && !info.modifiers.is_static;
        match &receiver {
            Receiver::Implicit if is_instance && self.context().is_static => {
                self.error(
                    span,
                    format!("an object reference is required for the non-static member '{}'", qualified_signature(&info)),
                );
                return None;
            }
            Receiver::Static(owner) if is_instance && is_type_path(owner) => {
                self.error(
                    span,
                    format!("an object reference is required for the non-static member '{}'", qualified_signature(&info)),
                );
                return None;
            }
            Receiver::Instance { .. } if !is_instance => {
                self.error(
                    span,
                    format!(
                        "member '{}' cannot be accessed with an instance reference; qualify it with a type name instead",
                        qualified_signature(&info)
                    ),
                );
                return None;
            }
            Receiver::Base if info.modifiers.is_abstract => {
                self.error(span, format!("cannot call an abstract base member '{}'", qualified_signature(&info)));
                return None;
            }
            _ => {}
        }

        if self.context().multiconst && !info.modifiers.is_multiconst {
            let caller = self.context().function.as_ref().map(|f| f.name.clone()).unwrap_or_default();
            self.error(
                span,
                format!("multiconst function '{}' cannot call non-multiconst function '{}'", caller, info.name),
            );
            return Some(placeholder(&info.return_type));
        }

        let rendered = self.arguments(&info, &ranking, call);
        let target = match receiver {
            Receiver::Implicit if member => info.name.clone(),
            Receiver::Implicit => format!("{}.{}", self.module_path(&info.owner), info.name),
            Receiver::Instance { code } => format!("{}.{}", code, info.name),
            Receiver::Base => format!("base.{}", info.name),
            Receiver::Static(owner) if is_type_path(&owner) => format!("{}.{}", owner.dotted(), info.name),
            Receiver::Static(owner) => format!("{}.{}", self.module_path(&owner), info.name),
        };
        Some(Resolution::new(
            info.return_type.clone(),
            format!("{}({})", target, rendered.join(", ")),
        ))
    }

    /// Convert the arguments of `call` to the chosen parameters and render
    /// them; `params` arguments are packed into a list
    pub(super) fn arguments(
        &mut self,
        info: &FunctionInfo,
        ranking: &Ranking,
        call: BranchId,
    ) -> Vec<String> {
        let tree = self.tree;
        let ids = tree.children(call);
        let skip = match tree.get(call).label {
            Label::New => 1,
            _ => 0,
        };
        let ids = ids.get(skip..).unwrap_or(&[]);
        let mut rendered = Vec::with_capacity(ids.len());
        for (i, arg) in ids.iter().enumerate() {
            let source = self.res(*arg).clone();
            let target = match ranking.targets.get(i) {
                Some(target) => target,
                None => break,
            };
            let converted = self.convert(&source, target, self.span(*arg));
            rendered.push(self.emit(&converted));
        }
        if !info.is_variadic() || !ranking.expanded {
            return rendered;
        }

        let fixed = info.params.len() - 1;
        let rest = match info.params.last() {
            Some(rest) => rest,
            None => return rendered,
        };
        let element = rest.ty.element().map(|e| e.host_name()).unwrap_or_else(|| "object".to_string());
        let packed = if rendered.len() > fixed {
            rendered.split_off(fixed)
        } else {
            Vec::new()
        };
        let list = if packed.is_empty() {
            format!("new List<{}>()", element)
        } else {
            format!("new List<{}> {{ {} }}", element, packed.join(", "))
        };
        if rendered.len() < fixed {
            rendered.push(format!("{}: {}", rest.name, list));
        } else {
            rendered.push(list);
        }
        rendered
    }

    /// Built-in math function: numeric arguments, folded when all are literal
    fn call_builtin(
        &mut self,
        builtin: &Builtin,
        call: BranchId,
    ) -> Resolution {
        let span = self.span(call);
        let tree = self.tree;
        let ids = tree.children(call);
        if ids.len() != builtin.arity {
            self.error(
                span,
                format!("no overload for method '{}' takes {} arguments", builtin.name, ids.len()),
            );
            return null_real();
        }
        let args: Vec<Resolution> = ids.iter().map(|a| self.res(*a).clone()).collect();
        for (i, arg) in args.iter().enumerate() {
            if !arg.ty.is_numeric() && !arg.ty.is_unknown() {
                self.error(
                    span,
                    format!("argument {}: cannot convert from '{}' to 'real'", i + 1, arg.ty),
                );
                return null_real();
            }
        }
        let rendered: Vec<String> = args.iter().map(|a| self.emit(a)).collect();
        let code = format!("{}({})", builtin.host, rendered.join(", "));

        let values: Option<Vec<Value>> = args.iter().map(|a| foldable(a).cloned()).collect();
        if let Some(values) = values {
            return match builtins::call(builtin.name, &values) {
                Ok(value) => {
                    let mut resolution = Resolution::constant(value);
                    if !self.config.fold_constants {
                        resolution.code = code;
                    }
                    resolution
                }
                Err(err) => {
                    self.error(span, err.to_string());
                    null_real()
                }
            };
        }
        Resolution::new(real(), code)
    }

    /// Object construction through `new T(...)` or `T(...)`
    fn construct(
        &mut self,
        owner: &ScopePath,
        call: BranchId,
    ) -> Option<Resolution> {
        let span = self.span(call);
        let ty = TypeDescriptor::user(owner.clone());
        let info = self.symbols.type_info(owner)?.clone();
        if info.kind == BlockKind::Interface || info.modifiers.is_abstract {
            self.error(
                span,
                format!("cannot create an instance of the abstract type or interface '{}'", owner.dotted()),
            );
            return None;
        }

        let tree = self.tree;
        let skip = usize::from(tree.get(call).label == Label::New);
        let ids = tree.children(call).get(skip..).unwrap_or(&[]);
        let constructors: Vec<ScopePath> = self.symbols.constructors(owner).iter().map(|f| f.path.clone()).collect();
        if constructors.is_empty() {
            if !ids.is_empty() {
                self.error(
                    span,
                    format!("'{}' does not contain a constructor that takes {} arguments", owner.dotted(), ids.len()),
                );
                return None;
            }
            return Some(Resolution::new(ty.clone(), format!("new {}()", ty.host_name())));
        }

        let from = self.scope_of(call);
        let visible: Vec<ScopePath> = constructors
            .iter()
            .filter(|path| {
                self.symbols
                    .function(path)
                    .map_or(false, |f| accessible(self.symbols, owner, &f.modifiers, from))
            })
            .cloned()
            .collect();
        if visible.is_empty() {
            let signature = qualified_signature(self.symbols.function(&constructors[0])?);
            self.error(span, format!("'{}' is inaccessible due to its protection level", signature));
            return None;
        }
        let candidates = self.narrowed(call, &visible).unwrap_or(visible);
        let args: Vec<Resolution> = ids.iter().map(|a| self.res(*a).clone()).collect();
        let (chosen, ranking) = self.choose_overload(&info.name, &candidates, &args, span)?;
        if self.context().multiconst && !chosen.modifiers.is_multiconst {
            let caller = self.context().function.as_ref().map(|f| f.name.clone()).unwrap_or_default();
            self.error(
                span,
                format!("multiconst function '{}' cannot call non-multiconst function '{}'", caller, chosen.name),
            );
            return Some(Resolution::new(ty, "null"));
        }
        let rendered = self.arguments(&chosen, &ranking, call);
        Some(Resolution::new(ty.clone(), format!("new {}({})", ty.host_name(), rendered.join(", "))))
    }

    /// `[index]` segment
    fn index(
        &mut self,
        cursor: Cursor,
        segment: BranchId,
    ) -> Result<Cursor, Wreck> {
        let span = self.span(segment);
        let position = self.res(self.child(segment, 0)?).clone();
        let value = match cursor {
            Cursor::Value(value) => value,
            Cursor::Failed => return Ok(Cursor::Failed),
            _ => {
                self.error(span, "cannot apply indexing to a type, namespace or method group");
                return Ok(Cursor::Failed);
            }
        };
        if value.ty.is_unknown() {
            return Ok(Cursor::Failed);
        }
        if !position.ty.is_integer() && !position.ty.is_unknown() {
            self.error(span, format!("cannot convert '{}' to 'int'", position.ty));
            return Ok(Cursor::Failed);
        }
        let literal = foldable(&position).and_then(|v| v.data.integer());

        let (ty, code, place) = if let Some(element) = value.ty.element() {
            if let (Some(i), Some(len)) = (literal, value.ty.fixed_length()) {
                if i < 0 || i >= i128::from(len) {
                    self.error(span, format!("index {} is out of range for length {}", i, len));
                    return Ok(Cursor::Value(Resolution::constant(Value::default_of(element))));
                }
            }
            let code = format!("{}[{}]", self.operand(&value), self.emit(&position));
            (element.clone(), code, true)
        } else if value.ty.is(Primitive::String) {
            let code = format!("{}[{}]", self.operand(&value), self.emit(&position));
            (TypeDescriptor::primitive(Primitive::Char), code, false)
        } else if value.ty.is_tuple() {
            let items = value.ty.tuple_items();
            let i = match literal {
                Some(i) => i,
                None => {
                    self.error(span, "a tuple index must be a constant integer");
                    return Ok(Cursor::Failed);
                }
            };
            if i < 0 || i >= items.len() as i128 {
                self.error(span, format!("index {} is out of range for length {}", i, items.len()));
                return Ok(Cursor::Failed);
            }
            let ty = items[i as usize].clone();
            (ty, format!("{}.Item{}", self.operand(&value), i + 1), false)
        } else {
            self.error(span, format!("cannot apply indexing to an expression of type '{}'", value.ty));
            return Ok(Cursor::Failed);
        };

        if let (Some(container), Some(at)) = (foldable(&value), foldable(&position)) {
            return Ok(Cursor::Value(match const_eval::index(container, at) {
                Ok(item) => {
                    let mut resolution = Resolution::constant(item);
                    resolution.ty = ty;
                    if !self.config.fold_constants {
                        resolution.code = code;
                    }
                    resolution
                }
                Err(err) => {
                    self.error(span, err.to_string());
                    Resolution::constant(Value::default_of(&ty))
                }
            }));
        }
        let mut resolution = Resolution::new(ty, code);
        resolution.place = place;
        Ok(Cursor::Value(resolution))
    }

    /// `new T(args)`: `[type, args...]`
    pub(super) fn new_object(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let span = self.span(id);
        let type_id = self.child(id, 0)?;
        let arity = self.tree.children(id).len() - 1;
        let ty = match self.declared_type(type_id) {
            Some(ty) => ty,
            None => {
                self.error(span, "'var' cannot be used in a 'new' expression");
                return Ok(Resolution::unknown());
            }
        };
        if ty.is_unknown() {
            return Ok(Resolution::unknown());
        }
        if ty.is_list() {
            if arity > 0 {
                self.error(span, format!("'{}' does not contain a constructor that takes {} arguments", ty, arity));
            }
            let element = ty.element().map(|e| e.host_name()).unwrap_or_else(|| "object".to_string());
            let code = match ty.fixed_length() {
                Some(n) => format!("new List<{}>(new {}[{}])", element, element, n),
                None => format!("new List<{}>()", element),
            };
            return Ok(Resolution::new(ty, code));
        }
        if !ty.is_user() {
            self.error(
                span,
                format!("cannot create an instance of primitive type '{}'; use a conversion call instead", ty),
            );
            return Ok(Resolution::constant(Value::default_of(&ty)));
        }
        let owner = ty.main.clone();
        Ok(match self.construct(&owner, id) {
            Some(resolution) => resolution,
            None => Resolution::new(ty, "null"),
        })
    }

    /// Conversion call `int(x)`, `string(x)`, ...: the folded result is pinned
    pub(super) fn conversion(
        &mut self,
        id: BranchId,
    ) -> Resolution {
        let tree = self.tree;
        let branch = tree.get(id);
        let span = branch.span;
        let kind = Primitive::from_name(&branch.text).unwrap_or(Primitive::Unknown);
        let target = TypeDescriptor::primitive(kind);
        let source = match branch.children.as_slice() {
            [only] => self.res(*only).clone(),
            _ => {
                self.error(span, format!("conversion to '{}' takes exactly one argument", branch.text));
                return Resolution::constant(Value::default_of(&target));
            }
        };
        if source.ty.is_unknown() {
            return Resolution::new(target, "default");
        }
        let from = match source.ty.as_primitive() {
            Some(from) if is_convertible(from) && is_convertible(kind) => from,
            _ => {
                self.error(span, format!("cannot convert '{}' to '{}'", source.ty, target));
                return Resolution::constant(Value::default_of(&target));
            }
        };

        let text = self.emit(&source);
        let code = if kind == Primitive::String || kind == Primitive::Bool || from == Primitive::Bool {
            format!("Convert.To{}({})", convert_method(kind), text)
        } else if from == Primitive::String {
            format!("{}.Parse({})", target.host_name(), text)
        } else {
            format!("({})({})", target.host_name(), text)
        };

        if let Some(value) = foldable(&source) {
            return match value.convert_to(kind) {
                Ok(converted) => {
                    let mut resolution = Resolution::constant(converted.pinned());
                    if !self.config.fold_constants {
                        resolution.code = code;
                        resolution.compound = true;
                    }
                    resolution
                }
                Err(err) => {
                    self.error(span, err.to_string());
                    Resolution::constant(Value::default_of(&target))
                }
            };
        }
        Resolution::new(target, code).compound()
    }

    /// `[a, b, ...]`: items converted to their common type
    pub(super) fn list_literal(
        &mut self,
        id: BranchId,
    ) -> Resolution {
        let span = self.span(id);
        let tree = self.tree;
        let items: Vec<Resolution> = tree.children(id).iter().map(|c| self.take(*c)).collect();
        let first = match items.first() {
            Some(first) => first.ty.clone(),
            None => return Resolution::constant(Value::list(Vec::new(), TypeDescriptor::unknown())),
        };
        let mut element = first;
        for item in &items[1..] {
            if item.ty == element {
                continue;
            }
            element = match common_type(self.symbols, &element, &item.ty) {
                Some(common) => common,
                None => {
                    self.error(span, "no best type found for the list literal");
                    return Resolution::new(TypeDescriptor::list_of(TypeDescriptor::unknown()), "null");
                }
            };
        }
        let mut converted = Vec::with_capacity(items.len());
        for item in items {
            if item.ty == element {
                converted.push(item);
            } else {
                converted.push(self.convert(&item, &element, span));
            }
        }

        let constant = converted.iter().all(|item| foldable(item).is_some());
        if constant && self.config.fold_constants {
            let values = converted.into_iter().filter_map(|item| item.value).collect();
            return Resolution::constant(Value::list(values, element));
        }
        let rendered: Vec<String> = converted.iter().map(|item| self.emit(item)).collect();
        let code = format!("new List<{}> {{ {} }}", element.host_name(), rendered.join(", "));
        if constant {
            let values = converted.into_iter().filter_map(|item| item.value).collect();
            let mut resolution = Resolution::constant(Value::list(values, element));
            resolution.code = code;
            return resolution;
        }
        Resolution::new(TypeDescriptor::list_of(element), code)
    }

    /// `(a, b, ...)`
    pub(super) fn tuple_literal(
        &mut self,
        id: BranchId,
    ) -> Resolution {
        let tree = self.tree;
        let items: Vec<Resolution> = tree.children(id).iter().map(|c| self.take(*c)).collect();
        let ty = TypeDescriptor::tuple(items.iter().map(|item| item.ty.clone()).collect());
        let rendered: Vec<String> = items.iter().map(|item| self.emit(item)).collect();
        let code = format!("({})", rendered.join(", "));
        if items.iter().all(|item| foldable(item).is_some()) {
            let values = items.into_iter().filter_map(|item| item.value).collect();
            let mut resolution = Resolution::constant(Value::with_type(Data::Tuple(values), ty));
            if !self.config.fold_constants {
                resolution.code = code;
            }
            return resolution;
        }
        Resolution::new(ty, code)
    }
}
