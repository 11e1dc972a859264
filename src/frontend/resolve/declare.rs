//! 声明登记
//!
//! Runs between the two parse phases. Namespaces, types, base types,
//! functions and constructors come from the block table plus the parsed
//! headers; properties are registered once member lists are parsed.

use crate::frontend::context::{CompilationContext, TypeCache};
use crate::frontend::lexer::tokens::PRIMITIVE_TYPES;
use crate::frontend::lexer::Lexeme;
use crate::frontend::parser::{Annotation, BranchId, Label, SyntaxTree};
use crate::frontend::symbols::scope::{BlockKind, ScopePath};
use crate::frontend::symbols::types::{Primitive, TypeDescriptor};
use crate::frontend::symbols::{
    FunctionInfo, Modifiers, ParameterInfo, PropertyInfo, SymbolTables, TypeInfo,
};
use crate::util::diagnostic::Diagnostics;
use crate::util::span::Span;

/// Kind of the container a declaration lives in (`None` at global scope)
pub fn container_kind(owner: &ScopePath) -> Option<BlockKind> {
    owner.last().map(|b| b.kind)
}

/// Readable owner name for diagnostics
pub fn owner_name(owner: &ScopePath) -> String {
    if owner.is_root() {
        "<global namespace>".to_string()
    } else {
        owner.dotted()
    }
}

/// Register namespaces, types, bases, functions and constructors
pub fn register_declarations(
    ctx: &mut CompilationContext,
    lexemes: &[Lexeme],
) {
    let CompilationContext {
        table,
        tree,
        symbols,
        types,
        headers,
        diagnostics,
        ..
    } = ctx;
    let span_of = |index: usize| lexemes.get(index).map(|l| l.span(index)).unwrap_or_default();

    for entry in table.iter() {
        let span = span_of(entry.keyword);
        let owner = entry.parent_scope();
        match entry.kind {
            BlockKind::Namespace => symbols.add_namespace(entry.scope.clone(), span),
            kind if kind.is_type() => {
                let info = TypeInfo {
                    path: entry.scope.clone(),
                    kind,
                    name: entry.name.clone(),
                    modifiers: Modifiers::from_words(
                        entry.modifiers.iter().map(String::as_str),
                        container_kind(&owner),
                    ),
                    base: None,
                    span,
                };
                if !symbols.add_type(info) {
                    diagnostics.error(
                        span,
                        format!(
                            "'{}' already contains a definition for '{}'",
                            owner_name(&owner),
                            entry.name
                        ),
                    );
                }
            }
            _ => {}
        }
    }

    for (index, entry) in table.iter().enumerate() {
        if !entry.kind.is_type() {
            continue;
        }
        let annotation = match headers.get(index).and_then(|h| h.annotation) {
            Some(id) => id,
            None => continue,
        };
        let span = tree.get(annotation).span;
        let base = match resolve_type(tree, symbols, types, annotation, diagnostics) {
            Some(base) => base,
            None => {
                diagnostics.error(span, "'var' is not a valid base type");
                continue;
            }
        };
        if base.is_unknown() {
            continue;
        }
        if !base.is_user() {
            diagnostics.error(span, format!("'{}' is not a valid base type", base));
            continue;
        }
        symbols.set_base(&entry.scope, Some(base.main));
    }

    for (index, entry) in table.iter().enumerate() {
        if !entry.kind.is_callable() {
            continue;
        }
        let header = headers.get(index).copied().unwrap_or_default();
        let owner = entry.parent_scope();
        let params = match header.params {
            Some(id) => parameters(tree, symbols, types, id, diagnostics),
            None => Vec::new(),
        };
        let return_type = match (entry.kind, header.annotation) {
            (BlockKind::Function, Some(id)) => match resolve_type(tree, symbols, types, id, diagnostics) {
                Some(ty) => ty,
                None => {
                    diagnostics.error(tree.get(id).span, "'var' is not a valid return type");
                    TypeDescriptor::unknown()
                }
            },
            _ => TypeDescriptor::void(),
        };
        symbols.add_function(FunctionInfo {
            path: entry.scope.clone(),
            owner: owner.clone(),
            kind: entry.kind,
            name: entry.name.clone(),
            modifiers: Modifiers::from_words(
                entry.modifiers.iter().map(String::as_str),
                container_kind(&owner),
            ),
            params,
            return_type,
            has_body: entry.has_body(),
            span: span_of(entry.keyword),
        });
    }
}

/// Parameter descriptors of a `Parameters` branch
fn parameters(
    tree: &SyntaxTree,
    symbols: &SymbolTables,
    types: &mut TypeCache,
    list: BranchId,
    diagnostics: &mut Diagnostics,
) -> Vec<ParameterInfo> {
    let items = tree.children(list);
    let mut params: Vec<ParameterInfo> = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let branch = tree.get(*item);
        let (optional, variadic) = match branch.annotation {
            Annotation::ParameterFlags { optional, variadic } => (optional, variadic),
            _ => (false, false),
        };
        let ty = match branch.children.first() {
            Some(ty) => value_type(tree, symbols, types, *ty, diagnostics, "parameter"),
            None => TypeDescriptor::unknown(),
        };
        if variadic && !ty.is_list() && !ty.is_unknown() {
            diagnostics.error(branch.span, "a params parameter must be a list type");
        }
        if variadic && position + 1 != items.len() {
            diagnostics.error(
                branch.span,
                "a params parameter must be the last parameter in a formal parameter list",
            );
        }
        if !optional && !variadic && params.iter().any(|p| p.optional) {
            diagnostics.error(
                branch.span,
                "optional parameters must appear after all required parameters",
            );
        }
        if params.iter().any(|p| p.name == branch.text) {
            diagnostics.error(
                branch.span,
                format!("the parameter name '{}' is a duplicate", branch.text),
            );
        }
        params.push(ParameterInfo {
            name: branch.text.clone(),
            ty,
            optional,
            variadic,
            default: branch.children.get(1).copied(),
            span: branch.span,
        });
    }
    params
}

/// Register every property found in the program's containers
pub fn register_properties(ctx: &mut CompilationContext) {
    let CompilationContext {
        tree,
        symbols,
        types,
        program,
        diagnostics,
        ..
    } = ctx;
    let mut stack: Vec<BranchId> = program.iter().copied().collect();
    while let Some(id) = stack.pop() {
        let branch = tree.get(id);
        match branch.label {
            Label::Program | Label::Namespace | Label::Class | Label::Struct | Label::Interface => {
                stack.extend(branch.children.iter().rev());
            }
            Label::Property => {
                let owner = tree.scope(branch.scope).clone();
                let words = match branch.children.first() {
                    Some(m) => tree.get(*m).text.clone(),
                    None => String::new(),
                };
                let ty = match branch.children.get(1) {
                    Some(ty) => value_type(tree, symbols, types, *ty, diagnostics, "property"),
                    None => TypeDescriptor::unknown(),
                };
                let kind = container_kind(&owner);
                if kind == Some(BlockKind::Interface) {
                    diagnostics.error(branch.span, "interfaces cannot contain properties");
                    continue;
                }
                let info = PropertyInfo {
                    owner: owner.clone(),
                    name: branch.text.clone(),
                    modifiers: Modifiers::from_words(words.split_whitespace(), kind),
                    ty,
                    span: branch.span,
                };
                if !symbols.add_property(info) {
                    diagnostics.error(
                        branch.span,
                        format!(
                            "'{}' already contains a definition for '{}'",
                            owner_name(&owner),
                            branch.text
                        ),
                    );
                }
            }
            _ => {}
        }
    }
}

/// Declared type of a parameter or property: `var` and `void` are rejected
fn value_type(
    tree: &SyntaxTree,
    symbols: &SymbolTables,
    types: &mut TypeCache,
    id: BranchId,
    diagnostics: &mut Diagnostics,
    what: &str,
) -> TypeDescriptor {
    let span = tree.get(id).span;
    match resolve_type(tree, symbols, types, id, diagnostics) {
        Some(ty) if ty.is_void() => {
            diagnostics.error(span, "keyword 'void' cannot be used in this context");
            TypeDescriptor::unknown()
        }
        Some(ty) => ty,
        None => {
            diagnostics.error(span, format!("'var' is not a valid {} type", what));
            TypeDescriptor::unknown()
        }
    }
}

/// Resolve a `TypeName` / `ListOf` branch; `None` stands for `var`.
///
/// Results are cached per branch, so a type written once reports its errors
/// once no matter how often it is looked at.
pub fn resolve_type(
    tree: &SyntaxTree,
    symbols: &SymbolTables,
    cache: &mut TypeCache,
    id: BranchId,
    diagnostics: &mut Diagnostics,
) -> Option<TypeDescriptor> {
    if let Some(known) = cache.get(&id) {
        return known.clone();
    }
    let resolved = compute_type(tree, symbols, cache, id, diagnostics);
    cache.insert(id, resolved.clone());
    resolved
}

fn compute_type(
    tree: &SyntaxTree,
    symbols: &SymbolTables,
    cache: &mut TypeCache,
    id: BranchId,
    diagnostics: &mut Diagnostics,
) -> Option<TypeDescriptor> {
    let branch = tree.get(id);
    let span = branch.span;
    match branch.label {
        Label::ListOf => {
            let element = match branch.children.first() {
                Some(inner) => element_type(tree, symbols, cache, *inner, diagnostics, span),
                None => TypeDescriptor::unknown(),
            };
            if branch.text.is_empty() {
                return Some(TypeDescriptor::list_of(element));
            }
            match branch.text.parse::<i64>() {
                Ok(length) => Some(TypeDescriptor::fixed_list(element, length)),
                Err(_) => {
                    diagnostics.error(span, format!("list length '{}' is too large", branch.text));
                    Some(TypeDescriptor::list_of(element))
                }
            }
        }
        Label::TypeName => {
            let name = branch.text.as_str();
            if name == "var" {
                return None;
            }
            if name == "tuple" {
                let items = branch
                    .children
                    .iter()
                    .map(|item| element_type(tree, symbols, cache, *item, diagnostics, span))
                    .collect();
                return Some(TypeDescriptor::tuple(items));
            }
            if PRIMITIVE_TYPES.contains(name) {
                return Some(
                    Primitive::from_name(name)
                        .map(TypeDescriptor::primitive)
                        .unwrap_or_else(TypeDescriptor::unknown),
                );
            }
            Some(named_type(tree.scope(branch.scope), symbols, name, span, diagnostics))
        }
        _ => Some(TypeDescriptor::unknown()),
    }
}

/// Element of a list or tuple type
fn element_type(
    tree: &SyntaxTree,
    symbols: &SymbolTables,
    cache: &mut TypeCache,
    id: BranchId,
    diagnostics: &mut Diagnostics,
    span: Span,
) -> TypeDescriptor {
    match resolve_type(tree, symbols, cache, id, diagnostics) {
        Some(ty) if ty.is_void() => {
            diagnostics.error(span, "keyword 'void' cannot be used in this context");
            TypeDescriptor::unknown()
        }
        Some(ty) => ty,
        None => {
            diagnostics.error(span, "'var' cannot be used as an element type");
            TypeDescriptor::unknown()
        }
    }
}

/// Dotted user type name looked up outward from `scope`
fn named_type(
    scope: &ScopePath,
    symbols: &SymbolTables,
    name: &str,
    span: Span,
    diagnostics: &mut Diagnostics,
) -> TypeDescriptor {
    let parts: Vec<&str> = name.split('.').collect();
    match symbols.resolve_dotted(scope, &parts) {
        Some(path) if symbols.type_info(&path).is_some() => TypeDescriptor::user(path),
        Some(_) => {
            diagnostics.error(span, format!("'{}' is a namespace but is used like a type", name));
            TypeDescriptor::unknown()
        }
        None => {
            diagnostics.error(span, format!("type '{}' could not be found", name));
            TypeDescriptor::unknown()
        }
    }
}
