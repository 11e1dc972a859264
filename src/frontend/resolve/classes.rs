//! 继承与成员声明检查
//!
//! Runs once over the registered declarations before any body is resolved.
//! Interfaces take part in implementation checks only; overriding and hiding
//! follow the class chain.

use std::collections::HashSet;

use crate::frontend::symbols::scope::{BlockKind, ScopePath};
use crate::frontend::symbols::types::TypeDescriptor;
use crate::frontend::symbols::{FunctionInfo, SymbolTables, TypeInfo};
use crate::util::diagnostic::Diagnostics;

/// Validate inheritance and member modifiers of every declaration
pub(super) fn validate(
    symbols: &SymbolTables,
    diagnostics: &mut Diagnostics,
) {
    for info in symbols.types() {
        check_base(symbols, info, diagnostics);
    }
    for function in symbols.functions() {
        check_modifiers(symbols, function, diagnostics);
        check_override(symbols, function, diagnostics);
    }
    for info in symbols.types() {
        check_implementation(symbols, info, diagnostics);
        check_implicit_constructor(symbols, info, diagnostics);
    }
    check_duplicates(symbols, diagnostics);
}

fn kind_of(
    symbols: &SymbolTables,
    path: &ScopePath,
) -> Option<BlockKind> {
    symbols.type_info(path).map(|t| t.kind)
}

/// Base chain returns to `path`
fn in_cycle(
    symbols: &SymbolTables,
    path: &ScopePath,
) -> bool {
    let mut seen = HashSet::new();
    let mut current = symbols.type_info(path).and_then(|t| t.base.clone());
    while let Some(base) = current {
        if &base == path {
            return true;
        }
        if !seen.insert(base.clone()) {
            return false;
        }
        current = symbols.type_info(&base).and_then(|t| t.base.clone());
    }
    false
}

fn check_base(
    symbols: &SymbolTables,
    info: &TypeInfo,
    diagnostics: &mut Diagnostics,
) {
    let base = match &info.base {
        Some(base) => base,
        None => return,
    };
    if in_cycle(symbols, &info.path) {
        diagnostics.error(
            info.span,
            format!(
                "circular base type dependency involving '{}' and '{}'",
                info.path.dotted(),
                base.dotted()
            ),
        );
        return;
    }
    let base_info = match symbols.type_info(base) {
        Some(base_info) => base_info,
        None => {
            diagnostics.error(info.span, format!("'{}' is not a valid base type", base.dotted()));
            return;
        }
    };
    match info.kind {
        BlockKind::Class => {
            if base_info.kind == BlockKind::Struct {
                diagnostics.error(
                    info.span,
                    format!("'{}': cannot derive from struct type '{}'", info.name, base.dotted()),
                );
            } else if base_info.modifiers.is_sealed {
                diagnostics.error(
                    info.span,
                    format!("'{}': cannot derive from sealed type '{}'", info.name, base.dotted()),
                );
            }
        }
        BlockKind::Struct if base_info.kind != BlockKind::Interface => {
            diagnostics.error(
                info.span,
                format!("'{}': a struct can only implement interfaces, '{}' is not an interface", info.name, base.dotted()),
            );
        }
        BlockKind::Interface if base_info.kind != BlockKind::Interface => {
            diagnostics.error(
                info.span,
                format!("'{}': an interface can only inherit from interfaces, '{}' is not an interface", info.name, base.dotted()),
            );
        }
        _ => {}
    }
}

fn member_name(function: &FunctionInfo) -> String {
    if function.owner.is_root() {
        function.name.clone()
    } else {
        format!("{}.{}", function.owner.dotted(), function.name)
    }
}

fn check_modifiers(
    symbols: &SymbolTables,
    function: &FunctionInfo,
    diagnostics: &mut Diagnostics,
) {
    let m = &function.modifiers;
    let name = member_name(function);
    let span = function.span;
    let owner = kind_of(symbols, &function.owner);

    if function.kind == BlockKind::Constructor {
        if !function.has_body {
            diagnostics.error(span, format!("'{}' must declare a body", name));
        }
        return;
    }
    if owner == Some(BlockKind::Interface) {
        if function.has_body {
            diagnostics.error(span, format!("'{}': interface members cannot have a definition", name));
        }
        return;
    }
    if m.is_polymorphic() && owner != Some(BlockKind::Class) {
        diagnostics.error(
            span,
            format!("'{}': only class members can be marked virtual, abstract or override", name),
        );
        return;
    }
    if m.is_static && m.is_polymorphic() {
        diagnostics.error(
            span,
            format!("a static member '{}' cannot be marked as override, virtual, or abstract", name),
        );
    }
    if m.is_abstract && m.is_virtual {
        diagnostics.error(span, format!("the abstract method '{}' cannot be marked virtual", name));
    }
    if m.is_abstract {
        if function.has_body {
            diagnostics.error(
                span,
                format!("'{}' cannot declare a body because it is marked abstract", name),
            );
        }
        let owner_abstract = symbols
            .type_info(&function.owner)
            .map_or(false, |t| t.modifiers.is_abstract);
        if !owner_abstract {
            diagnostics.error(
                span,
                format!(
                    "'{}' is abstract but it is contained in non-abstract type '{}'",
                    name,
                    function.owner.dotted()
                ),
            );
        }
    } else if !function.has_body {
        diagnostics.error(
            span,
            format!("'{}' must declare a body because it is not marked abstract", name),
        );
    }
    if m.is_sealed && !m.is_override {
        diagnostics.error(
            span,
            format!("'{}' cannot be sealed because it is not an override", name),
        );
    }
}

fn same_signature(
    a: &FunctionInfo,
    b: &FunctionInfo,
) -> bool {
    a.name == b.name && a.signature() == b.signature()
}

/// Nearest function with the same signature up the class chain
fn inherited<'s>(
    symbols: &'s SymbolTables,
    function: &FunctionInfo,
) -> Option<&'s FunctionInfo> {
    symbols
        .bases(&function.owner)
        .iter()
        .filter(|base| kind_of(symbols, base) != Some(BlockKind::Interface))
        .flat_map(|base| symbols.overloads(base, &function.name))
        .find(|candidate| same_signature(candidate, function))
}

fn check_override(
    symbols: &SymbolTables,
    function: &FunctionInfo,
    diagnostics: &mut Diagnostics,
) {
    if function.kind != BlockKind::Function || kind_of(symbols, &function.owner) != Some(BlockKind::Class) {
        return;
    }
    let name = member_name(function);
    let span = function.span;
    let base = inherited(symbols, function);

    if !function.modifiers.is_override {
        if let Some(base) = base {
            if !function.modifiers.is_new {
                diagnostics.warning(
                    span,
                    format!(
                        "'{}' hides inherited member '{}'; use the new keyword if hiding was intended",
                        name,
                        member_name(base)
                    ),
                );
            }
        }
        return;
    }

    let base = match base {
        Some(base) => base,
        None => {
            diagnostics.error(span, format!("'{}': no suitable method found to override", name));
            return;
        }
    };
    let base_name = member_name(base);
    if !base.modifiers.is_polymorphic() {
        diagnostics.error(
            span,
            format!(
                "'{}': cannot override inherited member '{}' because it is not marked virtual, abstract, or override",
                name, base_name
            ),
        );
    } else if base.modifiers.is_sealed {
        diagnostics.error(
            span,
            format!("'{}': cannot override inherited member '{}' because it is sealed", name, base_name),
        );
    } else if base.return_type != function.return_type {
        diagnostics.error(
            span,
            format!(
                "'{}': return type must be '{}' to match overridden member '{}'",
                name, base.return_type, base_name
            ),
        );
    }
}

/// Interfaces reachable from `path` through its base chain
fn interfaces(
    symbols: &SymbolTables,
    path: &ScopePath,
) -> Vec<ScopePath> {
    symbols
        .bases(path)
        .into_iter()
        .filter(|base| kind_of(symbols, base) == Some(BlockKind::Interface))
        .collect()
}

fn check_implementation(
    symbols: &SymbolTables,
    info: &TypeInfo,
    diagnostics: &mut Diagnostics,
) {
    if info.kind == BlockKind::Interface || in_cycle(symbols, &info.path) {
        return;
    }
    let chain: Vec<ScopePath> = symbols
        .lineage(&info.path)
        .into_iter()
        .filter(|t| kind_of(symbols, t) != Some(BlockKind::Interface))
        .collect();

    if !info.modifiers.is_abstract {
        for (position, owner) in chain.iter().enumerate().skip(1) {
            for function in symbols.functions().filter(|f| &f.owner == owner && f.modifiers.is_abstract) {
                let implemented = chain[..position].iter().any(|lower| {
                    symbols
                        .overloads(lower, &function.name)
                        .iter()
                        .any(|f| same_signature(f, function) && !f.modifiers.is_abstract)
                });
                if !implemented {
                    diagnostics.error(
                        info.span,
                        format!(
                            "'{}' does not implement inherited abstract member '{}.{}'",
                            info.path.dotted(),
                            owner.dotted(),
                            function.display_signature()
                        ),
                    );
                }
            }
        }
    }

    for interface in interfaces(symbols, &info.path) {
        for function in symbols.functions().filter(|f| f.owner == interface) {
            let implemented = chain.iter().any(|owner| {
                symbols
                    .overloads(owner, &function.name)
                    .iter()
                    .any(|f| same_signature(f, function) && !f.modifiers.is_static && f.return_type == function.return_type)
            });
            if !implemented {
                diagnostics.error(
                    info.span,
                    format!(
                        "'{}' does not implement interface member '{}.{}'",
                        info.path.dotted(),
                        interface.dotted(),
                        function.display_signature()
                    ),
                );
            }
        }
    }
}

/// A type without constructors gets an implicit parameterless one
fn check_implicit_constructor(
    symbols: &SymbolTables,
    info: &TypeInfo,
    diagnostics: &mut Diagnostics,
) {
    if info.kind != BlockKind::Class || !symbols.constructors(&info.path).is_empty() {
        return;
    }
    let base = match &info.base {
        Some(base) if kind_of(symbols, base) == Some(BlockKind::Class) => base,
        _ => return,
    };
    let constructors = symbols.constructors(base);
    if !constructors.is_empty() && !constructors.iter().any(|c| c.accepts_arity(0)) {
        diagnostics.error(
            info.span,
            format!("'{}' does not contain a constructor that takes 0 arguments", base.dotted()),
        );
    }
}

fn check_duplicates(
    symbols: &SymbolTables,
    diagnostics: &mut Diagnostics,
) {
    let mut seen: HashSet<(ScopePath, BlockKind, String, Vec<TypeDescriptor>)> = HashSet::new();
    for function in symbols.functions() {
        let key = (
            function.owner.clone(),
            function.kind,
            function.name.clone(),
            function.signature().into_iter().cloned().collect::<Vec<_>>(),
        );
        if !seen.insert(key) {
            let owner = if function.owner.is_root() {
                "<global>".to_string()
            } else {
                function.owner.dotted()
            };
            diagnostics.error(
                function.span,
                format!(
                    "'{}' already defines a member called '{}' with the same parameter types",
                    owner, function.name
                ),
            );
        }
    }
}
