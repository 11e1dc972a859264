//! Symbol table tests

use super::scope::{Block, BlockKind, ScopePath};
use super::types::{Primitive, TypeDescriptor};
use super::*;
use crate::util::span::Span;

fn path(blocks: &[(BlockKind, &str, u32)]) -> ScopePath {
    ScopePath::from_blocks(blocks.iter().map(|(k, n, g)| Block::new(*k, *n, *g)))
}

fn type_info(
    path: ScopePath,
    kind: BlockKind,
    base: Option<ScopePath>,
) -> TypeInfo {
    let name = path.last().map(|b| b.name.clone()).unwrap_or_default();
    TypeInfo {
        path,
        kind,
        name,
        modifiers: Modifiers::from_words([], None),
        base,
        span: Span::dummy(),
    }
}

fn function(
    owner: &ScopePath,
    name: &str,
    generation: u32,
    params: &[Primitive],
) -> FunctionInfo {
    FunctionInfo {
        path: owner.child(Block::new(BlockKind::Function, name, generation)),
        owner: owner.clone(),
        kind: BlockKind::Function,
        name: name.to_string(),
        modifiers: Modifiers::from_words([], None),
        params: params
            .iter()
            .enumerate()
            .map(|(i, p)| ParameterInfo {
                name: format!("p{}", i),
                ty: TypeDescriptor::primitive(*p),
                optional: false,
                variadic: false,
                default: None,
                span: Span::dummy(),
            })
            .collect(),
        return_type: TypeDescriptor::void(),
        has_body: true,
        span: Span::dummy(),
    }
}

fn geometry() -> (SymbolTables, ScopePath, ScopePath, ScopePath) {
    let mut tables = SymbolTables::new();
    let geo = path(&[(BlockKind::Namespace, "Geo", 0)]);
    tables.add_namespace(geo.clone(), Span::dummy());
    let shape = geo.child(Block::new(BlockKind::Class, "Shape", 0));
    let point = geo.child(Block::new(BlockKind::Class, "Point", 0));
    assert!(tables.add_type(type_info(shape.clone(), BlockKind::Class, None)));
    assert!(tables.add_type(type_info(point.clone(), BlockKind::Class, None)));
    tables.set_base(&point, Some(shape.clone()));
    (tables, geo, shape, point)
}

#[test]
fn test_modifier_defaults() {
    let class_member = Modifiers::from_words(["static"], Some(BlockKind::Class));
    assert_eq!(class_member.visibility, Visibility::Private);
    assert!(!class_member.explicit_visibility);
    assert!(class_member.is_static);

    let namespace_member = Modifiers::from_words([], Some(BlockKind::Namespace));
    assert_eq!(namespace_member.visibility, Visibility::Public);

    let interface_member = Modifiers::from_words(["public"], Some(BlockKind::Interface));
    assert!(interface_member.is_abstract);
    assert!(interface_member.explicit_visibility);
}

#[test]
fn test_duplicate_type_is_rejected() {
    let (mut tables, geo, _, _) = geometry();
    let again = geo.child(Block::new(BlockKind::Struct, "Point", 0));
    assert!(!tables.add_type(type_info(again, BlockKind::Struct, None)));
}

#[test]
fn test_find_named_searches_outward() {
    let (tables, geo, shape, point) = geometry();
    let inside = point.child(Block::new(BlockKind::Function, "Len", 0));
    assert_eq!(tables.find_named(&inside, "Shape"), Some(shape));
    assert_eq!(tables.find_named(&inside, "Geo"), Some(geo));
    assert_eq!(tables.find_named(&inside, "Missing"), None);
    assert_eq!(tables.resolve_dotted(&ScopePath::root(), &["Geo", "Point"]), Some(point));
}

#[test]
fn test_inheritance_chain() {
    let (mut tables, geo, shape, point) = geometry();
    assert_eq!(tables.bases(&point), vec![shape.clone()]);
    assert!(tables.is_subtype(&point, &shape));
    assert!(!tables.is_subtype(&shape, &point));

    // a cycle stops the walk instead of looping
    tables.set_base(&shape, Some(point.clone()));
    assert_eq!(tables.bases(&point), vec![shape.clone()]);
    assert_eq!(tables.lineage(&shape), vec![shape, point]);
    let _ = geo;
}

#[test]
fn test_overloads_and_visibility_of_functions() {
    let (mut tables, geo, shape, point) = geometry();
    tables.add_function(function(&shape, "Area", 0, &[]));
    tables.add_function(function(&geo, "Area", 0, &[Primitive::Int]));
    tables.add_function(function(&geo, "Area", 1, &[Primitive::Real]));

    // inside Point the inherited member wins over the namespace pair
    let inside = point.child(Block::new(BlockKind::Function, "Len", 0));
    let found = tables.visible_functions(&inside, "Area");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].owner, shape);

    // at namespace level both namespace overloads are visible
    let found = tables.visible_functions(&geo, "Area");
    assert_eq!(found.len(), 2);
    assert_eq!(tables.member_functions(&point, "Area").len(), 1);
}

#[test]
fn test_arity_with_optional_and_variadic() {
    let root = ScopePath::root();
    let mut f = function(&root, "f", 0, &[Primitive::Int, Primitive::Int, Primitive::Int]);
    f.params[1].optional = true;
    f.params[2].variadic = true;
    assert_eq!(f.required_arity(), 1);
    assert!(f.is_variadic());
    assert!(!f.accepts_arity(0));
    assert!(f.accepts_arity(1));
    assert!(f.accepts_arity(7));

    let g = function(&root, "g", 0, &[Primitive::Int]);
    assert!(!g.accepts_arity(2));
    assert_eq!(g.display_signature(), "g(int)");
}

#[test]
fn test_properties_and_locals() {
    let (mut tables, _, shape, point) = geometry();
    let property = PropertyInfo {
        owner: shape.clone(),
        name: "sides".into(),
        modifiers: Modifiers::from_words(["protected"], Some(BlockKind::Class)),
        ty: TypeDescriptor::primitive(Primitive::Int),
        span: Span::dummy(),
    };
    assert!(tables.add_property(property.clone()));
    assert!(!tables.add_property(property));
    assert_eq!(
        tables.member_property(&point, "sides").map(|p| p.owner.clone()),
        Some(shape)
    );

    let len = point.child(Block::new(BlockKind::Function, "Len", 0));
    tables.add_variable(VariableInfo {
        function: len.clone(),
        name: "i".into(),
        ty: TypeDescriptor::primitive(Primitive::Int),
        span: Span::dummy(),
    });
    assert_eq!(tables.variables(&len, "i").len(), 1);
    assert!(tables.variables(&len, "j").is_empty());
}

#[test]
fn test_constructors_are_kept_apart() {
    let (mut tables, _, _, point) = geometry();
    let mut ctor = function(&point, "Point", 0, &[Primitive::Int]);
    ctor.kind = BlockKind::Constructor;
    ctor.path = point.child(Block::new(BlockKind::Constructor, "Point", 0));
    tables.add_function(ctor);
    assert_eq!(tables.constructors(&point).len(), 1);
    assert!(tables.overloads(&point, "Point").is_empty());
}
