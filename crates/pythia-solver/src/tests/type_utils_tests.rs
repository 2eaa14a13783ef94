//! Tests for the type-model algebra: union normalization, structural
//! equality, conversions, and the derivation predicate.

use super::fixtures::Fixture;
use crate::printer::print_type;
use crate::type_utils::{
    InheritanceChain, combine_types, convert_class_to_object, for_each_subtype, get_metaclass,
    is_derived_from, is_ellipsis_type, is_no_return_type, is_none_or_never,
    is_same_without_literal_value, is_type_same, requires_specialization, strip_literal_value,
    transform_type_object_to_class,
};
use crate::symbols::SymbolTable;
use crate::types::{BaseClass, Parameter, Type, TypeId, Variance, class_flags};

#[test]
fn test_for_each_subtype_maps_and_recombines() {
    let fx = Fixture::new();
    let int_obj = fx.int_instance();
    let str_obj = fx.str_instance();
    let union = combine_types(&fx.arena, &[int_obj, str_obj]);

    // Map int to float, drop str.
    let result = for_each_subtype(&fx.arena, union, |subtype, _| {
        if subtype == int_obj {
            Some(fx.float_instance())
        } else {
            None
        }
    });
    assert_eq!(result, fx.float_instance());

    // A non-union applies the callback once.
    let result = for_each_subtype(&fx.arena, int_obj, |subtype, index| {
        assert_eq!(index, 0);
        Some(subtype)
    });
    assert_eq!(result, int_obj);

    // A None result on a non-union is Never.
    let result = for_each_subtype(&fx.arena, int_obj, |_, _| None);
    assert_eq!(result, TypeId::NEVER);
}

#[test]
fn test_strip_literal_value() {
    let fx = Fixture::new();
    let lit = fx.str_literal("on");
    assert_eq!(strip_literal_value(&fx.arena, lit), fx.str_instance());

    // Unions strip member-wise; untouched types come back unchanged.
    let union = combine_types(&fx.arena, &[fx.int_literal(1), fx.str_literal("x")]);
    let stripped = strip_literal_value(&fx.arena, union);
    let expected = combine_types(&fx.arena, &[fx.int_instance(), fx.str_instance()]);
    assert!(is_type_same(&fx.arena, stripped, expected, 0));

    assert_eq!(strip_literal_value(&fx.arena, fx.int_instance()), fx.int_instance());
}

#[test]
fn test_is_same_without_literal_value() {
    let fx = Fixture::new();
    assert!(is_same_without_literal_value(
        &fx.arena,
        fx.str_literal("on"),
        fx.str_instance()
    ));
    assert!(is_same_without_literal_value(
        &fx.arena,
        fx.str_literal("on"),
        fx.str_literal("off")
    ));
    assert!(!is_same_without_literal_value(
        &fx.arena,
        fx.str_literal("on"),
        fx.int_instance()
    ));
}

#[test]
fn test_conversions() {
    let fx = Fixture::new();

    assert_eq!(
        convert_class_to_object(&fx.arena, fx.int_class),
        fx.int_instance()
    );
    assert_eq!(convert_class_to_object(&fx.arena, TypeId::NONE), TypeId::NONE);

    let type_of_int = fx.instance(fx.specialized(fx.type_special, vec![fx.int_instance()]));
    assert_eq!(
        transform_type_object_to_class(&fx.arena, type_of_int),
        fx.int_class
    );
    // Anything that is not Type[Object] passes through.
    assert_eq!(
        transform_type_object_to_class(&fx.arena, fx.int_instance()),
        fx.int_instance()
    );
    let bare_type = fx.instance(fx.type_special);
    assert_eq!(transform_type_object_to_class(&fx.arena, bare_type), bare_type);
}

#[test]
fn test_marker_predicates() {
    let fx = Fixture::new();
    assert!(is_ellipsis_type(&fx.arena, TypeId::ELLIPSIS));
    assert!(!is_ellipsis_type(&fx.arena, TypeId::ANY));

    assert!(is_none_or_never(&fx.arena, TypeId::NONE));
    assert!(is_none_or_never(&fx.arena, TypeId::NEVER));
    assert!(!is_none_or_never(&fx.arena, fx.int_instance()));

    let no_return = fx.class_with(
        "NoReturn",
        class_flags::BUILTIN,
        Vec::new(),
        vec![BaseClass::new(fx.object_class)],
        SymbolTable::new(),
    );
    assert!(is_no_return_type(&fx.arena, fx.instance(no_return)));
    assert!(!is_no_return_type(&fx.arena, fx.int_instance()));
}

// =============================================================================
// Structural equality
// =============================================================================

#[test]
fn test_is_type_same_on_specializations() {
    let fx = Fixture::new();
    let t = fx.type_var("_T", Variance::Invariant);
    let list = fx.class_with(
        "List",
        0,
        vec![t],
        vec![BaseClass::new(fx.object_class)],
        SymbolTable::new(),
    );

    let a = fx.specialized(list, vec![fx.int_instance()]);
    let b = fx.specialized(list, vec![fx.int_instance()]);
    let c = fx.specialized(list, vec![fx.str_instance()]);
    assert_ne!(a, b);
    assert!(is_type_same(&fx.arena, a, b, 0));
    assert!(!is_type_same(&fx.arena, a, c, 0));

    // Different generic classes never compare equal, even with equal args.
    let other = fx.class_with(
        "Sequence",
        0,
        vec![t],
        vec![BaseClass::new(fx.object_class)],
        SymbolTable::new(),
    );
    let d = fx.specialized(other, vec![fx.int_instance()]);
    assert!(!is_type_same(&fx.arena, a, d, 0));
}

#[test]
fn test_is_type_same_unions_are_order_insensitive() {
    let fx = Fixture::new();
    let int_obj = fx.int_instance();
    let str_obj = fx.str_instance();
    let ab = combine_types(&fx.arena, &[int_obj, str_obj]);
    let ba = combine_types(&fx.arena, &[str_obj, int_obj]);
    assert!(is_type_same(&fx.arena, ab, ba, 0));

    let abc = combine_types(&fx.arena, &[int_obj, str_obj, fx.float_instance()]);
    assert!(!is_type_same(&fx.arena, ab, abc, 0));
}

#[test]
fn test_requires_specialization() {
    let fx = Fixture::new();
    let t = fx.type_var("_T", Variance::Invariant);
    let list = fx.class_with(
        "List",
        0,
        vec![t],
        vec![BaseClass::new(fx.object_class)],
        SymbolTable::new(),
    );

    assert!(requires_specialization(&fx.arena, t, 0));
    // An unspecialized generic still needs arguments.
    assert!(requires_specialization(&fx.arena, list, 0));
    assert!(!requires_specialization(
        &fx.arena,
        fx.specialized(list, vec![fx.int_instance()]),
        0
    ));
    assert!(requires_specialization(
        &fx.arena,
        fx.instance(fx.specialized(list, vec![t])),
        0
    ));
    assert!(!requires_specialization(&fx.arena, fx.int_instance(), 0));

    let generic_fn = fx.function(vec![Parameter::positional("x", t)], TypeId::NONE);
    assert!(requires_specialization(&fx.arena, generic_fn, 0));
}

// =============================================================================
// Hierarchy walks
// =============================================================================

#[test]
fn test_is_derived_from_builds_the_chain() {
    let fx = Fixture::new();
    let a = fx.simple_class("A");
    let b = fx.class_with("B", 0, Vec::new(), vec![BaseClass::new(a)], SymbolTable::new());
    let c = fx.class_with("C", 0, Vec::new(), vec![BaseClass::new(b)], SymbolTable::new());

    let mut chain = InheritanceChain::new();
    assert!(is_derived_from(&fx.arena, c, a, &mut chain));
    assert_eq!(chain.as_slice(), &[a, b, c]);

    let mut chain = InheritanceChain::new();
    assert!(!is_derived_from(&fx.arena, a, c, &mut chain));
    assert!(chain.is_empty());
}

#[test]
fn test_is_derived_from_through_unknown_base() {
    let fx = Fixture::new();
    let shaky = fx.class_with(
        "Shaky",
        0,
        Vec::new(),
        vec![BaseClass::new(TypeId::UNKNOWN)],
        SymbolTable::new(),
    );
    let target = fx.simple_class("Target");

    let mut chain = InheritanceChain::new();
    assert!(is_derived_from(&fx.arena, shaky, target, &mut chain));
    assert_eq!(chain.as_slice(), &[TypeId::UNKNOWN, shaky]);
}

#[test]
fn test_get_metaclass_skips_ordinary_bases() {
    let fx = Fixture::new();
    let meta = fx.simple_class("Meta");
    let with_meta = fx.class_with(
        "Widget",
        0,
        Vec::new(),
        vec![BaseClass::new(fx.object_class), BaseClass::metaclass(meta)],
        SymbolTable::new(),
    );
    assert_eq!(get_metaclass(&fx.arena, with_meta), Some(meta));
    assert_eq!(get_metaclass(&fx.arena, fx.int_class), None);
}

// =============================================================================
// Printing
// =============================================================================

#[test]
fn test_print_type_spellings() {
    let fx = Fixture::new();
    assert_eq!(print_type(&fx.arena, fx.int_instance()), "int");
    assert_eq!(print_type(&fx.arena, fx.int_class), "Type[int]");
    assert_eq!(print_type(&fx.arena, fx.str_literal("on")), "Literal['on']");
    assert_eq!(print_type(&fx.arena, TypeId::NONE), "None");

    let union = combine_types(&fx.arena, &[fx.int_instance(), TypeId::NONE]);
    assert_eq!(print_type(&fx.arena, union), "int | None");

    let t = fx.type_var("_T", Variance::Invariant);
    let list = fx.class_with(
        "List",
        0,
        vec![t],
        vec![BaseClass::new(fx.object_class)],
        SymbolTable::new(),
    );
    let list_of_int = fx.instance(fx.specialized(list, vec![fx.int_instance()]));
    assert_eq!(print_type(&fx.arena, list_of_int), "List[int]");

    let function = fx.function(
        vec![Parameter::positional("x", fx.int_instance())],
        fx.str_instance(),
    );
    assert_eq!(print_type(&fx.arena, function), "(x: int) -> str");
}

#[test]
fn test_union_never_nests() {
    let fx = Fixture::new();
    let inner = combine_types(&fx.arena, &[fx.int_instance(), fx.str_instance()]);
    let outer = combine_types(&fx.arena, &[inner, fx.float_instance()]);

    let outer_arc = fx.arena.get(outer);
    let Type::Union(union_type) = &*outer_arc else {
        panic!("expected a union");
    };
    assert_eq!(union_type.subtypes.len(), 3);
    for &subtype in &union_type.subtypes {
        assert!(!matches!(&*fx.arena.get(subtype), Type::Union(_)));
    }
}
