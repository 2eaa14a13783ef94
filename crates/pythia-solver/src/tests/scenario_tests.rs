//! End-to-end scenarios exercising the engine the way the checker drives it.

use super::fixtures::Fixture;
use crate::assign::AssignabilityChecker;
use crate::specialize::specialize_type;
use crate::symbols::SymbolTable;
use crate::types::{BaseClass, Parameter, TypeId, Variance, assign_flags, class_flags};
use crate::typevar_map::TypeVarMap;
use pythia_common::DiagnosticAddendum;

#[test]
fn test_covariant_list() {
    let fx = Fixture::new();
    let checker = AssignabilityChecker::new(&fx.arena);
    let (animal, dog) = fx.animal_and_dog();

    let element = fx.type_var("_T", Variance::Covariant);
    let list = fx.class_with(
        "List",
        0,
        vec![element],
        vec![BaseClass::new(fx.object_class)],
        SymbolTable::new(),
    );
    let list_of_animal = fx.instance(fx.specialized(list, vec![fx.instance(animal)]));
    let list_of_dog = fx.instance(fx.specialized(list, vec![fx.instance(dog)]));

    let mut diag = DiagnosticAddendum::new();
    assert!(checker.can_assign(list_of_animal, list_of_dog, &mut diag, None, 0, 0));

    let mut diag = DiagnosticAddendum::new();
    assert!(!checker.can_assign(list_of_dog, list_of_animal, &mut diag, None, 0, 0));
    let rendered = diag.flatten().join("\n");
    assert!(rendered.contains("incompatible"), "unexpected addendum: {rendered}");
}

#[test]
fn test_invariant_dict() {
    let fx = Fixture::new();
    let checker = AssignabilityChecker::new(&fx.arena);
    let (animal, dog) = fx.animal_and_dog();

    let key = fx.type_var("_K", Variance::Invariant);
    let value = fx.type_var("_V", Variance::Invariant);
    let dict = fx.class_with(
        "Dict",
        0,
        vec![key, value],
        vec![BaseClass::new(fx.object_class)],
        SymbolTable::new(),
    );
    let str_obj = fx.str_instance();
    let dict_str_animal = fx.instance(fx.specialized(dict, vec![str_obj, fx.instance(animal)]));
    let dict_str_dog = fx.instance(fx.specialized(dict, vec![str_obj, fx.instance(dog)]));

    let mut diag = DiagnosticAddendum::new();
    assert!(!checker.can_assign(dict_str_animal, dict_str_dog, &mut diag, None, 0, 0));
}

#[test]
fn test_literal_narrowing() {
    let fx = Fixture::new();
    let checker = AssignabilityChecker::new(&fx.arena);

    let lit_on = fx.str_literal("on");
    let lit_off = fx.str_literal("off");

    let mut diag = DiagnosticAddendum::new();
    assert!(!checker.can_assign(lit_on, lit_off, &mut diag, None, 0, 0));
    let rendered = diag.flatten().join("\n");
    assert!(
        rendered.contains("cannot be assigned to"),
        "unexpected addendum: {rendered}"
    );

    let mut diag = DiagnosticAddendum::new();
    assert!(checker.can_assign(fx.str_instance(), lit_on, &mut diag, None, 0, 0));
}

#[test]
fn test_typevar_binding_through_identity_function() {
    let fx = Fixture::new();
    let checker = AssignabilityChecker::new(&fx.arena);

    // def id(x: _T) -> _T, called with an int argument.
    let t = fx.type_var("_T", Variance::Invariant);
    let identity = fx.function(vec![Parameter::positional("x", t)], t);

    let mut map = TypeVarMap::new();
    let mut diag = DiagnosticAddendum::new();
    assert!(checker.can_assign(t, fx.int_instance(), &mut diag, Some(&mut map), 0, 0));
    assert_eq!(map.get("_T"), Some(fx.int_instance()));

    // The call's return type specializes to int.
    let specialized = specialize_type(&fx.arena, identity, Some(&map), false, 0);
    let specialized_arc = fx.arena.get(specialized);
    let function = specialized_arc.as_function().expect("still a function");
    assert_eq!(function.effective_return_type(), fx.int_instance());
    assert_eq!(function.effective_parameter_type(0), fx.int_instance());
}

#[test]
fn test_protocol_match() {
    let fx = Fixture::new();
    let checker = AssignabilityChecker::new(&fx.arena);
    let int_obj = fx.int_instance();

    let mut protocol_fields = SymbolTable::new();
    protocol_fields.insert("__len__".to_string(), fx.method_symbol(Vec::new(), int_obj));
    let has_len = fx.class_with(
        "HasLen",
        class_flags::PROTOCOL,
        Vec::new(),
        vec![BaseClass::new(fx.object_class)],
        protocol_fields,
    );

    let mut box_fields = SymbolTable::new();
    box_fields.insert("__len__".to_string(), fx.method_symbol(Vec::new(), int_obj));
    let box_class = fx.class_with(
        "Box",
        0,
        Vec::new(),
        vec![BaseClass::new(fx.object_class)],
        box_fields,
    );
    let blank = fx.simple_class("Blank");

    let mut diag = DiagnosticAddendum::new();
    assert!(checker.can_assign(
        fx.instance(has_len),
        fx.instance(box_class),
        &mut diag,
        None,
        0,
        0
    ));
    assert!(diag.is_empty());

    let mut diag = DiagnosticAddendum::new();
    assert!(!checker.can_assign(
        fx.instance(has_len),
        fx.instance(blank),
        &mut diag,
        None,
        0,
        0
    ));
    let rendered = diag.flatten().join("\n");
    assert!(
        rendered.contains("'__len__' is not present"),
        "unexpected addendum: {rendered}"
    );
}

#[test]
fn test_numeric_tower() {
    let fx = Fixture::new();
    let checker = AssignabilityChecker::new(&fx.arena);
    let mut diag = DiagnosticAddendum::new();

    assert!(checker.can_assign(fx.float_instance(), fx.int_instance(), &mut diag, None, 0, 0));
    assert!(checker.can_assign(fx.complex_instance(), fx.float_instance(), &mut diag, None, 0, 0));
    assert!(checker.can_assign(fx.complex_instance(), fx.int_instance(), &mut diag, None, 0, 0));
    assert!(!checker.can_assign(fx.int_instance(), fx.float_instance(), &mut diag, None, 0, 0));
}

#[test]
fn test_variadic_tuple() {
    let fx = Fixture::new();
    let checker = AssignabilityChecker::new(&fx.arena);
    let int_obj = fx.int_instance();
    let str_obj = fx.str_instance();

    let homogeneous =
        fx.instance(fx.specialized(fx.tuple_class, vec![int_obj, TypeId::ELLIPSIS]));
    let three_ints =
        fx.instance(fx.specialized(fx.tuple_class, vec![int_obj, int_obj, int_obj]));
    let int_and_str = fx.instance(fx.specialized(fx.tuple_class, vec![int_obj, str_obj]));

    let mut diag = DiagnosticAddendum::new();
    assert!(checker.can_assign(homogeneous, three_ints, &mut diag, None, 0, 0));

    let mut diag = DiagnosticAddendum::new();
    assert!(!checker.can_assign(homogeneous, int_and_str, &mut diag, None, 0, 0));
    let rendered = diag.flatten().join("\n");
    assert!(
        rendered.contains("Tuple entry 2 is incorrect type"),
        "unexpected addendum: {rendered}"
    );
}

#[test]
fn test_fixed_tuple_size_mismatch() {
    let fx = Fixture::new();
    let checker = AssignabilityChecker::new(&fx.arena);
    let int_obj = fx.int_instance();

    let two = fx.instance(fx.specialized(fx.tuple_class, vec![int_obj, int_obj]));
    let three = fx.instance(fx.specialized(fx.tuple_class, vec![int_obj, int_obj, int_obj]));

    let mut diag = DiagnosticAddendum::new();
    assert!(!checker.can_assign(two, three, &mut diag, None, assign_flags::DEFAULT, 0));
    let rendered = diag.flatten().join("\n");
    assert!(
        rendered.contains("Tuple size mismatch: expected 2 but got 3"),
        "unexpected addendum: {rendered}"
    );
}
