//! Type-variable substitution.
//!
//! `specialize_type` rewrites a type with every transitively-mentioned type
//! variable replaced by its binding (or a concrete fallback), allocating new
//! types only when something actually changed. The functions here are pure:
//! no map mutation, no diagnostics. The one exception is method binding,
//! which runs an assignability query to infer bindings from an annotated
//! `self`/`cls` parameter.

use crate::arena::TypeArena;
use crate::assign::AssignabilityChecker;
use crate::type_utils::{combine_types, requires_specialization};
use crate::types::{
    ClassType, FunctionType, OverloadedFunctionType, SpecializedFunctionTypes, Type, TypeId,
    assign_flags,
};
use crate::typevar_map::TypeVarMap;
use pythia_common::DiagnosticAddendum;
use pythia_common::limits::MAX_TYPE_RECURSION_COUNT;

/// Replace every type variable in `id` using `map`.
///
/// A variable with no binding stays itself, unless `make_concrete` is set or
/// no map was supplied at all; then it falls back to its concrete form, the
/// union of its constraints plus its bound (`Any` when it has neither).
pub fn specialize_type(
    arena: &TypeArena,
    id: TypeId,
    map: Option<&TypeVarMap>,
    make_concrete: bool,
    recursion_level: u32,
) -> TypeId {
    if recursion_level > MAX_TYPE_RECURSION_COUNT {
        return TypeId::ANY;
    }
    // Shortcut the common case: nothing to substitute.
    if !requires_specialization(arena, id, 0) {
        return id;
    }

    match &*arena.get(id) {
        Type::TypeVar(type_var) => {
            if let Some(map) = map {
                if let Some(bound) = map.get(&type_var.name) {
                    return bound;
                }
            }
            if make_concrete || map.is_none() {
                tracing::trace!(name = %type_var.name, "type variable concretized");
                return get_concrete_type_from_type_var(arena, id, recursion_level);
            }
            id
        }
        Type::Union(union_type) => {
            let subtypes = union_type.subtypes.clone();
            let specialized: Vec<TypeId> = subtypes
                .iter()
                .map(|&subtype| {
                    specialize_type(arena, subtype, map, make_concrete, recursion_level + 1)
                })
                .collect();
            if specialized == subtypes {
                id
            } else {
                combine_types(arena, &specialized)
            }
        }
        Type::Object(object_type) => {
            let class_id = object_type.class_type;
            let specialized_class =
                specialize_type(arena, class_id, map, make_concrete, recursion_level + 1);
            // An instance of `Type[X]` is `X`-the-class.
            if let Some(class_type) = arena.get(specialized_class).as_class() {
                if class_type.is_builtin_named("Type") {
                    if let Some(type_arguments) = &class_type.type_arguments {
                        if let Some(&first) = type_arguments.first() {
                            if let Type::Object(inner) = &*arena.get(first) {
                                return inner.class_type;
                            }
                        }
                    }
                }
            }
            if specialized_class == class_id {
                id
            } else {
                arena.object_with_literal(specialized_class, object_type.literal_value.clone())
            }
        }
        Type::Class(class_type) => {
            specialize_class_type(arena, id, class_type, map, make_concrete, recursion_level)
        }
        Type::Function(function_type) => {
            specialize_function_type(arena, id, function_type, map, make_concrete, recursion_level)
        }
        Type::Overloaded(overloaded) => {
            let overloads = overloaded.overloads.clone();
            let specialized: Vec<TypeId> = overloads
                .iter()
                .map(|&overload| {
                    specialize_type(arena, overload, map, make_concrete, recursion_level + 1)
                })
                .collect();
            if specialized == overloads {
                id
            } else {
                arena.alloc(Type::Overloaded(Box::new(OverloadedFunctionType {
                    overloads: specialized,
                })))
            }
        }
        // Any, Unknown, None, Never, Unbound, Module
        _ => id,
    }
}

fn specialize_class_type(
    arena: &TypeArena,
    class_id: TypeId,
    class_type: &ClassType,
    map: Option<&TypeVarMap>,
    make_concrete: bool,
    recursion_level: u32,
) -> TypeId {
    match &class_type.type_arguments {
        Some(type_arguments) => {
            let specialized: Vec<TypeId> = type_arguments
                .iter()
                .map(|&arg| specialize_type(arena, arg, map, make_concrete, recursion_level + 1))
                .collect();
            if specialized == *type_arguments {
                class_id
            } else {
                arena.class(class_type.with_type_arguments(specialized))
            }
        }
        Option::None => {
            // An unspecialized generic stays unspecialized unless the caller
            // asked for a concrete type.
            if class_type.details.type_parameters.is_empty() || !make_concrete {
                return class_id;
            }
            let type_arguments: Vec<TypeId> = class_type
                .details
                .type_parameters
                .iter()
                .map(|&param| specialize_type(arena, param, map, true, recursion_level + 1))
                .collect();
            arena.class(class_type.with_type_arguments(type_arguments))
        }
    }
}

fn specialize_function_type(
    arena: &TypeArena,
    function_id: TypeId,
    function_type: &FunctionType,
    map: Option<&TypeVarMap>,
    make_concrete: bool,
    recursion_level: u32,
) -> TypeId {
    let mut changed = false;

    let parameter_types: Vec<TypeId> = (0..function_type.parameters.len())
        .map(|index| {
            let param_type = function_type.effective_parameter_type(index);
            let specialized =
                specialize_type(arena, param_type, map, make_concrete, recursion_level + 1);
            if specialized != param_type {
                changed = true;
            }
            specialized
        })
        .collect();

    let return_type = function_type.effective_return_type();
    let specialized_return =
        specialize_type(arena, return_type, map, make_concrete, recursion_level + 1);
    if specialized_return != return_type {
        changed = true;
    }

    if !changed {
        return function_id;
    }

    let mut specialized_function = function_type.clone();
    specialized_function.specialized = Some(SpecializedFunctionTypes {
        parameter_types,
        return_type: Some(specialized_return),
    });
    arena.alloc(Type::Function(Box::new(specialized_function)))
}

/// The concrete form a free type variable degrades to: the union of its
/// constraints plus its bound, or `Any` with neither.
pub fn get_concrete_type_from_type_var(
    arena: &TypeArena,
    type_var_id: TypeId,
    recursion_level: u32,
) -> TypeId {
    let type_var_arc = arena.get(type_var_id);
    let Type::TypeVar(type_var) = &*type_var_arc else {
        return type_var_id;
    };
    let mut concrete_types = type_var.constraints.clone();
    if let Some(bound_type) = type_var.bound_type {
        concrete_types.push(bound_type);
    }
    if concrete_types.is_empty() {
        return TypeId::ANY;
    }
    let combined = combine_types(arena, &concrete_types);
    specialize_type(arena, combined, Option::None, false, recursion_level + 1)
}

/// Map each of the class's type parameters to its argument. An unspecialized
/// class maps each parameter to itself; a short argument list (special
/// builtins) pads with `Unknown`.
pub fn build_type_var_map_from_specialized_class(
    arena: &TypeArena,
    class_type: &ClassType,
) -> TypeVarMap {
    let mut map = TypeVarMap::new();
    for (index, &param) in class_type.details.type_parameters.iter().enumerate() {
        let param_arc = arena.get(param);
        let Type::TypeVar(type_var) = &*param_arc else {
            continue;
        };
        let bound = match &class_type.type_arguments {
            Some(type_arguments) => type_arguments.get(index).copied().unwrap_or(TypeId::UNKNOWN),
            Option::None => param,
        };
        map.set(type_var.name.clone(), bound);
    }
    map
}

/// Substitute the given bindings without concretizing anything unbound.
pub fn partially_specialize_type(arena: &TypeArena, id: TypeId, map: &TypeVarMap) -> TypeId {
    specialize_type(arena, id, Some(map), false, 0)
}

/// Rewrite a base-class reference in terms of the derived class's type
/// arguments, so that inherited members carry their substituted types.
pub fn partially_specialize_type_for_base_class(
    arena: &TypeArena,
    derived_class: &ClassType,
    base_class_id: TypeId,
) -> TypeId {
    if derived_class.type_arguments.is_none() {
        return base_class_id;
    }
    let map = build_type_var_map_from_specialized_class(arena, derived_class);
    partially_specialize_type(arena, base_class_id, &map)
}

/// Clone a function minus its leading parameter (and the matching entry of
/// its specialized parameter list).
pub fn strip_first_parameter(arena: &TypeArena, function_id: TypeId) -> TypeId {
    let function_arc = arena.get(function_id);
    let Type::Function(function_type) = &*function_arc else {
        return function_id;
    };
    if function_type.parameters.is_empty() {
        return function_id;
    }
    let mut stripped = (**function_type).clone();
    stripped.parameters.remove(0);
    if let Some(specialized) = &mut stripped.specialized {
        if !specialized.parameter_types.is_empty() {
            specialized.parameter_types.remove(0);
        }
    }
    arena.alloc(Type::Function(Box::new(stripped)))
}

/// Bind a function or overload set to a class or instance.
///
/// Instance methods bind against an instance base, class methods (or any
/// method when `treat_as_class_member`) against the class; both specialize
/// the signature with the base's type arguments, augmented by whatever an
/// annotated first parameter can infer, and then drop the first parameter.
/// With no base, only the first parameter is dropped.
pub fn bind_function_to_class_or_object(
    arena: &TypeArena,
    base: Option<TypeId>,
    member_type: TypeId,
    treat_as_class_member: bool,
) -> TypeId {
    match &*arena.get(member_type) {
        Type::Function(function_type) => {
            let Some(base_id) = base else {
                return strip_first_parameter(arena, member_type);
            };
            if function_type.is_instance_method() && !treat_as_class_member {
                if matches!(&*arena.get(base_id), Type::Object(_)) {
                    return partially_specialize_bound_member(arena, base_id, member_type);
                }
            } else if function_type.is_class_method() || treat_as_class_member {
                let class_id = match &*arena.get(base_id) {
                    Type::Object(object_type) => object_type.class_type,
                    _ => base_id,
                };
                return partially_specialize_bound_member(arena, class_id, member_type);
            }
            member_type
        }
        Type::Overloaded(overloaded) => {
            let bound: Vec<TypeId> = overloaded
                .overloads
                .iter()
                .map(|&overload| {
                    bind_function_to_class_or_object(arena, base, overload, treat_as_class_member)
                })
                .collect();
            arena.alloc(Type::Overloaded(Box::new(OverloadedFunctionType {
                overloads: bound,
            })))
        }
        _ => member_type,
    }
}

fn partially_specialize_bound_member(
    arena: &TypeArena,
    base_id: TypeId,
    member_type: TypeId,
) -> TypeId {
    let class_id = match &*arena.get(base_id) {
        Type::Object(object_type) => object_type.class_type,
        _ => base_id,
    };
    let class_arc = arena.get(class_id);
    let Some(class_type) = class_arc.as_class() else {
        return member_type;
    };

    // Start from the specialization the base already carries, then let an
    // annotated self/cls parameter contribute additional bindings.
    let mut map = if class_type.type_arguments.is_some() {
        build_type_var_map_from_specialized_class(arena, class_type)
    } else {
        TypeVarMap::new()
    };
    if let Some(first_param) = arena
        .get(member_type)
        .as_function()
        .and_then(|f| f.parameters.first().cloned())
    {
        let checker = AssignabilityChecker::new(arena);
        let mut scratch = DiagnosticAddendum::new();
        checker.can_assign(
            first_param.param_type,
            base_id,
            &mut scratch,
            Some(&mut map),
            assign_flags::DEFAULT,
            0,
        );
    }

    let specialized = specialize_type(arena, member_type, Some(&map), false, 0);
    strip_first_parameter(arena, specialized)
}
