//! The small algebra over the type model.
//!
//! Everything here is total: ambiguous or partially-unknown inputs produce
//! `Unknown`/`Any` results instead of failing, and every recursive walk is
//! capped by the shared recursion bound.

use crate::arena::TypeArena;
use crate::types::{Type, TypeId, UnionType};
use pythia_common::limits::MAX_TYPE_RECURSION_COUNT;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Class ids from a derived class up to and including a matched ancestor,
/// derived-most last.
pub type InheritanceChain = SmallVec<[TypeId; 4]>;

// =============================================================================
// Predicates
// =============================================================================

pub fn is_any_or_unknown(arena: &TypeArena, id: TypeId) -> bool {
    arena.get(id).is_any_or_unknown()
}

pub fn is_none_or_never(arena: &TypeArena, id: TypeId) -> bool {
    arena.get(id).is_none_or_never()
}

/// The `...` marker: the flagged `Any` or the builtin `ellipsis` class.
pub fn is_ellipsis_type(arena: &TypeArena, id: TypeId) -> bool {
    match &*arena.get(id) {
        Type::Any { is_ellipsis } => *is_ellipsis,
        Type::Class(class_type) => class_type.is_builtin_named("ellipsis"),
        _ => false,
    }
}

/// An instance of the builtin `NoReturn` marker class.
pub fn is_no_return_type(arena: &TypeArena, id: TypeId) -> bool {
    match &*arena.get(id) {
        Type::Object(object_type) => arena
            .get(object_type.class_type)
            .as_class()
            .is_some_and(|class_type| class_type.is_builtin_named("NoReturn")),
        _ => false,
    }
}

// =============================================================================
// Conversions
// =============================================================================

/// Drop the literal pin from an object type; unions strip member-wise.
pub fn strip_literal_value(arena: &TypeArena, id: TypeId) -> TypeId {
    match &*arena.get(id) {
        Type::Object(object_type) if object_type.literal_value.is_some() => {
            arena.object(object_type.class_type)
        }
        Type::Union(union_type) => {
            let stripped: Vec<TypeId> = union_type
                .subtypes
                .iter()
                .map(|&subtype| strip_literal_value(arena, subtype))
                .collect();
            if stripped == union_type.subtypes {
                id
            } else {
                combine_types(arena, &stripped)
            }
        }
        _ => id,
    }
}

/// A class used in value position denotes its instances.
pub fn convert_class_to_object(arena: &TypeArena, id: TypeId) -> TypeId {
    match &*arena.get(id) {
        Type::Class(_) => arena.object(id),
        _ => id,
    }
}

/// Unwrap the builtin `Type[X]`: an instance of `Type[X]` is `X`-the-class.
/// Anything else passes through unchanged.
pub fn transform_type_object_to_class(arena: &TypeArena, id: TypeId) -> TypeId {
    let type_arc = arena.get(id);
    let Some(object_type) = type_arc.as_object() else {
        return id;
    };
    let class_arc = arena.get(object_type.class_type);
    let Some(class_type) = class_arc.as_class() else {
        return id;
    };
    if !class_type.is_builtin_named("Type") {
        return id;
    }
    let Some(type_arguments) = &class_type.type_arguments else {
        return id;
    };
    let Some(&first) = type_arguments.first() else {
        return id;
    };
    match &*arena.get(first) {
        Type::Object(inner) => inner.class_type,
        _ => id,
    }
}

// =============================================================================
// Union algebra
// =============================================================================

/// Union-form and canonicalize: drop `Never` members, flatten nested unions,
/// remove exact duplicates, and collapse to a single element when possible.
/// An empty input is `Never`.
pub fn combine_types(arena: &TypeArena, types: &[TypeId]) -> TypeId {
    let live: Vec<TypeId> = types
        .iter()
        .copied()
        .filter(|&id| !matches!(&*arena.get(id), Type::Never))
        .collect();
    if live.is_empty() {
        return TypeId::NEVER;
    }
    if live.len() == 1 {
        return live[0];
    }

    let mut expanded: Vec<TypeId> = Vec::with_capacity(live.len());
    for id in live {
        match &*arena.get(id) {
            Type::Union(union_type) => expanded.extend(union_type.subtypes.iter().copied()),
            _ => expanded.push(id),
        }
    }

    let mut subtypes: Vec<TypeId> = Vec::with_capacity(expanded.len());
    for id in expanded {
        if !subtypes
            .iter()
            .any(|&existing| is_type_same(arena, existing, id, 0))
        {
            subtypes.push(id);
        }
    }

    if subtypes.len() == 1 {
        return subtypes[0];
    }
    arena.alloc(Type::Union(Box::new(UnionType { subtypes })))
}

/// Apply `callback` to each union member (or to the type itself when it is
/// not a union), recombining the non-`None` results. A `None` result stands
/// for `Never` and is dropped by [`combine_types`].
pub fn for_each_subtype(
    arena: &TypeArena,
    id: TypeId,
    mut callback: impl FnMut(TypeId, usize) -> Option<TypeId>,
) -> TypeId {
    match &*arena.get(id) {
        Type::Union(union_type) => {
            let subtypes = union_type.subtypes.clone();
            let results: Vec<TypeId> = subtypes
                .iter()
                .enumerate()
                .filter_map(|(index, &subtype)| callback(subtype, index))
                .collect();
            combine_types(arena, &results)
        }
        _ => callback(id, 0).unwrap_or(TypeId::NEVER),
    }
}

// =============================================================================
// Structural equality
// =============================================================================

/// Deep structural equality up to the recursion bound (beyond which types are
/// presumed equal; the bound is the termination guarantee on cyclic graphs).
pub fn is_type_same(arena: &TypeArena, a: TypeId, b: TypeId, recursion_level: u32) -> bool {
    if a == b {
        return true;
    }
    if recursion_level > MAX_TYPE_RECURSION_COUNT {
        return true;
    }

    let a_type = arena.get(a);
    let b_type = arena.get(b);
    match (&*a_type, &*b_type) {
        (Type::Unbound, Type::Unbound)
        | (Type::Unknown, Type::Unknown)
        | (Type::None, Type::None)
        | (Type::Never, Type::Never) => true,
        (Type::Any { is_ellipsis: a_ellipsis }, Type::Any { is_ellipsis: b_ellipsis }) => {
            a_ellipsis == b_ellipsis
        }
        (Type::TypeVar(a_var), Type::TypeVar(b_var)) => {
            a_var.name == b_var.name
                && a_var.variance == b_var.variance
                && a_var.constraints.len() == b_var.constraints.len()
                && a_var
                    .constraints
                    .iter()
                    .zip(&b_var.constraints)
                    .all(|(&x, &y)| is_type_same(arena, x, y, recursion_level + 1))
                && match (a_var.bound_type, b_var.bound_type) {
                    (Some(x), Some(y)) => is_type_same(arena, x, y, recursion_level + 1),
                    (Option::None, Option::None) => true,
                    _ => false,
                }
        }
        (Type::Class(a_class), Type::Class(b_class)) => {
            if !a_class.is_same_generic_class(b_class) {
                return false;
            }
            // Compare specializations, treating a missing argument as Any.
            let a_args = a_class.type_arguments.as_deref().unwrap_or(&[]);
            let b_args = b_class.type_arguments.as_deref().unwrap_or(&[]);
            if a_class.type_arguments.is_none() && b_class.type_arguments.is_none() {
                return true;
            }
            let arg_count = a_args.len().max(b_args.len());
            (0..arg_count).all(|index| {
                let a_arg = a_args.get(index).copied().unwrap_or(TypeId::ANY);
                let b_arg = b_args.get(index).copied().unwrap_or(TypeId::ANY);
                is_type_same(arena, a_arg, b_arg, recursion_level + 1)
            })
        }
        (Type::Object(a_object), Type::Object(b_object)) => {
            a_object.literal_value == b_object.literal_value
                && is_type_same(
                    arena,
                    a_object.class_type,
                    b_object.class_type,
                    recursion_level + 1,
                )
        }
        (Type::Function(a_func), Type::Function(b_func)) => {
            if a_func.parameters.len() != b_func.parameters.len() {
                return false;
            }
            let params_match = a_func
                .parameters
                .iter()
                .zip(&b_func.parameters)
                .enumerate()
                .all(|(index, (a_param, b_param))| {
                    a_param.category == b_param.category
                        && a_param.name == b_param.name
                        && is_type_same(
                            arena,
                            a_func.effective_parameter_type(index),
                            b_func.effective_parameter_type(index),
                            recursion_level + 1,
                        )
                });
            params_match
                && is_type_same(
                    arena,
                    a_func.effective_return_type(),
                    b_func.effective_return_type(),
                    recursion_level + 1,
                )
        }
        (Type::Overloaded(a_overloads), Type::Overloaded(b_overloads)) => {
            a_overloads.overloads.len() == b_overloads.overloads.len()
                && a_overloads
                    .overloads
                    .iter()
                    .zip(&b_overloads.overloads)
                    .all(|(&x, &y)| is_type_same(arena, x, y, recursion_level + 1))
        }
        (Type::Union(a_union), Type::Union(b_union)) => {
            // Union members carry no particular order; quadratic match.
            a_union.subtypes.len() == b_union.subtypes.len()
                && a_union.subtypes.iter().all(|&a_subtype| {
                    b_union
                        .subtypes
                        .iter()
                        .any(|&b_subtype| is_type_same(arena, a_subtype, b_subtype, recursion_level + 1))
                })
        }
        _ => false,
    }
}

/// Structural equality that treats a literal-pinned object as equal to the
/// plain instance of the same class.
pub fn is_same_without_literal_value(arena: &TypeArena, a: TypeId, b: TypeId) -> bool {
    let a_stripped = strip_literal_value(arena, a);
    let b_stripped = strip_literal_value(arena, b);
    is_type_same(arena, a_stripped, b_stripped, 0)
}

// =============================================================================
// Type-variable discovery
// =============================================================================

/// Does `id` transitively mention a type variable?
pub fn requires_specialization(arena: &TypeArena, id: TypeId, recursion_level: u32) -> bool {
    if recursion_level > MAX_TYPE_RECURSION_COUNT {
        return false;
    }
    match &*arena.get(id) {
        Type::TypeVar(_) => true,
        Type::Class(class_type) => match &class_type.type_arguments {
            Some(type_arguments) => type_arguments
                .iter()
                .any(|&arg| requires_specialization(arena, arg, recursion_level + 1)),
            Option::None => !class_type.details.type_parameters.is_empty(),
        },
        Type::Object(object_type) => {
            requires_specialization(arena, object_type.class_type, recursion_level + 1)
        }
        Type::Function(function_type) => {
            let param_count = function_type.parameters.len();
            (0..param_count).any(|index| {
                requires_specialization(
                    arena,
                    function_type.effective_parameter_type(index),
                    recursion_level + 1,
                )
            }) || requires_specialization(
                arena,
                function_type.effective_return_type(),
                recursion_level + 1,
            )
        }
        Type::Overloaded(overloaded) => overloaded
            .overloads
            .iter()
            .any(|&overload| requires_specialization(arena, overload, recursion_level + 1)),
        Type::Union(union_type) => union_type
            .subtypes
            .iter()
            .any(|&subtype| requires_specialization(arena, subtype, recursion_level + 1)),
        _ => false,
    }
}

/// All type variables mentioned in `id`, depth-first in first-occurrence
/// order, de-duplicated by name.
pub fn get_type_var_arguments_recursive(arena: &TypeArena, id: TypeId) -> Vec<TypeId> {
    let mut result = Vec::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    collect_type_vars(arena, id, &mut result, &mut seen, 0);
    result
}

fn collect_type_vars(
    arena: &TypeArena,
    id: TypeId,
    result: &mut Vec<TypeId>,
    seen: &mut FxHashSet<String>,
    recursion_level: u32,
) {
    if recursion_level > MAX_TYPE_RECURSION_COUNT {
        return;
    }
    match &*arena.get(id) {
        Type::TypeVar(type_var) => {
            if seen.insert(type_var.name.clone()) {
                result.push(id);
            }
        }
        Type::Class(class_type) => {
            if let Some(type_arguments) = &class_type.type_arguments {
                for &arg in type_arguments {
                    collect_type_vars(arena, arg, result, seen, recursion_level + 1);
                }
            }
        }
        Type::Object(object_type) => {
            collect_type_vars(arena, object_type.class_type, result, seen, recursion_level + 1);
        }
        Type::Union(union_type) => {
            for &subtype in &union_type.subtypes {
                collect_type_vars(arena, subtype, result, seen, recursion_level + 1);
            }
        }
        Type::Function(function_type) => {
            for index in 0..function_type.parameters.len() {
                collect_type_vars(
                    arena,
                    function_type.effective_parameter_type(index),
                    result,
                    seen,
                    recursion_level + 1,
                );
            }
            collect_type_vars(
                arena,
                function_type.effective_return_type(),
                result,
                seen,
                recursion_level + 1,
            );
        }
        Type::Overloaded(overloaded) => {
            for &overload in &overloaded.overloads {
                collect_type_vars(arena, overload, result, seen, recursion_level + 1);
            }
        }
        _ => {}
    }
}

// =============================================================================
// Class hierarchy
// =============================================================================

/// The first metaclass entry among the class's bases, if any.
pub fn get_metaclass(arena: &TypeArena, class_id: TypeId) -> Option<TypeId> {
    let class_arc = arena.get(class_id);
    let class_type = class_arc.as_class()?;
    class_type
        .details
        .base_classes
        .iter()
        .find(|base| base.is_metaclass)
        .map(|base| base.class_type)
}

/// Does `child` derive from `ancestor` (same generic class or reachable
/// through non-metaclass bases)? On success the matched chain is appended to
/// `chain`, derived-most last; an Any/Unknown base matches unconditionally
/// and contributes an `Unknown` link.
pub fn is_derived_from(
    arena: &TypeArena,
    child: TypeId,
    ancestor: TypeId,
    chain: &mut InheritanceChain,
) -> bool {
    is_derived_from_recursive(arena, child, ancestor, chain, 0)
}

fn is_derived_from_recursive(
    arena: &TypeArena,
    child: TypeId,
    ancestor: TypeId,
    chain: &mut InheritanceChain,
    recursion_level: u32,
) -> bool {
    if recursion_level > MAX_TYPE_RECURSION_COUNT {
        return false;
    }
    let child_arc = arena.get(child);
    let ancestor_arc = arena.get(ancestor);
    let (Some(child_class), Some(ancestor_class)) = (child_arc.as_class(), ancestor_arc.as_class())
    else {
        return false;
    };

    if child_class.is_same_generic_class(ancestor_class) {
        chain.push(child);
        return true;
    }

    for base in &child_class.details.base_classes {
        if base.is_metaclass {
            continue;
        }
        match &*arena.get(base.class_type) {
            Type::Class(_) => {
                if is_derived_from_recursive(
                    arena,
                    base.class_type,
                    ancestor,
                    chain,
                    recursion_level + 1,
                ) {
                    chain.push(child);
                    return true;
                }
            }
            base_type if base_type.is_any_or_unknown() => {
                chain.push(TypeId::UNKNOWN);
                chain.push(child);
                return true;
            }
            _ => {}
        }
    }
    false
}
