//! Class-member lookup.
//!
//! Multiple-inheritance resolution: search the class's own fields, then its
//! bases in declared order, partially specializing each base so that
//! inherited members are reported in terms of the derived class's type
//! arguments.

use crate::arena::TypeArena;
use crate::specialize::{
    build_type_var_map_from_specialized_class, partially_specialize_type,
    partially_specialize_type_for_base_class,
};
use crate::symbols::Symbol;
use crate::types::{Type, TypeId, lookup_flags};
use indexmap::IndexMap;
use pythia_common::limits::MAX_TYPE_RECURSION_COUNT;

/// The result of a member lookup: the symbol plus the (partially specialized)
/// class that provided it.
#[derive(Clone, Debug)]
pub struct ClassMember {
    pub symbol: Symbol,
    /// The providing class, specialized with the derived class's type
    /// arguments; `Unknown` when the lookup ran into an unknown base.
    pub owning_class: TypeId,
    pub is_instance_member: bool,
}

/// An abstract method that a concrete subclass still has to override.
#[derive(Clone, Debug)]
pub struct AbstractMethod {
    pub symbol: Symbol,
    pub class_type: TypeId,
}

/// One key of a typed-record class.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedRecordEntry {
    pub value_type: TypeId,
    pub is_required: bool,
}

/// Search `class_id` (a `Class` type) and optionally its bases for `name`.
///
/// Instance variables are preferred over class members; metaclass bases are
/// skipped. Lookup on an `Any`/`Unknown` class synthesizes a placeholder
/// member with an `Unknown` type. Absence is `None`; lookup never fails.
pub fn look_up_class_member(
    arena: &TypeArena,
    class_id: TypeId,
    name: &str,
    flags: u32,
) -> Option<ClassMember> {
    look_up_class_member_recursive(arena, class_id, name, flags, 0)
}

/// Search an object's class for `name`.
pub fn look_up_object_member(
    arena: &TypeArena,
    object_id: TypeId,
    name: &str,
    flags: u32,
) -> Option<ClassMember> {
    match &*arena.get(object_id) {
        Type::Object(object_type) => {
            look_up_class_member(arena, object_type.class_type, name, flags)
        }
        _ => None,
    }
}

fn look_up_class_member_recursive(
    arena: &TypeArena,
    class_id: TypeId,
    name: &str,
    flags: u32,
    recursion_level: u32,
) -> Option<ClassMember> {
    if recursion_level > MAX_TYPE_RECURSION_COUNT {
        return None;
    }

    let class_arc = arena.get(class_id);
    match &*class_arc {
        Type::Class(class_type) => {
            if (flags & lookup_flags::SKIP_OBJECT_BASE_CLASS) != 0
                && class_type.is_builtin_named("object")
            {
                return None;
            }

            if (flags & lookup_flags::SKIP_ORIGINAL_CLASS) == 0 {
                if let Some(symbol) = class_type.details.fields.get(name) {
                    let declared_ok = (flags & lookup_flags::DECLARED_TYPES_ONLY) == 0
                        || symbol.has_typed_declarations();
                    if symbol.is_instance_member()
                        && (flags & lookup_flags::SKIP_INSTANCE_VARIABLES) == 0
                        && declared_ok
                    {
                        return Some(ClassMember {
                            symbol: symbol.clone(),
                            owning_class: class_id,
                            is_instance_member: true,
                        });
                    }
                    if symbol.is_class_member() && declared_ok {
                        return Some(ClassMember {
                            symbol: symbol.clone(),
                            owning_class: class_id,
                            is_instance_member: false,
                        });
                    }
                }
            }

            if (flags & lookup_flags::SKIP_BASE_CLASSES) == 0 {
                for base in &class_type.details.base_classes {
                    if base.is_metaclass {
                        continue;
                    }
                    // Report base members in terms of this class's arguments.
                    let specialized_base = partially_specialize_type_for_base_class(
                        arena,
                        class_type,
                        base.class_type,
                    );
                    if let Some(member) = look_up_class_member_recursive(
                        arena,
                        specialized_base,
                        name,
                        flags & !lookup_flags::SKIP_ORIGINAL_CLASS,
                        recursion_level + 1,
                    ) {
                        return Some(member);
                    }
                }
            }
            None
        }
        // All bets are off; pretend the member exists with an unknown type.
        Type::Any { .. } | Type::Unknown => Some(ClassMember {
            symbol: Symbol::synthesized_unknown(),
            owning_class: TypeId::UNKNOWN,
            is_instance_member: false,
        }),
        _ => None,
    }
}

/// The type of a looked-up member, specialized with its owning class's type
/// arguments.
pub fn get_type_of_member(arena: &TypeArena, member: &ClassMember) -> TypeId {
    match &*arena.get(member.owning_class) {
        Type::Class(owning_class) => {
            let map = build_type_var_map_from_specialized_class(arena, owning_class);
            partially_specialize_type(arena, member.symbol.effective_type(), &map)
        }
        _ => TypeId::UNKNOWN,
    }
}

/// Collect the names of abstract methods that remain unimplemented at
/// `class_id`: declared abstract somewhere in an abstract base and not
/// overridden by a non-abstract definition further down.
pub fn get_abstract_methods_recursive(
    arena: &TypeArena,
    class_id: TypeId,
    methods: &mut IndexMap<String, AbstractMethod>,
    recursion_level: u32,
) {
    if recursion_level > MAX_TYPE_RECURSION_COUNT {
        return;
    }
    let class_arc = arena.get(class_id);
    let Some(class_type) = class_arc.as_class() else {
        return;
    };

    for base in &class_type.details.base_classes {
        if base.is_metaclass {
            continue;
        }
        if let Some(base_class) = arena.get(base.class_type).as_class() {
            if base_class.is_abstract() {
                get_abstract_methods_recursive(
                    arena,
                    base.class_type,
                    methods,
                    recursion_level + 1,
                );
            }
        }
    }

    if methods.is_empty() && !class_type.is_abstract() {
        return;
    }
    for (name, symbol) in &class_type.details.fields {
        if !symbol.is_class_member() {
            continue;
        }
        match &*arena.get(symbol.effective_type()) {
            Type::Function(function_type) if function_type.is_abstract() => {
                methods.insert(
                    name.clone(),
                    AbstractMethod {
                        symbol: symbol.clone(),
                        class_type: class_id,
                    },
                );
            }
            // Any concrete redefinition satisfies the base's requirement.
            _ => {
                methods.shift_remove(name);
            }
        }
    }
}

/// Collect the keyed entries of a typed-record class, base classes first so
/// that the current class's declarations win. Requiredness is the inverse of
/// the declaring class's can-omit policy.
pub fn get_typed_record_members_recursive(
    arena: &TypeArena,
    class_id: TypeId,
    entries: &mut IndexMap<String, TypedRecordEntry>,
    recursion_level: u32,
) {
    if recursion_level > MAX_TYPE_RECURSION_COUNT {
        return;
    }
    let class_arc = arena.get(class_id);
    let Some(class_type) = class_arc.as_class() else {
        return;
    };
    if !class_type.is_typed_record() {
        return;
    }

    for base in &class_type.details.base_classes {
        if base.is_metaclass {
            continue;
        }
        if let Some(base_class) = arena.get(base.class_type).as_class() {
            if base_class.is_typed_record() {
                get_typed_record_members_recursive(
                    arena,
                    base.class_type,
                    entries,
                    recursion_level + 1,
                );
            }
        }
    }

    let map = build_type_var_map_from_specialized_class(arena, class_type);
    for (name, symbol) in &class_type.details.fields {
        if let Some(declared_type) = symbol.declared_type {
            entries.insert(
                name.clone(),
                TypedRecordEntry {
                    value_type: partially_specialize_type(arena, declared_type, &map),
                    is_required: !class_type.can_omit_values(),
                },
            );
        }
    }
}
