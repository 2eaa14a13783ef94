//! Type-relation and specialization core for the pythia type checker.
//!
//! This crate answers the two linked questions the rest of the checker asks
//! about every pair of types it encounters:
//!
//! - **Assignability**: can a value of type `src` be bound where `dest` is
//!   declared, under an evolving map of type-variable bindings?
//!   ([`AssignabilityChecker::can_assign`])
//! - **Specialization**: given a generic type and bindings for its type
//!   variables, what is the instantiated type? ([`specialize_type`])
//!
//! The two are mutually recursive: assignability discovers bindings, the
//! specializer consumes them. Class-member lookup ([`look_up_class_member`])
//! walks base classes in resolution order, partially specializing at each
//! step so inherited members carry their substituted types.
//!
//! Tokenizing, parsing, binding, import resolution, and diagnostic
//! formatting all live outside this crate; it consumes an already-built type
//! graph held in a [`TypeArena`] and produces booleans plus structured
//! [`pythia_common::DiagnosticAddendum`] trees.

pub mod arena;
pub mod assign;
pub mod members;
pub mod printer;
pub mod specialize;
pub mod symbols;
pub mod type_utils;
pub mod types;
pub mod typevar_map;

// Re-export commonly used items
pub use arena::TypeArena;
pub use assign::AssignabilityChecker;
pub use members::{
    AbstractMethod, ClassMember, TypedRecordEntry, get_abstract_methods_recursive,
    get_type_of_member, get_typed_record_members_recursive, look_up_class_member,
    look_up_object_member,
};
pub use printer::print_type;
pub use specialize::{
    bind_function_to_class_or_object, build_type_var_map_from_specialized_class,
    get_concrete_type_from_type_var, partially_specialize_type,
    partially_specialize_type_for_base_class, specialize_type, strip_first_parameter,
};
pub use symbols::{Symbol, SymbolTable};
pub use type_utils::{
    InheritanceChain, combine_types, convert_class_to_object, for_each_subtype, get_metaclass,
    get_type_var_arguments_recursive, is_any_or_unknown, is_derived_from, is_ellipsis_type,
    is_no_return_type, is_none_or_never, is_same_without_literal_value, is_type_same,
    requires_specialization, strip_literal_value, transform_type_object_to_class,
};
pub use types::*;
pub use typevar_map::TypeVarMap;

#[cfg(test)]
mod tests;
