//! The assignability engine.
//!
//! Decides whether a value of type `src` can be bound where `dest` is
//! required, discovering type-variable bindings along the way. The engine
//! never fails: the answer is a `bool`, failures record structured reasons
//! into a [`DiagnosticAddendum`], and the recursion counter guarantees
//! termination on cyclic type graphs.
//!
//! Partial map mutations made before a failed check are kept; callers clone
//! the map before speculative work (overload probing, union-destination
//! matching).

use crate::arena::TypeArena;
use crate::members::{
    get_type_of_member, get_typed_record_members_recursive, look_up_class_member,
    look_up_object_member,
};
use crate::printer::print_type;
use crate::specialize::{
    bind_function_to_class_or_object, build_type_var_map_from_specialized_class,
    partially_specialize_type, partially_specialize_type_for_base_class, specialize_type,
};
use crate::type_utils::{
    InheritanceChain, combine_types, convert_class_to_object, get_metaclass, is_any_or_unknown,
    is_derived_from, is_ellipsis_type, is_same_without_literal_value, is_type_same,
    strip_literal_value, transform_type_object_to_class,
};
use crate::types::{
    FunctionType, Parameter, ParameterCategory, Type, TypeId, Variance, assign_flags,
    function_flags, lookup_flags,
};
use crate::typevar_map::TypeVarMap;
use indexmap::IndexMap;
use pythia_common::DiagnosticAddendum;
use pythia_common::limits::MAX_TYPE_RECURSION_COUNT;

// Deeply nested generics recurse hard before the recursion counter trips;
// grow the stack instead of overflowing it.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

/// Decides `can_assign(dest, src)` queries against one type arena.
pub struct AssignabilityChecker<'a> {
    arena: &'a TypeArena,
}

impl<'a> AssignabilityChecker<'a> {
    pub fn new(arena: &'a TypeArena) -> Self {
        AssignabilityChecker { arena }
    }

    /// Can a value of type `src` be assigned where `dest` is declared?
    ///
    /// When a `type_var_map` is supplied, destination type variables bind to
    /// the source types they match; mutations made before a failure are kept.
    pub fn can_assign(
        &self,
        dest: TypeId,
        src: TypeId,
        diag: &mut DiagnosticAddendum,
        type_var_map: Option<&mut TypeVarMap>,
        flags: u32,
        recursion_level: u32,
    ) -> bool {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.can_assign_inner(dest, src, diag, type_var_map, flags, recursion_level)
        })
    }

    fn can_assign_inner(
        &self,
        dest: TypeId,
        src: TypeId,
        diag: &mut DiagnosticAddendum,
        mut type_var_map: Option<&mut TypeVarMap>,
        flags: u32,
        recursion_level: u32,
    ) -> bool {
        if recursion_level > MAX_TYPE_RECURSION_COUNT {
            return true;
        }
        if dest == src {
            return true;
        }

        let dest_type = self.arena.get(dest);
        let src_type = self.arena.get(src);

        // An unbound name is reported elsewhere; stay silent here.
        if matches!(&*dest_type, Type::Unbound) || matches!(&*src_type, Type::Unbound) {
            return true;
        }

        // A destination type variable binds (or widens) before its
        // constraints are checked.
        if let Type::TypeVar(dest_type_var) = &*dest_type {
            if let Some(map) = type_var_map.as_deref_mut() {
                let src_without_literal = strip_literal_value(self.arena, src);
                match map.get(&dest_type_var.name) {
                    Some(existing) => {
                        if existing == src_without_literal {
                            // Already bound to this exact type.
                        } else if self.can_assign(
                            existing,
                            src_without_literal,
                            diag.create_addendum(),
                            Some(&mut *map),
                            flags,
                            recursion_level + 1,
                        ) {
                            // Compatible with the existing binding.
                        } else if self.can_assign(
                            src_without_literal,
                            existing,
                            diag.create_addendum(),
                            Some(&mut *map),
                            flags,
                            recursion_level + 1,
                        ) {
                            // The new type is wider; replace the binding.
                            map.set(dest_type_var.name.clone(), src_without_literal);
                        } else {
                            // Neither direction holds; widen to a union.
                            let widened =
                                combine_types(self.arena, &[existing, src_without_literal]);
                            map.set(dest_type_var.name.clone(), widened);
                        }
                    }
                    None => map.set(dest_type_var.name.clone(), src_without_literal),
                }
            }
            return self.can_assign_to_type_var(dest, src, diag, flags, recursion_level + 1);
        }

        if dest_type.is_any_or_unknown() || src_type.is_any_or_unknown() {
            return true;
        }

        // A source type variable should have been substituted by now;
        // degrade it to its concrete form and retry.
        if matches!(&*src_type, Type::TypeVar(_)) {
            let concrete_src = specialize_type(self.arena, src, None, true, recursion_level + 1);
            return self.can_assign(dest, concrete_src, diag, type_var_map, flags, recursion_level + 1);
        }

        // Every member of a source union must be assignable.
        if let Type::Union(src_union) = &*src_type {
            let mut incompatible = false;
            for &subtype in &src_union.subtypes {
                if !self.can_assign(
                    dest,
                    subtype,
                    diag.create_addendum(),
                    type_var_map.as_deref_mut(),
                    flags,
                    recursion_level + 1,
                ) {
                    diag.add_message(format!(
                        "Type '{}' is incompatible with type '{}'",
                        print_type(self.arena, subtype),
                        print_type(self.arena, dest)
                    ));
                    incompatible = true;
                }
            }
            return !incompatible;
        }

        // A destination union needs just one member to accept the source.
        if let Type::Union(dest_union) = &*dest_type {
            let mut last_probe = DiagnosticAddendum::new();
            for &subtype in &dest_union.subtypes {
                last_probe = DiagnosticAddendum::new();
                if self.can_assign(
                    subtype,
                    src,
                    &mut last_probe,
                    type_var_map.as_deref_mut(),
                    flags,
                    recursion_level + 1,
                ) {
                    return true;
                }
            }
            diag.add_addendum(last_probe);
            return false;
        }

        if matches!(&*src_type, Type::Never) {
            return true;
        }
        if matches!(&*dest_type, Type::None) {
            if matches!(&*src_type, Type::None) {
                return true;
            }
            diag.add_message("Cannot assign to 'None'");
            return false;
        }

        // A `Type[X]` value stands for X-the-class.
        if let Type::Object(src_object) = &*src_type {
            let src_class_arc = self.arena.get(src_object.class_type);
            if let Some(src_class) = src_class_arc.as_class() {
                if src_class.is_builtin_named("Type") {
                    if let Some(type_arguments) = &src_class.type_arguments {
                        if let Some(&first) = type_arguments.first() {
                            if is_any_or_unknown(self.arena, first) {
                                return true;
                            }
                            if let Type::Object(inner) = &*self.arena.get(first) {
                                return self.can_assign(
                                    dest,
                                    inner.class_type,
                                    diag,
                                    type_var_map,
                                    flags,
                                    recursion_level + 1,
                                );
                            }
                        }
                    }
                }
            }
        }

        if matches!(&*dest_type, Type::Class(_)) && matches!(&*src_type, Type::Class(_)) {
            return self.can_assign_class(
                dest,
                src,
                diag,
                type_var_map,
                flags,
                recursion_level + 1,
                false,
            );
        }

        if let Type::Object(dest_object) = &*dest_type {
            let dest_class_id = dest_object.class_type;
            let dest_class_arc = self.arena.get(dest_class_id);
            if let Some(dest_class) = dest_class_arc.as_class() {
                // The unspecialized builtin `type` accepts any class-like
                // value.
                if dest_class.is_builtin_named("type")
                    && matches!(
                        &*src_type,
                        Type::Class(_) | Type::Function(_) | Type::Overloaded(_)
                    )
                {
                    return true;
                }

                // A `Type[X]` destination accepts whatever X-the-class does.
                if dest_class.is_builtin_named("Type") {
                    if let Some(type_arguments) = &dest_class.type_arguments {
                        if let Some(&first) = type_arguments.first() {
                            if is_any_or_unknown(self.arena, first) {
                                return true;
                            }
                            let inner_class = transform_type_object_to_class(self.arena, dest);
                            if inner_class != dest {
                                return self.can_assign(
                                    inner_class,
                                    src,
                                    diag,
                                    type_var_map,
                                    flags,
                                    recursion_level + 1,
                                );
                            }
                        }
                    }
                }

                match &*src_type {
                    Type::Object(src_object) => {
                        // A literal-pinned destination admits only the same
                        // literal.
                        if let Some(dest_literal) = &dest_object.literal_value {
                            if src_object.literal_value.as_ref() != Some(dest_literal) {
                                diag.add_message(format!(
                                    "'{}' cannot be assigned to '{}'",
                                    print_type(self.arena, src),
                                    print_type(self.arena, dest)
                                ));
                                return false;
                            }
                        }
                        return self.can_assign_class(
                            dest_class_id,
                            src_object.class_type,
                            diag,
                            type_var_map,
                            flags,
                            recursion_level + 1,
                            true,
                        );
                    }
                    Type::Function(_) | Type::Overloaded(_) => {
                        if let Some(call_type) = self.get_callback_protocol_type(dest) {
                            return self.can_assign(
                                call_type,
                                src,
                                diag,
                                type_var_map,
                                flags,
                                recursion_level + 1,
                            );
                        }
                        if dest_class.is_builtin_named("object") {
                            return true;
                        }
                    }
                    Type::Module(_) => {
                        if dest_class.is_builtin_named("ModuleType")
                            || dest_class.is_builtin_named("object")
                        {
                            return true;
                        }
                    }
                    Type::None => {
                        if dest_class.is_builtin_named("object") {
                            return true;
                        }
                    }
                    Type::Class(_) => {
                        if dest_class.is_builtin_named("object") {
                            return true;
                        }
                        // A class value is an instance of its metaclass.
                        if let Some(metaclass) = get_metaclass(self.arena, src) {
                            if is_any_or_unknown(self.arena, metaclass) {
                                return true;
                            }
                            if matches!(&*self.arena.get(metaclass), Type::Class(_)) {
                                return self.can_assign_class(
                                    dest_class_id,
                                    metaclass,
                                    diag,
                                    type_var_map,
                                    flags,
                                    recursion_level + 1,
                                    false,
                                );
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        if matches!(&*dest_type, Type::Function(_)) {
            let mut src_function: Option<TypeId> = None;
            match &*src_type {
                Type::Overloaded(src_overloaded) => {
                    // Pick the first overload that fits, probing each with a
                    // cloned map.
                    let matched = src_overloaded.overloads.iter().copied().find(|&overload| {
                        let mut probe_map = type_var_map.as_deref().cloned();
                        self.can_assign(
                            dest,
                            overload,
                            diag.create_addendum(),
                            probe_map.as_mut(),
                            flags,
                            recursion_level + 1,
                        )
                    });
                    match matched {
                        Some(overload) => src_function = Some(overload),
                        None => {
                            diag.add_message(format!(
                                "No overloaded function matches type '{}'",
                                print_type(self.arena, dest)
                            ));
                            return false;
                        }
                    }
                }
                Type::Function(_) => src_function = Some(src),
                Type::Object(_) => {
                    if let Some(member) =
                        look_up_object_member(self.arena, src, "__call__", lookup_flags::DEFAULT)
                    {
                        let member_type = get_type_of_member(self.arena, &member);
                        if matches!(&*self.arena.get(member_type), Type::Function(_)) {
                            src_function = Some(bind_function_to_class_or_object(
                                self.arena,
                                Some(src),
                                member_type,
                                false,
                            ));
                        }
                    }
                }
                Type::Class(_) => {
                    src_function = Some(self.get_constructor_function(src));
                }
                _ => {}
            }
            if let Some(src_function_id) = src_function {
                if matches!(&*self.arena.get(src_function_id), Type::Function(_)) {
                    return self.can_assign_function(
                        dest,
                        src_function_id,
                        diag,
                        type_var_map,
                        flags,
                        recursion_level + 1,
                        true,
                    );
                }
            }
        }

        tracing::trace!(
            dest = %print_type(self.arena, dest),
            src = %print_type(self.arena, src),
            "assignment incompatible"
        );
        diag.add_message(format!(
            "'{}' is incompatible with '{}'",
            print_type(self.arena, src),
            print_type(self.arena, dest)
        ));
        false
    }

    /// Validate a source against a destination type variable's bound and
    /// constraints (the binding itself has already been recorded).
    fn can_assign_to_type_var(
        &self,
        dest: TypeId,
        src: TypeId,
        diag: &mut DiagnosticAddendum,
        flags: u32,
        recursion_level: u32,
    ) -> bool {
        if recursion_level > MAX_TYPE_RECURSION_COUNT {
            return true;
        }
        let dest_arc = self.arena.get(dest);
        let Type::TypeVar(dest_type_var) = &*dest_arc else {
            return true;
        };
        if is_any_or_unknown(self.arena, src) {
            return true;
        }

        let mut effective_src = src;
        if matches!(&*self.arena.get(src), Type::TypeVar(_)) {
            if is_type_same(self.arena, src, dest, recursion_level) {
                return true;
            }
            effective_src = specialize_type(self.arena, src, None, true, recursion_level);
        }

        if let Some(bound_type) = dest_type_var.bound_type {
            if !self.can_assign(
                bound_type,
                effective_src,
                diag.create_addendum(),
                None,
                flags,
                recursion_level + 1,
            ) {
                diag.add_message(format!(
                    "Type '{}' is not compatible with bound type '{}' for TypeVar '{}'",
                    print_type(self.arena, effective_src),
                    print_type(self.arena, bound_type),
                    dest_type_var.name
                ));
                return false;
            }
        }

        if dest_type_var.constraints.is_empty() {
            return true;
        }
        for &constraint in &dest_type_var.constraints {
            if is_any_or_unknown(self.arena, constraint) {
                return true;
            }
            if let Type::Union(src_union) = &*self.arena.get(effective_src) {
                if src_union
                    .subtypes
                    .iter()
                    .any(|&subtype| is_same_without_literal_value(self.arena, constraint, subtype))
                {
                    return true;
                }
            } else if is_same_without_literal_value(self.arena, constraint, effective_src) {
                return true;
            }
        }

        diag.add_message(format!(
            "Type '{}' is not compatible with constraints imposed by TypeVar '{}'",
            print_type(self.arena, effective_src),
            dest_type_var.name
        ));
        false
    }

    /// Class-to-class comparison: protocols structurally, typed records by
    /// key, the numeric tower by name, everything else through the
    /// inheritance chain.
    fn can_assign_class(
        &self,
        dest_class_id: TypeId,
        src_class_id: TypeId,
        diag: &mut DiagnosticAddendum,
        type_var_map: Option<&mut TypeVarMap>,
        flags: u32,
        recursion_level: u32,
        report_errors_using_object_type: bool,
    ) -> bool {
        if recursion_level > MAX_TYPE_RECURSION_COUNT {
            return true;
        }
        let dest_arc = self.arena.get(dest_class_id);
        let src_arc = self.arena.get(src_class_id);
        let (Some(dest_class), Some(src_class)) = (dest_arc.as_class(), src_arc.as_class()) else {
            return false;
        };

        if dest_class.is_protocol() {
            return self.can_assign_protocol(dest_class_id, src_class_id, diag, recursion_level);
        }

        if dest_class.is_typed_record() && src_class.is_typed_record() {
            return self.can_assign_typed_record(dest_class_id, src_class_id, diag, recursion_level);
        }

        // Numeric tower promotions.
        if dest_class.is_builtin() && src_class.is_builtin() {
            let dest_name = dest_class.name();
            let src_name = src_class.name();
            if dest_name == "float" && src_name == "int" {
                return true;
            }
            if dest_name == "complex" && (src_name == "int" || src_name == "float") {
                return true;
            }
        }

        if (flags & assign_flags::ENFORCE_INVARIANCE) == 0
            || dest_class.is_same_generic_class(src_class)
        {
            let mut chain = InheritanceChain::new();
            if is_derived_from(self.arena, src_class_id, dest_class_id, &mut chain) {
                return self.can_assign_class_with_type_args(
                    dest_class_id,
                    src_class_id,
                    &chain,
                    diag,
                    type_var_map,
                    recursion_level,
                );
            }
        }

        let (dest_error_type, src_error_type) = if report_errors_using_object_type {
            (
                convert_class_to_object(self.arena, dest_class_id),
                convert_class_to_object(self.arena, src_class_id),
            )
        } else {
            (dest_class_id, src_class_id)
        };
        diag.add_message(format!(
            "'{}' is incompatible with '{}'",
            print_type(self.arena, src_error_type),
            print_type(self.arena, dest_error_type)
        ));
        false
    }

    /// Structural protocol match: every non-ignored destination member must
    /// be present and assignable in the source class.
    fn can_assign_protocol(
        &self,
        dest_class_id: TypeId,
        src_class_id: TypeId,
        diag: &mut DiagnosticAddendum,
        recursion_level: u32,
    ) -> bool {
        let dest_arc = self.arena.get(dest_class_id);
        let Some(dest_class) = dest_arc.as_class() else {
            return false;
        };
        let dest_map = build_type_var_map_from_specialized_class(self.arena, dest_class);

        let mut types_are_consistent = true;
        for (name, symbol) in &dest_class.details.fields {
            if symbol.is_ignored_for_protocol_match() {
                continue;
            }
            match look_up_class_member(
                self.arena,
                src_class_id,
                name,
                lookup_flags::SKIP_INSTANCE_VARIABLES,
            ) {
                None => {
                    tracing::trace!(member = %name, "protocol member missing");
                    diag.add_message(format!("'{name}' is not present"));
                    types_are_consistent = false;
                }
                Some(member) => {
                    if let Some(declared_type) = symbol.declared_type {
                        // Protocol members carry the protocol's own type
                        // arguments.
                        let dest_member_type =
                            partially_specialize_type(self.arena, declared_type, &dest_map);
                        let src_member_type = get_type_of_member(self.arena, &member);
                        if !self.can_assign(
                            dest_member_type,
                            src_member_type,
                            diag.create_addendum(),
                            None,
                            assign_flags::DEFAULT,
                            recursion_level + 1,
                        ) {
                            diag.add_message(format!("'{name}' is an incompatible type"));
                            types_are_consistent = false;
                        }
                    }
                }
            }
        }
        types_are_consistent
    }

    /// Typed records match on keys: every destination key must exist, agree
    /// on requiredness, and carry the same value type.
    fn can_assign_typed_record(
        &self,
        dest_class_id: TypeId,
        src_class_id: TypeId,
        diag: &mut DiagnosticAddendum,
        recursion_level: u32,
    ) -> bool {
        let mut dest_entries = IndexMap::new();
        get_typed_record_members_recursive(self.arena, dest_class_id, &mut dest_entries, recursion_level);
        let mut src_entries = IndexMap::new();
        get_typed_record_members_recursive(self.arena, src_class_id, &mut src_entries, recursion_level);

        let mut types_are_consistent = true;
        for (name, dest_entry) in &dest_entries {
            match src_entries.get(name) {
                None => {
                    diag.add_message(format!(
                        "'{}' is missing from '{}'",
                        name,
                        print_type(self.arena, convert_class_to_object(self.arena, src_class_id))
                    ));
                    types_are_consistent = false;
                }
                Some(src_entry) => {
                    if dest_entry.is_required && !src_entry.is_required {
                        diag.add_message(format!(
                            "'{}' is required in '{}'",
                            name,
                            print_type(self.arena, convert_class_to_object(self.arena, dest_class_id))
                        ));
                        types_are_consistent = false;
                    } else if !dest_entry.is_required && src_entry.is_required {
                        diag.add_message(format!(
                            "'{}' is not required in '{}'",
                            name,
                            print_type(self.arena, convert_class_to_object(self.arena, dest_class_id))
                        ));
                        types_are_consistent = false;
                    }
                    // Record values compare invariantly.
                    if !is_type_same(
                        self.arena,
                        dest_entry.value_type,
                        src_entry.value_type,
                        recursion_level + 1,
                    ) {
                        diag.add_message(format!("'{name}' is an incompatible type"));
                        types_are_consistent = false;
                    }
                }
            }
        }
        types_are_consistent
    }

    /// Walk the inheritance chain, specializing the source upward until it
    /// sits in the destination's generic frame, then validate type arguments.
    fn can_assign_class_with_type_args(
        &self,
        dest_class_id: TypeId,
        src_class_id: TypeId,
        chain: &InheritanceChain,
        diag: &mut DiagnosticAddendum,
        type_var_map: Option<&mut TypeVarMap>,
        recursion_level: u32,
    ) -> bool {
        let mut cur_src = src_class_id;
        let chain_len = chain.len();
        for (ancestor_index, &ancestor) in chain.iter().enumerate().rev() {
            if is_any_or_unknown(self.arena, ancestor) {
                return true;
            }
            let ancestor_arc = self.arena.get(ancestor);
            let Some(ancestor_class) = ancestor_arc.as_class() else {
                return true;
            };
            if ancestor_class.is_builtin_named("object") {
                return true;
            }
            if ancestor_index < chain_len - 1 {
                let cur_src_arc = self.arena.get(cur_src);
                if let Some(cur_src_class) = cur_src_arc.as_class() {
                    cur_src = partially_specialize_type_for_base_class(
                        self.arena,
                        cur_src_class,
                        ancestor,
                    );
                }
            }
        }

        let dest_arc = self.arena.get(dest_class_id);
        let Some(dest_class) = dest_arc.as_class() else {
            return true;
        };

        // Variadic tuples: arity is part of the type.
        if dest_class.is_special_builtin() && dest_class.name() == "Tuple" {
            return self.can_assign_tuple(dest_class_id, cur_src, diag, type_var_map, recursion_level);
        }

        if dest_class.type_arguments.is_none() {
            return true;
        }
        let cur_src_arc = self.arena.get(cur_src);
        if let Some(cur_src_class) = cur_src_arc.as_class() {
            if cur_src_class.type_arguments.is_none() {
                cur_src = specialize_type(self.arena, cur_src, None, true, recursion_level + 1);
            }
        }
        self.verify_type_arguments_assignable(
            dest_class_id,
            cur_src,
            diag,
            type_var_map,
            recursion_level,
        )
    }

    /// Compare the type arguments of two specializations of the same generic
    /// class under each parameter's declared variance.
    fn verify_type_arguments_assignable(
        &self,
        dest_class_id: TypeId,
        src_class_id: TypeId,
        diag: &mut DiagnosticAddendum,
        mut type_var_map: Option<&mut TypeVarMap>,
        recursion_level: u32,
    ) -> bool {
        let dest_arc = self.arena.get(dest_class_id);
        let src_arc = self.arena.get(src_class_id);
        let (Some(dest_class), Some(src_class)) = (dest_arc.as_class(), src_arc.as_class()) else {
            return true;
        };
        let dest_params = &dest_class.details.type_parameters;
        let Some(dest_args) = &dest_class.type_arguments else {
            return true;
        };
        let Some(src_args) = &src_class.type_arguments else {
            return true;
        };
        if !(src_class.is_special_builtin() || src_args.len() == dest_params.len()) {
            return true;
        }

        for (src_index, &src_arg) in src_args.iter().enumerate() {
            // Arity normally matches; special builtins may reuse the last
            // destination slot (homogeneous tuples).
            let dest_index = src_index.min(dest_args.len().saturating_sub(1));
            let Some(&dest_arg) = dest_args.get(dest_index) else {
                continue;
            };
            let variance = dest_params
                .get(dest_index)
                .and_then(|&param| match &*self.arena.get(param) {
                    Type::TypeVar(type_var) => Some(type_var.variance),
                    _ => None,
                })
                .unwrap_or(Variance::Covariant);

            let assignable = match variance {
                Variance::Covariant => self.can_assign(
                    dest_arg,
                    src_arg,
                    diag.create_addendum(),
                    type_var_map.as_deref_mut(),
                    assign_flags::DEFAULT,
                    recursion_level + 1,
                ),
                Variance::Contravariant => self.can_assign(
                    src_arg,
                    dest_arg,
                    diag.create_addendum(),
                    type_var_map.as_deref_mut(),
                    assign_flags::DEFAULT,
                    recursion_level + 1,
                ),
                Variance::Invariant => {
                    self.can_assign(
                        dest_arg,
                        src_arg,
                        diag.create_addendum(),
                        type_var_map.as_deref_mut(),
                        assign_flags::ENFORCE_INVARIANCE,
                        recursion_level + 1,
                    ) && self.can_assign(
                        src_arg,
                        dest_arg,
                        diag.create_addendum(),
                        type_var_map.as_deref_mut(),
                        assign_flags::ENFORCE_INVARIANCE,
                        recursion_level + 1,
                    )
                }
            };
            if !assignable {
                return false;
            }
        }
        true
    }

    /// Tuple comparison: homogeneous `Tuple[X, ...]` matches any arity,
    /// otherwise arities must agree and entries compare pairwise.
    fn can_assign_tuple(
        &self,
        dest_class_id: TypeId,
        src_class_id: TypeId,
        diag: &mut DiagnosticAddendum,
        mut type_var_map: Option<&mut TypeVarMap>,
        recursion_level: u32,
    ) -> bool {
        let dest_arc = self.arena.get(dest_class_id);
        let src_arc = self.arena.get(src_class_id);
        let (Some(dest_class), Some(src_class)) = (dest_arc.as_class(), src_arc.as_class()) else {
            return true;
        };
        let Some(dest_args) = dest_class.type_arguments.clone() else {
            return true;
        };
        let Some(src_args) = src_class.type_arguments.clone() else {
            return true;
        };
        if dest_args.is_empty() {
            return true;
        }

        let dest_is_homogeneous = dest_args.len() == 2 && is_ellipsis_type(self.arena, dest_args[1]);
        let src_is_homogeneous = src_args.len() == 2 && is_ellipsis_type(self.arena, src_args[1]);

        if dest_is_homogeneous {
            let dest_entry = dest_args[0];
            let src_entries: &[TypeId] = if src_is_homogeneous {
                &src_args[..1]
            } else {
                &src_args
            };
            for (index, &src_entry) in src_entries.iter().enumerate() {
                if !self.can_assign(
                    dest_entry,
                    src_entry,
                    diag.create_addendum(),
                    type_var_map.as_deref_mut(),
                    assign_flags::DEFAULT,
                    recursion_level + 1,
                ) {
                    diag.add_message(format!("Tuple entry {} is incorrect type", index + 1));
                    return false;
                }
            }
        } else if src_is_homogeneous {
            let src_entry = src_args[0];
            for (index, &dest_entry) in dest_args.iter().enumerate() {
                if !self.can_assign(
                    dest_entry,
                    src_entry,
                    diag.create_addendum(),
                    type_var_map.as_deref_mut(),
                    assign_flags::DEFAULT,
                    recursion_level + 1,
                ) {
                    diag.add_message(format!("Tuple entry {} is incorrect type", index + 1));
                    return false;
                }
            }
        } else if dest_args.len() == src_args.len() {
            for (index, (&dest_entry, &src_entry)) in dest_args.iter().zip(&src_args).enumerate() {
                if !self.can_assign(
                    dest_entry,
                    src_entry,
                    diag.create_addendum(),
                    type_var_map.as_deref_mut(),
                    assign_flags::DEFAULT,
                    recursion_level + 1,
                ) {
                    diag.add_message(format!("Tuple entry {} is incorrect type", index + 1));
                    return false;
                }
            }
        } else {
            diag.add_message(format!(
                "Tuple size mismatch: expected {} but got {}",
                dest_args.len(),
                src_args.len()
            ));
            return false;
        }
        true
    }

    /// Function-to-function comparison: contravariant parameters (populate
    /// the map, then confirm against the specialized destination), optional
    /// keyword-only matching, arity rules, covariant return.
    fn can_assign_function(
        &self,
        dest: TypeId,
        src: TypeId,
        diag: &mut DiagnosticAddendum,
        mut type_var_map: Option<&mut TypeVarMap>,
        flags: u32,
        recursion_level: u32,
        check_named_params: bool,
    ) -> bool {
        let dest_arc = self.arena.get(dest);
        let src_arc = self.arena.get(src);
        let (Type::Function(dest_func), Type::Function(src_func)) = (&*dest_arc, &*src_arc) else {
            return false;
        };

        let mut can_assign = true;
        let src_param_count = src_func.parameters.len();
        let dest_param_count = dest_func.parameters.len();
        let positional_count = src_param_count.min(dest_param_count);

        for param_index in 0..positional_count {
            let src_param = &src_func.parameters[param_index];
            let dest_param = &dest_func.parameters[param_index];
            // Positional matching stops at the first var-arg on either side.
            if src_param.category != ParameterCategory::Positional
                || dest_param.category != ParameterCategory::Positional
            {
                break;
            }
            let src_param_type = src_func.effective_parameter_type(param_index);
            let dest_param_type = dest_func.effective_parameter_type(param_index);
            let param_diag = diag.create_addendum();
            // One pass to populate the map, then confirm against the
            // specialized destination type.
            self.can_assign(
                src_param_type,
                dest_param_type,
                param_diag.create_addendum(),
                type_var_map.as_deref_mut(),
                flags,
                recursion_level + 1,
            );
            let specialized_dest_param_type = specialize_type(
                self.arena,
                dest_param_type,
                type_var_map.as_deref(),
                false,
                recursion_level + 1,
            );
            if !self.can_assign(
                src_param_type,
                specialized_dest_param_type,
                param_diag.create_addendum(),
                None,
                flags,
                recursion_level + 1,
            ) {
                param_diag.add_message(format!(
                    "Parameter {} of type '{}' cannot be assigned to type '{}'",
                    param_index + 1,
                    print_type(self.arena, specialized_dest_param_type),
                    print_type(self.arena, src_param_type)
                ));
                can_assign = false;
            }
        }

        let src_has_var_args = src_func
            .parameters
            .iter()
            .any(|p| p.category != ParameterCategory::Positional);
        let dest_has_var_args = dest_func
            .parameters
            .iter()
            .any(|p| p.category != ParameterCategory::Positional);

        if check_named_params {
            // Keyword-only parameters are the named ones after a var-arg.
            let mut dest_named: IndexMap<&str, &Parameter> = IndexMap::new();
            let mut dest_saw_var_args = false;
            for param in &dest_func.parameters {
                if dest_saw_var_args {
                    if param.category == ParameterCategory::Positional {
                        if let Some(name) = &param.name {
                            dest_named.insert(name.as_str(), param);
                        }
                    }
                } else if param.category == ParameterCategory::VarArgPositional {
                    dest_saw_var_args = true;
                }
            }

            let mut src_saw_var_args = false;
            for (src_index, param) in src_func.parameters.iter().enumerate() {
                if src_saw_var_args {
                    if param.category == ParameterCategory::Positional {
                        if let Some(name) = &param.name {
                            match dest_named.shift_remove(name.as_str()) {
                                None => {
                                    diag.add_message(format!(
                                        "Named parameter '{name}' is missing in destination"
                                    ));
                                    can_assign = false;
                                }
                                Some(dest_param) => {
                                    let param_diag = diag.create_addendum();
                                    let specialized_dest_type = specialize_type(
                                        self.arena,
                                        dest_param.param_type,
                                        type_var_map.as_deref(),
                                        false,
                                        recursion_level + 1,
                                    );
                                    let src_param_type =
                                        src_func.effective_parameter_type(src_index);
                                    if !self.can_assign(
                                        src_param_type,
                                        specialized_dest_type,
                                        param_diag.create_addendum(),
                                        None,
                                        flags,
                                        recursion_level + 1,
                                    ) {
                                        param_diag.add_message(format!(
                                            "Named parameter '{}' of type '{}' cannot be assigned to type '{}'",
                                            name,
                                            print_type(self.arena, specialized_dest_type),
                                            print_type(self.arena, src_param_type)
                                        ));
                                        can_assign = false;
                                    }
                                }
                            }
                        }
                    }
                } else if param.category == ParameterCategory::VarArgPositional {
                    src_saw_var_args = true;
                }
            }

            // Anything left over was demanded by the destination but never
            // provided by the source.
            for (name, _) in &dest_named {
                diag.add_message(format!("Named parameter '{name}' is missing in source"));
                can_assign = false;
            }
        }

        // Without var-args on either side, arities have to line up.
        if !src_has_var_args && !dest_has_var_args {
            let non_default_src_param_count = src_func
                .parameters
                .iter()
                .filter(|p| !p.has_default)
                .count();
            if dest_param_count < non_default_src_param_count {
                diag.add_message(format!(
                    "Function accepts too few parameters. Expected {non_default_src_param_count} but got {dest_param_count}"
                ));
                can_assign = false;
            }
            if dest_param_count > src_param_count {
                diag.add_message(format!(
                    "Function accepts too many parameters. Expected {src_param_count} but got {dest_param_count}"
                ));
                can_assign = false;
            }
        }

        // Return types are covariant.
        let src_return_type = src_func.effective_return_type();
        let dest_return_type = dest_func.effective_return_type();
        if !self.can_assign(
            dest_return_type,
            src_return_type,
            diag.create_addendum(),
            type_var_map.as_deref_mut(),
            flags,
            recursion_level + 1,
        ) {
            diag.add_message(format!(
                "Function return type '{}' is incompatible with type '{}'",
                print_type(self.arena, src_return_type),
                print_type(self.arena, dest_return_type)
            ));
            can_assign = false;
        }

        can_assign
    }

    /// The bound `__call__` signature of a callback protocol instance.
    fn get_callback_protocol_type(&self, dest_object_id: TypeId) -> Option<TypeId> {
        let dest_arc = self.arena.get(dest_object_id);
        let object_type = dest_arc.as_object()?;
        let class_arc = self.arena.get(object_type.class_type);
        let class_type = class_arc.as_class()?;
        if !class_type.is_protocol() {
            return None;
        }
        let member =
            look_up_object_member(self.arena, dest_object_id, "__call__", lookup_flags::DEFAULT)?;
        let member_type = get_type_of_member(self.arena, &member);
        if matches!(&*self.arena.get(member_type), Type::Function(_)) {
            Some(bind_function_to_class_or_object(
                self.arena,
                Some(dest_object_id),
                member_type,
                false,
            ))
        } else {
            None
        }
    }

    /// Synthesize the function a class value behaves as when called: its
    /// constructor signature minus the implicit first parameter, returning an
    /// instance of the class.
    fn get_constructor_function(&self, class_id: TypeId) -> TypeId {
        let mut constructor = FunctionType::new(
            function_flags::STATIC_METHOD
                | function_flags::CONSTRUCTOR_METHOD
                | function_flags::SYNTHESIZED,
        );
        constructor.declared_return_type = Some(self.arena.object(class_id));

        let member_type = ["__new__", "__init__"].into_iter().find_map(|name| {
            let member = look_up_class_member(
                self.arena,
                class_id,
                name,
                lookup_flags::SKIP_INSTANCE_VARIABLES | lookup_flags::SKIP_OBJECT_BASE_CLASS,
            )?;
            let member_type = get_type_of_member(self.arena, &member);
            matches!(&*self.arena.get(member_type), Type::Function(_)).then_some(member_type)
        });

        match member_type {
            Some(member_type) => {
                if let Type::Function(init_func) = &*self.arena.get(member_type) {
                    // Skip the implicit cls/self parameter.
                    for (index, param) in init_func.parameters.iter().enumerate().skip(1) {
                        let mut param = param.clone();
                        param.param_type = init_func.effective_parameter_type(index);
                        constructor.parameters.push(param);
                    }
                }
            }
            None => {
                constructor
                    .parameters
                    .push(Parameter::var_arg_positional("args", TypeId::ANY));
                constructor
                    .parameters
                    .push(Parameter::var_arg_keyword("kwargs", TypeId::ANY));
            }
        }

        self.arena.alloc(Type::Function(Box::new(constructor)))
    }
}
