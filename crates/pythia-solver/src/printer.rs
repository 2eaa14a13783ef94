//! Deterministic type rendering for diagnostic addenda.
//!
//! Diagnostics must be byte-identical across runs, so rendering walks the
//! type graph in declaration order and never consults anything but the arena.
//! Spelling follows the checked language: instances print as their class name
//! (`int`, `List[int]`), class values as `Type[int]`, literal pins as
//! `Literal['on']`.

use crate::arena::TypeArena;
use crate::types::{LiteralValue, ParameterCategory, Type, TypeId};
use pythia_common::limits::MAX_TYPE_RECURSION_COUNT;

/// Render `id` for use in a diagnostic message.
pub fn print_type(arena: &TypeArena, id: TypeId) -> String {
    print_type_recursive(arena, id, 0)
}

fn print_type_recursive(arena: &TypeArena, id: TypeId, recursion_level: u32) -> String {
    if recursion_level > MAX_TYPE_RECURSION_COUNT {
        return "...".to_string();
    }

    match &*arena.get(id) {
        Type::Unbound => "Unbound".to_string(),
        Type::Unknown => "Unknown".to_string(),
        Type::Any { is_ellipsis: false } => "Any".to_string(),
        Type::Any { is_ellipsis: true } => "...".to_string(),
        Type::None => "None".to_string(),
        Type::Never => "Never".to_string(),
        Type::TypeVar(type_var) => type_var.name.clone(),
        Type::Class(_) => format!(
            "Type[{}]",
            print_class_name(arena, id, recursion_level + 1)
        ),
        Type::Object(object_type) => match &object_type.literal_value {
            Some(value) => format!("Literal[{}]", print_literal(value)),
            Option::None => print_class_name(arena, object_type.class_type, recursion_level + 1),
        },
        Type::Function(function_type) => {
            let params: Vec<String> = function_type
                .parameters
                .iter()
                .enumerate()
                .map(|(index, param)| {
                    let prefix = match param.category {
                        ParameterCategory::Positional => "",
                        ParameterCategory::VarArgPositional => "*",
                        ParameterCategory::VarArgKeyword => "**",
                    };
                    let param_type = print_type_recursive(
                        arena,
                        function_type.effective_parameter_type(index),
                        recursion_level + 1,
                    );
                    match &param.name {
                        Some(name) => format!("{prefix}{name}: {param_type}"),
                        Option::None => format!("{prefix}{param_type}"),
                    }
                })
                .collect();
            let return_type = print_type_recursive(
                arena,
                function_type.effective_return_type(),
                recursion_level + 1,
            );
            format!("({}) -> {}", params.join(", "), return_type)
        }
        Type::Overloaded(overloaded) => {
            let overloads: Vec<String> = overloaded
                .overloads
                .iter()
                .map(|&overload| print_type_recursive(arena, overload, recursion_level + 1))
                .collect();
            format!("Overload[{}]", overloads.join(", "))
        }
        Type::Module(_) => "Module".to_string(),
        Type::Union(union_type) => {
            let subtypes: Vec<String> = union_type
                .subtypes
                .iter()
                .map(|&subtype| print_type_recursive(arena, subtype, recursion_level + 1))
                .collect();
            subtypes.join(" | ")
        }
    }
}

/// A class spelled as a value-position annotation: `int`, `Dict[str, int]`.
fn print_class_name(arena: &TypeArena, class_id: TypeId, recursion_level: u32) -> String {
    if recursion_level > MAX_TYPE_RECURSION_COUNT {
        return "...".to_string();
    }
    let class_arc = arena.get(class_id);
    let Some(class_type) = class_arc.as_class() else {
        return print_type_recursive(arena, class_id, recursion_level);
    };
    match &class_type.type_arguments {
        Some(type_arguments) if !type_arguments.is_empty() => {
            let args: Vec<String> = type_arguments
                .iter()
                .map(|&arg| print_type_recursive(arena, arg, recursion_level + 1))
                .collect();
            format!("{}[{}]", class_type.name(), args.join(", "))
        }
        _ => class_type.name().to_string(),
    }
}

fn print_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Bool(true) => "True".to_string(),
        LiteralValue::Bool(false) => "False".to_string(),
        LiteralValue::Int(value) => value.to_string(),
        LiteralValue::Str(value) => format!("'{value}'"),
    }
}
