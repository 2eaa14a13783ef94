//! Core type definitions for the type-relation engine.
//!
//! This module contains the main `Type` enum and all type variant structs.
//! Types are held in a [`crate::arena::TypeArena`] and referenced by
//! [`TypeId`]; every variant is immutable once the type graph is tied.

use super::flags::{class_flags, function_flags};
use crate::symbols::SymbolTable;
use serde::Serialize;
use std::sync::Arc;

// =============================================================================
// Type ID
// =============================================================================

/// Unique identifier for a type in the type arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Placeholder for a name that has no type yet.
    pub const UNBOUND: TypeId = TypeId(0);
    /// Explicit "we don't know".
    pub const UNKNOWN: TypeId = TypeId(1);
    /// Top and bottom for assignability.
    pub const ANY: TypeId = TypeId(2);
    /// `Any` carrying the ellipsis marker used by variadic tuples.
    pub const ELLIPSIS: TypeId = TypeId(3);
    /// The singleton null type.
    pub const NONE: TypeId = TypeId(4);
    /// Bottom for runtime values; no inhabitants.
    pub const NEVER: TypeId = TypeId(5);
}

// =============================================================================
// Literal Values
// =============================================================================

/// A literal value pinning an object type to a single inhabitant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

// =============================================================================
// Type Variables
// =============================================================================

/// Per-parameter policy governing how type arguments propagate through
/// subtyping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
}

/// A type variable (`_T`, `_T bound SupportsInt`, ...).
#[derive(Clone, Debug, Serialize)]
pub struct TypeVarType {
    pub name: String,
    /// Value-constraint list; a bound variable must resolve to a type that is
    /// the same as one of these (ignoring literal pins).
    pub constraints: Vec<TypeId>,
    /// Upper bound; a bound variable must resolve to a subtype of this.
    pub bound_type: Option<TypeId>,
    pub variance: Variance,
}

impl TypeVarType {
    pub fn new(name: impl Into<String>) -> Self {
        TypeVarType {
            name: name.into(),
            constraints: Vec::new(),
            bound_type: None,
            variance: Variance::Invariant,
        }
    }
}

// =============================================================================
// Classes
// =============================================================================

/// A reference to a base class in a class declaration.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct BaseClass {
    /// Expected to be a `Class` (or `Unknown` when the base failed to
    /// resolve).
    pub class_type: TypeId,
    /// Metaclass entries are skipped by member lookup and derivation walks.
    pub is_metaclass: bool,
}

impl BaseClass {
    pub fn new(class_type: TypeId) -> Self {
        BaseClass {
            class_type,
            is_metaclass: false,
        }
    }

    pub fn metaclass(class_type: TypeId) -> Self {
        BaseClass {
            class_type,
            is_metaclass: true,
        }
    }
}

/// The immutable, declaration-scoped half of a class type.
///
/// Shared (via `Arc`) by every specialization of the class: `List[int]` and
/// `List[str]` are two `ClassType` wrappers over one `ClassDetails`.
#[derive(Debug, Serialize)]
pub struct ClassDetails {
    pub name: String,
    pub flags: u32,
    /// TypeVar ids, in declaration order.
    pub type_parameters: Vec<TypeId>,
    /// Bases in declared order; metaclass entries carry `is_metaclass`.
    pub base_classes: Vec<BaseClass>,
    pub fields: SymbolTable,
}

/// A class type: shared details plus an optional specialization.
#[derive(Clone, Debug, Serialize)]
pub struct ClassType {
    pub details: Arc<ClassDetails>,
    /// `None` = unspecialized. When present, the length equals
    /// `type_parameters.len()` except for special builtins (`Tuple`, `Type`),
    /// which accept arbitrary arity.
    pub type_arguments: Option<Vec<TypeId>>,
}

impl ClassType {
    pub fn new(
        name: impl Into<String>,
        flags: u32,
        type_parameters: Vec<TypeId>,
        base_classes: Vec<BaseClass>,
        fields: SymbolTable,
    ) -> Self {
        ClassType {
            details: Arc::new(ClassDetails {
                name: name.into(),
                flags,
                type_parameters,
                base_classes,
                fields,
            }),
            type_arguments: None,
        }
    }

    /// Clone this class with the given type arguments, sharing the details.
    #[must_use]
    pub fn with_type_arguments(&self, type_arguments: Vec<TypeId>) -> Self {
        ClassType {
            details: Arc::clone(&self.details),
            type_arguments: Some(type_arguments),
        }
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    /// Two class types describe the same generic class when they share the
    /// same declaration, regardless of specialization.
    pub fn is_same_generic_class(&self, other: &ClassType) -> bool {
        Arc::ptr_eq(&self.details, &other.details)
    }

    pub fn is_builtin(&self) -> bool {
        (self.details.flags & class_flags::BUILTIN) != 0
    }

    /// Is this the builtin class with the given name?
    pub fn is_builtin_named(&self, name: &str) -> bool {
        self.is_builtin() && self.details.name == name
    }

    pub fn is_special_builtin(&self) -> bool {
        (self.details.flags & class_flags::SPECIAL_BUILTIN) != 0
    }

    pub fn is_protocol(&self) -> bool {
        (self.details.flags & class_flags::PROTOCOL) != 0
    }

    pub fn is_typed_record(&self) -> bool {
        (self.details.flags & class_flags::TYPED_RECORD) != 0
    }

    pub fn is_abstract(&self) -> bool {
        (self.details.flags & class_flags::ABSTRACT) != 0
    }

    pub fn can_omit_values(&self) -> bool {
        (self.details.flags & class_flags::CAN_OMIT_VALUES) != 0
    }
}

/// An instance of a class, optionally pinned to a literal value.
#[derive(Clone, Debug, Serialize)]
pub struct ObjectType {
    /// Always a `Class` variant.
    pub class_type: TypeId,
    pub literal_value: Option<LiteralValue>,
}

// =============================================================================
// Functions
// =============================================================================

/// How a parameter accepts arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ParameterCategory {
    /// An ordinary positional-or-keyword parameter.
    Positional,
    /// `*args`; also written bare (`*`) to introduce keyword-only parameters.
    VarArgPositional,
    /// `**kwargs`.
    VarArgKeyword,
}

/// A single function parameter.
#[derive(Clone, Debug, Serialize)]
pub struct Parameter {
    pub category: ParameterCategory,
    pub name: Option<String>,
    pub param_type: TypeId,
    pub has_default: bool,
}

impl Parameter {
    pub fn positional(name: impl Into<String>, param_type: TypeId) -> Self {
        Parameter {
            category: ParameterCategory::Positional,
            name: Some(name.into()),
            param_type,
            has_default: false,
        }
    }

    pub fn var_arg_positional(name: impl Into<String>, param_type: TypeId) -> Self {
        Parameter {
            category: ParameterCategory::VarArgPositional,
            name: Some(name.into()),
            param_type,
            has_default: false,
        }
    }

    pub fn var_arg_keyword(name: impl Into<String>, param_type: TypeId) -> Self {
        Parameter {
            category: ParameterCategory::VarArgKeyword,
            name: Some(name.into()),
            param_type,
            has_default: false,
        }
    }

    #[must_use]
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// Parameter and return types produced by specializing a function.
#[derive(Clone, Debug, Serialize)]
pub struct SpecializedFunctionTypes {
    pub parameter_types: Vec<TypeId>,
    pub return_type: Option<TypeId>,
}

/// A function or method type.
#[derive(Clone, Debug, Serialize)]
pub struct FunctionType {
    pub flags: u32,
    pub parameters: Vec<Parameter>,
    pub declared_return_type: Option<TypeId>,
    pub inferred_return_type: Option<TypeId>,
    /// When present, overrides the declared parameter/return types.
    pub specialized: Option<SpecializedFunctionTypes>,
}

impl FunctionType {
    pub fn new(flags: u32) -> Self {
        FunctionType {
            flags,
            parameters: Vec::new(),
            declared_return_type: None,
            inferred_return_type: None,
            specialized: None,
        }
    }

    pub fn is_instance_method(&self) -> bool {
        (self.flags & function_flags::INSTANCE_METHOD) != 0
    }

    pub fn is_class_method(&self) -> bool {
        (self.flags & function_flags::CLASS_METHOD) != 0
    }

    pub fn is_static_method(&self) -> bool {
        (self.flags & function_flags::STATIC_METHOD) != 0
    }

    pub fn is_constructor_method(&self) -> bool {
        (self.flags & function_flags::CONSTRUCTOR_METHOD) != 0
    }

    pub fn is_abstract(&self) -> bool {
        (self.flags & function_flags::ABSTRACT) != 0
    }

    pub fn is_synthesized(&self) -> bool {
        (self.flags & function_flags::SYNTHESIZED) != 0
    }

    /// The parameter type at `index`, preferring the specialized set.
    pub fn effective_parameter_type(&self, index: usize) -> TypeId {
        if let Some(specialized) = &self.specialized {
            if let Some(&param_type) = specialized.parameter_types.get(index) {
                return param_type;
            }
        }
        self.parameters
            .get(index)
            .map(|p| p.param_type)
            .unwrap_or(TypeId::UNKNOWN)
    }

    /// Specialized return type, else declared, else inferred, else `Unknown`.
    pub fn effective_return_type(&self) -> TypeId {
        self.specialized
            .as_ref()
            .and_then(|s| s.return_type)
            .or(self.declared_return_type)
            .or(self.inferred_return_type)
            .unwrap_or(TypeId::UNKNOWN)
    }
}

/// A set of overload signatures for one callable name.
#[derive(Clone, Debug, Serialize)]
pub struct OverloadedFunctionType {
    /// `Function` ids in declaration order.
    pub overloads: Vec<TypeId>,
}

// =============================================================================
// Modules and Unions
// =============================================================================

/// A module value.
#[derive(Clone, Debug, Serialize)]
pub struct ModuleType {
    pub fields: SymbolTable,
    /// Fields contributed by the module loader rather than the module body.
    pub loader_fields: SymbolTable,
}

/// A union of two or more types. Never nested; duplicates collapsed.
#[derive(Clone, Debug, Serialize)]
pub struct UnionType {
    pub subtypes: Vec<TypeId>,
}

// =============================================================================
// Type Enum
// =============================================================================

/// All possible type variants.
/// Large variants are boxed to keep the enum size small.
#[derive(Clone, Debug, Serialize)]
pub enum Type {
    Unbound,
    Unknown,
    Any { is_ellipsis: bool },
    None,
    Never,
    TypeVar(Box<TypeVarType>),
    Class(Box<ClassType>),
    Object(Box<ObjectType>),
    Function(Box<FunctionType>),
    Overloaded(Box<OverloadedFunctionType>),
    Module(Box<ModuleType>),
    Union(Box<UnionType>),
}

impl Type {
    pub fn is_any_or_unknown(&self) -> bool {
        matches!(self, Type::Any { .. } | Type::Unknown)
    }

    pub fn is_none_or_never(&self) -> bool {
        matches!(self, Type::None | Type::Never)
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(class_type) => Some(class_type),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Type::Object(object_type) => Some(object_type),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(function_type) => Some(function_type),
            _ => None,
        }
    }
}
