//! Shared test fixtures: a minimal builtin catalog plus helpers for building
//! classes, methods, and instances.

use crate::arena::TypeArena;
use crate::symbols::{Symbol, SymbolTable};
use crate::types::{
    BaseClass, ClassType, FunctionType, LiteralValue, Parameter, Type, TypeId, TypeVarType,
    Variance, class_flags, function_flags,
};

/// The slice of builtins the relation engine special-cases, plus an arena to
/// grow test types in.
pub struct Fixture {
    pub arena: TypeArena,
    pub object_class: TypeId,
    /// The runtime class of classes (`type`).
    pub type_class: TypeId,
    /// The `Type[...]` special form (unspecialized).
    pub type_special: TypeId,
    /// The `Tuple` special form (unspecialized).
    pub tuple_class: TypeId,
    pub module_type_class: TypeId,
    pub int_class: TypeId,
    pub float_class: TypeId,
    pub complex_class: TypeId,
    pub str_class: TypeId,
    pub bool_class: TypeId,
}

impl Fixture {
    pub fn new() -> Self {
        let arena = TypeArena::new();
        let object_class = arena.class(ClassType::new(
            "object",
            class_flags::BUILTIN,
            Vec::new(),
            Vec::new(),
            SymbolTable::new(),
        ));
        let builtin = |name: &str, flags: u32| {
            arena.class(ClassType::new(
                name,
                flags,
                Vec::new(),
                vec![BaseClass::new(object_class)],
                SymbolTable::new(),
            ))
        };
        let type_class = builtin("type", class_flags::BUILTIN);
        let type_special = builtin("Type", class_flags::BUILTIN | class_flags::SPECIAL_BUILTIN);
        let tuple_class = builtin("Tuple", class_flags::BUILTIN | class_flags::SPECIAL_BUILTIN);
        let module_type_class = builtin("ModuleType", class_flags::BUILTIN);
        let int_class = builtin("int", class_flags::BUILTIN);
        let float_class = builtin("float", class_flags::BUILTIN);
        let complex_class = builtin("complex", class_flags::BUILTIN);
        let str_class = builtin("str", class_flags::BUILTIN);
        let bool_class = builtin("bool", class_flags::BUILTIN);

        Fixture {
            arena,
            object_class,
            type_class,
            type_special,
            tuple_class,
            module_type_class,
            int_class,
            float_class,
            complex_class,
            str_class,
            bool_class,
        }
    }

    // =========================================================================
    // Instances and literals
    // =========================================================================

    pub fn instance(&self, class_id: TypeId) -> TypeId {
        self.arena.object(class_id)
    }

    pub fn int_instance(&self) -> TypeId {
        self.arena.object(self.int_class)
    }

    pub fn float_instance(&self) -> TypeId {
        self.arena.object(self.float_class)
    }

    pub fn complex_instance(&self) -> TypeId {
        self.arena.object(self.complex_class)
    }

    pub fn str_instance(&self) -> TypeId {
        self.arena.object(self.str_class)
    }

    pub fn bool_instance(&self) -> TypeId {
        self.arena.object(self.bool_class)
    }

    pub fn str_literal(&self, value: &str) -> TypeId {
        self.arena
            .object_literal(self.str_class, LiteralValue::Str(value.to_string()))
    }

    pub fn int_literal(&self, value: i64) -> TypeId {
        self.arena
            .object_literal(self.int_class, LiteralValue::Int(value))
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// A plain class deriving `object`.
    pub fn simple_class(&self, name: &str) -> TypeId {
        self.class_with(name, 0, Vec::new(), vec![BaseClass::new(self.object_class)], SymbolTable::new())
    }

    pub fn class_with(
        &self,
        name: &str,
        flags: u32,
        type_parameters: Vec<TypeId>,
        base_classes: Vec<BaseClass>,
        fields: SymbolTable,
    ) -> TypeId {
        self.arena.class(ClassType::new(
            name,
            flags,
            type_parameters,
            base_classes,
            fields,
        ))
    }

    /// Clone a generic class with the given type arguments.
    pub fn specialized(&self, class_id: TypeId, type_arguments: Vec<TypeId>) -> TypeId {
        let class_arc = self.arena.get(class_id);
        let class_type = class_arc.as_class().expect("fixture id must be a class");
        self.arena.class(class_type.with_type_arguments(type_arguments))
    }

    pub fn type_var(&self, name: &str, variance: Variance) -> TypeId {
        let mut type_var = TypeVarType::new(name);
        type_var.variance = variance;
        self.arena.type_var(type_var)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// An unbound instance method: implicit `self` (unannotated) plus the
    /// given parameters.
    pub fn method(&self, parameters: Vec<Parameter>, return_type: TypeId) -> TypeId {
        let mut function = FunctionType::new(function_flags::INSTANCE_METHOD);
        function.parameters.push(Parameter::positional("self", TypeId::UNKNOWN));
        function.parameters.extend(parameters);
        function.declared_return_type = Some(return_type);
        self.arena.function(function)
    }

    /// A free function with the given parameters and declared return type.
    pub fn function(&self, parameters: Vec<Parameter>, return_type: TypeId) -> TypeId {
        let mut function = FunctionType::new(0);
        function.parameters = parameters;
        function.declared_return_type = Some(return_type);
        self.arena.function(function)
    }

    /// A class-member symbol holding an instance method.
    pub fn method_symbol(&self, parameters: Vec<Parameter>, return_type: TypeId) -> Symbol {
        Symbol::class_member(self.method(parameters, return_type))
    }

    /// The `Animal` / `Dog <: Animal` pair used throughout subtype tests.
    pub fn animal_and_dog(&self) -> (TypeId, TypeId) {
        let animal = self.simple_class("Animal");
        let dog = self.class_with(
            "Dog",
            0,
            Vec::new(),
            vec![BaseClass::new(animal), BaseClass::new(self.object_class)],
            SymbolTable::new(),
        );
        (animal, dog)
    }
}

/// Route trace events to the test harness when `RUST_LOG` asks for them.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Shorthand for an untyped `Type::Union` membership check in assertions.
pub fn union_members(arena: &TypeArena, id: TypeId) -> Vec<TypeId> {
    match &*arena.get(id) {
        Type::Union(union_type) => union_type.subtypes.clone(),
        _ => vec![id],
    }
}
