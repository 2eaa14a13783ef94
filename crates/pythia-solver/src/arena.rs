//! The type arena.
//!
//! All types live in a [`TypeArena`] and are referenced by [`TypeId`]. Holding
//! types by stable index keeps self-referential types representable without
//! reference cycles: a class whose field mentions the class itself is two
//! arena slots pointing at each other.
//!
//! One arena belongs to one analysis session. Types are immutable once the
//! graph is tied ([`TypeArena::replace`] is a construction-time operation used
//! by the binder to close knots), so ids can be shared freely within the
//! session.

use crate::types::{ClassType, FunctionType, LiteralValue, ModuleType, ObjectType, Type, TypeId, TypeVarType};
use dashmap::DashMap;
use std::sync::{Arc, RwLock};

/// Arena allocator that owns every [`Type`] of an analysis session.
#[derive(Debug)]
pub struct TypeArena {
    types: RwLock<Vec<Arc<Type>>>,
    /// Interns instance types so that the same class + literal pair always
    /// resolves to the same id. Identity checks then cover the common case of
    /// comparing two mentions of the same instance type.
    object_cache: DashMap<(TypeId, Option<LiteralValue>), TypeId>,
}

impl TypeArena {
    pub fn new() -> Self {
        let arena = TypeArena {
            types: RwLock::new(Vec::with_capacity(64)),
            object_cache: DashMap::new(),
        };
        // Singleton registration order must match the TypeId constants.
        arena.alloc(Type::Unbound);
        arena.alloc(Type::Unknown);
        arena.alloc(Type::Any { is_ellipsis: false });
        arena.alloc(Type::Any { is_ellipsis: true });
        arena.alloc(Type::None);
        arena.alloc(Type::Never);
        arena
    }

    /// Insert a type, returning its assigned id.
    pub fn alloc(&self, ty: Type) -> TypeId {
        let mut types = self.types.write().unwrap_or_else(|e| e.into_inner());
        let id = TypeId(types.len() as u32);
        types.push(Arc::new(ty));
        id
    }

    /// Resolve an id. An id that this arena never produced resolves to
    /// `Unknown` rather than failing; the model's operations are total.
    pub fn get(&self, id: TypeId) -> Arc<Type> {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        types
            .get(id.0 as usize)
            .cloned()
            .unwrap_or_else(|| Arc::new(Type::Unknown))
    }

    /// Swap the type stored at `id`. Used by the binder to tie knots in
    /// self-referential declarations; ignores ids this arena never produced.
    pub fn replace(&self, id: TypeId, ty: Type) {
        let mut types = self.types.write().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = types.get_mut(id.0 as usize) {
            *slot = Arc::new(ty);
        }
    }

    pub fn len(&self) -> usize {
        self.types.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn class(&self, class_type: ClassType) -> TypeId {
        self.alloc(Type::Class(Box::new(class_type)))
    }

    pub fn type_var(&self, type_var: TypeVarType) -> TypeId {
        self.alloc(Type::TypeVar(Box::new(type_var)))
    }

    pub fn function(&self, function_type: FunctionType) -> TypeId {
        self.alloc(Type::Function(Box::new(function_type)))
    }

    pub fn module(&self, module_type: ModuleType) -> TypeId {
        self.alloc(Type::Module(Box::new(module_type)))
    }

    /// An instance of `class_type` with no literal pin. Interned.
    pub fn object(&self, class_type: TypeId) -> TypeId {
        self.object_with_literal(class_type, None)
    }

    /// An instance of `class_type` pinned to `value`. Interned.
    pub fn object_literal(&self, class_type: TypeId, value: LiteralValue) -> TypeId {
        self.object_with_literal(class_type, Some(value))
    }

    pub fn object_with_literal(
        &self,
        class_type: TypeId,
        literal_value: Option<LiteralValue>,
    ) -> TypeId {
        *self
            .object_cache
            .entry((class_type, literal_value.clone()))
            .or_insert_with(|| {
                self.alloc(Type::Object(Box::new(ObjectType {
                    class_type,
                    literal_value,
                })))
            })
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        TypeArena::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{Symbol, SymbolTable};

    #[test]
    fn test_singletons_are_preregistered() {
        let arena = TypeArena::new();
        assert!(matches!(&*arena.get(TypeId::UNBOUND), Type::Unbound));
        assert!(matches!(&*arena.get(TypeId::UNKNOWN), Type::Unknown));
        assert!(matches!(
            &*arena.get(TypeId::ANY),
            Type::Any { is_ellipsis: false }
        ));
        assert!(matches!(
            &*arena.get(TypeId::ELLIPSIS),
            Type::Any { is_ellipsis: true }
        ));
        assert!(matches!(&*arena.get(TypeId::NONE), Type::None));
        assert!(matches!(&*arena.get(TypeId::NEVER), Type::Never));
    }

    #[test]
    fn test_object_interning() {
        let arena = TypeArena::new();
        let class_id = arena.class(ClassType::new(
            "Widget",
            0,
            Vec::new(),
            Vec::new(),
            SymbolTable::new(),
        ));

        let a = arena.object(class_id);
        let b = arena.object(class_id);
        assert_eq!(a, b);

        let lit_a = arena.object_literal(class_id, LiteralValue::Int(3));
        let lit_b = arena.object_literal(class_id, LiteralValue::Int(3));
        let lit_c = arena.object_literal(class_id, LiteralValue::Int(4));
        assert_eq!(lit_a, lit_b);
        assert_ne!(lit_a, lit_c);
        assert_ne!(lit_a, a);
    }

    #[test]
    fn test_replace_ties_knots() {
        let arena = TypeArena::new();
        let class_id = arena.class(ClassType::new(
            "Node",
            0,
            Vec::new(),
            Vec::new(),
            SymbolTable::new(),
        ));
        let instance = arena.object(class_id);

        let mut fields = SymbolTable::new();
        fields.insert("next".to_string(), Symbol::instance_member(instance));
        arena.replace(
            class_id,
            Type::Class(Box::new(ClassType::new("Node", 0, Vec::new(), Vec::new(), fields))),
        );

        let tied = arena.get(class_id);
        let class_type = tied.as_class().expect("still a class");
        assert!(class_type.details.fields.contains_key("next"));
    }
}
