//! The type-variable binding environment.
//!
//! An assignability query discovers bindings (`_T := int`) as it recurses;
//! specialization consumes them. The map is mutated mid-query, so callers
//! clone it before any speculative path (overload probing, union-destination
//! matching). Iteration order is insertion order and must stay deterministic
//! to keep diagnostics reproducible.

use crate::types::TypeId;
use indexmap::IndexMap;

/// Ordered mapping from type-variable name to its currently bound type.
#[derive(Clone, Debug, Default)]
pub struct TypeVarMap {
    entries: IndexMap<String, TypeId>,
}

impl TypeVarMap {
    pub fn new() -> Self {
        TypeVarMap {
            entries: IndexMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.entries.get(name).copied()
    }

    pub fn set(&mut self, name: impl Into<String>, ty: TypeId) {
        self.entries.insert(name.into(), ty);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Bound names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
