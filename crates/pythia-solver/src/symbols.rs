//! Symbols and symbol tables.
//!
//! The binder (external to this crate) resolves names to symbols before the
//! relation engine runs, so a [`Symbol`] here carries already-resolved type
//! ids. Tables preserve declaration order; protocol matching and diagnostics
//! iterate them, and that order must be deterministic.

use crate::types::{TypeId, symbol_flags};
use indexmap::IndexMap;
use serde::Serialize;

/// An insertion-ordered name-to-symbol table.
pub type SymbolTable = IndexMap<String, Symbol>;

/// A named member of a class, object, or module scope.
#[derive(Clone, Debug, Serialize)]
pub struct Symbol {
    pub flags: u32,
    /// The type the declaration spells out, if any.
    pub declared_type: Option<TypeId>,
    /// The type inferred from assignments when there is no declaration.
    pub inferred_type: Option<TypeId>,
}

impl Symbol {
    pub fn new(flags: u32, declared_type: Option<TypeId>, inferred_type: Option<TypeId>) -> Self {
        Symbol {
            flags,
            declared_type,
            inferred_type,
        }
    }

    /// A class-scoped member with a declared type (methods, annotated class
    /// variables).
    pub fn class_member(declared_type: TypeId) -> Self {
        Symbol::new(symbol_flags::CLASS_MEMBER, Some(declared_type), None)
    }

    /// An instance variable with a declared type.
    pub fn instance_member(declared_type: TypeId) -> Self {
        Symbol::new(symbol_flags::INSTANCE_MEMBER, Some(declared_type), None)
    }

    /// A placeholder fabricated when lookup runs into an `Unknown` class.
    pub fn synthesized_unknown() -> Self {
        Symbol::new(symbol_flags::CLASS_MEMBER, Some(TypeId::UNKNOWN), None)
    }

    #[must_use]
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags |= flags;
        self
    }

    pub fn is_instance_member(&self) -> bool {
        (self.flags & symbol_flags::INSTANCE_MEMBER) != 0
    }

    pub fn is_class_member(&self) -> bool {
        (self.flags & symbol_flags::CLASS_MEMBER) != 0
    }

    pub fn is_ignored_for_protocol_match(&self) -> bool {
        (self.flags & symbol_flags::IGNORED_FOR_PROTOCOL_MATCH) != 0
    }

    /// Whether the symbol's declarations spell out a type (as opposed to the
    /// type being inferred from assignments).
    pub fn has_typed_declarations(&self) -> bool {
        self.declared_type.is_some()
    }

    /// Declared type if present, else inferred, else `Unknown`.
    pub fn effective_type(&self) -> TypeId {
        self.declared_type
            .or(self.inferred_type)
            .unwrap_or(TypeId::UNKNOWN)
    }
}
