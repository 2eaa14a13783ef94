//! Flag constants for the type model.
//!
//! This module contains all flag sets used by the type-relation core. Each set
//! lives in its own `pub mod` of `u32` constants so call sites read as
//! `class_flags::PROTOCOL` and combine with `|`.

/// Flags that describe a class declaration.
pub mod class_flags {
    pub const NONE: u32 = 0;

    /// Declared in the builtins scope (`object`, `int`, `str`, ...).
    pub const BUILTIN: u32 = 1 << 0;

    /// A builtin special form that accepts an arbitrary number of type
    /// arguments (`Tuple`, `Type`).
    pub const SPECIAL_BUILTIN: u32 = 1 << 1;

    /// A structural interface: assignability to this class is decided
    /// member-by-member rather than by inheritance.
    pub const PROTOCOL: u32 = 1 << 2;

    /// A keyed-record class with declared per-key value types.
    pub const TYPED_RECORD: u32 = 1 << 3;

    /// Has at least one unimplemented abstract method.
    pub const ABSTRACT: u32 = 1 << 4;

    /// Typed-record classes only: keys declared by this class may be omitted
    /// (requiredness is the inverse of this flag).
    pub const CAN_OMIT_VALUES: u32 = 1 << 5;
}

/// Flags that describe a function or method.
pub mod function_flags {
    pub const NONE: u32 = 0;

    /// Bound through an instance; the first parameter is the instance.
    pub const INSTANCE_METHOD: u32 = 1 << 0;

    /// Bound through the class; the first parameter is the class.
    pub const CLASS_METHOD: u32 = 1 << 1;

    /// No implicit first parameter.
    pub const STATIC_METHOD: u32 = 1 << 2;

    /// Constructs an instance of the containing class.
    pub const CONSTRUCTOR_METHOD: u32 = 1 << 3;

    /// Declared abstract; concrete subclasses must override.
    pub const ABSTRACT: u32 = 1 << 4;

    /// Fabricated by the checker rather than written in source
    /// (e.g. the constructor signature synthesized for a class value).
    pub const SYNTHESIZED: u32 = 1 << 5;
}

/// Flags that describe a symbol in a class, module, or object scope.
pub mod symbol_flags {
    pub const NONE: u32 = 0;

    /// Assigned through `self`; lives on instances.
    pub const INSTANCE_MEMBER: u32 = 1 << 0;

    /// Declared in the class body; lives on the class.
    pub const CLASS_MEMBER: u32 = 1 << 1;

    /// Excluded when matching a protocol member-by-member
    /// (e.g. `__init__` and other dunder plumbing on the protocol itself).
    pub const IGNORED_FOR_PROTOCOL_MATCH: u32 = 1 << 2;
}

/// Flags controlling class-member lookup.
pub mod lookup_flags {
    pub const DEFAULT: u32 = 0;

    /// Skip the class itself; search only its bases.
    pub const SKIP_ORIGINAL_CLASS: u32 = 1 << 0;

    /// Search only the class itself, not its bases.
    pub const SKIP_BASE_CLASSES: u32 = 1 << 1;

    /// Stop before the builtin `object` base.
    pub const SKIP_OBJECT_BASE_CLASS: u32 = 1 << 2;

    /// Consider only class-scoped members, not instance variables.
    pub const SKIP_INSTANCE_VARIABLES: u32 = 1 << 3;

    /// Require a declared (not merely inferred) type on the symbol.
    pub const DECLARED_TYPES_ONLY: u32 = 1 << 4;
}

/// Flags controlling assignability checks.
pub mod assign_flags {
    pub const DEFAULT: u32 = 0;

    /// Forbid subclass-to-superclass assignment for generic type arguments:
    /// the two sides must be the same generic class.
    pub const ENFORCE_INVARIANCE: u32 = 1 << 0;
}
