//! Centralized limits and thresholds for the pythia type checker.
//!
//! This module provides shared constants for recursion depths used throughout
//! the codebase. Centralizing these values:
//! - Prevents duplicate definitions with inconsistent values
//! - Documents the rationale for each limit

/// Maximum recursion depth for type operations (assignability, specialization,
/// structural equality, member lookup).
///
/// The type graph may contain cycles (self-referential generics, mutually
/// recursive protocols), so every recursive type operation threads a counter
/// and short-circuits with a safe default once the counter exceeds this bound:
/// `true` for assignability, `Any` for specialization, no-op for aggregation.
///
/// # Example
///
/// ```text
/// class Node:
///     next: Node      # assignability between two Node types recurses
///                     # through the field and must terminate
/// ```
pub const MAX_TYPE_RECURSION_COUNT: u32 = 64;

/// Maximum number of nested addendum levels rendered when a diagnostic tree
/// is flattened into display lines.
///
/// Deeply nested failures (e.g. a union inside a generic inside a protocol
/// member) produce addendum trees deeper than anyone will read; rendering
/// stops at this depth while the tree itself is kept intact.
pub const MAX_DIAGNOSTIC_DEPTH: u32 = 16;
