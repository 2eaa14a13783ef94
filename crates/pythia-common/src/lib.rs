//! Common types and utilities for the pythia type checker.
//!
//! This crate provides foundational pieces used across all pythia crates:
//! - Centralized limits and thresholds
//! - Structured diagnostic addenda (`DiagnosticAddendum`)

// Centralized limits and thresholds
pub mod limits;

// Structured diagnostic reasons attached to failed type queries
pub mod diagnostics;
pub use diagnostics::DiagnosticAddendum;
