//! In-crate test modules for the type-relation core.

mod fixtures;

mod scenario_tests;
mod type_utils_tests;
