//! Field validation engine.
//!
//! Provides rule types, the process-wide registry that types declare their
//! rules into, and a pure-logic evaluator.

pub mod evaluator;
pub mod registry;
pub mod rules;
