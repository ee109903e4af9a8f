//! `fieldcheck-core` -- declarative field validation.
//!
//! Types declare per-field rules once at setup time into a
//! [`ValidatorRegistry`]; callers later ask whether an instance satisfies
//! every declared rule and get a plain boolean back.

pub mod catalog;
pub mod error;
pub mod validation;

pub use error::CoreError;
pub use validation::registry::{Validatable, ValidatorRegistry};
pub use validation::rules::{
    FieldRuleSet, FieldValues, FieldViolation, RuleKind, TypeRuleSet, ValidationResult,
};
