//! Validation rule and result types.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Field values of one instance, keyed by field name.
pub type FieldValues = serde_json::Map<String, serde_json::Value>;

/// Ordered rules attached to one field. Duplicates are kept.
pub type FieldRuleSet = Vec<RuleKind>;

/// All declared field rules for one type.
pub type TypeRuleSet = HashMap<String, FieldRuleSet>;

/// A single validation predicate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Value must be present and truthy: not null, `false`, `""` or zero.
    Required,
    /// Value must be a number strictly greater than zero.
    PositiveNumber,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::PositiveNumber => "positive_number",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated result of evaluating all rules of a type against one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub violations: Vec<FieldViolation>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            violations: Vec::new(),
        }
    }
}

/// A single field-level rule violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub rule: RuleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}
