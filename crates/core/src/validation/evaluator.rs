//! Rule evaluator -- pure logic, no registry access.

use serde_json::Value;

use super::rules::{FieldValues, FieldViolation, RuleKind, TypeRuleSet, ValidationResult};

/// Evaluate every declared rule against a single record, collecting violations.
///
/// Fields are visited in name order so the violation list is stable.
/// Fields present in `data` without declared rules are ignored.
pub fn evaluate_rules(rules: &TypeRuleSet, data: &FieldValues) -> ValidationResult {
    let mut fields: Vec<&String> = rules.keys().collect();
    fields.sort();

    let mut violations = Vec::new();
    for field in fields {
        let value = data.get(field.as_str());
        for rule in &rules[field] {
            if !rule_passes(*rule, value) {
                tracing::debug!(field = %field, rule = %rule, "Field rule failed");
                violations.push(FieldViolation {
                    field: field.clone(),
                    rule: *rule,
                    value: value.cloned(),
                });
            }
        }
    }

    ValidationResult {
        is_valid: violations.is_empty(),
        violations,
    }
}

/// `true` iff every rule of every declared field passes.
pub fn passes_all(rules: &TypeRuleSet, data: &FieldValues) -> bool {
    rules.iter().all(|(field, field_rules)| {
        let value = data.get(field.as_str());
        field_rules.iter().all(|rule| rule_passes(*rule, value))
    })
}

/// Evaluate a single rule against a field value (`None` when absent).
pub fn rule_passes(rule: RuleKind, value: Option<&Value>) -> bool {
    match rule {
        RuleKind::Required => is_truthy(value),
        RuleKind::PositiveNumber => is_positive_number(value),
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        // Zero fails even for fields with no numeric intent.
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn is_positive_number(value: Option<&Value>) -> bool {
    value.and_then(Value::as_f64).is_some_and(|f| f > 0.0)
}
