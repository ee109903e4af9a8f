//! Process-wide registry of declared field rules.
//!
//! Types implement [`Validatable`] to name themselves and declare their
//! rules; [`ValidatorRegistry::declare`] wires a type in exactly once.
//! Lookups for types that never declared anything yield no rules, which
//! validation treats as "valid with no constraints".

use std::collections::{HashMap, HashSet};
use std::sync::{LazyLock, PoisonError, RwLock};

use crate::error::CoreError;

use super::evaluator;
use super::rules::{FieldValues, RuleKind, TypeRuleSet, ValidationResult};

static GLOBAL: LazyLock<ValidatorRegistry> = LazyLock::new(ValidatorRegistry::new);

/// A type whose instances can be checked against registered rules.
pub trait Validatable {
    /// Registry key for this type. Must be unique across declared types.
    const TYPE_NAME: &'static str;

    /// Register this type's field rules. Called once per registry by
    /// [`ValidatorRegistry::declare`].
    fn declare_rules(registry: &ValidatorRegistry);

    /// Current field values of this instance.
    fn field_values(&self) -> FieldValues;
}

#[derive(Default)]
struct RegistryState {
    rules: HashMap<String, TypeRuleSet>,
    declared: HashSet<&'static str>,
}

/// Mapping from type name to its declared field rules.
///
/// Thread-safe via interior `RwLock`. Every mutation completes under one
/// write guard, so a poisoned lock is recovered rather than propagated.
#[derive(Default)]
pub struct ValidatorRegistry {
    state: RwLock<RegistryState>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry. Created empty on first access.
    pub fn global() -> &'static ValidatorRegistry {
        &GLOBAL
    }

    /// Append `rule` to the rules of `type_name.field_name`.
    ///
    /// Never fails and never deduplicates: registering the same rule twice
    /// stores it twice.
    pub fn register(&self, type_name: &str, field_name: &str, rule: RuleKind) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state
            .rules
            .entry(type_name.to_string())
            .or_default()
            .entry(field_name.to_string())
            .or_default()
            .push(rule);
        tracing::debug!(type_name, field_name, rule = %rule, "Registered field rule");
    }

    /// Run `T::declare_rules` unless `T` has already been declared here.
    ///
    /// Rules are collected into a scratch registry first and merged under a
    /// single write lock together with the declared marker, so readers see
    /// either none or all of a type's rules. If `declare_rules` panics
    /// nothing is recorded and a later call may retry.
    ///
    /// Returns `true` if this call performed the declaration.
    pub fn declare<T: Validatable>(&self) -> bool {
        if self.is_declared(T::TYPE_NAME) {
            return false;
        }

        let scratch = ValidatorRegistry::new();
        T::declare_rules(&scratch);
        let staged = scratch
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .rules;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.declared.insert(T::TYPE_NAME) {
            return false;
        }
        for (type_name, fields) in staged {
            let type_rules = state.rules.entry(type_name).or_default();
            for (field_name, rules) in fields {
                type_rules.entry(field_name).or_default().extend(rules);
            }
        }
        drop(state);

        tracing::info!(type_name = T::TYPE_NAME, "Declared validated type");
        true
    }

    /// Whether `declare` has completed for `type_name`.
    pub fn is_declared(&self, type_name: &str) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.declared.contains(type_name)
    }

    /// Snapshot of the rules declared for `type_name`, if any.
    pub fn rules_for(&self, type_name: &str) -> Option<TypeRuleSet> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.rules.get(type_name).cloned()
    }

    /// Names of every type with at least one registered rule, sorted.
    pub fn declared_types(&self) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = state.rules.keys().cloned().collect();
        names.sort();
        names
    }

    /// `true` iff `fields` satisfy every rule declared for `type_name`.
    /// Unregistered types are vacuously valid.
    pub fn validate_fields(&self, type_name: &str, fields: &FieldValues) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match state.rules.get(type_name) {
            Some(rules) => evaluator::passes_all(rules, fields),
            None => true,
        }
    }

    /// Like [`validate_fields`](Self::validate_fields) but reports which
    /// field rules failed.
    pub fn evaluate_fields(&self, type_name: &str, fields: &FieldValues) -> ValidationResult {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match state.rules.get(type_name) {
            Some(rules) => evaluator::evaluate_rules(rules, fields),
            None => ValidationResult::valid(),
        }
    }

    /// Validate an instance against the rules declared for its type.
    pub fn validate<T: Validatable>(&self, instance: &T) -> bool {
        self.validate_fields(T::TYPE_NAME, &instance.field_values())
    }

    /// Validate an instance, turning a failure into [`CoreError::Validation`].
    pub fn ensure_valid<T: Validatable>(&self, instance: &T) -> Result<(), CoreError> {
        let result = self.evaluate_fields(T::TYPE_NAME, &instance.field_values());
        if result.is_valid {
            return Ok(());
        }
        let failed: Vec<String> = result
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.rule))
            .collect();
        Err(CoreError::Validation(format!(
            "{} is invalid ({})",
            T::TYPE_NAME,
            failed.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn fields(pairs: &[(&str, serde_json::Value)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    struct Note {
        body: String,
    }

    impl Validatable for Note {
        const TYPE_NAME: &'static str = "Note";

        fn declare_rules(registry: &ValidatorRegistry) {
            registry.register(Self::TYPE_NAME, "body", RuleKind::Required);
        }

        fn field_values(&self) -> FieldValues {
            fields(&[("body", json!(self.body))])
        }
    }

    #[test]
    fn unregistered_type_has_no_rules_and_is_valid() {
        let registry = ValidatorRegistry::new();
        assert!(registry.rules_for("Ghost").is_none());
        assert!(registry.validate_fields("Ghost", &fields(&[("x", json!(""))])));
        assert!(registry.evaluate_fields("Ghost", &FieldValues::new()).is_valid);
    }

    #[test]
    fn second_rule_appends_instead_of_overwriting() {
        let registry = ValidatorRegistry::new();
        registry.register("Course", "price", RuleKind::Required);
        registry.register("Course", "price", RuleKind::PositiveNumber);

        let rules = registry.rules_for("Course").unwrap();
        assert_eq!(
            rules["price"],
            vec![RuleKind::Required, RuleKind::PositiveNumber]
        );
    }

    #[test]
    fn duplicate_registration_is_kept() {
        let registry = ValidatorRegistry::new();
        registry.register("Course", "title", RuleKind::Required);
        registry.register("Course", "title", RuleKind::Required);

        let rules = registry.rules_for("Course").unwrap();
        assert_eq!(rules["title"].len(), 2);
        assert!(registry.validate_fields("Course", &fields(&[("title", json!("Go"))])));
        assert!(!registry.validate_fields("Course", &fields(&[("title", json!(""))])));
    }

    #[test]
    fn rules_are_scoped_per_type() {
        let registry = ValidatorRegistry::new();
        registry.register("A", "name", RuleKind::Required);

        assert!(!registry.validate_fields("A", &FieldValues::new()));
        assert!(registry.validate_fields("B", &FieldValues::new()));
        assert_eq!(registry.declared_types(), vec!["A".to_string()]);
    }

    #[test]
    fn declare_runs_once_per_type() {
        let registry = ValidatorRegistry::new();
        assert!(registry.declare::<Note>());
        assert!(!registry.declare::<Note>());

        let rules = registry.rules_for("Note").unwrap();
        assert_eq!(rules["body"], vec![RuleKind::Required]);
    }

    struct Flaky;

    static FLAKY_SHOULD_PANIC: std::sync::atomic::AtomicBool =
        std::sync::atomic::AtomicBool::new(true);

    impl Validatable for Flaky {
        const TYPE_NAME: &'static str = "Flaky";

        fn declare_rules(registry: &ValidatorRegistry) {
            registry.register(Self::TYPE_NAME, "name", RuleKind::Required);
            if FLAKY_SHOULD_PANIC.swap(false, std::sync::atomic::Ordering::SeqCst) {
                panic!("declaration interrupted");
            }
            registry.register(Self::TYPE_NAME, "count", RuleKind::PositiveNumber);
        }

        fn field_values(&self) -> FieldValues {
            FieldValues::new()
        }
    }

    #[test]
    fn panicking_declaration_leaves_no_partial_rules() {
        let registry = ValidatorRegistry::new();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registry.declare::<Flaky>()
        }));
        assert!(outcome.is_err());
        assert!(!registry.is_declared("Flaky"));
        assert!(registry.rules_for("Flaky").is_none());

        assert!(registry.declare::<Flaky>());
        assert!(registry.is_declared("Flaky"));
        let rules = registry.rules_for("Flaky").unwrap();
        assert_eq!(rules["name"], vec![RuleKind::Required]);
        assert_eq!(rules["count"], vec![RuleKind::PositiveNumber]);
    }

    #[test]
    fn declare_keeps_rules_registered_directly() {
        let registry = ValidatorRegistry::new();
        registry.register("Note", "body", RuleKind::PositiveNumber);
        registry.declare::<Note>();

        let rules = registry.rules_for("Note").unwrap();
        assert_eq!(
            rules["body"],
            vec![RuleKind::PositiveNumber, RuleKind::Required]
        );
    }

    #[test]
    fn validate_uses_instance_fields() {
        let registry = ValidatorRegistry::new();
        registry.declare::<Note>();

        assert!(registry.validate(&Note {
            body: "hello".into()
        }));
        assert!(!registry.validate(&Note { body: String::new() }));
    }

    #[test]
    fn ensure_valid_names_failed_rules() {
        let registry = ValidatorRegistry::new();
        registry.declare::<Note>();

        assert!(registry.ensure_valid(&Note { body: "x".into() }).is_ok());
        let err = registry
            .ensure_valid(&Note { body: String::new() })
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.contains("body: required"));
    }

    #[test]
    fn rules_for_returns_snapshot() {
        let registry = ValidatorRegistry::new();
        registry.register("A", "name", RuleKind::Required);
        let snapshot = registry.rules_for("A").unwrap();
        registry.register("A", "name", RuleKind::PositiveNumber);

        assert_eq!(snapshot["name"].len(), 1);
        assert_eq!(registry.rules_for("A").unwrap()["name"].len(), 2);
    }

    #[test]
    fn concurrent_registration_keeps_every_rule() {
        let registry = ValidatorRegistry::new();
        std::thread::scope(|s| {
            for i in 0..8 {
                let registry = &registry;
                s.spawn(move || {
                    registry.register(&format!("T{i}"), "f", RuleKind::Required);
                    registry.register("Shared", "f", RuleKind::Required);
                });
            }
        });

        assert_eq!(registry.declared_types().len(), 9);
        assert_eq!(registry.rules_for("Shared").unwrap()["f"].len(), 8);
    }
}
