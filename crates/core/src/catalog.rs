//! Declared types shipped with the library.
//!
//! [`Course`] carries registry rules; [`Product`] enforces its own price
//! rule in a setter and declares nothing.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::CoreError;
use crate::validation::registry::{Validatable, ValidatorRegistry};
use crate::validation::rules::{FieldValues, RuleKind};

/// Declare every catalog type into `registry`.
pub fn declare_all(registry: &ValidatorRegistry) {
    registry.declare::<Course>();
    registry.declare::<Product>();
}

/// A course offering. `title` is required; `price` is required and positive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub title: String,
    pub price: f64,
}

impl Course {
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            price,
        }
    }
}

impl Validatable for Course {
    const TYPE_NAME: &'static str = "Course";

    fn declare_rules(registry: &ValidatorRegistry) {
        registry.register(Self::TYPE_NAME, "title", RuleKind::Required);
        registry.register(Self::TYPE_NAME, "price", RuleKind::Required);
        registry.register(Self::TYPE_NAME, "price", RuleKind::PositiveNumber);
    }

    fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values.insert("title".to_string(), json!(self.title));
        values.insert("price".to_string(), json!(self.price));
        values
    }
}

/// A product whose price can only be changed to a positive amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub title: String,
    price: f64,
}

impl Product {
    /// Construction does not check the price; only [`set_price`](Self::set_price) does.
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            price,
        }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Replace the price. Non-positive values are rejected and the stored
    /// price is left unchanged.
    pub fn set_price(&mut self, value: f64) -> Result<(), CoreError> {
        if value > 0.0 {
            self.price = value;
            Ok(())
        } else {
            Err(CoreError::InvalidAssignment {
                field: "price",
                message: "Invalid Price - Price should be positive.".to_string(),
            })
        }
    }

    /// Price including `tax`, given as a fraction (`0.2` for 20%).
    pub fn price_with_tax(&self, tax: f64) -> f64 {
        self.price * (1.0 + tax)
    }
}

impl Validatable for Product {
    const TYPE_NAME: &'static str = "Product";

    fn declare_rules(_registry: &ValidatorRegistry) {}

    fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values.insert("title".to_string(), json!(self.title));
        values.insert("price".to_string(), json!(self.price));
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn registry() -> ValidatorRegistry {
        let registry = ValidatorRegistry::new();
        declare_all(&registry);
        registry
    }

    #[test]
    fn course_declares_expected_rules() {
        let rules = registry().rules_for(Course::TYPE_NAME).unwrap();
        assert_eq!(rules["title"], vec![RuleKind::Required]);
        assert_eq!(
            rules["price"],
            vec![RuleKind::Required, RuleKind::PositiveNumber]
        );
    }

    #[test]
    fn course_end_to_end() {
        let registry = registry();
        assert!(registry.validate(&Course::new("Go", 10.0)));
        assert!(!registry.validate(&Course::new("", -5.0)));
        assert!(!registry.validate(&Course::new("Go", 0.0)));
        assert!(!registry.validate(&Course::new("", 10.0)));
    }

    #[test]
    fn declare_all_is_idempotent() {
        let registry = registry();
        declare_all(&registry);
        let rules = registry.rules_for(Course::TYPE_NAME).unwrap();
        assert_eq!(rules["price"].len(), 2);
    }

    #[test]
    fn product_has_no_registry_rules() {
        let registry = registry();
        assert!(registry.rules_for(Product::TYPE_NAME).is_none());
        assert!(registry.validate(&Product::new("", -1.0)));
    }

    #[test]
    fn set_price_accepts_positive() {
        let mut product = Product::new("Book", 19.99);
        product.set_price(25.0).unwrap();
        assert_eq!(product.price(), 25.0);
    }

    #[test]
    fn set_price_rejects_non_positive_and_keeps_previous() {
        let mut product = Product::new("Book", 19.99);
        for bad in [0.0, -3.0] {
            let err = product.set_price(bad).unwrap_err();
            assert_matches!(err, CoreError::InvalidAssignment { field: "price", .. });
        }
        assert_eq!(product.price(), 19.99);
    }

    #[test]
    fn set_price_error_message() {
        let err = Product::new("Book", 1.0).set_price(-1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid assignment to price: Invalid Price - Price should be positive."
        );
    }

    #[test]
    fn price_with_tax_applies_fraction() {
        let product = Product::new("Book", 100.0);
        assert!((product.price_with_tax(0.2) - 120.0).abs() < 1e-9);
        assert_eq!(product.price_with_tax(0.0), 100.0);
    }
}
