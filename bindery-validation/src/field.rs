// Reusable rule sets for a single field

use crate::{ValidationError, ValidationErrors};
use std::sync::Arc;

type RuleFn = Arc<dyn Fn(&str, &str) -> Result<(), ValidationError> + Send + Sync>;

/// Ordered rules applied to one string field.
///
/// Build once (for example in a `Lazy`) and share between validations.
#[derive(Clone)]
pub struct FieldRules {
    field: String,
    rules: Vec<RuleFn>,
}

impl FieldRules {
    pub fn for_field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rules: Vec::new(),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add<F>(mut self, rule: F) -> Self
    where
        F: Fn(&str, &str) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Run every rule; all failures are reported.
    pub fn validate(&self, value: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for rule in &self.rules {
            if let Err(error) = rule(value, &self.field) {
                errors.add(error);
            }
        }
        errors.into_result()
    }
}

impl std::fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRules")
            .field("field", &self.field)
            .field("rules", &self.rules.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules;

    #[test]
    fn test_rules_run_in_order() {
        let name = FieldRules::for_field("name")
            .add(rules::not_empty)
            .add(|v, f| rules::min_length(v, 2, f));

        let errors = name.validate("").unwrap_err();
        assert_eq!(errors.errors[0].constraint, "notEmpty");
        assert_eq!(errors.errors[1].constraint, "minLength");
        assert!(name.validate("Al").is_ok());
    }

    #[test]
    fn test_field_name_is_passed_to_rules() {
        let email = FieldRules::for_field("contact").add(rules::email);
        let errors = email.validate("nope").unwrap_err();
        assert_eq!(errors.errors[0].field, "contact");
    }
}
