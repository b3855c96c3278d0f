// Validation traits

use crate::{ValidationError, ValidationErrors};

/// A value that can check its own invariants after deserialization.
///
/// The default implementation accepts everything, so payloads without rules
/// only need `impl Validate for MyPayload {}`.
pub trait Validate {
    /// Validate the value and return every failed rule.
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl<T: Validate + ?Sized> Validate for Box<T> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        (**self).validate()
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Some(inner) => inner.validate(),
            None => Ok(()),
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for (index, item) in self.iter().enumerate() {
            if let Err(nested) = item.validate() {
                for error in nested.errors {
                    let field = format!("[{}].{}", index, error.field);
                    errors.add(ValidationError { field, ..error });
                }
            }
        }
        errors.into_result()
    }
}

impl Validate for serde_json::Value {}
impl Validate for String {}
impl Validate for std::collections::HashMap<String, String> {}
impl Validate for std::collections::HashMap<String, serde_json::Value> {}

/// Accumulates the outcome of several rule checks.
///
/// Unlike `?`, a failed check does not stop the remaining ones, so the
/// caller receives every violation at once.
#[derive(Debug, Default)]
pub struct Checks {
    errors: ValidationErrors,
}

impl Checks {
    /// Start an empty set of checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a single rule.
    pub fn check(mut self, outcome: Result<(), ValidationError>) -> Self {
        if let Err(error) = outcome {
            self.errors.add(error);
        }
        self
    }

    /// Record the outcome of a nested validation, prefixing field names.
    pub fn nested<T: Validate>(mut self, prefix: &str, value: &T) -> Self {
        if let Err(nested) = value.validate() {
            for error in nested.errors {
                let field = format!("{}.{}", prefix, error.field);
                self.errors.add(ValidationError { field, ..error });
            }
        }
        self
    }

    /// Finish, returning all accumulated failures.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        self.errors.into_result()
    }
}
