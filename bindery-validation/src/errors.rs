// Validation errors

use serde::Serialize;
use std::fmt;

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,

    /// Name of the rule that failed, e.g. `notEmpty`
    pub constraint: String,

    /// Offending value, when it is safe to echo back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            constraint: "custom".to_string(),
            value: None,
        }
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Every rule that failed for one value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Errors recorded for `field`.
    pub fn field(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// One JSON object per failure, in the order they were recorded.
    pub fn to_details(&self) -> Vec<serde_json::Value> {
        self.errors
            .iter()
            .filter_map(|e| serde_json::to_value(e).ok())
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::new(vec![error])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_fields() {
        let errors = ValidationErrors::new(vec![
            ValidationError::new("name", "is required"),
            ValidationError::new("age", "must be positive"),
        ]);
        assert_eq!(errors.to_string(), "name: is required; age: must be positive");
    }

    #[test]
    fn test_details_skip_missing_value() {
        let errors: ValidationErrors = ValidationError::new("name", "is required")
            .with_constraint("notEmpty")
            .into();
        let details = errors.to_details();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0]["constraint"], "notEmpty");
        assert!(details[0].get("value").is_none());
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::default().into_result().is_ok());
        let errors: ValidationErrors = ValidationError::new("x", "bad").into();
        assert_eq!(errors.into_result().unwrap_err().field("x").len(), 1);
    }
}
