//! Built-in rules.
//!
//! Each rule takes the value and the field name and reports a single
//! [`ValidationError`] on failure, so rules compose with [`crate::Checks`]
//! and [`crate::FieldRules`].

use crate::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

/// The value must contain something other than whitespace.
pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, format!("{} should not be empty", field))
            .with_constraint("notEmpty"));
    }
    Ok(())
}

/// At least `min` characters.
pub fn min_length(value: &str, min: usize, field: &str) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        return Err(ValidationError::new(
            field,
            format!("{} must be at least {} characters", field, min),
        )
        .with_constraint("minLength")
        .with_value(value));
    }
    Ok(())
}

/// At most `max` characters.
pub fn max_length(value: &str, max: usize, field: &str) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("{} must be at most {} characters", field, max),
        )
        .with_constraint("maxLength"));
    }
    Ok(())
}

pub fn email(value: &str, field: &str) -> Result<(), ValidationError> {
    if EMAIL_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(
            ValidationError::new(field, format!("{} must be a valid email", field))
                .with_constraint("isEmail")
                .with_value(value),
        )
    }
}

pub fn uuid(value: &str, field: &str) -> Result<(), ValidationError> {
    if UUID_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(
            ValidationError::new(field, format!("{} must be a UUID", field))
                .with_constraint("isUuid")
                .with_value(value),
        )
    }
}

/// Inclusive numeric range.
pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!("{} must be between {} and {}", field, min, max),
        )
        .with_constraint("inRange")
        .with_value(value.to_string()));
    }
    Ok(())
}

/// Custom pattern; `pattern` is compiled by the caller so it is checked once.
pub fn matches(value: &str, pattern: &Regex, field: &str) -> Result<(), ValidationError> {
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(
            ValidationError::new(field, format!("{} does not match required pattern", field))
                .with_constraint("matches")
                .with_value(value),
        )
    }
}

/// The field must be present.
pub fn required<T>(value: &Option<T>, field: &str) -> Result<(), ValidationError> {
    if value.is_none() {
        return Err(
            ValidationError::new(field, format!("{} is required", field)).with_constraint("required"),
        );
    }
    Ok(())
}
