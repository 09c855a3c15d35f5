//! String validation.
//!
//! This module provides [`StringShape`] for validating string values with
//! length and pattern constraints.

use regex::Regex;
use serde_json::Value;
use stillwater::Validation;

use crate::error::{ConfigError, ErrorCollector, ParseError, ParseErrors};
use crate::ValidationResult;

use super::primitives::type_mismatch;
use super::traits::{IntoValidator, Validate, Validator};

/// A constraint applied to string values.
#[derive(Clone)]
enum StringConstraint {
    MinLength {
        min: usize,
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        message: Option<String>,
    },
    Pattern {
        regex: Regex,
        message: Option<String>,
    },
}

/// A validator for string values.
///
/// Every violated constraint is reported, not just the first.
///
/// # Example
///
/// ```rust
/// use shapeql::Shape;
/// use shapeql::Validate;
/// use serde_json::json;
///
/// let slug = Shape::string()
///     .min_len(3)
///     .pattern(r"^[a-z-]+$")
///     .unwrap();
///
/// assert!(slug.validate(&json!("red-shoes")).is_success());
///
/// // Too short AND not matching the pattern: two errors
/// let result = slug.validate(&json!("A"));
/// assert!(result.is_failure());
/// ```
#[derive(Clone, Default)]
pub struct StringShape {
    constraints: Vec<StringConstraint>,
    type_error_message: Option<String>,
}

impl StringShape {
    /// Creates a string validator with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// The string must have at least `min` characters.
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(StringConstraint::MinLength { min, message: None });
        self
    }

    /// The string must have at most `max` characters.
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(StringConstraint::MaxLength { max, message: None });
        self
    }

    /// The string must match `pattern`.
    ///
    /// An invalid pattern is a configuration error.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.constraints.push(StringConstraint::Pattern {
            regex,
            message: None,
        });
        Ok(self)
    }

    /// Overrides the message of the most recent constraint.
    ///
    /// With no constraints yet, overrides the type error message instead.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = Some(message.into());
        match self.constraints.last_mut() {
            Some(StringConstraint::MinLength { message: m, .. })
            | Some(StringConstraint::MaxLength { message: m, .. })
            | Some(StringConstraint::Pattern { message: m, .. }) => *m = message,
            None => self.type_error_message = message,
        }
        self
    }
}

impl Validate for StringShape {
    fn validate(&self, value: &Value) -> ValidationResult<Value> {
        let s = match value.as_str() {
            Some(s) => s,
            None => {
                return match &self.type_error_message {
                    Some(message) => Validation::Failure(ParseErrors::single(
                        ParseError::new(value.clone(), message.clone()).with_code("invalid_type"),
                    )),
                    None => type_mismatch("string", value),
                };
            }
        };

        let mut errors = ErrorCollector::new();
        for constraint in &self.constraints {
            check_constraint(constraint, s, value, &mut errors);
        }
        errors.finish(value.clone())
    }
}

impl IntoValidator for StringShape {
    fn into_validator(self) -> Validator {
        Validator::new(self)
    }
}

fn check_constraint(
    constraint: &StringConstraint,
    s: &str,
    value: &Value,
    errors: &mut ErrorCollector,
) {
    match constraint {
        StringConstraint::MinLength { min, message } => {
            let len = s.chars().count();
            if len < *min {
                let msg = message.clone().unwrap_or_else(|| {
                    format!("String must contain at least {} character(s), got {}", min, len)
                });
                errors.add_error(None, value, msg, "min_length");
            }
        }
        StringConstraint::MaxLength { max, message } => {
            let len = s.chars().count();
            if len > *max {
                let msg = message.clone().unwrap_or_else(|| {
                    format!("String must contain at most {} character(s), got {}", max, len)
                });
                errors.add_error(None, value, msg, "max_length");
            }
        }
        StringConstraint::Pattern { regex, message } => {
            if !regex.is_match(s) {
                let msg = message
                    .clone()
                    .unwrap_or_else(|| format!("String must match pattern '{}'", regex.as_str()));
                errors.add_error(None, value, msg, "pattern");
            }
        }
    }
}
