//! Number validation.
//!
//! This module provides [`NumberShape`] for validating JSON numbers with
//! bounds, integrality and sign constraints.

use serde_json::Value;

use crate::error::ErrorCollector;
use crate::ValidationResult;

use super::primitives::type_mismatch;
use super::traits::{IntoValidator, Validate, Validator};

#[derive(Clone)]
enum NumberConstraint {
    Min { value: f64, message: Option<String> },
    Max { value: f64, message: Option<String> },
    Integer { message: Option<String> },
    Positive { message: Option<String> },
}

/// A validator for numbers.
///
/// # Example
///
/// ```rust
/// use shapeql::{Shape, Validate};
/// use serde_json::json;
///
/// let rating = Shape::number().integer().min(1.0).max(5.0);
///
/// assert!(rating.validate(&json!(4)).is_success());
/// assert!(rating.validate(&json!(4.5)).is_failure());
/// assert!(rating.validate(&json!(9)).is_failure());
/// ```
#[derive(Clone, Default)]
pub struct NumberShape {
    constraints: Vec<NumberConstraint>,
}

impl NumberShape {
    /// Creates a number validator with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number must be at least `value` (inclusive).
    pub fn min(mut self, value: f64) -> Self {
        self.constraints.push(NumberConstraint::Min {
            value,
            message: None,
        });
        self
    }

    /// The number must be at most `value` (inclusive).
    pub fn max(mut self, value: f64) -> Self {
        self.constraints.push(NumberConstraint::Max {
            value,
            message: None,
        });
        self
    }

    /// The number must have no fractional part.
    pub fn integer(mut self) -> Self {
        self.constraints
            .push(NumberConstraint::Integer { message: None });
        self
    }

    /// The number must be greater than zero.
    pub fn positive(mut self) -> Self {
        self.constraints
            .push(NumberConstraint::Positive { message: None });
        self
    }

    /// Overrides the message of the most recent constraint.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(
            NumberConstraint::Min { message: m, .. }
            | NumberConstraint::Max { message: m, .. }
            | NumberConstraint::Integer { message: m }
            | NumberConstraint::Positive { message: m },
        ) = self.constraints.last_mut()
        {
            *m = Some(message.into());
        }
        self
    }
}

impl Validate for NumberShape {
    fn validate(&self, value: &Value) -> ValidationResult<Value> {
        let n = match value.as_f64() {
            Some(n) => n,
            None => return type_mismatch("number", value),
        };

        let mut errors = ErrorCollector::new();
        for constraint in &self.constraints {
            let failed = match constraint {
                NumberConstraint::Min { value: min, message } if n < *min => Some((
                    message.clone().unwrap_or_else(|| {
                        format!("Number must be greater than or equal to {}", min)
                    }),
                    "min_value",
                )),
                NumberConstraint::Max { value: max, message } if n > *max => Some((
                    message
                        .clone()
                        .unwrap_or_else(|| format!("Number must be less than or equal to {}", max)),
                    "max_value",
                )),
                NumberConstraint::Integer { message } if n.fract() != 0.0 => Some((
                    message
                        .clone()
                        .unwrap_or_else(|| "Expected integer, received float".to_string()),
                    "not_integer",
                )),
                NumberConstraint::Positive { message } if n <= 0.0 => Some((
                    message
                        .clone()
                        .unwrap_or_else(|| "Number must be greater than 0".to_string()),
                    "not_positive",
                )),
                _ => None,
            };
            if let Some((message, code)) = failed {
                errors.add_error(None, value, message, code);
            }
        }
        errors.finish(value.clone())
    }
}

impl IntoValidator for NumberShape {
    fn into_validator(self) -> Validator {
        Validator::new(self)
    }
}
