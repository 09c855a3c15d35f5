//! Combinators over whole validators.
//!
//! - [`union`]: the first validator that accepts the input wins
//! - [`chain`]: sequential composition that treats `None` as identity

use serde_json::Value;
use stillwater::Validation;

use crate::error::ErrorCollector;

use super::traits::Validator;

/// Tries each validator in order and returns the first success.
///
/// When every option fails, the failure holds the errors of every attempt
/// followed by one summary entry at the union's own path.
pub fn union(validators: Vec<Validator>) -> Validator {
    Validator::from_fn(move |value: &Value| {
        let mut errors = ErrorCollector::new();
        for validator in &validators {
            match validator.validate(value) {
                Validation::Success(v) => return Validation::Success(v),
                Validation::Failure(e) => errors.add(None, e),
            }
        }
        errors.add_error(
            None,
            value,
            format!("value did not match any of {} options", validators.len()),
            "union_none_matched",
        );
        errors.finish(Value::Null)
    })
}

/// Sequential composition `b(a(input))`.
///
/// With one side absent the other is returned unchanged; with both absent
/// the result is `None`, so callers keep the identity fast path.
pub fn chain(a: Option<Validator>, b: Option<Validator>) -> Option<Validator> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.then(b)),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}
