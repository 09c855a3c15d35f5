//! Data error types.
//!
//! This module provides [`ParseError`] for a single structural failure,
//! [`ParseErrors`] for the non-empty set carried by a failed validation, and
//! [`ErrorCollector`], the accumulator combinators use while walking a
//! document.

use std::fmt::{self, Display};

use serde_json::Value;
use stillwater::{NonEmptyVec, Semigroup, Validation};

use crate::path::{JsonPath, PathSegment};

/// A single validation failure.
///
/// - **path**: where in the document the failure occurred
/// - **value**: the offending value
/// - **message**: human-readable description
/// - **code**: machine-readable error code (`invalid_type`, `union_none_matched`, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Path to the value that failed validation, root-to-leaf.
    pub path: JsonPath,
    /// The value that failed validation.
    pub value: Value,
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error code.
    pub code: String,
}

impl ParseError {
    /// Creates a root-path error for `value`.
    ///
    /// The code defaults to `"validation_error"`.
    pub fn new(value: Value, message: impl Into<String>) -> Self {
        Self {
            path: JsonPath::root(),
            value,
            message: message.into(),
            code: "validation_error".to_string(),
        }
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the path and returns self for chaining.
    pub fn with_path(mut self, path: JsonPath) -> Self {
        self.path = path;
        self
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "result{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ParseError {}

/// The failures of one validation run. Never empty.
///
/// The rendered message is produced by [`Display`] (or
/// [`ParseErrors::with_message`]) so nothing is formatted while the tree is
/// still being walked.
///
/// ```rust
/// use shapeql::{ParseError, ParseErrors};
/// use serde_json::json;
///
/// let errors = ParseErrors::single(
///     ParseError::new(json!("bad"), "Expected number, received string"),
/// )
/// .prefixed("price");
///
/// assert_eq!(
///     errors.to_string(),
///     "1 Parsing Error:\nresult.price: Expected number, received string"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParseErrors(NonEmptyVec<ParseError>);

impl ParseErrors {
    /// Creates a `ParseErrors` containing a single error.
    pub fn single(error: ParseError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Returns `None` for an empty vec.
    pub fn from_vec(errors: Vec<ParseError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.0.iter()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &ParseError {
        self.0.head()
    }

    /// Returns all errors at the specified path.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&ParseError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Returns all errors with the specified code.
    pub fn with_code(&self, code: &str) -> Vec<&ParseError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Converts this collection into a `Vec<ParseError>`.
    pub fn into_vec(self) -> Vec<ParseError> {
        self.0.into_vec()
    }

    /// Re-roots every error under `segment`.
    pub fn prefixed(self, segment: impl Into<PathSegment>) -> Self {
        let segment = segment.into();
        Self(self.0.map(|mut error| {
            error.path.prepend(segment.clone());
            error
        }))
    }

    /// Renders the aggregated message.
    ///
    /// `"<n> Parsing Error(s):"` followed by one `result<path>: <message>`
    /// line per entry, in collection order.
    pub fn with_message(&self) -> String {
        self.to_string()
    }
}

impl Semigroup for ParseErrors {
    fn combine(self, other: Self) -> Self {
        ParseErrors(self.0.combine(other.0))
    }
}

impl Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.len();
        write!(f, "{} Parsing {}:", n, if n == 1 { "Error" } else { "Errors" })?;
        for error in self.iter() {
            write!(f, "\n{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ParseErrors>();
    assert_sync::<ParseErrors>();
};

/// Accumulates failures while a combinator walks its children.
///
/// An empty collector is not a failure: call [`ErrorCollector::finish`] (or
/// check [`ErrorCollector::len`]) to decide the outcome.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    entries: Vec<ParseError>,
}

impl ErrorCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorbs a child's failures, re-prefixing their paths with `segment`.
    ///
    /// Entries are flattened into this collector, never nested.
    pub fn add(&mut self, segment: Option<PathSegment>, errors: ParseErrors) {
        for mut error in errors {
            if let Some(segment) = &segment {
                error.path.prepend(segment.clone());
            }
            self.entries.push(error);
        }
    }

    /// Records one plain error under `segment`.
    pub fn add_error(
        &mut self,
        segment: Option<PathSegment>,
        value: &Value,
        message: impl Into<String>,
        code: &str,
    ) {
        let path = segment.map(|s| JsonPath::from(vec![s])).unwrap_or_default();
        self.entries
            .push(ParseError::new(value.clone(), message).with_code(code).with_path(path));
    }

    /// Number of collected entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the collected entries into `ParseErrors`, if any.
    pub fn into_errors(self) -> Option<ParseErrors> {
        ParseErrors::from_vec(self.entries)
    }

    /// Succeeds with `output` when nothing was collected.
    pub fn finish<T>(self, output: T) -> Validation<T, ParseErrors> {
        match self.into_errors() {
            None => Validation::Success(output),
            Some(errors) => Validation::Failure(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_error_display_root() {
        let error = ParseError::new(json!(null), "Expected string, received null");
        assert_eq!(error.to_string(), "result: Expected string, received null");
        assert_eq!(error.code, "validation_error");
    }

    #[test]
    fn test_prefixed_prepends_in_order() {
        let errors = ParseErrors::single(ParseError::new(json!(42), "bad"))
            .prefixed("id")
            .prefixed(1usize)
            .prefixed("items");
        assert_eq!(errors.first().path.to_string(), ".items[1].id");
    }

    #[test]
    fn test_from_vec() {
        assert!(ParseErrors::from_vec(Vec::new()).is_none());

        let errors = ParseErrors::from_vec(vec![
            ParseError::new(json!(1), "a"),
            ParseError::new(json!(2), "b"),
        ])
        .unwrap()
        .prefixed(0usize);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.path.to_string() == "[0]"));
    }

    #[test]
    fn test_plural_header() {
        let errors = ParseErrors::single(ParseError::new(json!(1), "a").with_path(JsonPath::from_field("x")))
            .combine(ParseErrors::single(ParseError::new(json!(2), "b").with_path(JsonPath::from_index(3))));
        assert_eq!(errors.with_message(), "2 Parsing Errors:\nresult.x: a\nresult[3]: b");
    }

    #[test]
    fn test_collector_empty_is_success() {
        let collector = ErrorCollector::new();
        assert_eq!(collector.len(), 0);
        assert!(collector.finish(json!({})).is_success());
    }

    #[test]
    fn test_collector_flattens_child_errors() {
        let child = ParseErrors::single(ParseError::new(json!(1), "a").with_path(JsonPath::from_field("x")))
            .combine(ParseErrors::single(ParseError::new(json!(2), "b")));

        let mut collector = ErrorCollector::new();
        collector.add(Some(PathSegment::field("outer")), child);
        collector.add_error(None, &json!(3), "c", "custom");
        assert_eq!(collector.len(), 3);

        let errors = collector.into_errors().unwrap();
        let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec![".outer.x", ".outer", ""]);
        assert_eq!(errors.with_code("custom").len(), 1);
    }

    #[test]
    fn test_at_path() {
        let errors = ParseErrors::single(ParseError::new(json!(1), "a").with_path(JsonPath::from_field("x")))
            .combine(ParseErrors::single(ParseError::new(json!(2), "b")));
        assert_eq!(errors.at_path(&JsonPath::from_field("x")).len(), 1);
        assert_eq!(errors.at_path(&JsonPath::root()).len(), 1);
    }
}
