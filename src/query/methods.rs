//! Text-level query operations.
//!
//! Everything here is built on [`QueryNode::extend`] (shape unchanged) and
//! [`QueryNode::chain`] (shape replaced).

use tracing::debug;

use crate::conditional::{first_match, require_uniform_coverage};
use crate::error::ConfigError;
use crate::projection::{compile, Projection};
use crate::shape::{IntoValidator, Shape, Validator};

use super::{Cardinality, QueryNode};

/// Sort direction for [`QueryNode::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl QueryNode {
    /// Selects every document: `*`.
    pub fn star(&self) -> Self {
        Self {
            cardinality: Cardinality::Many,
            ..self.extend("*")
        }
    }

    /// Appends a filter: `[condition]`.
    pub fn filter(&self, condition: &str) -> Self {
        self.extend(&format!("[{}]", condition))
    }

    /// Filters by document type: `[_type == "a" || _type == "b"]`.
    pub fn filter_by_type<I, S>(&self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let condition = types
            .into_iter()
            .map(|t| format!("_type == {}", quote(t.as_ref())))
            .collect::<Vec<_>>()
            .join(" || ");
        self.filter(&condition)
    }

    /// Orders results: ` | order(a asc, b desc)`.
    pub fn order<'a, I>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Direction)>,
    {
        let specs = fields
            .into_iter()
            .map(|(field, direction)| format!("{} {}", field, direction.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        self.extend(&format!(" | order({})", specs))
    }

    /// Keeps results `start` (inclusive) to `end` (exclusive): `[start...end]`.
    pub fn slice(&self, start: usize, end: usize) -> Result<Self, ConfigError> {
        self.chain_as(&format!("[{}...{}]", start, end), None, Cardinality::Many)
    }

    /// Keeps the single result at `index`: `[index]`.
    pub fn slice_one(&self, index: usize) -> Result<Self, ConfigError> {
        self.chain_as(&format!("[{}]", index), None, Cardinality::One)
    }

    /// Follows references: `->`.
    pub fn deref(&self) -> Result<Self, ConfigError> {
        self.chain("->", None)
    }

    /// Selects a field path, optionally validating the selected value(s).
    ///
    /// A trailing `[]` marks the path as yielding an array. The validator
    /// describes one item and is lifted to the node's cardinality.
    pub fn field(&self, path: &str, validator: Option<Validator>) -> Result<Self, ConfigError> {
        let cardinality = if path.ends_with("[]") {
            Cardinality::Many
        } else {
            self.cardinality
        };
        let text = if self.text.is_empty() {
            path.to_string()
        } else {
            format!(".{}", path)
        };
        self.chain_as(&text, validator.map(|v| cardinality.wrap(v)), cardinality)
    }

    /// Appends raw text and replaces the validator.
    pub fn raw(&self, text: &str, validator: Option<Validator>) -> Result<Self, ConfigError> {
        self.chain(text, validator)
    }

    /// Appends raw text and keeps the current validator unchanged.
    pub fn raw_passthrough(&self, text: &str) -> Self {
        self.extend(text)
    }

    /// Appends a compiled projection: `{ ... }`.
    ///
    /// The projection's validator describes one document and is lifted to
    /// the node's cardinality.
    pub fn project(&self, projection: Projection) -> Result<Self, ConfigError> {
        let compiled = compile(&projection, self)?;
        debug!(query = %self.text, projection = %compiled.text, "project");
        let validator = compiled.validator.map(|v| self.cardinality.wrap(v));
        self.chain(&compiled.text, validator)
    }

    /// Appends a value-level `select(cond => value, ..., fallback)`.
    ///
    /// Arms are assumed mutually exclusive: the first arm whose validator
    /// accepts the data wins. Without a fallback the store yields `null`
    /// when no condition holds, so `null` is accepted in that case.
    pub fn select<I, S>(&self, arms: I, fallback: Option<QueryNode>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, QueryNode)>,
        S: Into<String>,
    {
        let arms: Vec<(String, QueryNode)> =
            arms.into_iter().map(|(c, node)| (c.into(), node)).collect();

        let mut parts: Vec<String> = arms
            .iter()
            .map(|(condition, node)| format!("{} => {}", condition, node.query()))
            .collect();
        let mut coverage: Vec<(String, Option<Validator>)> = arms
            .iter()
            .map(|(condition, node)| (condition.clone(), node.validator().cloned()))
            .collect();
        if let Some(fallback) = &fallback {
            parts.push(fallback.query().to_string());
            coverage.push(("default".to_string(), fallback.validator().cloned()));
        }

        let validator = require_uniform_coverage(coverage)?.map(|branches| {
            let resolved = first_match(branches, true);
            match fallback {
                Some(_) => resolved,
                None => Shape::nullable(resolved),
            }
        });

        let text = format!("select({})", parts.join(", "));
        self.chain_as(&text, validator, Cardinality::One)
    }

    /// Counts results: wraps the current text in `count(...)`.
    pub fn count(&self) -> Result<Self, ConfigError> {
        if self.validator.is_some() {
            return Err(ConfigError::ChainAfterValidator {
                text: "count()".to_string(),
            });
        }
        Ok(Self {
            text: format!("count({})", self.text),
            validator: Some(Shape::number().integer().into_validator()),
            cardinality: Cardinality::One,
            ..self.clone()
        })
    }
}

pub(crate) fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
