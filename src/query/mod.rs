//! Immutable query expression nodes.
//!
//! A [`QueryNode`] pairs the query text built so far with the validator for
//! the data that text returns. Every operation returns a new node; nothing
//! is mutated, so intermediate nodes can be reused as bases for several
//! queries.
//!
//! Two primitives underlie every operation:
//!
//! - [`QueryNode::extend`] grows the text and keeps the validator (the data
//!   shape is unchanged, e.g. filtering or ordering).
//! - [`QueryNode::chain`] grows the text and replaces the validator. It is
//!   rejected once a validator is attached, because the new text would no
//!   longer match the shape that was validated.
//!
//! # Example
//!
//! ```rust
//! use shapeql::{Projection, QueryNode, Shape};
//! use serde_json::json;
//!
//! let query = QueryNode::new()
//!     .star()
//!     .filter_by_type(["product"])
//!     .project(
//!         Projection::new()
//!             .field("name", Shape::string())
//!             .field("price", Shape::number()),
//!     )
//!     .unwrap();
//!
//! assert_eq!(
//!     query.query(),
//!     r#"*[_type == "product"]{ name, price }"#
//! );
//!
//! let data = query.parse(&json!([{"name": "Lamp", "price": 20}])).unwrap();
//! assert_eq!(data, json!([{"name": "Lamp", "price": 20}]));
//! ```

mod config;
mod methods;

use std::sync::Arc;

use indexmap::IndexSet;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ConfigError, QueryError};
use crate::shape::{ArrayShape, IntoValidator, Validator};

pub use config::BuilderConfig;
pub use methods::Direction;
pub(crate) use methods::quote;

/// How many results the text built so far yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// A single value.
    One,
    /// An array of values.
    Many,
    /// Either, depending on upstream data.
    Unknown,
}

impl Cardinality {
    /// Lifts a per-item validator to this cardinality.
    pub fn wrap(self, item: Validator) -> Validator {
        match self {
            Cardinality::One => item,
            Cardinality::Many => ArrayShape::new(Some(item)).into_validator(),
            Cardinality::Unknown => ArrayShape::maybe(Some(item)).into_validator(),
        }
    }
}

/// An immutable query under construction.
#[derive(Debug, Clone)]
pub struct QueryNode {
    text: String,
    validator: Option<Validator>,
    cardinality: Cardinality,
    config: Arc<BuilderConfig>,
    known_fields: Option<Arc<IndexSet<String>>>,
}

impl QueryNode {
    /// Creates an empty root node with the default configuration.
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    /// Creates an empty root node with `config`.
    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            text: String::new(),
            validator: None,
            cardinality: Cardinality::One,
            config: Arc::new(config),
            known_fields: None,
        }
    }

    /// The query text built so far.
    pub fn query(&self) -> &str {
        &self.text
    }

    /// The attached validator, if any.
    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Fields that may be included as-is (`true`) in projections.
    pub fn known_fields(&self) -> Option<&IndexSet<String>> {
        self.known_fields.as_deref()
    }

    /// Declares the fields of the documents this node selects.
    ///
    /// Projections built on this node reject `true` entries for any other
    /// key. Subqueries start without a declaration.
    pub fn with_known_fields<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_fields: Some(Arc::new(fields.into_iter().map(Into::into).collect())),
            ..self.clone()
        }
    }

    /// Overrides the cardinality the builder inferred.
    ///
    /// Needed after [`raw`](QueryNode::raw) text whose result shape the
    /// builder cannot see, e.g. a reference that may point at one document
    /// or many (`Cardinality::Unknown`).
    pub fn with_cardinality(&self, cardinality: Cardinality) -> Self {
        Self {
            cardinality,
            ..self.clone()
        }
    }

    /// Appends `text`, keeping the current validator.
    pub fn extend(&self, text: &str) -> Self {
        trace!(text, "extend");
        Self {
            text: format!("{}{}", self.text, text),
            ..self.clone()
        }
    }

    /// Appends `text` and attaches `validator`.
    ///
    /// Fails if this node already carries a validator; use [`extend`]
    /// (passthrough) to keep growing text under the existing one.
    ///
    /// [`extend`]: QueryNode::extend
    pub fn chain(&self, text: &str, validator: Option<Validator>) -> Result<Self, ConfigError> {
        self.chain_as(text, validator, self.cardinality)
    }

    pub(crate) fn chain_as(
        &self,
        text: &str,
        validator: Option<Validator>,
        cardinality: Cardinality,
    ) -> Result<Self, ConfigError> {
        if self.validator.is_some() {
            return Err(ConfigError::ChainAfterValidator {
                text: text.to_string(),
            });
        }
        trace!(text, validated = validator.is_some(), "chain");
        Ok(Self {
            text: format!("{}{}", self.text, text),
            validator,
            cardinality,
            ..self.clone()
        })
    }

    /// A fresh, empty node for building nested projections.
    ///
    /// Shares only the configuration: the parent's text, validator and
    /// known fields are not inherited. Its text is spliced into the parent
    /// when used as a projection value.
    pub fn subquery(&self) -> Self {
        Self {
            text: String::new(),
            validator: None,
            cardinality: Cardinality::One,
            config: Arc::clone(&self.config),
            known_fields: None,
        }
    }

    /// Validates raw query results with the attached validator.
    ///
    /// Without a validator the value is returned unchanged, unless the
    /// configuration requires validation.
    pub fn parse(&self, raw: &Value) -> Result<Value, QueryError> {
        match &self.validator {
            Some(validator) => {
                debug!(query = %self.text, "validating query result");
                validator.parse(raw).map_err(|errors| {
                    debug!(errors = errors.len(), "query result failed validation");
                    QueryError::Parse(errors)
                })
            }
            None if self.config.is_validation_required() => {
                Err(ConfigError::ValidationRequired.into())
            }
            None => Ok(raw.clone()),
        }
    }
}

impl Default for QueryNode {
    fn default() -> Self {
        Self::new()
    }
}
