//! Projections: output keys mapped to query fragments and validators.
//!
//! A [`Projection`] is an ordered map from output key to
//! [`ProjectionValue`]. Compiling it classifies every entry into a
//! [`FieldSpec`], normalizes the named ones into [`NormalizedField`]s, and
//! produces one projection fragment plus one object validator.
//!
//! Two keys are reserved:
//!
//! - `...` spreads every field of the source document underneath the named
//!   fields (named fields win on conflict).
//! - keys starting with `[Conditional] ` hold a [`Conditional`].

mod compile;
mod conditional;

use indexmap::IndexMap;

use crate::error::ConfigError;
use crate::query::QueryNode;
use crate::shape::{ArrayShape, IntoValidator, NumberShape, ObjectShape, StringShape, Validator};

pub(crate) use compile::compile;
pub use compile::CompiledProjection;
pub use conditional::Conditional;

/// Key of the spread entry.
pub const SPREAD_KEY: &str = "...";

/// Prefix of conditional entry keys.
pub const CONDITIONAL_PREFIX: &str = "[Conditional] ";

/// The value side of a projection entry, before classification.
#[derive(Debug, Clone)]
pub enum ProjectionValue {
    /// `true` includes the field as-is; `false` is never valid.
    Bool(bool),
    /// A naked sub-path.
    Path(String),
    /// A sub-path with a validator.
    PathWith(String, Validator),
    /// A validator for the field of the same name.
    Validator(Validator),
    /// A nested query (typically built from [`QueryNode::subquery`]).
    Node(QueryNode),
    /// A conditional group.
    Conditional(Conditional),
}

impl From<bool> for ProjectionValue {
    fn from(include: bool) -> Self {
        ProjectionValue::Bool(include)
    }
}

impl From<&str> for ProjectionValue {
    fn from(path: &str) -> Self {
        ProjectionValue::Path(path.to_string())
    }
}

impl From<String> for ProjectionValue {
    fn from(path: String) -> Self {
        ProjectionValue::Path(path)
    }
}

impl<V: IntoValidator> From<(&str, V)> for ProjectionValue {
    fn from((path, validator): (&str, V)) -> Self {
        ProjectionValue::PathWith(path.to_string(), validator.into_validator())
    }
}

impl From<Validator> for ProjectionValue {
    fn from(validator: Validator) -> Self {
        ProjectionValue::Validator(validator)
    }
}

impl From<StringShape> for ProjectionValue {
    fn from(shape: StringShape) -> Self {
        ProjectionValue::Validator(shape.into_validator())
    }
}

impl From<NumberShape> for ProjectionValue {
    fn from(shape: NumberShape) -> Self {
        ProjectionValue::Validator(shape.into_validator())
    }
}

impl From<ObjectShape> for ProjectionValue {
    fn from(shape: ObjectShape) -> Self {
        ProjectionValue::Validator(shape.into_validator())
    }
}

impl From<ArrayShape> for ProjectionValue {
    fn from(shape: ArrayShape) -> Self {
        ProjectionValue::Validator(shape.into_validator())
    }
}

impl From<QueryNode> for ProjectionValue {
    fn from(node: QueryNode) -> Self {
        ProjectionValue::Node(node)
    }
}

impl From<Conditional> for ProjectionValue {
    fn from(conditional: Conditional) -> Self {
        ProjectionValue::Conditional(conditional)
    }
}

/// An ordered field map.
///
/// # Example
///
/// ```rust
/// use shapeql::{Projection, QueryNode, Shape};
///
/// let root = QueryNode::new();
/// let projection = Projection::new()
///     .field("_id", true)
///     .field("title", Shape::string())
///     .field("slug", ("slug.current", Shape::string()))
///     .field("authorName", "author->name")
///     .field("tags", root.subquery().field("tags[]", None).unwrap());
///
/// let node = root.star().project(projection).unwrap();
/// assert_eq!(
///     node.query(),
///     r#"*{ _id, title, "slug": slug.current, "authorName": author->name, "tags": tags[] }"#
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Projection {
    entries: IndexMap<String, ProjectionValue>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an entry.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<ProjectionValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Spreads the source document's fields beneath the named ones.
    pub fn spread(self) -> Self {
        self.field(SPREAD_KEY, true)
    }

    /// Spreads the source document, validated by `validator`, beneath the
    /// named fields.
    pub fn spread_with(self, validator: impl IntoValidator) -> Self {
        self.field(SPREAD_KEY, validator.into_validator())
    }

    /// Adds a conditional group under its reserved key.
    pub fn conditional(self, conditional: Conditional) -> Self {
        let key = conditional.key();
        self.field(key, conditional)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &ProjectionValue)> {
        self.entries.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Projection
where
    K: Into<String>,
    V: Into<ProjectionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The kind of a projection entry, decided once by [`classify`].
#[derive(Debug, Clone)]
pub enum FieldSpec {
    Include,
    Path(String),
    PathWith(String, Validator),
    Validator(Validator),
    Nested(QueryNode),
    Spread(Option<Validator>),
    Conditional(Conditional),
}

/// Decides the kind of one entry from its key and value.
///
/// Reserved keys only accept their own kinds, and ordinary keys never accept
/// a conditional group or `false`.
pub fn classify(key: &str, value: &ProjectionValue) -> Result<FieldSpec, ConfigError> {
    let unexpected = || ConfigError::UnexpectedProjectionValue {
        key: key.to_string(),
    };

    if key == SPREAD_KEY {
        return match value {
            ProjectionValue::Bool(true) => Ok(FieldSpec::Spread(None)),
            ProjectionValue::Validator(v) => Ok(FieldSpec::Spread(Some(v.clone()))),
            _ => Err(unexpected()),
        };
    }
    if key.starts_with(CONDITIONAL_PREFIX) {
        return match value {
            ProjectionValue::Conditional(c) => Ok(FieldSpec::Conditional(c.clone())),
            _ => Err(unexpected()),
        };
    }

    match value {
        ProjectionValue::Bool(true) => Ok(FieldSpec::Include),
        ProjectionValue::Path(path) => Ok(FieldSpec::Path(path.clone())),
        ProjectionValue::PathWith(path, v) => Ok(FieldSpec::PathWith(path.clone(), v.clone())),
        ProjectionValue::Validator(v) => Ok(FieldSpec::Validator(v.clone())),
        ProjectionValue::Node(node) => Ok(FieldSpec::Nested(node.clone())),
        ProjectionValue::Bool(false) | ProjectionValue::Conditional(_) => Err(unexpected()),
    }
}

/// A named entry reduced to its fragment and validator.
#[derive(Debug, Clone)]
pub struct NormalizedField {
    pub key: String,
    pub query_fragment: String,
    pub validator: Option<Validator>,
}

impl NormalizedField {
    /// Builds the normalized form of a named (non-reserved) entry.
    ///
    /// Returns `None` for spread and conditional kinds.
    pub fn from_spec(key: &str, spec: &FieldSpec) -> Option<Self> {
        let (query_fragment, validator) = match spec {
            FieldSpec::Include => (key.to_string(), None),
            FieldSpec::Path(path) => (path.clone(), None),
            FieldSpec::PathWith(path, v) => (path.clone(), Some(v.clone())),
            FieldSpec::Validator(v) => (key.to_string(), Some(v.clone())),
            FieldSpec::Nested(node) => (node.query().to_string(), node.validator().cloned()),
            FieldSpec::Spread(_) | FieldSpec::Conditional(_) => return None,
        };
        Some(Self {
            key: key.to_string(),
            query_fragment,
            validator,
        })
    }

    /// `key` when the fragment is the key itself, else `"key": fragment`.
    pub fn text(&self) -> String {
        if self.key == self.query_fragment {
            self.key.clone()
        } else {
            format!("{}: {}", crate::query::quote(&self.key), self.query_fragment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    #[test]
    fn test_classify_kinds() {
        assert!(matches!(
            classify("name", &true.into()).unwrap(),
            FieldSpec::Include
        ));
        assert!(matches!(
            classify("name", &"title".into()).unwrap(),
            FieldSpec::Path(p) if p == "title"
        ));
        assert!(matches!(
            classify("name", &("title", Shape::string()).into()).unwrap(),
            FieldSpec::PathWith(p, _) if p == "title"
        ));
        assert!(matches!(
            classify("name", &Shape::string().into()).unwrap(),
            FieldSpec::Validator(_)
        ));
        assert!(matches!(
            classify("name", &QueryNode::new().into()).unwrap(),
            FieldSpec::Nested(_)
        ));
        assert!(matches!(
            classify(SPREAD_KEY, &true.into()).unwrap(),
            FieldSpec::Spread(None)
        ));
    }

    #[test]
    fn test_classify_rejects_unexpected_values() {
        let cases: Vec<(&str, ProjectionValue)> = vec![
            ("name", false.into()),
            ("name", Conditional::merge("c").into()),
            (SPREAD_KEY, "title".into()),
            (SPREAD_KEY, false.into()),
            ("[Conditional] c", true.into()),
        ];
        for (key, value) in cases {
            assert_eq!(
                classify(key, &value).unwrap_err(),
                ConfigError::UnexpectedProjectionValue {
                    key: key.to_string()
                }
            );
        }
    }

    #[test]
    fn test_normalized_text_shorthand() {
        let same = NormalizedField::from_spec("title", &FieldSpec::Path("title".into())).unwrap();
        assert_eq!(same.text(), "title");

        let renamed =
            NormalizedField::from_spec("first name", &FieldSpec::Path("name.first".into())).unwrap();
        assert_eq!(renamed.text(), r#""first name": name.first"#);

        assert!(NormalizedField::from_spec("...", &FieldSpec::Spread(None)).is_none());
    }
}
