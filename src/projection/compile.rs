//! Projection compilation.

use tracing::debug;

use crate::conditional::{require_uniform_coverage, resolve, ConditionalPolicy, Discriminator};
use crate::error::ConfigError;
use crate::query::QueryNode;
use crate::shape::{combine_objects, IntoValidator, ObjectShape, Shape, Validator};

use super::{classify, Conditional, FieldSpec, NormalizedField, Projection, SPREAD_KEY};

/// The result of compiling a [`Projection`].
#[derive(Debug, Clone)]
pub struct CompiledProjection {
    /// The `{ ... }` fragment.
    pub text: String,
    /// Validator for one projected document; `None` when no entry
    /// supplies validation.
    pub validator: Option<Validator>,
}

/// Compiles `projection` in the context of `node`.
///
/// `node` supplies the configuration (validation required or not) and the
/// known-field declaration; its text is not used.
pub(crate) fn compile(
    projection: &Projection,
    node: &QueryNode,
) -> Result<CompiledProjection, ConfigError> {
    let specs = projection
        .entries()
        .map(|(key, value)| classify(key, value).map(|spec| (key.as_str(), spec)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut spread: Option<Option<Validator>> = None;
    let mut named: Vec<NormalizedField> = Vec::new();
    let mut conditionals: Vec<&Conditional> = Vec::new();

    for (key, spec) in &specs {
        match spec {
            FieldSpec::Spread(validator) => spread = Some(validator.clone()),
            FieldSpec::Conditional(conditional) => conditionals.push(conditional),
            FieldSpec::Include => {
                if let Some(known) = node.known_fields() {
                    if !known.contains(*key) {
                        return Err(ConfigError::UnknownField {
                            key: key.to_string(),
                        });
                    }
                }
                named.extend(NormalizedField::from_spec(key, spec));
            }
            _ => named.extend(NormalizedField::from_spec(key, spec)),
        }
    }

    if node.config().is_validation_required() {
        let unvalidated_spread = matches!(spread, Some(None)).then(|| SPREAD_KEY.to_string());
        let missing: Vec<String> = unvalidated_spread
            .into_iter()
            .chain(
                named
                    .iter()
                    .filter(|field| field.validator.is_none())
                    .map(|field| field.key.clone()),
            )
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingValidation { keys: missing });
        }
    }

    let mut parts: Vec<String> = Vec::with_capacity(named.len() + 1);
    if spread.is_some() {
        parts.push(SPREAD_KEY.to_string());
    }
    parts.extend(named.iter().map(NormalizedField::text));

    let mut conditional_validators = Vec::new();
    for conditional in conditionals {
        let (text, validator) = compile_conditional(conditional, node)?;
        parts.push(text);
        conditional_validators.extend(validator);
    }

    let text = if parts.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", parts.join(", "))
    };

    let validated = named.iter().any(|field| field.validator.is_some())
        || !conditional_validators.is_empty()
        || matches!(spread, Some(Some(_)));

    let validator = validated.then(|| {
        let mut layers = Vec::new();
        if let Some(base) = spread {
            layers.push(base.unwrap_or_else(Shape::any_object));
        }
        if !named.is_empty() {
            let shape: ObjectShape = named
                .iter()
                .map(|field| (field.key.clone(), field.validator.clone()))
                .collect();
            layers.push(shape.into_validator());
        }
        layers.extend(conditional_validators);
        combine_objects(layers)
    });

    debug!(
        fields = named.len(),
        validated = validator.is_some(),
        "compiled projection"
    );

    Ok(CompiledProjection { text, validator })
}

fn compile_conditional(
    conditional: &Conditional,
    node: &QueryNode,
) -> Result<(String, Option<Validator>), ConfigError> {
    let mut entries = Vec::with_capacity(conditional.branches().len());
    let mut coverage = Vec::with_capacity(conditional.branches().len());

    for (condition, projection) in conditional.branches() {
        let compiled = compile(projection, node)?;
        entries.push(format!("{} => {}", condition, compiled.text));
        coverage.push((condition.clone(), compiled.validator));
    }

    let text = match conditional.policy() {
        ConditionalPolicy::MergeAll => entries.join(", "),
        ConditionalPolicy::FirstMatch => format!("...select({})", entries.join(", ")),
    };

    let validator = require_uniform_coverage(coverage)?.map(|branches| {
        let branches = branches
            .into_iter()
            .zip(conditional.branches())
            .map(|(branch, (condition, projection))| {
                match Discriminator::parse(condition) {
                    Some(discriminator) => {
                        let carried = projection.entries().any(|(key, _)| *key == discriminator.field);
                        branch.with_discriminator(discriminator.carried(carried))
                    }
                    None => branch,
                }
            })
            .collect();
        resolve(branches, conditional.policy(), conditional.is_exhaustive())
    });

    Ok((text, validator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::BuilderConfig;
    use serde_json::json;

    #[test]
    fn test_empty_projection() {
        let compiled = compile(&Projection::new(), &QueryNode::new()).unwrap();
        assert_eq!(compiled.text, "{}");
        assert!(compiled.validator.is_none());
    }

    #[test]
    fn test_unvalidated_projection_has_no_validator() {
        let projection = Projection::new().field("a", true).field("b", "c.d");
        let compiled = compile(&projection, &QueryNode::new()).unwrap();
        assert_eq!(compiled.text, r#"{ a, "b": c.d }"#);
        assert!(compiled.validator.is_none());
    }

    #[test]
    fn test_missing_validation_reports_every_key() {
        let strict = QueryNode::with_config(BuilderConfig::new().validation_required(true));
        let projection = Projection::new()
            .field("a", true)
            .field("b", Shape::string())
            .field("c", "path.to.c");
        assert_eq!(
            compile(&projection, &strict).unwrap_err(),
            ConfigError::MissingValidation {
                keys: vec!["a".to_string(), "c".to_string()]
            }
        );
    }

    #[test]
    fn test_missing_validation_includes_bare_spread() {
        let strict = QueryNode::with_config(BuilderConfig::new().validation_required(true));
        let projection = Projection::new().field("a", Shape::string()).spread();
        assert_eq!(
            compile(&projection, &strict).unwrap_err(),
            ConfigError::MissingValidation {
                keys: vec!["...".to_string()]
            }
        );

        let validated = Projection::new()
            .field("a", Shape::string())
            .spread_with(Shape::any_object());
        assert!(compile(&validated, &strict).is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let node = QueryNode::new().with_known_fields(["title", "slug"]);
        let projection = Projection::new().field("title", true).field("body", true);
        assert_eq!(
            compile(&projection, &node).unwrap_err(),
            ConfigError::UnknownField {
                key: "body".to_string()
            }
        );
    }

    #[test]
    fn test_spread_is_base_layer() {
        let projection = Projection::new()
            .field("title", ("upper(title)", Shape::string()))
            .spread();
        let compiled = compile(&projection, &QueryNode::new()).unwrap();
        assert_eq!(compiled.text, r#"{ ..., "title": upper(title) }"#);

        let validator = compiled.validator.unwrap();
        let output = validator
            .parse(&json!({"title": "HELLO", "extra": 1}))
            .unwrap();
        assert_eq!(output, json!({"title": "HELLO", "extra": 1}));

        let errors = validator.parse(&json!({"title": 5, "extra": 1})).unwrap_err();
        assert_eq!(errors.first().path.to_string(), ".title");
    }

    #[test]
    fn test_select_conditional_text() {
        let conditional = Conditional::select("kind")
            .branch("defined(url)", Projection::new().field("url", Shape::string()))
            .branch("defined(body)", Projection::new().field("body", Shape::string()));
        let projection = Projection::new().conditional(conditional);
        let compiled = compile(&projection, &QueryNode::new()).unwrap();
        assert_eq!(
            compiled.text,
            "{ ...select(defined(url) => { url }, defined(body) => { body }) }"
        );
        let validator = compiled.validator.unwrap();
        assert_eq!(validator.parse(&json!({"body": "b"})).unwrap(), json!({"body": "b"}));
        assert_eq!(validator.parse(&json!({"other": 1})).unwrap(), json!({}));
    }

    #[test]
    fn test_partially_validated_conditional_is_config_error() {
        let conditional = Conditional::merge("mixed")
            .branch("a", Projection::new().field("x", Shape::string()))
            .branch("b", Projection::new().field("y", true));
        let error = compile(&Projection::new().conditional(conditional), &QueryNode::new())
            .unwrap_err();
        assert_eq!(
            error,
            ConfigError::PartialBranchValidation {
                branches: vec!["b".to_string()]
            }
        );
    }
}
