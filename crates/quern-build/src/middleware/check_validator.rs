//! Verifies every validator reference in a schema.

use crate::pipeline::{Next, SchemaMiddleware};
use crate::schema::RawApiSchema;
use async_trait::async_trait;
use quern_core::validator::ValidatorLoader;
use quern_core::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Post-order step resolving and checking declared validators.
///
/// For every validator reference in the schema: the name must be non-empty,
/// must resolve through the loader, and the resolved validator must accept
/// the declared arguments via `validate_schema`. Checks run after the
/// downstream chain returns, so references appended by correction steps
/// deeper in the chain are covered as well.
///
/// Failures are fail-fast: the first bad reference aborts the run, and
/// loader or validator errors surface unchanged.
pub struct CheckValidator {
    loader: Arc<dyn ValidatorLoader>,
}

impl CheckValidator {
    /// Creates the step with the loader used to resolve names.
    #[must_use]
    pub fn new(loader: Arc<dyn ValidatorLoader>) -> Self {
        Self { loader }
    }
}

impl fmt::Debug for CheckValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckValidator").finish_non_exhaustive()
    }
}

#[async_trait]
impl SchemaMiddleware for CheckValidator {
    fn name(&self) -> &'static str {
        "check_validator"
    }

    async fn handle(&self, schema: &mut RawApiSchema, next: Next<'_>) -> Result<()> {
        next.run(schema).await?;

        for field in &schema.request {
            let Some(validators) = &field.validators else {
                continue;
            };
            for reference in validators {
                if reference.name.is_empty() {
                    return Err(Error::ConfigError {
                        message: "Validator name is required".to_string(),
                    });
                }
                let validator = self.loader.load(&reference.name).await?;
                validator.validate_schema(&reference.args)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SchemaPipeline;
    use crate::schema::RawRequestField;
    use mockall::mock;
    use quern_core::validator::{
        IntegerValidator, RequiredValidator, Validator, ValidatorRegistry,
    };
    use quern_core::{FieldInType, ValidatorRef};
    use serde_json::{Value, json};

    mock! {
        Loader {}

        #[async_trait]
        impl ValidatorLoader for Loader {
            async fn load(&self, name: &str) -> Result<Arc<dyn Validator>>;
        }
    }

    fn schema_with_validators(validators: Vec<ValidatorRef>) -> RawApiSchema {
        let mut schema = RawApiSchema::new("get_user");
        schema.request.push(RawRequestField {
            field_name: "id".to_string(),
            field_in: FieldInType::Path,
            validators: Some(validators),
        });
        schema
    }

    fn registry_pipeline() -> SchemaPipeline {
        let registry = Arc::new(ValidatorRegistry::with_built_ins());
        SchemaPipeline::new().with(CheckValidator::new(registry))
    }

    // ========================================================================
    // Contract Tests
    // ========================================================================

    #[tokio::test]
    async fn test_well_formed_references_pass() {
        let mut schema = schema_with_validators(vec![
            ValidatorRef::new("required", json!({})),
            ValidatorRef::new("integer", json!({ "min": 1, "max": 10 })),
        ]);

        registry_pipeline().execute(&mut schema).await.unwrap();
    }

    #[tokio::test]
    async fn test_fields_without_validators_are_skipped() {
        // Zero expectations: any load call panics the test.
        let loader = MockLoader::new();
        let pipeline = SchemaPipeline::new().with(CheckValidator::new(Arc::new(loader)));

        let mut schema = RawApiSchema::new("search");
        schema
            .request
            .push(RawRequestField::new("q", FieldInType::Query));

        pipeline.execute(&mut schema).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_name_fails_before_any_lookup() {
        let loader = MockLoader::new();
        let pipeline = SchemaPipeline::new().with(CheckValidator::new(Arc::new(loader)));

        let mut schema = schema_with_validators(vec![ValidatorRef::new("", Value::Null)]);
        let err = pipeline.execute(&mut schema).await.unwrap_err();

        assert!(err.is_config_error());
        assert_eq!(err.to_string(), "Configuration error: Validator name is required");
    }

    #[tokio::test]
    async fn test_unknown_name_propagates_lookup_failure() {
        let mut schema = schema_with_validators(vec![ValidatorRef::new("uuid", Value::Null)]);

        let err = registry_pipeline().execute(&mut schema).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("uuid"));
    }

    #[tokio::test]
    async fn test_rejected_args_propagate_unchanged() {
        let mut schema = schema_with_validators(vec![ValidatorRef::new(
            "integer",
            json!({ "min": 10, "max": 1 }),
        )]);

        let err = registry_pipeline().execute(&mut schema).await.unwrap_err();

        assert!(err.is_validation_failed());
    }

    // ========================================================================
    // Lookup Accounting Tests
    // ========================================================================

    #[tokio::test]
    async fn test_each_reference_is_checked_exactly_once() {
        let mut loader = MockLoader::new();
        loader
            .expect_load()
            .withf(|name| name == "required")
            .times(2)
            .returning(|_| Ok(Arc::new(RequiredValidator) as Arc<dyn Validator>));
        loader
            .expect_load()
            .withf(|name| name == "integer")
            .times(1)
            .returning(|_| Ok(Arc::new(IntegerValidator) as Arc<dyn Validator>));
        let pipeline = SchemaPipeline::new().with(CheckValidator::new(Arc::new(loader)));

        let mut schema = RawApiSchema::new("get_order");
        schema.request.push(RawRequestField {
            field_name: "id".to_string(),
            field_in: FieldInType::Path,
            validators: Some(vec![
                ValidatorRef::new("required", json!({})),
                ValidatorRef::new("integer", json!({ "min": 0 })),
            ]),
        });
        schema.request.push(RawRequestField {
            field_name: "region".to_string(),
            field_in: FieldInType::Query,
            validators: Some(vec![ValidatorRef::new("required", json!({}))]),
        });

        pipeline.execute(&mut schema).await.unwrap();
    }

    #[tokio::test]
    async fn test_first_failure_stops_remaining_lookups() {
        let mut loader = MockLoader::new();
        loader
            .expect_load()
            .withf(|name| name == "missing")
            .times(1)
            .returning(|name| {
                Err(Error::ValidatorNotFound {
                    name: name.to_string(),
                })
            });
        // No expectation for "after": a lookup for it panics the test.
        let pipeline = SchemaPipeline::new().with(CheckValidator::new(Arc::new(loader)));

        let mut schema = schema_with_validators(vec![
            ValidatorRef::new("missing", Value::Null),
            ValidatorRef::new("after", Value::Null),
        ]);
        let err = pipeline.execute(&mut schema).await.unwrap_err();

        assert!(err.is_not_found());
    }

    // ========================================================================
    // Ordering Tests
    // ========================================================================

    /// Appends a nameless validator reference from below the check.
    struct AppendsBadReference;

    #[async_trait]
    impl SchemaMiddleware for AppendsBadReference {
        fn name(&self) -> &'static str {
            "appends_bad_reference"
        }

        async fn handle(&self, schema: &mut RawApiSchema, next: Next<'_>) -> Result<()> {
            schema.request.push(RawRequestField {
                field_name: "late".to_string(),
                field_in: FieldInType::Query,
                validators: Some(vec![ValidatorRef::new("", Value::Null)]),
            });
            next.run(schema).await
        }
    }

    #[tokio::test]
    async fn test_checks_references_added_downstream() {
        let registry = Arc::new(ValidatorRegistry::with_built_ins());
        let pipeline = SchemaPipeline::new()
            .with(CheckValidator::new(registry))
            .with(AppendsBadReference);

        let mut schema = RawApiSchema::new("late_binding");
        let err = pipeline.execute(&mut schema).await.unwrap_err();

        assert_eq!(err.to_string(), "Configuration error: Validator name is required");
    }
}
