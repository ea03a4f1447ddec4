//! Guarantees a `required` validator on every path-bound field.

use crate::pipeline::{Next, SchemaMiddleware};
use crate::schema::RawApiSchema;
use async_trait::async_trait;
use quern_core::validator::RequiredValidator;
use quern_core::{FieldInType, Result, ValidatorRef};
use serde_json::json;

/// Post-order step appending a `required` validator to path fields.
///
/// A path field is part of the URL itself, so a request without it cannot
/// exist; the schema must say so even when the author forgot. The
/// correction runs after the downstream chain returns, so fields added or
/// rewritten downstream are covered too. Idempotent: a field already
/// carrying a `required` entry, whatever its arguments, is left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddRequiredValidatorForPath;

#[async_trait]
impl SchemaMiddleware for AddRequiredValidatorForPath {
    fn name(&self) -> &'static str {
        "add_required_validator_for_path"
    }

    async fn handle(&self, schema: &mut RawApiSchema, next: Next<'_>) -> Result<()> {
        next.run(schema).await?;

        for field in &mut schema.request {
            if field.field_in != FieldInType::Path {
                continue;
            }
            let validators = field.validators.get_or_insert_with(Vec::new);
            if validators
                .iter()
                .any(|reference| reference.name == RequiredValidator::NAME)
            {
                continue;
            }
            tracing::debug!(
                field = %field.field_name,
                "appending required validator to path field"
            );
            validators.push(ValidatorRef::new(RequiredValidator::NAME, json!({})));
        }
        Ok(())
    }
}
