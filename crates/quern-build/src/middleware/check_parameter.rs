//! Cross-checks declared template parameters against request fields.

use crate::pipeline::{Next, SchemaMiddleware};
use crate::schema::RawApiSchema;
use async_trait::async_trait;
use quern_core::{Error, Result, TemplateMetadataStore};
use std::fmt;
use std::sync::Arc;

/// Post-order step verifying that every template parameter has a field.
///
/// Looks up the schema's template source in the metadata store. A schema
/// without a template source, or a template the store knows nothing about,
/// is skipped silently: absence of metadata is tolerated, templates without
/// declared parameters are simply never checked. A parameter that *is*
/// declared but has no matching request field is a hard stop.
///
/// Dotted parameter names collapse to their first segment: `"user.address"`
/// is satisfied by a field named `"user"`. Only the root is matched; the
/// nested remainder is the template's own business.
pub struct CheckParameter {
    metadata: Arc<dyn TemplateMetadataStore>,
}

impl CheckParameter {
    /// Creates the step with the metadata store to consult.
    #[must_use]
    pub fn new(metadata: Arc<dyn TemplateMetadataStore>) -> Self {
        Self { metadata }
    }
}

impl fmt::Debug for CheckParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckParameter").finish_non_exhaustive()
    }
}

#[async_trait]
impl SchemaMiddleware for CheckParameter {
    fn name(&self) -> &'static str {
        "check_parameter"
    }

    async fn handle(&self, schema: &mut RawApiSchema, next: Next<'_>) -> Result<()> {
        next.run(schema).await?;

        let Some(template_source) = &schema.template_source else {
            tracing::debug!(
                source = %schema.source_name,
                "schema has no template source, skipping parameter check"
            );
            return Ok(());
        };
        let Some(metadata) = self.metadata.get(template_source).await else {
            tracing::debug!(
                template = %template_source,
                "no metadata for template, skipping parameter check"
            );
            return Ok(());
        };

        for parameter in &metadata.parameters {
            let root = parameter
                .name
                .split_once('.')
                .map_or(parameter.name.as_str(), |(root, _)| root);
            if !schema
                .request
                .iter()
                .any(|field| field.field_name == root)
            {
                return Err(Error::ConfigError {
                    message: format!(
                        "Parameter {} is not found in the schema.",
                        parameter.name
                    ),
                });
            }
        }
        Ok(())
    }
}
