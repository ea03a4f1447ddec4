//! Defaults the template source for schemas that declare none.

use crate::pipeline::{Next, SchemaMiddleware};
use crate::schema::RawApiSchema;
use async_trait::async_trait;
use quern_core::Result;

/// Pre-order step that defaults `template_source` to the source name.
///
/// Runs its correction before the downstream chain, so metadata lookups and
/// the final conversion always see a populated value. A source the author
/// declared explicitly is never overwritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateTemplateSource;

#[async_trait]
impl SchemaMiddleware for GenerateTemplateSource {
    fn name(&self) -> &'static str {
        "generate_template_source"
    }

    async fn handle(&self, schema: &mut RawApiSchema, next: Next<'_>) -> Result<()> {
        if schema.template_source.is_none() {
            tracing::debug!(
                source = %schema.source_name,
                "defaulting template source to the source name"
            );
            schema.template_source = Some(schema.source_name.clone());
        }
        next.run(schema).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SchemaPipeline;
    use std::sync::{Arc, Mutex};

    /// Captures the template source as seen by the downstream chain.
    struct Probe {
        seen: Arc<Mutex<Option<String>>>,
    }

    #[async_trait]
    impl SchemaMiddleware for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        async fn handle(&self, schema: &mut RawApiSchema, next: Next<'_>) -> Result<()> {
            *self.seen.lock().unwrap() = schema.template_source.clone();
            next.run(schema).await
        }
    }

    #[tokio::test]
    async fn test_defaults_absent_template_source() {
        let pipeline = SchemaPipeline::new().with(GenerateTemplateSource);
        let mut schema = RawApiSchema::new("list_orders");

        pipeline.execute(&mut schema).await.unwrap();

        assert_eq!(schema.template_source.as_deref(), Some("list_orders"));
    }

    #[tokio::test]
    async fn test_never_overwrites_declared_source() {
        let pipeline = SchemaPipeline::new().with(GenerateTemplateSource);
        let mut schema = RawApiSchema::new("list_orders");
        schema.template_source = Some("orders_report.sql".to_string());

        pipeline.execute(&mut schema).await.unwrap();

        assert_eq!(schema.template_source.as_deref(), Some("orders_report.sql"));
    }

    #[tokio::test]
    async fn test_default_is_visible_downstream() {
        let seen = Arc::new(Mutex::new(None));
        let pipeline = SchemaPipeline::new()
            .with(GenerateTemplateSource)
            .with(Probe {
                seen: Arc::clone(&seen),
            });

        let mut schema = RawApiSchema::new("get_user");
        pipeline.execute(&mut schema).await.unwrap();

        assert_eq!(seen.lock().unwrap().as_deref(), Some("get_user"));
    }
}
