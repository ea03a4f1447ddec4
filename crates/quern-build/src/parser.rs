//! Schema parser composing the standard middleware chain.

use crate::middleware::{
    AddRequiredValidatorForPath, CheckParameter, CheckValidator, GenerateTemplateSource,
};
use crate::pipeline::SchemaPipeline;
use crate::schema::RawApiSchema;
use quern_core::validator::ValidatorLoader;
use quern_core::{ApiSchema, Result, TemplateMetadataStore};
use std::fmt;
use std::sync::Arc;

/// Turns raw per-source schemas into validated ones.
///
/// The parser owns a [`SchemaPipeline`] and runs each schema through it,
/// then performs the checked conversion to [`ApiSchema`]. The standard
/// chain, in order:
///
/// 1. [`GenerateTemplateSource`] defaults a missing template source before
///    anything downstream looks at it.
/// 2. [`CheckValidator`] resolves and checks validator references.
/// 3. [`AddRequiredValidatorForPath`] forces path fields to be required.
/// 4. [`CheckParameter`] cross-checks declared template parameters.
///
/// The checks are post-order, so on the way back out they run innermost
/// first: the parameter check sees the corrected schema, and the validator
/// check sees and verifies the `required` entries the correction step
/// appended.
///
/// # Examples
///
/// ```
/// use quern_build::{RawApiSchema, SchemaParser};
/// use quern_core::ValidatorRegistry;
/// use quern_core::template::InMemoryMetadataStore;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> quern_core::Result<()> {
/// let parser = SchemaParser::new(
///     Arc::new(ValidatorRegistry::with_built_ins()),
///     Arc::new(InMemoryMetadataStore::new()),
/// );
///
/// let schema = parser.parse(RawApiSchema::new("get_user")).await?;
/// assert_eq!(schema.template_source, "get_user");
/// # Ok(())
/// # }
/// ```
pub struct SchemaParser {
    pipeline: SchemaPipeline,
}

impl SchemaParser {
    /// Creates a parser with the standard middleware chain.
    #[must_use]
    pub fn new(
        validators: Arc<dyn ValidatorLoader>,
        metadata: Arc<dyn TemplateMetadataStore>,
    ) -> Self {
        let pipeline = SchemaPipeline::new()
            .with(GenerateTemplateSource)
            .with(CheckValidator::new(validators))
            .with(AddRequiredValidatorForPath)
            .with(CheckParameter::new(metadata));
        Self { pipeline }
    }

    /// Creates a parser around a custom middleware chain.
    #[must_use]
    pub fn with_pipeline(pipeline: SchemaPipeline) -> Self {
        Self { pipeline }
    }

    /// The composed middleware chain.
    #[must_use]
    pub fn pipeline(&self) -> &SchemaPipeline {
        &self.pipeline
    }

    /// Parses one raw schema into its validated form.
    ///
    /// # Errors
    ///
    /// Returns the first middleware error, or a configuration error if the
    /// pipeline finished without populating the template source. A schema
    /// that fails yields no partial result.
    pub async fn parse(&self, mut schema: RawApiSchema) -> Result<ApiSchema> {
        self.pipeline.execute(&mut schema).await?;
        schema.into_api_schema()
    }

    /// Parses a batch of raw schemas, failing on the first bad one.
    ///
    /// Callers that want to keep going past failures call [`Self::parse`]
    /// per schema and collect outcomes themselves.
    ///
    /// # Errors
    ///
    /// Returns the first error; schemas after it are not processed.
    pub async fn parse_all(&self, schemas: Vec<RawApiSchema>) -> Result<Vec<ApiSchema>> {
        tracing::debug!(schemas = schemas.len(), "parsing schema batch");
        let mut parsed = Vec::with_capacity(schemas.len());
        for schema in schemas {
            parsed.push(self.parse(schema).await?);
        }
        Ok(parsed)
    }
}

impl fmt::Debug for SchemaParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaParser")
            .field("pipeline", &self.pipeline)
            .finish()
    }
}
