//! Raw per-source schema model.
//!
//! A raw schema is the build pipeline's working object: deserialized from an
//! authored source with some fields still absent, mutated in place by the
//! middleware chain, and finally converted into the validated
//! [`ApiSchema`] form through [`RawApiSchema::into_api_schema`].

use quern_core::{ApiSchema, Error, FieldInType, RequestField, Result, ValidatorRef};
use serde::{Deserialize, Serialize};

/// A request field as authored, before pipeline normalization.
///
/// `validators` distinguishes "not declared" (`None`) from "declared but
/// empty" (`Some` of an empty list); middlewares initialize absent lists
/// before appending to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRequestField {
    /// Field name, matched against template parameter metadata.
    pub field_name: String,

    /// Where the field is carried in a request.
    pub field_in: FieldInType,

    /// Validators declared by the schema author, if any.
    #[serde(default)]
    pub validators: Option<Vec<ValidatorRef>>,
}

impl RawRequestField {
    /// Creates a field with no declared validators.
    #[must_use]
    pub fn new(field_name: impl Into<String>, field_in: FieldInType) -> Self {
        Self {
            field_name: field_name.into(),
            field_in,
            validators: None,
        }
    }
}

/// A per-source API schema before the build pipeline has run.
///
/// `source_name` is assigned by the upstream reader and never changes;
/// everything else may be filled in or corrected by middlewares. One raw
/// schema instance belongs to exactly one pipeline run at a time.
///
/// # Examples
///
/// ```
/// use quern_build::RawApiSchema;
///
/// let schema: RawApiSchema = serde_json::from_str(
///     r#"{ "sourceName": "get_user", "templateSource": "get_user.sql" }"#,
/// )
/// .unwrap();
/// assert_eq!(schema.source_name, "get_user");
/// assert!(schema.request.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawApiSchema {
    /// Unique identifier of the source this schema was derived from.
    pub source_name: String,

    /// Name of the template source backing this API. Absent until the
    /// author declares it or the pipeline defaults it.
    #[serde(default)]
    pub template_source: Option<String>,

    /// Request fields of the API.
    #[serde(default)]
    pub request: Vec<RawRequestField>,
}

impl RawApiSchema {
    /// Creates an empty raw schema for a source.
    #[must_use]
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            template_source: None,
            request: Vec::new(),
        }
    }

    /// Converts this raw schema into its validated form.
    ///
    /// Absent validator lists collapse to empty ones; the final form has no
    /// optional fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if `template_source` is still absent,
    /// which means the pipeline (or the author) never populated it.
    pub fn into_api_schema(self) -> Result<ApiSchema> {
        let Some(template_source) = self.template_source else {
            return Err(Error::ConfigError {
                message: format!("schema '{}' has no template source", self.source_name),
            });
        };

        let request = self
            .request
            .into_iter()
            .map(|field| RequestField {
                field_name: field.field_name,
                field_in: field.field_in,
                validators: field.validators.unwrap_or_default(),
            })
            .collect();

        Ok(ApiSchema {
            source_name: self.source_name,
            template_source,
            request,
        })
    }
}
