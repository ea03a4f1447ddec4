//! Validated API schema model.
//!
//! These are the *final* schema types: the shape a raw per-source schema
//! settles into once the build pipeline has enriched and verified it. The
//! serialized form matches the authored sources (camelCase keys, upper-case
//! `fieldIn` values), so a final schema round-trips cleanly into build
//! artifacts.
//!
//! The raw, partially-populated counterpart lives in the build crate; it is
//! converted into these types through a checked conversion once every
//! required field is present.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Where a request field is carried in an incoming API request.
///
/// # Examples
///
/// ```
/// use quern_core::FieldInType;
///
/// let field_in: FieldInType = serde_json::from_str("\"PATH\"").unwrap();
/// assert_eq!(field_in, FieldInType::Path);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldInType {
    /// Part of the URL path, e.g. `/users/:id`. Path fields are always
    /// required: the build pipeline guarantees a `required` validator.
    Path,
    /// Query-string parameter.
    Query,
    /// HTTP header value.
    Header,
    /// Request body member.
    Body,
}

impl fmt::Display for FieldInType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Path => "PATH",
            Self::Query => "QUERY",
            Self::Header => "HEADER",
            Self::Body => "BODY",
        };
        write!(f, "{s}")
    }
}

/// A reference to a named validator, with the arguments the schema author
/// declared for it.
///
/// The name must resolve in the validator registry, and `args` must satisfy
/// that validator's `validate_schema` check; both are enforced by the build
/// pipeline, not by this type.
///
/// # Examples
///
/// ```
/// use quern_core::ValidatorRef;
/// use serde_json::json;
///
/// let reference = ValidatorRef::new("integer", json!({ "min": 1 }));
/// assert_eq!(reference.name, "integer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRef {
    /// Validator name. Deserialization tolerates a missing name (empty
    /// string) so that the pipeline, not the reader, rejects it with a
    /// descriptive error.
    #[serde(default)]
    pub name: String,

    /// Arguments for the validator's schema-time check. `Null` when the
    /// author declared none.
    #[serde(default)]
    pub args: Value,
}

impl ValidatorRef {
    /// Creates a validator reference.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// One request field of a validated API schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestField {
    /// Field name, matched against template parameter metadata during the
    /// build.
    pub field_name: String,

    /// Where the field is carried in a request.
    pub field_in: FieldInType,

    /// Validators to apply to incoming data. Never absent in the final
    /// form; path fields always contain a `required` entry.
    #[serde(default)]
    pub validators: Vec<ValidatorRef>,
}

/// A validated, normalized API schema for one source.
///
/// Produced by the build pipeline from a raw schema once all required
/// fields are populated. JSON-serializable with no function-valued fields,
/// so downstream artifact builders can persist it as-is.
///
/// `source_name` is assigned by the upstream reader and is unique per
/// build; nothing in the pipeline rewrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSchema {
    /// Unique identifier of the source this schema was derived from.
    pub source_name: String,

    /// Name of the template source backing this API.
    pub template_source: String,

    /// Request fields of the API.
    #[serde(default)]
    pub request: Vec<RequestField>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_in_serde_uses_uppercase() {
        assert_eq!(serde_json::to_value(FieldInType::Path).unwrap(), "PATH");
        assert_eq!(serde_json::to_value(FieldInType::Query).unwrap(), "QUERY");
        assert_eq!(
            serde_json::from_value::<FieldInType>(json!("HEADER")).unwrap(),
            FieldInType::Header
        );
    }

    #[test]
    fn test_field_in_display_matches_wire_form() {
        assert_eq!(FieldInType::Body.to_string(), "BODY");
    }

    #[test]
    fn test_validator_ref_defaults() {
        let reference: ValidatorRef = serde_json::from_value(json!({})).unwrap();
        assert!(reference.name.is_empty());
        assert!(reference.args.is_null());
    }

    #[test]
    fn test_api_schema_serializes_camel_case() {
        let schema = ApiSchema {
            source_name: "get_user".to_string(),
            template_source: "get_user.sql".to_string(),
            request: vec![RequestField {
                field_name: "id".to_string(),
                field_in: FieldInType::Path,
                validators: vec![ValidatorRef::new("required", json!({}))],
            }],
        };

        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["sourceName"], "get_user");
        assert_eq!(value["templateSource"], "get_user.sql");
        assert_eq!(value["request"][0]["fieldName"], "id");
        assert_eq!(value["request"][0]["fieldIn"], "PATH");
        assert_eq!(value["request"][0]["validators"][0]["name"], "required");
    }

    #[test]
    fn test_api_schema_round_trips() {
        let schema = ApiSchema {
            source_name: "list_orders".to_string(),
            template_source: "list_orders.sql".to_string(),
            request: vec![],
        };
        let encoded = serde_json::to_string(&schema).unwrap();
        let decoded: ApiSchema = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, schema);
    }
}
