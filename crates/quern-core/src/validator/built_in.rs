//! Validators shipped with the engine.

use super::Validator;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Rejects absent values.
///
/// Schema arguments: none are meaningful, so `null` or an empty object is
/// accepted and anything else is a configuration mistake.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredValidator;

impl RequiredValidator {
    /// Registered name, also the name appended to path fields by the
    /// standard middleware chain.
    pub const NAME: &'static str = "required";
}

#[async_trait]
impl Validator for RequiredValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn validate_schema(&self, args: &Value) -> Result<()> {
        match args {
            Value::Null | Value::Object(_) => Ok(()),
            other => Err(Error::ValidationFailed {
                validator: Self::NAME.to_string(),
                message: format!("arguments must be an object, got {other}"),
            }),
        }
    }

    async fn validate_data(&self, value: &Value, _args: &Value) -> Result<()> {
        if value.is_null() {
            return Err(Error::ValidationFailed {
                validator: Self::NAME.to_string(),
                message: "value is required but was not provided".to_string(),
            });
        }
        Ok(())
    }
}

/// Accepts integer values, optionally constrained to a closed range.
///
/// Schema arguments: `null`, or an object whose only keys are `min` and
/// `max`, both integers, with `min <= max` when both are present.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerValidator;

impl IntegerValidator {
    /// Registered name.
    pub const NAME: &'static str = "integer";

    fn bound(args: &Value, key: &str) -> Result<Option<i64>> {
        match args.get(key) {
            None => Ok(None),
            Some(value) => value.as_i64().map(Some).ok_or_else(|| Error::ValidationFailed {
                validator: Self::NAME.to_string(),
                message: format!("'{key}' must be an integer, got {value}"),
            }),
        }
    }
}

#[async_trait]
impl Validator for IntegerValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn validate_schema(&self, args: &Value) -> Result<()> {
        let object = match args {
            Value::Null => return Ok(()),
            Value::Object(object) => object,
            other => {
                return Err(Error::ValidationFailed {
                    validator: Self::NAME.to_string(),
                    message: format!("arguments must be an object, got {other}"),
                });
            }
        };

        for key in object.keys() {
            if key != "min" && key != "max" {
                return Err(Error::ValidationFailed {
                    validator: Self::NAME.to_string(),
                    message: format!("unknown argument '{key}'"),
                });
            }
        }

        let min = Self::bound(args, "min")?;
        let max = Self::bound(args, "max")?;
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(Error::ValidationFailed {
                validator: Self::NAME.to_string(),
                message: format!("'min' ({min}) exceeds 'max' ({max})"),
            });
        }
        Ok(())
    }

    async fn validate_data(&self, value: &Value, args: &Value) -> Result<()> {
        let number = value.as_i64().ok_or_else(|| Error::ValidationFailed {
            validator: Self::NAME.to_string(),
            message: format!("expected an integer, got {value}"),
        })?;

        if let Some(min) = Self::bound(args, "min")?
            && number < min
        {
            return Err(Error::ValidationFailed {
                validator: Self::NAME.to_string(),
                message: format!("{number} is below the minimum {min}"),
            });
        }
        if let Some(max) = Self::bound(args, "max")?
            && number > max
        {
            return Err(Error::ValidationFailed {
                validator: Self::NAME.to_string(),
                message: format!("{number} is above the maximum {max}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ========================================================================
    // RequiredValidator
    // ========================================================================

    #[test]
    fn test_required_accepts_null_and_object_args() {
        let validator = RequiredValidator;
        assert!(validator.validate_schema(&Value::Null).is_ok());
        assert!(validator.validate_schema(&json!({})).is_ok());
    }

    #[test]
    fn test_required_rejects_non_object_args() {
        let validator = RequiredValidator;
        let err = validator.validate_schema(&json!([1, 2])).unwrap_err();
        assert!(err.is_validation_failed());
    }

    #[tokio::test]
    async fn test_required_rejects_null_value() {
        let validator = RequiredValidator;
        let err = validator
            .validate_data(&Value::Null, &Value::Null)
            .await
            .unwrap_err();
        assert!(err.is_validation_failed());
    }

    #[tokio::test]
    async fn test_required_accepts_present_values() {
        let validator = RequiredValidator;
        for value in [json!(0), json!(""), json!(false), json!({}), json!([])] {
            validator.validate_data(&value, &Value::Null).await.unwrap();
        }
    }

    // ========================================================================
    // IntegerValidator
    // ========================================================================

    #[test]
    fn test_integer_accepts_null_and_range_args() {
        let validator = IntegerValidator;
        assert!(validator.validate_schema(&Value::Null).is_ok());
        assert!(validator.validate_schema(&json!({})).is_ok());
        assert!(validator.validate_schema(&json!({ "min": 1 })).is_ok());
        assert!(validator.validate_schema(&json!({ "min": 1, "max": 10 })).is_ok());
    }

    #[test]
    fn test_integer_rejects_unknown_arg_keys() {
        let validator = IntegerValidator;
        let err = validator.validate_schema(&json!({ "step": 2 })).unwrap_err();
        assert!(err.to_string().contains("step"));
    }

    #[test]
    fn test_integer_rejects_non_integer_bounds() {
        let validator = IntegerValidator;
        let err = validator
            .validate_schema(&json!({ "min": "low" }))
            .unwrap_err();
        assert!(err.is_validation_failed());
    }

    #[test]
    fn test_integer_rejects_inverted_range() {
        let validator = IntegerValidator;
        let err = validator
            .validate_schema(&json!({ "min": 10, "max": 1 }))
            .unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[tokio::test]
    async fn test_integer_checks_value_against_range() {
        let validator = IntegerValidator;
        let args = json!({ "min": 1, "max": 10 });

        validator.validate_data(&json!(5), &args).await.unwrap();
        validator.validate_data(&json!(1), &args).await.unwrap();
        validator.validate_data(&json!(10), &args).await.unwrap();

        let low = validator.validate_data(&json!(0), &args).await.unwrap_err();
        assert!(low.to_string().contains("below"));
        let high = validator.validate_data(&json!(11), &args).await.unwrap_err();
        assert!(high.to_string().contains("above"));
    }

    #[tokio::test]
    async fn test_integer_rejects_non_integer_value() {
        let validator = IntegerValidator;
        let err = validator
            .validate_data(&json!("7"), &Value::Null)
            .await
            .unwrap_err();
        assert!(err.is_validation_failed());
    }
}
