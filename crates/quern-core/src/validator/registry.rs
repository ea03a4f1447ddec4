//! In-memory validator registry.

use super::{IntegerValidator, RequiredValidator, Validator, ValidatorLoader};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// In-memory name → validator map.
///
/// Populated once while a build session is assembled, then shared read-only
/// (`Arc`) with every pipeline run; concurrent lookups need no locking.
/// The plugin contract is enforced here, at registration time, so the
/// pipeline never re-checks validator shape at each use.
///
/// # Examples
///
/// ```
/// use quern_core::validator::ValidatorRegistry;
///
/// let registry = ValidatorRegistry::with_built_ins();
/// assert!(registry.contains("required"));
/// assert!(registry.contains("integer"));
/// ```
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Arc<dyn Validator>>,
}

impl ValidatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the built-in validators
    /// (`required`, `integer`).
    ///
    /// The standard middleware chain appends `required` references to path
    /// fields and then checks them, so registries used with it must know
    /// `required`; this constructor guarantees that.
    #[must_use]
    pub fn with_built_ins() -> Self {
        let mut registry = Self::new();
        // Built-in names are non-empty and distinct, registration cannot fail.
        let _ = registry.register(Arc::new(RequiredValidator));
        let _ = registry.register(Arc::new(IntegerValidator));
        registry
    }

    /// Registers a validator under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the validator's name is empty or
    /// already registered.
    pub fn register(&mut self, validator: Arc<dyn Validator>) -> Result<()> {
        let name = validator.name().to_string();
        if name.is_empty() {
            return Err(Error::ConfigError {
                message: "validator registered without a name".to_string(),
            });
        }
        if self.validators.contains_key(&name) {
            return Err(Error::ConfigError {
                message: format!("validator '{name}' is already registered"),
            });
        }
        tracing::debug!(validator = %name, "registered validator");
        self.validators.insert(name, validator);
        Ok(())
    }

    /// Returns `true` if a validator with `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Number of registered validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns `true` if no validators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ValidatorRegistry")
            .field("validators", &names)
            .finish()
    }
}

#[async_trait]
impl ValidatorLoader for ValidatorRegistry {
    async fn load(&self, name: &str) -> Result<Arc<dyn Validator>> {
        self.validators
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ValidatorNotFound {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    struct NamedValidator(&'static str);

    #[async_trait]
    impl Validator for NamedValidator {
        fn name(&self) -> &str {
            self.0
        }

        fn validate_schema(&self, _args: &Value) -> Result<()> {
            Ok(())
        }

        async fn validate_data(&self, _value: &Value, _args: &Value) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_load_resolves_registered_validator() {
        let mut registry = ValidatorRegistry::new();
        registry.register(Arc::new(NamedValidator("uuid"))).unwrap();

        let validator = registry.load("uuid").await.unwrap();
        assert_eq!(validator.name(), "uuid");
    }

    #[tokio::test]
    async fn test_load_rejects_unregistered_name() {
        let registry = ValidatorRegistry::new();

        let err = registry.load("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let mut registry = ValidatorRegistry::new();
        let err = registry.register(Arc::new(NamedValidator(""))).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_register_rejects_duplicate_name() {
        let mut registry = ValidatorRegistry::new();
        registry.register(Arc::new(NamedValidator("dup"))).unwrap();

        let err = registry
            .register(Arc::new(NamedValidator("dup")))
            .unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("dup"));
    }

    #[test]
    fn test_with_built_ins_registers_required_and_integer() {
        let registry = ValidatorRegistry::with_built_ins();
        assert!(registry.contains("required"));
        assert!(registry.contains("integer"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_debug_lists_sorted_names() {
        let registry = ValidatorRegistry::with_built_ins();
        let debug = format!("{registry:?}");
        assert!(debug.contains("integer"));
        assert!(debug.contains("required"));
    }
}
