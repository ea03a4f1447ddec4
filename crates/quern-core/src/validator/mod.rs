//! Validator plugin contract and registry.
//!
//! A validator is a named capability with two checks: `validate_schema`
//! verifies the arguments a schema author declared for it (at build time),
//! and `validate_data` verifies actual values (at serving time). Typed
//! errors are the only failure signal; there is no return-code convention.
//!
//! The registry resolves names to validators through the async
//! [`ValidatorLoader`] seam, so registries backed by remote catalogs can be
//! dropped in without touching the pipeline. The in-memory
//! [`ValidatorRegistry`] is the implementation a normal build uses.
//!
//! # Examples
//!
//! ```
//! use quern_core::validator::{ValidatorLoader, ValidatorRegistry};
//! use serde_json::json;
//!
//! # async fn example() -> quern_core::Result<()> {
//! let registry = ValidatorRegistry::with_built_ins();
//! let required = registry.load("required").await?;
//! required.validate_schema(&json!({}))?;
//! # Ok(())
//! # }
//! ```

mod built_in;
mod registry;

pub use built_in::{IntegerValidator, RequiredValidator};
pub use registry::ValidatorRegistry;

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A named, pluggable validation capability.
///
/// Implementations must be cheap to share: the registry hands out
/// `Arc<dyn Validator>` clones to every pipeline run.
#[async_trait]
pub trait Validator: Send + Sync {
    /// The name schemas use to reference this validator.
    fn name(&self) -> &str;

    /// Checks the arguments a schema declared for this validator.
    ///
    /// Called once per validator reference during the build. Synchronous:
    /// argument checking is pure structure inspection.
    ///
    /// # Errors
    ///
    /// Returns an error when `args` is malformed for this validator; the
    /// pipeline propagates it unchanged.
    fn validate_schema(&self, args: &Value) -> Result<()>;

    /// Checks an actual request value against this validator.
    ///
    /// Called by the serving side against live data; async so that
    /// implementations may consult external systems. Absent values are
    /// passed as `Value::Null`.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` violates the constraint described by
    /// `args`.
    async fn validate_data(&self, value: &Value, args: &Value) -> Result<()>;
}

impl fmt::Debug for dyn Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Resolves validator names to capabilities.
///
/// Lookup is async (a suspension point of the pipeline) and fails for
/// unregistered names with [`Error::ValidatorNotFound`](crate::Error).
#[async_trait]
pub trait ValidatorLoader: Send + Sync {
    /// Resolves `name` to a validator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidatorNotFound`](crate::Error) if no validator
    /// with that name is registered.
    async fn load(&self, name: &str) -> Result<Arc<dyn Validator>>;
}
