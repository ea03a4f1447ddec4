//! Error types for quern.
//!
//! This module provides the error hierarchy shared by the schema-parsing
//! pipeline and the template compilation engine. All failures are fail-fast:
//! nothing in this crate retries, wraps, or reinterprets an error, and the
//! first failure surfaces unchanged to the build driver.
//!
//! # Examples
//!
//! ```
//! use quern_core::{Error, Result};
//!
//! fn check_name(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(Error::ConfigError {
//!             message: "Validator name is required".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = check_name("").unwrap_err();
//! assert!(err.is_config_error());
//! ```

use thiserror::Error;

/// Main error type for quern.
///
/// All errors in the build pipeline and template engine use this type,
/// providing one consistent taxonomy across the workspace.
#[derive(Error, Debug)]
pub enum Error {
    /// Schema or template misconfiguration.
    ///
    /// Raised for human-authored mistakes: a validator reference without a
    /// name, a declared template parameter with no matching request field,
    /// a schema that finished the pipeline without a template source.
    /// Fatal to the enclosing schema's build, not to the whole build.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// A validator name did not resolve in the validator registry.
    #[error("Validator not found: {name}")]
    ValidatorNotFound {
        /// The unresolved validator name
        name: String,
    },

    /// A validator rejected its schema arguments or runtime data.
    ///
    /// Produced by validator implementations themselves; the pipeline
    /// propagates it unchanged.
    #[error("Validation failed in {validator}: {message}")]
    ValidationFailed {
        /// Name of the validator that rejected the input
        validator: String,
        /// Reason given by the validator
        message: String,
    },

    /// A template name did not resolve in the code loader.
    ///
    /// Raised at render time when an executable unit (or an included
    /// fragment) was never compiled into the loader.
    #[error("Template not found: {name}")]
    TemplateNotFound {
        /// The unresolved template source name
        name: String,
    },

    /// A filter name did not resolve in the runtime environment.
    #[error("Filter not found: {name}")]
    FilterNotFound {
        /// The unresolved filter name
        name: String,
    },

    /// Template source failed to compile.
    ///
    /// Raised by the compile-time environment: malformed tags, references
    /// outside the parameter namespace, or filters never declared by any
    /// registered extension.
    #[error("Cannot compile template '{template}': {message}")]
    CompileError {
        /// Name of the template source that failed
        template: String,
        /// Description of the compilation failure
        message: String,
    },

    /// Template rendering failed.
    ///
    /// Raised by the runtime environment: unbound parameters in strict
    /// mode, or include nesting beyond the configured depth.
    #[error("Cannot render template '{template}': {message}")]
    RenderError {
        /// Name of the template being rendered
        template: String,
        /// Description of the rendering failure
        message: String,
    },

    /// A registered extension (filter or loader) failed while running.
    ///
    /// The underlying error is preserved as the source; the engine does not
    /// reinterpret extension failures.
    #[error("Extension '{extension}' failed")]
    ExtensionError {
        /// Name of the failing extension
        extension: String,
        /// Underlying error raised by the extension
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Returns `true` if this is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use quern_core::Error;
    ///
    /// let err = Error::ConfigError {
    ///     message: "Validator name is required".to_string(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a lookup failure: an unresolved validator,
    /// template, or filter name.
    ///
    /// Callers treat all three identically: the referenced capability was
    /// never registered for this build.
    ///
    /// # Examples
    ///
    /// ```
    /// use quern_core::Error;
    ///
    /// let err = Error::ValidatorNotFound {
    ///     name: "uuid".to_string(),
    /// };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ValidatorNotFound { .. }
                | Self::TemplateNotFound { .. }
                | Self::FilterNotFound { .. }
        )
    }

    /// Returns `true` if this is a validator-defined failure.
    #[must_use]
    pub const fn is_validation_failed(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }

    /// Returns `true` if this is a template compilation error.
    #[must_use]
    pub const fn is_compile_error(&self) -> bool {
        matches!(self, Self::CompileError { .. })
    }

    /// Returns `true` if this is a template rendering error.
    ///
    /// # Examples
    ///
    /// ```
    /// use quern_core::Error;
    ///
    /// let err = Error::RenderError {
    ///     template: "get_user.sql".to_string(),
    ///     message: "parameter 'id' is not bound".to_string(),
    /// };
    /// assert!(err.is_render_error());
    /// ```
    #[must_use]
    pub const fn is_render_error(&self) -> bool {
        matches!(self, Self::RenderError { .. })
    }

    /// Returns `true` if this is an extension-raised failure.
    #[must_use]
    pub const fn is_extension_error(&self) -> bool {
        matches!(self, Self::ExtensionError { .. })
    }
}

/// Result type alias for quern operations.
///
/// # Examples
///
/// ```
/// use quern_core::{Error, Result};
///
/// fn parse_limit(raw: i64) -> Result<u32> {
///     u32::try_from(raw).map_err(|_| Error::ConfigError {
///         message: format!("limit {raw} is out of range"),
///     })
/// }
///
/// assert!(parse_limit(10).is_ok());
/// assert!(parse_limit(-1).is_err());
/// ```
pub type Result<T> = std::result::Result<T, Error>;
