//! Filter extensions and their registry.
//!
//! A filter extension is a (builder, runner) pair sharing one name. The
//! builder side is all the compile-time environment sees: it declares the
//! name so unknown filters are rejected while compiling. The runner side
//! lives in the runtime environment and performs the actual transformation,
//! possibly suspending on I/O; rendering waits for each `transform` to
//! resolve before continuing.
//!
//! Extensions are registered once when the registry is built and are
//! immutable afterwards.
//!
//! # Examples
//!
//! ```
//! use quern_core::template::{ExtensionRegistry, FilterExtension};
//!
//! let registry = ExtensionRegistry::builder()
//!     .register(FilterExtension::from_fn("upper", |value, _arg| async move {
//!         Ok(value.as_str().unwrap_or_default().to_uppercase())
//!     }))
//!     .unwrap()
//!     .build();
//! assert!(registry.contains("upper"));
//! ```

use super::metadata::ExecutionMetadata;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Compile-time half of a filter extension.
pub trait FilterBuilder: Send + Sync {
    /// Name the filter is invoked by inside templates.
    fn filter_name(&self) -> &str;
}

/// Runtime half of a filter extension.
#[async_trait]
pub trait FilterRunner: Send + Sync {
    /// Name the runner answers to; must match its builder.
    fn filter_name(&self) -> &str;

    /// Transforms `value` into the text spliced into the rendered output.
    ///
    /// `args` are the scalar arguments written at the call site. The
    /// enclosing render suspends until this future resolves.
    ///
    /// # Errors
    ///
    /// Implementations signal failure through any [`Error`] variant;
    /// [`Error::ExtensionError`] is the conventional carrier for wrapped
    /// underlying failures. Errors propagate to the render caller unchanged.
    async fn transform(
        &self,
        value: Value,
        args: &[Value],
        metadata: &ExecutionMetadata,
    ) -> Result<String>;
}

/// A named (builder, runner) pair.
pub struct FilterExtension {
    builder: Arc<dyn FilterBuilder>,
    runner: Arc<dyn FilterRunner>,
}

impl FilterExtension {
    /// Pairs a builder with a runner.
    ///
    /// Name agreement is checked when the pair is registered, not here.
    #[must_use]
    pub fn new(builder: Arc<dyn FilterBuilder>, runner: Arc<dyn FilterRunner>) -> Self {
        Self { builder, runner }
    }

    /// Adapts a plain async function into an extension.
    ///
    /// The function receives the value under transformation and the first
    /// declared argument (`Value::Null` when the call site passes none);
    /// filters needing every argument or the execution metadata implement
    /// [`FilterRunner`] directly.
    pub fn from_fn<F, Fut>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        let filter = Arc::new(FnFilter {
            name: name.into(),
            function,
        });
        Self {
            builder: Arc::clone(&filter) as Arc<dyn FilterBuilder>,
            runner: filter,
        }
    }

    /// Declared name of the pair, read from the builder side.
    #[must_use]
    pub fn name(&self) -> &str {
        self.builder.filter_name()
    }

    /// Compile-time half.
    #[must_use]
    pub fn builder(&self) -> &Arc<dyn FilterBuilder> {
        &self.builder
    }

    /// Runtime half.
    #[must_use]
    pub fn runner(&self) -> &Arc<dyn FilterRunner> {
        &self.runner
    }
}

impl fmt::Debug for FilterExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterExtension")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Function-backed filter used by [`FilterExtension::from_fn`].
struct FnFilter<F> {
    name: String,
    function: F,
}

impl<F: Send + Sync> FilterBuilder for FnFilter<F> {
    fn filter_name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl<F, Fut> FilterRunner for FnFilter<F>
where
    F: Fn(Value, Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send,
{
    fn filter_name(&self) -> &str {
        &self.name
    }

    async fn transform(
        &self,
        value: Value,
        args: &[Value],
        _metadata: &ExecutionMetadata,
    ) -> Result<String> {
        // Positional contract: the function sees the first argument group.
        let argument = args.first().cloned().unwrap_or(Value::Null);
        (self.function)(value, argument).await
    }
}

/// Immutable name → extension map shared by both environments.
#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: HashMap<String, FilterExtension>,
}

impl ExtensionRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> ExtensionRegistryBuilder {
        ExtensionRegistryBuilder::default()
    }

    /// Returns `true` if a filter named `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    /// Declared filter names, unordered.
    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.extensions.keys().map(String::as_str)
    }

    /// Number of registered extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Returns `true` if no extensions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Clones the runner side of every extension, keyed by name.
    #[must_use]
    pub fn runners(&self) -> HashMap<String, Arc<dyn FilterRunner>> {
        self.extensions
            .iter()
            .map(|(name, extension)| (name.clone(), Arc::clone(extension.runner())))
            .collect()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.filter_names().collect();
        names.sort_unstable();
        f.debug_struct("ExtensionRegistry")
            .field("filters", &names)
            .finish()
    }
}

/// Builder enforcing the extension contract at registration time.
#[derive(Default)]
pub struct ExtensionRegistryBuilder {
    extensions: HashMap<String, FilterExtension>,
}

impl ExtensionRegistryBuilder {
    /// Registers an extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the name is empty, the builder and
    /// runner disagree on the name, or the name is already registered.
    pub fn register(mut self, extension: FilterExtension) -> Result<Self> {
        let name = extension.name().to_string();
        if name.is_empty() {
            return Err(Error::ConfigError {
                message: "filter extension registered without a name".to_string(),
            });
        }
        let runner_name = extension.runner().filter_name();
        if runner_name != name {
            return Err(Error::ConfigError {
                message: format!(
                    "filter extension builder '{name}' and runner '{runner_name}' disagree on the name"
                ),
            });
        }
        if self.extensions.contains_key(&name) {
            return Err(Error::ConfigError {
                message: format!("filter extension '{name}' is already registered"),
            });
        }
        tracing::debug!(filter = %name, "registered filter extension");
        self.extensions.insert(name, extension);
        Ok(self)
    }

    /// Finalizes the registry.
    #[must_use]
    pub fn build(self) -> ExtensionRegistry {
        ExtensionRegistry {
            extensions: self.extensions,
        }
    }
}

impl fmt::Debug for ExtensionRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistryBuilder")
            .field("registered", &self.extensions.len())
            .finish()
    }
}
