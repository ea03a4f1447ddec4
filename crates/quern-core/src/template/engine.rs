//! Build-session facade over the compilation engine.
//!
//! A [`TemplateEngine`] owns one compiler and one loader for the lifetime of
//! a build: compile templates into it, hand the collected metadata to schema
//! checks, render when needed. There is no process-global state; drop the
//! engine and everything it compiled goes with it.
//!
//! # Examples
//!
//! ```
//! use quern_core::template::TemplateEngine;
//!
//! let engine = TemplateEngine::builder().build().unwrap();
//! let metadata = engine
//!     .compile("get_user.sql", "SELECT * FROM users WHERE id = {{ params.id }}")
//!     .unwrap();
//! assert_eq!(metadata.parameters[0].name, "id");
//! assert!(engine.is_compiled("get_user.sql"));
//! ```

use super::compiler::{Compiler, RenderedTemplate, StencilCompiler};
use super::extension::{ExtensionRegistry, FilterExtension};
use super::loader::{CodeLoader, InMemoryCodeLoader};
use super::metadata::{InMemoryMetadataStore, TemplateMetadata};
use crate::config::StencilConfig;
use crate::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Long-lived engine for one build session.
pub struct TemplateEngine {
    compiler: Arc<dyn Compiler>,
    loader: Arc<dyn CodeLoader>,
}

impl TemplateEngine {
    /// Starts building an engine.
    #[must_use]
    pub fn builder() -> TemplateEngineBuilder {
        TemplateEngineBuilder::default()
    }

    /// Compiles `source` and stores the unit under `name`.
    ///
    /// Returns the static-analysis metadata; the unit itself stays in the
    /// loader for later rendering.
    ///
    /// # Errors
    ///
    /// Returns a compile error for malformed source; nothing is stored on
    /// failure.
    pub fn compile(&self, name: &str, source: &str) -> Result<TemplateMetadata> {
        let compiled = self.compiler.compile(name, source)?;
        self.loader.insert(name, compiled.unit);
        Ok(compiled.metadata)
    }

    /// Compiles every `(name, source)` pair and collects the metadata.
    ///
    /// The returned store is what schema parameter checks consume. Fail-fast:
    /// the first compile error aborts the batch.
    ///
    /// # Errors
    ///
    /// Returns the first compile error; templates compiled before it remain
    /// stored.
    pub fn compile_all<I, N, S>(&self, sources: I) -> Result<InMemoryMetadataStore>
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: AsRef<str>,
    {
        let mut store = InMemoryMetadataStore::new();
        for (name, source) in sources {
            let name = name.as_ref();
            store.insert(name, self.compile(name, source.as_ref())?);
        }
        tracing::debug!(templates = store.len(), "compiled template batch");
        Ok(store)
    }

    /// Renders the stored template `name` against `bindings`.
    ///
    /// `bindings` are the values templates see under `params`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TemplateNotFound`] for an uncompiled name;
    /// render failures propagate from the compiler.
    pub async fn render(&self, name: &str, bindings: &Value) -> Result<RenderedTemplate> {
        self.compiler.execute(name, bindings).await
    }

    /// Returns `true` if a unit is stored under `name`.
    #[must_use]
    pub fn is_compiled(&self, name: &str) -> bool {
        self.loader.contains(name)
    }

    /// Name of the grammar front-end in use.
    #[must_use]
    pub fn compiler_name(&self) -> &'static str {
        self.compiler.name()
    }
}

impl fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("compiler", &self.compiler.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`TemplateEngine`].
#[derive(Default)]
pub struct TemplateEngineBuilder {
    extensions: Vec<FilterExtension>,
    loader: Option<Arc<dyn CodeLoader>>,
    config: StencilConfig,
    compiler: Option<Arc<dyn Compiler>>,
}

impl TemplateEngineBuilder {
    /// Adds a filter extension for the built-in stencil compiler.
    #[must_use]
    pub fn extension(mut self, extension: FilterExtension) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Replaces the default in-memory loader.
    #[must_use]
    pub fn loader(mut self, loader: Arc<dyn CodeLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Sets rendering options for the built-in stencil compiler.
    #[must_use]
    pub fn config(mut self, config: StencilConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the built-in stencil compiler with a custom grammar.
    ///
    /// A custom compiler brings its own environments; registered extensions
    /// and config apply only to the built-in one. It must share the loader
    /// the engine stores units into.
    #[must_use]
    pub fn compiler(mut self, compiler: Arc<dyn Compiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ConfigError`] if the registered extensions
    /// violate the registration contract.
    pub fn build(self) -> Result<TemplateEngine> {
        let loader = self
            .loader
            .unwrap_or_else(|| Arc::new(InMemoryCodeLoader::new()) as Arc<dyn CodeLoader>);
        let compiler = match self.compiler {
            Some(compiler) => compiler,
            None => {
                let mut registry = ExtensionRegistry::builder();
                for extension in self.extensions {
                    registry = registry.register(extension)?;
                }
                Arc::new(StencilCompiler::new(
                    &registry.build(),
                    Arc::clone(&loader),
                    self.config,
                ))
            }
        };
        Ok(TemplateEngine { compiler, loader })
    }
}

impl fmt::Debug for TemplateEngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEngineBuilder")
            .field("extensions", &self.extensions.len())
            .field("custom_loader", &self.loader.is_some())
            .field("custom_compiler", &self.compiler.is_some())
            .field("config", &self.config)
            .finish()
    }
}
