//! Template compilation engine.
//!
//! Compiles annotated template sources into executable units and renders
//! them with pluggable filters and loaders. The pieces:
//!
//! - [`TemplateEngine`]: session facade owning one compiler and one loader.
//! - [`Compiler`] / [`StencilCompiler`]: the grammar seam and the built-in
//!   stencil dialect behind it.
//! - [`CompileTimeEnvironment`] / [`RuntimeEnvironment`]: static analysis
//!   vs. rendering; only the runtime side can reach the loader.
//! - [`ExtensionRegistry`]: named filter extensions, built once.
//! - [`CodeLoader`]: storage for compiled units, resolved at render time.
//! - [`TemplateMetadataStore`]: compiled-parameter metadata for schema
//!   checks.
//!
//! # Examples
//!
//! ```
//! use quern_core::template::{FilterExtension, TemplateEngine};
//!
//! let engine = TemplateEngine::builder()
//!     .extension(FilterExtension::from_fn("upper", |value, _arg| async move {
//!         Ok(value.as_str().unwrap_or_default().to_uppercase())
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let metadata = engine
//!     .compile("greet.sql", "SELECT '{{ params.name | upper }}'")
//!     .unwrap();
//! assert_eq!(metadata.parameters[0].name, "name");
//! ```

mod compiler;
mod engine;
mod environment;
mod extension;
mod loader;
mod metadata;
mod scanner;
mod unit;

pub use compiler::{CompileResult, Compiler, RenderedTemplate, StencilCompiler};
pub use engine::{TemplateEngine, TemplateEngineBuilder};
pub use environment::{CompileTimeEnvironment, RuntimeEnvironment};
pub use extension::{
    ExtensionRegistry, ExtensionRegistryBuilder, FilterBuilder, FilterExtension, FilterRunner,
};
pub use loader::{CodeLoader, InMemoryCodeLoader};
pub use metadata::{
    ExecutionMetadata, ExecutionPhase, InMemoryMetadataStore, TemplateMetadata,
    TemplateMetadataStore, TemplateParameterMetadata,
};
pub use unit::{CompiledTemplate, FilterCall, TemplateOp};
