//! The grammar seam and the built-in stencil compiler.
//!
//! [`Compiler`] is the boundary behind which the concrete template grammar
//! lives: callers hand it a named source and get back an executable unit
//! plus metadata, or hand it a template name and bindings and get back
//! rendered output. [`StencilCompiler`] is the shipped implementation,
//! binding one compile-time and one runtime environment built from the same
//! extension registry and loader.

use super::environment::{CompileTimeEnvironment, RuntimeEnvironment};
use super::extension::ExtensionRegistry;
use super::loader::CodeLoader;
use super::metadata::{ExecutionMetadata, ExecutionPhase, TemplateMetadata};
use super::unit::CompiledTemplate;
use crate::config::StencilConfig;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Output of compiling one template source.
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// The executable unit.
    pub unit: CompiledTemplate,
    /// Static-analysis metadata extracted alongside.
    pub metadata: TemplateMetadata,
}

/// Output of rendering one template.
#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    /// The rendered text.
    pub content: String,
    /// The execution record of this render.
    pub metadata: ExecutionMetadata,
}

/// A template grammar front-end.
///
/// Compilation is synchronous and pure with respect to the loader;
/// execution fetches the unit through the loader and renders it in the
/// runtime environment.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Grammar identifier, e.g. `"stencil"`.
    fn name(&self) -> &'static str;

    /// Compiles `source` into an executable unit under `template_name`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::CompileError`] for malformed source.
    fn compile(&self, template_name: &str, source: &str) -> Result<CompileResult>;

    /// Renders the unit stored under `template_name` against `bindings`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TemplateNotFound`] if no unit is stored under
    /// `template_name`; render failures propagate from the runtime
    /// environment.
    async fn execute(&self, template_name: &str, bindings: &Value) -> Result<RenderedTemplate>;
}

/// The built-in stencil grammar.
///
/// One constructor wires both environments: the compile-time side sees only
/// the registry's declared filter names, the runtime side gets the runners
/// and the loader.
pub struct StencilCompiler {
    compile_time: CompileTimeEnvironment,
    runtime: RuntimeEnvironment,
}

impl StencilCompiler {
    /// Builds both environments from one registry and loader.
    #[must_use]
    pub fn new(
        extensions: &ExtensionRegistry,
        loader: Arc<dyn CodeLoader>,
        config: StencilConfig,
    ) -> Self {
        Self {
            compile_time: CompileTimeEnvironment::new(extensions),
            runtime: RuntimeEnvironment::new(extensions, loader, config),
        }
    }

    /// The static-analysis environment.
    #[must_use]
    pub fn compile_time(&self) -> &CompileTimeEnvironment {
        &self.compile_time
    }

    /// The rendering environment.
    #[must_use]
    pub fn runtime(&self) -> &RuntimeEnvironment {
        &self.runtime
    }
}

impl fmt::Debug for StencilCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StencilCompiler")
            .field("compile_time", &self.compile_time)
            .field("runtime", &self.runtime)
            .finish()
    }
}

#[async_trait]
impl Compiler for StencilCompiler {
    fn name(&self) -> &'static str {
        "stencil"
    }

    fn compile(&self, template_name: &str, source: &str) -> Result<CompileResult> {
        let run = ExecutionMetadata::new(template_name, ExecutionPhase::Compile);
        let (unit, metadata) = self.compile_time.analyze(template_name, source)?;
        tracing::debug!(
            execution_id = %run.execution_id,
            template = template_name,
            parameters = metadata.parameters.len(),
            includes = metadata.includes.len(),
            elapsed_ms = run.elapsed().num_milliseconds(),
            "compiled template"
        );
        Ok(CompileResult { unit, metadata })
    }

    async fn execute(&self, template_name: &str, bindings: &Value) -> Result<RenderedTemplate> {
        let metadata = ExecutionMetadata::new(template_name, ExecutionPhase::Render);
        let unit = self.runtime.loader().fetch(template_name).await?;
        let content = self.runtime.render(unit, bindings, &metadata).await?;
        tracing::debug!(
            execution_id = %metadata.execution_id,
            template = template_name,
            bytes = content.len(),
            elapsed_ms = metadata.elapsed().num_milliseconds(),
            "rendered template"
        );
        Ok(RenderedTemplate { content, metadata })
    }
}
