//! Compile-time and runtime execution environments.
//!
//! The two environments share one extension registry but expose different
//! capabilities. [`CompileTimeEnvironment`] carries only the declared filter
//! names: it can analyze sources and reject unknown filters, and since it
//! holds no loader it structurally cannot perform loader I/O, even for a
//! template full of includes. [`RuntimeEnvironment`] carries the runner side
//! of every extension plus the code loader, and owns rendering.

use super::extension::{ExtensionRegistry, FilterRunner};
use super::loader::CodeLoader;
use super::metadata::{ExecutionMetadata, TemplateMetadata};
use super::scanner;
use super::unit::{CompiledTemplate, FilterCall, TemplateOp};
use crate::config::StencilConfig;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Static-analysis environment. No loader, no runners, no I/O.
#[derive(Debug, Clone, Default)]
pub struct CompileTimeEnvironment {
    filters: BTreeSet<String>,
}

impl CompileTimeEnvironment {
    /// Creates an environment declaring the registry's filter names.
    #[must_use]
    pub fn new(extensions: &ExtensionRegistry) -> Self {
        Self {
            filters: extensions.filter_names().map(str::to_string).collect(),
        }
    }

    /// Returns `true` if `name` is a declared filter.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.filters.contains(name)
    }

    /// Declared filter names in sorted order.
    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(String::as_str)
    }

    /// Compiles `source` into an executable unit and its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CompileError`] for malformed source or references to
    /// undeclared filters.
    pub fn analyze(
        &self,
        template_name: &str,
        source: &str,
    ) -> Result<(CompiledTemplate, TemplateMetadata)> {
        let ops = scanner::scan(template_name, source, &self.filters)?;
        let metadata = TemplateMetadata::from_ops(&ops);
        Ok((CompiledTemplate::new(template_name, ops), metadata))
    }
}

/// Rendering environment: extension runners plus the code loader.
pub struct RuntimeEnvironment {
    filters: HashMap<String, Arc<dyn FilterRunner>>,
    loader: Arc<dyn CodeLoader>,
    config: StencilConfig,
}

impl RuntimeEnvironment {
    /// Creates an environment over the registry's runners and `loader`.
    #[must_use]
    pub fn new(
        extensions: &ExtensionRegistry,
        loader: Arc<dyn CodeLoader>,
        config: StencilConfig,
    ) -> Self {
        Self {
            filters: extensions.runners(),
            loader,
            config,
        }
    }

    /// The loader includes are resolved through.
    #[must_use]
    pub fn loader(&self) -> &Arc<dyn CodeLoader> {
        &self.loader
    }

    /// Rendering options in effect.
    #[must_use]
    pub fn config(&self) -> &StencilConfig {
        &self.config
    }

    /// Renders `unit` against `bindings`, the values visible under `params`.
    ///
    /// Walks the op-list with an explicit include stack: each `Include` op
    /// fetches the nested unit through the loader and splices its output at
    /// the current position. The render suspends at every loader fetch and
    /// every filter transform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RenderError`] for missing bindings (unless lenient
    /// bindings are configured), non-scalar interpolations, and include
    /// chains deeper than the configured cap; [`Error::TemplateNotFound`]
    /// when an include is not loaded; [`Error::FilterNotFound`] when a unit
    /// references a runner this environment does not carry. Filter-defined
    /// failures propagate unchanged.
    pub async fn render(
        &self,
        unit: Arc<CompiledTemplate>,
        bindings: &Value,
        metadata: &ExecutionMetadata,
    ) -> Result<String> {
        let mut output = String::new();
        let mut stack: Vec<(Arc<CompiledTemplate>, usize)> = vec![(unit, 0)];

        while let Some(frame) = stack.last_mut() {
            let index = frame.1;
            if index >= frame.0.ops.len() {
                stack.pop();
                continue;
            }
            frame.1 += 1;
            let current = Arc::clone(&frame.0);

            match &current.ops[index] {
                TemplateOp::Literal(text) => output.push_str(text),
                TemplateOp::Parameter { path, filters } => {
                    let rendered = self.render_parameter(path, filters, bindings, metadata).await?;
                    output.push_str(&rendered);
                }
                TemplateOp::Include { source } => {
                    if stack.len() >= self.config.max_include_depth {
                        return Err(Error::RenderError {
                            template: metadata.template_name.clone(),
                            message: format!(
                                "include depth limit of {} exceeded at '{source}'",
                                self.config.max_include_depth
                            ),
                        });
                    }
                    let nested = self.loader.fetch(source).await?;
                    stack.push((nested, 0));
                }
            }
        }

        Ok(output)
    }

    async fn render_parameter(
        &self,
        path: &str,
        filters: &[FilterCall],
        bindings: &Value,
        metadata: &ExecutionMetadata,
    ) -> Result<String> {
        let mut value = match lookup(bindings, path) {
            Some(value) => value.clone(),
            None if self.config.lenient_bindings => Value::Null,
            None => {
                return Err(Error::RenderError {
                    template: metadata.template_name.clone(),
                    message: format!("missing binding 'params.{path}'"),
                });
            }
        };

        for call in filters {
            let runner = self
                .filters
                .get(&call.name)
                .ok_or_else(|| Error::FilterNotFound {
                    name: call.name.clone(),
                })?;
            // Each stage receives the previous stage's output.
            value = Value::String(runner.transform(value, &call.args, metadata).await?);
        }

        scalar_text(&value, path, &metadata.template_name)
    }
}

impl fmt::Debug for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("RuntimeEnvironment")
            .field("filters", &names)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn lookup<'bindings>(bindings: &'bindings Value, path: &str) -> Option<&'bindings Value> {
    let mut current = bindings;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn scalar_text(value: &Value, path: &str, template: &str) -> Result<String> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::String(text) => Ok(text.clone()),
        Value::Array(_) | Value::Object(_) => Err(Error::RenderError {
            template: template.to_string(),
            message: format!("parameter 'params.{path}' does not render to a scalar"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::extension::FilterExtension;
    use crate::template::loader::InMemoryCodeLoader;
    use crate::template::metadata::ExecutionPhase;
    use serde_json::json;

    fn registry(extensions: Vec<FilterExtension>) -> ExtensionRegistry {
        let mut builder = ExtensionRegistry::builder();
        for extension in extensions {
            builder = builder.register(extension).unwrap();
        }
        builder.build()
    }

    fn upper_extension() -> FilterExtension {
        FilterExtension::from_fn("upper", |value, _arg| async move {
            Ok(value.as_str().unwrap_or_default().to_uppercase())
        })
    }

    fn render_metadata(template: &str) -> ExecutionMetadata {
        ExecutionMetadata::new(template, ExecutionPhase::Render)
    }

    async fn render_source(
        source: &str,
        bindings: Value,
        extensions: Vec<FilterExtension>,
    ) -> Result<String> {
        let registry = registry(extensions);
        let compile_time = CompileTimeEnvironment::new(&registry);
        let (unit, _) = compile_time.analyze("test.sql", source)?;
        let runtime = RuntimeEnvironment::new(
            &registry,
            Arc::new(InMemoryCodeLoader::new()),
            StencilConfig::default(),
        );
        runtime
            .render(Arc::new(unit), &bindings, &render_metadata("test.sql"))
            .await
    }

    // ========================================================================
    // Compile-time environment
    // ========================================================================

    #[test]
    fn test_analyze_extracts_unit_and_metadata() {
        let environment = CompileTimeEnvironment::new(&registry(vec![upper_extension()]));

        let (unit, metadata) = environment
            .analyze("q.sql", "{{ params.id | upper }}{% include \"tail.sql\" %}")
            .unwrap();
        assert_eq!(unit.name, "q.sql");
        assert_eq!(unit.ops.len(), 2);
        assert_eq!(metadata.parameters[0].name, "id");
        assert_eq!(metadata.includes, ["tail.sql"]);
    }

    #[test]
    fn test_analyze_rejects_undeclared_filter() {
        let environment = CompileTimeEnvironment::new(&registry(vec![]));

        let err = environment.analyze("q.sql", "{{ params.id | upper }}").unwrap_err();
        assert!(err.is_compile_error());
    }

    #[test]
    fn test_declared_names_are_sorted() {
        let registry = registry(vec![
            upper_extension(),
            FilterExtension::from_fn("first", |value, _arg| async move { Ok(value.to_string()) }),
        ]);
        let environment = CompileTimeEnvironment::new(&registry);

        let names: Vec<&str> = environment.filter_names().collect();
        assert_eq!(names, ["first", "upper"]);
        assert!(environment.declares("upper"));
        assert!(!environment.declares("missing"));
    }

    // ========================================================================
    // Scalar rendering and bindings
    // ========================================================================

    #[tokio::test]
    async fn test_render_scalars() {
        let source = "{{ params.s }}/{{ params.n }}/{{ params.b }}/{{ params.missing }}";
        let bindings = json!({ "s": "text", "n": 7, "b": true, "missing": null });

        let output = render_source(source, bindings, vec![]).await.unwrap();
        assert_eq!(output, "text/7/true/null");
    }

    #[tokio::test]
    async fn test_render_nested_binding() {
        let output = render_source(
            "{{ params.user.address.city }}",
            json!({ "user": { "address": { "city": "Tainan" } } }),
            vec![],
        )
        .await
        .unwrap();
        assert_eq!(output, "Tainan");
    }

    #[tokio::test]
    async fn test_missing_binding_fails_by_default() {
        let err = render_source("{{ params.id }}", json!({}), vec![])
            .await
            .unwrap_err();
        assert!(err.is_render_error());
        assert!(err.to_string().contains("params.id"));
    }

    #[tokio::test]
    async fn test_lenient_bindings_render_null() {
        let registry = registry(vec![]);
        let (unit, _) = CompileTimeEnvironment::new(&registry)
            .analyze("q.sql", "{{ params.id }}")
            .unwrap();
        let runtime = RuntimeEnvironment::new(
            &registry,
            Arc::new(InMemoryCodeLoader::new()),
            StencilConfig::default().with_lenient_bindings(true),
        );

        let output = runtime
            .render(Arc::new(unit), &json!({}), &render_metadata("q.sql"))
            .await
            .unwrap();
        assert_eq!(output, "null");
    }

    #[tokio::test]
    async fn test_unfiltered_object_binding_fails() {
        let err = render_source("{{ params.user }}", json!({ "user": {} }), vec![])
            .await
            .unwrap_err();
        assert!(err.is_render_error());
        assert!(err.to_string().contains("scalar"));
    }

    // ========================================================================
    // Filter chains
    // ========================================================================

    #[tokio::test]
    async fn test_filter_chain_feeds_previous_output_forward() {
        let exclaim = FilterExtension::from_fn("exclaim", |value, _arg| async move {
            Ok(format!("{}!", value.as_str().unwrap_or_default()))
        });

        let output = render_source(
            "{{ params.word | upper | exclaim }}",
            json!({ "word": "go" }),
            vec![upper_extension(), exclaim],
        )
        .await
        .unwrap();
        assert_eq!(output, "GO!");
    }

    #[tokio::test]
    async fn test_first_filter_receives_raw_value() {
        let type_name = FilterExtension::from_fn("type_name", |value, _arg| async move {
            Ok(match value {
                Value::Object(_) => "object".to_string(),
                Value::String(_) => "string".to_string(),
                other => other.to_string(),
            })
        });

        let output = render_source(
            "{{ params.user | type_name }}",
            json!({ "user": { "id": 1 } }),
            vec![type_name],
        )
        .await
        .unwrap();
        assert_eq!(output, "object");
    }

    #[tokio::test]
    async fn test_missing_runner_fails_with_filter_not_found() {
        // Unit compiled elsewhere can reference runners this environment lacks.
        let unit = CompiledTemplate::new(
            "q.sql",
            vec![TemplateOp::Parameter {
                path: "id".to_string(),
                filters: vec![FilterCall::new("upper", vec![])],
            }],
        );
        let runtime = RuntimeEnvironment::new(
            &registry(vec![]),
            Arc::new(InMemoryCodeLoader::new()),
            StencilConfig::default(),
        );

        let err = runtime
            .render(Arc::new(unit), &json!({ "id": 1 }), &render_metadata("q.sql"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FilterNotFound { ref name } if name == "upper"));
    }

    // ========================================================================
    // Includes
    // ========================================================================

    #[tokio::test]
    async fn test_include_splices_nested_unit() {
        let registry = registry(vec![]);
        let compile_time = CompileTimeEnvironment::new(&registry);
        let loader = Arc::new(InMemoryCodeLoader::new());

        let (header, _) = compile_time.analyze("header.sql", "-- header\n").unwrap();
        loader.insert("header.sql", header);
        let (main, _) = compile_time
            .analyze("main.sql", "{% include \"header.sql\" %}SELECT {{ params.id }}")
            .unwrap();

        let runtime = RuntimeEnvironment::new(
            &registry,
            Arc::clone(&loader) as Arc<dyn CodeLoader>,
            StencilConfig::default(),
        );
        let output = runtime
            .render(Arc::new(main), &json!({ "id": 9 }), &render_metadata("main.sql"))
            .await
            .unwrap();
        assert_eq!(output, "-- header\nSELECT 9");
    }

    #[tokio::test]
    async fn test_unloaded_include_fails() {
        let err = render_source("{% include \"gone.sql\" %}", json!({}), vec![])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_self_include_hits_depth_cap() {
        let registry = registry(vec![]);
        let loader = Arc::new(InMemoryCodeLoader::new());
        let (unit, _) = CompileTimeEnvironment::new(&registry)
            .analyze("loop.sql", "{% include \"loop.sql\" %}")
            .unwrap();
        loader.insert("loop.sql", unit.clone());

        let runtime = RuntimeEnvironment::new(
            &registry,
            Arc::clone(&loader) as Arc<dyn CodeLoader>,
            StencilConfig::default(),
        );
        let err = runtime
            .render(Arc::new(unit), &json!({}), &render_metadata("loop.sql"))
            .await
            .unwrap_err();
        assert!(err.is_render_error());
        assert!(err.to_string().contains("depth"));
    }
}
