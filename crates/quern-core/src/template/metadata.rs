//! Template metadata and per-execution records.
//!
//! Compiling a template yields a [`TemplateMetadata`]: the parameters and
//! includes discovered by static analysis. Build tooling collects these into
//! a [`TemplateMetadataStore`] so schema checks can ask "which parameters
//! does this template declare?" without touching template sources again.
//!
//! Separately, every compilation and every render gets its own
//! [`ExecutionMetadata`] for log correlation. It lives only as long as that
//! one run and is never persisted.

use super::unit::TemplateOp;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// One parameter a template declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParameterMetadata {
    /// Dotted parameter name, e.g. `"user.address.city"`. Only the segment
    /// before the first dot is matched against request field names.
    pub name: String,
}

impl TemplateParameterMetadata {
    /// Creates a parameter record.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Static-analysis output of compiling one template source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    /// Declared parameters, deduplicated, in first-seen order.
    pub parameters: Vec<TemplateParameterMetadata>,
    /// Included template names, deduplicated, in first-seen order.
    pub includes: Vec<String>,
}

impl TemplateMetadata {
    /// Derives metadata from a compiled op-list.
    ///
    /// # Examples
    ///
    /// ```
    /// use quern_core::template::{TemplateMetadata, TemplateOp};
    ///
    /// let ops = vec![
    ///     TemplateOp::Parameter { path: "id".to_string(), filters: vec![] },
    ///     TemplateOp::Parameter { path: "id".to_string(), filters: vec![] },
    /// ];
    /// let metadata = TemplateMetadata::from_ops(&ops);
    /// assert_eq!(metadata.parameters.len(), 1);
    /// ```
    #[must_use]
    pub fn from_ops(ops: &[TemplateOp]) -> Self {
        let mut parameters: Vec<TemplateParameterMetadata> = Vec::new();
        let mut includes: Vec<String> = Vec::new();
        for op in ops {
            match op {
                TemplateOp::Parameter { path, .. } => {
                    if !parameters.iter().any(|parameter| parameter.name == *path) {
                        parameters.push(TemplateParameterMetadata::new(path.clone()));
                    }
                }
                TemplateOp::Include { source } => {
                    if !includes.iter().any(|include| include == source) {
                        includes.push(source.clone());
                    }
                }
                TemplateOp::Literal(_) => {}
            }
        }
        Self {
            parameters,
            includes,
        }
    }
}

/// Execution phase an [`ExecutionMetadata`] record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPhase {
    /// Static compilation of a template source.
    Compile,
    /// Rendering of a compiled unit against bindings.
    Render,
}

impl fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile => f.write_str("compile"),
            Self::Render => f.write_str("render"),
        }
    }
}

/// Correlation record for a single compilation or render.
///
/// Created by the compiler at the start of a run and handed to filters by
/// reference. A render returns its record to the caller inside
/// `RenderedTemplate`; a compile logs and drops it.
#[derive(Debug, Clone)]
pub struct ExecutionMetadata {
    /// Unique id of this run.
    pub execution_id: Uuid,
    /// Template the run operates on.
    pub template_name: String,
    /// Whether this run compiles or renders.
    pub phase: ExecutionPhase,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl ExecutionMetadata {
    /// Starts a new record for `template_name`.
    #[must_use]
    pub fn new(template_name: impl Into<String>, phase: ExecutionPhase) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            template_name: template_name.into(),
            phase,
            started_at: Utc::now(),
        }
    }

    /// Time elapsed since the run started.
    #[must_use]
    pub fn elapsed(&self) -> TimeDelta {
        Utc::now() - self.started_at
    }
}

/// Read side of the template metadata collected by a build.
///
/// Lookup is async: a store may sit behind I/O. Absence is an `Option`, not
/// an error; callers decide how to treat an unknown template source.
#[async_trait]
pub trait TemplateMetadataStore: Send + Sync {
    /// Returns the metadata recorded for `template_source`, if any.
    async fn get(&self, template_source: &str) -> Option<TemplateMetadata>;
}

/// Map-backed [`TemplateMetadataStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadataStore {
    entries: HashMap<String, TemplateMetadata>,
}

impl InMemoryMetadataStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records metadata for `template_source`, replacing any previous entry.
    pub fn insert(&mut self, template_source: impl Into<String>, metadata: TemplateMetadata) {
        self.entries.insert(template_source.into(), metadata);
    }

    /// Returns `true` if `template_source` has an entry.
    #[must_use]
    pub fn contains(&self, template_source: &str) -> bool {
        self.entries.contains_key(template_source)
    }

    /// Number of recorded templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, TemplateMetadata)> for InMemoryMetadataStore {
    fn from_iter<I: IntoIterator<Item = (String, TemplateMetadata)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl TemplateMetadataStore for InMemoryMetadataStore {
    async fn get(&self, template_source: &str) -> Option<TemplateMetadata> {
        self.entries.get(template_source).cloned()
    }
}
