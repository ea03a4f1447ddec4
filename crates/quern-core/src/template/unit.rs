//! Executable template units.
//!
//! A [`CompiledTemplate`] is the artifact a grammar front-end produces: the
//! template name plus a flat op-list the runtime environment replays. The
//! unit is serializable so external tooling can package it; how artifacts are
//! stored is up to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A compiled template, ready for the runtime environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledTemplate {
    /// Name the unit was compiled under, also its loader key.
    pub name: String,
    /// Ops in source order.
    pub ops: Vec<TemplateOp>,
}

impl CompiledTemplate {
    /// Creates a unit from a name and its op-list.
    #[must_use]
    pub fn new(name: impl Into<String>, ops: Vec<TemplateOp>) -> Self {
        Self {
            name: name.into(),
            ops,
        }
    }
}

/// One step of a compiled template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateOp {
    /// Verbatim text.
    Literal(String),
    /// Parameter interpolation with an optional filter chain.
    Parameter {
        /// Dotted path below the `params` root, e.g. `"user.id"`.
        path: String,
        /// Filters applied left to right.
        filters: Vec<FilterCall>,
    },
    /// Splice of another compiled template, resolved at render time.
    Include {
        /// Loader key of the included template.
        source: String,
    },
}

/// A single filter invocation inside a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCall {
    /// Registered filter name.
    pub name: String,
    /// Scalar arguments in declaration order.
    pub args: Vec<Value>,
}

impl FilterCall {
    /// Creates a call to `name` with the given arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}
