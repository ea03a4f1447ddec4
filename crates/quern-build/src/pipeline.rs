//! Onion-model middleware pipeline over raw schemas.
//!
//! A [`SchemaPipeline`] composes an ordered list of [`SchemaMiddleware`]
//! steps. Each step wraps the remainder of the chain: its code before
//! [`Next::run`] executes on the way in, its code after executes on the way
//! back out, once everything downstream has finished. Errors tunnel back up
//! through every enclosing continuation, skipping the post-continuation code
//! of outer steps; the pipeline never catches or retries.
//!
//! The continuation is consumed by value, so a middleware can invoke it at
//! most once. A second call does not exist to write.
//!
//! # Examples
//!
//! ```
//! use async_trait::async_trait;
//! use quern_build::{Next, RawApiSchema, Result, SchemaMiddleware, SchemaPipeline};
//!
//! struct Stamp;
//!
//! #[async_trait]
//! impl SchemaMiddleware for Stamp {
//!     fn name(&self) -> &'static str {
//!         "stamp"
//!     }
//!
//!     async fn handle(&self, schema: &mut RawApiSchema, next: Next<'_>) -> Result<()> {
//!         schema.template_source.get_or_insert_with(|| "default.sql".to_string());
//!         next.run(schema).await
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let pipeline = SchemaPipeline::new().with(Stamp);
//! let mut schema = RawApiSchema::new("get_user");
//! pipeline.execute(&mut schema).await?;
//! assert_eq!(schema.template_source.as_deref(), Some("default.sql"));
//! # Ok(())
//! # }
//! ```

use crate::schema::RawApiSchema;
use async_trait::async_trait;
use quern_core::Result;
use std::fmt;

/// One step of the schema pipeline.
///
/// A middleware receives the schema exclusively for the duration of its
/// call, together with the continuation for the rest of the chain. It may
/// mutate the schema before running the continuation (pre-order), after it
/// returns (post-order), or both. Skipping the continuation entirely is
/// allowed and skips everything downstream.
#[async_trait]
pub trait SchemaMiddleware: Send + Sync {
    /// Short name used in pipeline logs.
    fn name(&self) -> &'static str;

    /// Processes the schema, delegating to the downstream chain via `next`.
    async fn handle(&self, schema: &mut RawApiSchema, next: Next<'_>) -> Result<()>;
}

/// Continuation over the remaining middleware chain.
///
/// `run` consumes the continuation, so each middleware invocation can
/// run its downstream chain at most once; the at-most-once contract is
/// enforced by move semantics rather than a runtime flag.
pub struct Next<'a> {
    remaining: &'a [Box<dyn SchemaMiddleware>],
}

impl Next<'_> {
    /// Runs the rest of the chain to completion.
    ///
    /// Resolves only after every downstream middleware has finished; an
    /// error anywhere downstream surfaces here unchanged.
    pub async fn run(self, schema: &mut RawApiSchema) -> Result<()> {
        match self.remaining.split_first() {
            Some((middleware, rest)) => {
                tracing::debug!(middleware = middleware.name(), "entering middleware");
                middleware.handle(schema, Next { remaining: rest }).await
            }
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.remaining.len())
            .finish()
    }
}

/// An ordered middleware chain, reusable across schemas.
///
/// The pipeline holds no state beyond the composed chain: each call to
/// [`SchemaPipeline::execute`] is independent, and the only mutable state
/// in a run is the schema passed in. Different schemas may therefore run
/// through the same pipeline concurrently.
#[derive(Default)]
pub struct SchemaPipeline {
    middlewares: Vec<Box<dyn SchemaMiddleware>>,
}

impl SchemaPipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Appends a middleware to the end of the chain.
    ///
    /// Registration order is execution order: the first middleware added is
    /// the outermost layer of the onion.
    #[must_use]
    pub fn with(mut self, middleware: impl SchemaMiddleware + 'static) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    /// Number of middlewares in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns `true` if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Runs the whole chain over one schema.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any middleware; the schema may
    /// have been partially mutated and should be discarded by the caller.
    pub async fn execute(&self, schema: &mut RawApiSchema) -> Result<()> {
        tracing::debug!(
            source = %schema.source_name,
            middlewares = self.middlewares.len(),
            "executing schema pipeline"
        );
        Next {
            remaining: &self.middlewares,
        }
        .run(schema)
        .await
    }
}

impl fmt::Debug for SchemaPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.middlewares.iter().map(|m| m.name()).collect();
        f.debug_struct("SchemaPipeline")
            .field("middlewares", &names)
            .finish()
    }
}
