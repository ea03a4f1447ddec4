//! Build-time schema parsing pipeline for quern.
//!
//! This crate turns raw, per-source API schema descriptions into validated,
//! normalized schemas. Raw schemas arrive partially populated; an ordered
//! chain of middlewares enriches and verifies them, consulting the validator
//! registry and the template metadata produced by `quern-core`'s compiler.
//!
//! # Architecture
//!
//! - [`RawApiSchema`]: the mutable working form of one source's schema.
//! - [`SchemaPipeline`]: onion-model executor over [`SchemaMiddleware`]
//!   steps; each step wraps the remainder of the chain.
//! - [`middleware`]: the shipped steps, covering template-source defaulting,
//!   validator checking, path-field correction, parameter cross-checking.
//! - [`SchemaParser`]: composes the standard chain and performs the final
//!   checked conversion to `ApiSchema`.
//!
//! # Examples
//!
//! ```
//! use quern_build::{RawApiSchema, RawRequestField, SchemaParser};
//! use quern_core::template::InMemoryMetadataStore;
//! use quern_core::{FieldInType, ValidatorRegistry};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> quern_core::Result<()> {
//! let parser = SchemaParser::new(
//!     Arc::new(ValidatorRegistry::with_built_ins()),
//!     Arc::new(InMemoryMetadataStore::new()),
//! );
//!
//! let mut raw = RawApiSchema::new("get_user");
//! raw.request.push(RawRequestField::new("id", FieldInType::Path));
//!
//! let schema = parser.parse(raw).await?;
//! assert_eq!(schema.request[0].validators[0].name, "required");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod middleware;
mod parser;
mod pipeline;
mod schema;

pub use parser::SchemaParser;
pub use pipeline::{Next, SchemaMiddleware, SchemaPipeline};
pub use quern_core::{Error, Result};
pub use schema::{RawApiSchema, RawRequestField};
