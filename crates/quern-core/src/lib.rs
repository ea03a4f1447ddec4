//! Core types, validator contract, and template compilation engine for quern.
//!
//! This crate provides the foundations shared across the quern workspace:
//! the serializable API-schema model, the error taxonomy, the validator
//! registry the schema pipeline resolves names against, and the template
//! compilation engine with its compile-time/runtime environment split.
//!
//! # Architecture
//!
//! - Schema data model (`ApiSchema`, `RequestField`, `ValidatorRef`)
//! - Error hierarchy with contextual information
//! - Validator contract, loader seam, and in-memory registry
//! - Template engine: compiler seam, environments, loaders, extensions
//! - Stencil compiler configuration

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod schema;

pub mod template;
pub mod validator;

pub use config::{DEFAULT_MAX_INCLUDE_DEPTH, StencilConfig};
pub use error::{Error, Result};
pub use schema::{ApiSchema, FieldInType, RequestField, ValidatorRef};
pub use template::{TemplateEngine, TemplateMetadata, TemplateMetadataStore};
pub use validator::{Validator, ValidatorLoader, ValidatorRegistry};
