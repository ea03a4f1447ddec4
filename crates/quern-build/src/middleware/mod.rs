//! Schema pipeline steps.
//!
//! Each middleware here does one job over a raw schema: defaulting a
//! missing template source, verifying validator references, forcing path
//! fields to be required, or cross-checking declared template parameters.
//! The chain is order-sensitive: [`crate::SchemaParser`] composes the
//! standard order, with [`GenerateTemplateSource`] outermost so its default
//! is visible to everything downstream, and the checks post-order so they
//! see the fully corrected schema on the way back out.

mod add_required_validator_for_path;
mod check_parameter;
mod check_validator;
mod generate_template_source;

pub use add_required_validator_for_path::AddRequiredValidatorForPath;
pub use check_parameter::CheckParameter;
pub use check_validator::CheckValidator;
pub use generate_template_source::GenerateTemplateSource;
