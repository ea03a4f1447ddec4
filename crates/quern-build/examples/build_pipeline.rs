//! Build pipeline example.
//!
//! Demonstrates how to:
//! 1. Compile template sources and collect their metadata
//! 2. Parse raw API schemas through the standard middleware chain
//! 3. Render a compiled template with bound parameters
//!
//! Usage:
//!   cargo run --example build_pipeline

use anyhow::{Context, Result};
use quern_build::{RawApiSchema, SchemaParser};
use quern_core::ValidatorRegistry;
use quern_core::template::{FilterExtension, TemplateEngine};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_target(false)
        .init();

    // Step 1: Compile the template sources for this build
    let engine = TemplateEngine::builder()
        .extension(FilterExtension::from_fn("quote", |value, _arg| async move {
            Ok(format!("'{}'", value.as_str().unwrap_or_default()))
        }))
        .extension(FilterExtension::from_fn("upper", |value, _arg| async move {
            Ok(value.as_str().unwrap_or_default().to_uppercase())
        }))
        .build()
        .context("Failed to build template engine")?;

    let metadata = engine
        .compile_all([
            (
                "get_user.sql",
                "{% include \"prelude.sql\" %}SELECT * FROM users WHERE id = {{ params.id }}",
            ),
            (
                "find_orders.sql",
                "SELECT * FROM orders WHERE region = {{ params.region | upper | quote }}",
            ),
            ("prelude.sql", "-- generated by quern\n"),
        ])
        .context("Failed to compile templates")?;

    tracing::info!("Compiled {} template sources", metadata.len());

    // Step 2: Parse raw schemas through the standard chain
    let parser = SchemaParser::new(
        Arc::new(ValidatorRegistry::with_built_ins()),
        Arc::new(metadata),
    );

    let raw_schemas: Vec<RawApiSchema> = serde_json::from_value(json!([
        {
            "sourceName": "get_user",
            "templateSource": "get_user.sql",
            "request": [
                { "fieldName": "id", "fieldIn": "PATH" },
            ],
        },
        {
            "sourceName": "find_orders",
            "templateSource": "find_orders.sql",
            "request": [
                { "fieldName": "region", "fieldIn": "QUERY" },
                {
                    "fieldName": "limit",
                    "fieldIn": "QUERY",
                    "validators": [{ "name": "integer", "args": { "min": 1, "max": 100 } }],
                },
            ],
        },
    ]))
    .context("Failed to read raw schemas")?;

    let schemas = parser
        .parse_all(raw_schemas)
        .await
        .context("Failed to parse schemas")?;

    for schema in &schemas {
        tracing::info!(
            "  ✓ {} ({} fields)",
            schema.source_name,
            schema.request.len()
        );
        println!("{}", serde_json::to_string_pretty(schema)?);
    }

    // Step 3: Render one of the compiled templates
    let rendered = engine
        .render("find_orders.sql", &json!({ "region": "emea" }))
        .await
        .context("Failed to render template")?;

    tracing::info!(
        "Rendered {} in execution {}",
        rendered.metadata.template_name,
        rendered.metadata.execution_id
    );
    println!("{}", rendered.content);

    Ok(())
}
