//! Stencil source scanner.
//!
//! Turns template source into the op-list of a [`CompiledTemplate`]. The
//! dialect is deliberately small: literal text, `{{ params.a.b | filter(1) }}`
//! interpolations rooted at `params`, and `{% include "name" %}` tags.
//! Anything else is a compile error naming the offending construct.

use super::unit::{FilterCall, TemplateOp};
use crate::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::LazyLock;

// Pre-compiled regexes for the scanner fast paths (compiled once, reused)
static TAG_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\{%").expect("valid regex"));
static INCLUDE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^include\s+"([^"]+)"$"#).expect("valid regex"));
static PARAMETER_PATH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("valid regex")
});
static FILTER_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Scans `source` into ops, checking filter names against `declared`.
pub(super) fn scan(
    template: &str,
    source: &str,
    declared: &BTreeSet<String>,
) -> Result<Vec<TemplateOp>> {
    let mut ops = Vec::new();
    let mut rest = source;

    while let Some(open) = TAG_OPEN_REGEX.find(rest) {
        if open.start() > 0 {
            ops.push(TemplateOp::Literal(rest[..open.start()].to_string()));
        }
        let tail = &rest[open.end()..];
        if open.as_str() == "{{" {
            let Some(close) = tail.find("}}") else {
                return Err(compile_error(template, "unterminated '{{' interpolation"));
            };
            ops.push(parse_expression(template, tail[..close].trim(), declared)?);
            rest = &tail[close + 2..];
        } else {
            let Some(close) = tail.find("%}") else {
                return Err(compile_error(template, "unterminated '{%' tag"));
            };
            ops.push(parse_tag(template, tail[..close].trim())?);
            rest = &tail[close + 2..];
        }
    }

    if !rest.is_empty() {
        ops.push(TemplateOp::Literal(rest.to_string()));
    }
    Ok(ops)
}

fn compile_error(template: &str, message: impl Into<String>) -> Error {
    Error::CompileError {
        template: template.to_string(),
        message: message.into(),
    }
}

fn parse_tag(template: &str, inner: &str) -> Result<TemplateOp> {
    if let Some(captures) = INCLUDE_REGEX.captures(inner) {
        return Ok(TemplateOp::Include {
            source: captures[1].to_string(),
        });
    }
    if inner.starts_with("include") {
        return Err(compile_error(
            template,
            format!("malformed include tag '{{% {inner} %}}'"),
        ));
    }
    Err(compile_error(
        template,
        format!("unsupported tag '{{% {inner} %}}'"),
    ))
}

fn parse_expression(template: &str, expr: &str, declared: &BTreeSet<String>) -> Result<TemplateOp> {
    if expr.is_empty() {
        return Err(compile_error(template, "empty interpolation"));
    }

    let segments = split_chain(expr);
    let reference = segments[0].trim();

    if reference == "params" {
        return Err(compile_error(
            template,
            "parameter reference 'params' has no path",
        ));
    }
    let Some(path) = reference.strip_prefix("params.") else {
        return Err(compile_error(
            template,
            format!("parameter references must be rooted at 'params', got '{reference}'"),
        ));
    };
    if !PARAMETER_PATH_REGEX.is_match(path) {
        return Err(compile_error(
            template,
            format!("invalid parameter path '{path}'"),
        ));
    }

    let mut filters = Vec::with_capacity(segments.len() - 1);
    for segment in &segments[1..] {
        filters.push(parse_filter(template, segment.trim(), declared)?);
    }

    Ok(TemplateOp::Parameter {
        path: path.to_string(),
        filters,
    })
}

fn parse_filter(template: &str, segment: &str, declared: &BTreeSet<String>) -> Result<FilterCall> {
    if segment.is_empty() {
        return Err(compile_error(template, "empty filter segment in chain"));
    }

    let (name, args) = match segment.find('(') {
        Some(open) => {
            if !segment.ends_with(')') {
                return Err(compile_error(
                    template,
                    format!("malformed filter call '{segment}'"),
                ));
            }
            let name = segment[..open].trim_end();
            let inner = &segment[open + 1..segment.len() - 1];
            (name, parse_filter_args(template, name, inner)?)
        }
        None => (segment, Vec::new()),
    };

    if !FILTER_NAME_REGEX.is_match(name) {
        return Err(compile_error(template, format!("invalid filter name '{name}'")));
    }
    if !declared.contains(name) {
        return Err(compile_error(template, format!("unknown filter '{name}'")));
    }

    Ok(FilterCall::new(name, args))
}

fn parse_filter_args(template: &str, name: &str, inner: &str) -> Result<Vec<Value>> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    // Arguments are a JSON scalar list; bracketing them parses the whole
    // group in one shot, commas inside string literals included.
    let args: Vec<Value> = serde_json::from_str(&format!("[{inner}]")).map_err(|_| {
        compile_error(
            template,
            format!("filter '{name}' arguments must be JSON scalars: '{inner}'"),
        )
    })?;
    if let Some(composite) = args.iter().find(|arg| arg.is_array() || arg.is_object()) {
        return Err(compile_error(
            template,
            format!("filter '{name}' arguments must be JSON scalars, got {composite}"),
        ));
    }
    Ok(args)
}

/// Splits a `value | filter | filter(args)` chain at top-level pipes only.
fn split_chain(expr: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0usize;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in expr.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            '|' if !in_string && depth == 0 => {
                segments.push(&expr[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    segments.push(&expr[start..]);
    segments
}
