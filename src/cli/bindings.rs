//! Parsing of `--bindings` arguments.
//!
//! Three forms are accepted:
//!
//! - `key=value[,key=value...]`: values are strings; a dotted key such as
//!   `image.tag=1.25` builds a nested mapping
//! - a JSON object literal: `{"replicas": 3, "image": {"tag": "1.25"}}`
//! - `@path` to a `.json`, `.yaml` or `.yml` file holding an object
//!
//! Several `--bindings` flags are deep-merged in order with [`merge_all`].

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::core::KrenderError;
use crate::templating::{Bindings, merge_bindings};

/// Parse one `--bindings` argument.
///
/// # Errors
///
/// Returns [`KrenderError::InvalidBindings`] for malformed input, or an I/O
/// error if a referenced file cannot be read.
pub async fn parse_bindings(input: &str) -> Result<Bindings> {
    let trimmed = input.trim();

    if let Some(path) = trimmed.strip_prefix('@') {
        return load_bindings_file(Path::new(path)).await;
    }

    if trimmed.starts_with('{') {
        let value: Value = serde_json::from_str(trimmed).map_err(|e| invalid(input, e))?;
        return into_object(input, value);
    }

    parse_key_values(input)
}

/// Deep-merge parsed bindings in order; later sets win.
pub fn merge_all(sets: impl IntoIterator<Item = Bindings>) -> Bindings {
    sets.into_iter().fold(Bindings::new(), |merged, next| merge_bindings(merged, &next))
}

async fn load_bindings_file(path: &Path) -> Result<Bindings> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read bindings file {}", path.display()))?;
    let input = format!("@{}", path.display());

    let value: Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| invalid(&input, e))?,
        Some("yaml" | "yml") => serde_yaml::from_str(&content).map_err(|e| invalid(&input, e))?,
        _ => {
            return Err(invalid(&input, "bindings files must end in .json, .yaml or .yml").into());
        }
    };

    tracing::debug!("Loaded bindings from {}", path.display());
    into_object(&input, value)
}

fn parse_key_values(input: &str) -> Result<Bindings> {
    let mut bindings = Bindings::new();

    for pair in input.split(',').filter(|pair| !pair.trim().is_empty()) {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(invalid(input, format!("expected key=value, got '{pair}'")).into());
        };

        let path: Vec<&str> = key.trim().split('.').collect();
        if path.iter().any(|segment| segment.is_empty()) {
            return Err(invalid(input, format!("invalid key '{}'", key.trim())).into());
        }

        let mut nested = Value::String(value.to_string());
        for segment in path.iter().rev() {
            let mut object = Bindings::new();
            object.insert((*segment).to_string(), nested);
            nested = Value::Object(object);
        }
        if let Value::Object(object) = nested {
            bindings = merge_bindings(bindings, &object);
        }
    }

    if bindings.is_empty() {
        return Err(invalid(input, "no bindings given").into());
    }
    Ok(bindings)
}

fn into_object(input: &str, value: Value) -> Result<Bindings> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(invalid(input, format!("expected an object, got {other}")).into()),
    }
}

fn invalid(input: &str, reason: impl ToString) -> KrenderError {
    KrenderError::InvalidBindings {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
