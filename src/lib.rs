//! krender - Kubernetes manifest template renderer
//!
//! Renders deployment manifest templates written in Tera syntax into plain
//! YAML document streams. Templates can include named partials, which are
//! rendered recursively with their own local variables and spliced back into
//! the including document in an indentation-independent form.
//!
//! # Architecture Overview
//!
//! A deployment renders a set of files from one template directory:
//! - Files ending in `.tera` are evaluated; all others pass through unchanged
//! - `partial(name="...")` includes `<template_dir>/partials/<name>.yaml.tera`
//!   (or `.yml.tera`), falling back to `<template_dir>/../partials`
//! - Embedded partial output is re-emitted as single-line JSON, which is valid
//!   YAML at any indentation
//! - Failures are reported to a summary sink and surfaced as one error per file
//!
//! # Core Modules
//!
//! - [`templating`] - Scopes, partial resolution, evaluation and normalization
//! - [`core`] - Error types, user-facing error formatting, the summary sink
//! - [`config`] - `krender.toml` loading
//! - [`cli`] - Command-line interface
//! - [`constants`] - Naming conventions and limits
//! - [`utils`] - Path helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use krender::core::DeploySummary;
//! use krender::templating::{Renderer, RendererOptions};
//! use serde_json::json;
//!
//! # fn example() -> anyhow::Result<()> {
//! let summary = Arc::new(DeploySummary::new());
//! let bindings = match json!({"replicas": 3}) {
//!     serde_json::Value::Object(map) => map,
//!     _ => unreachable!(),
//! };
//!
//! let renderer = Renderer::new(
//!     RendererOptions::new("deploy/production")
//!         .with_current_sha("0123456789abcdef")
//!         .with_bindings(bindings)
//!         .with_summary(summary.clone()),
//! )?;
//!
//! let raw = std::fs::read_to_string("deploy/production/web.yaml.tera")?;
//! let yaml = renderer.render_template("web.yaml.tera", &raw)?;
//! print!("{yaml}");
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! krender --template-dir deploy/production --current-sha "$REVISION" \
//!     --bindings environment=production | kubectl apply -f -
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod templating;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
