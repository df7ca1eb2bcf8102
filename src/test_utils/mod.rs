//! Test utilities for krender
//!
//! Helpers shared by the unit tests and the integration suite: a throwaway
//! template tree on disk and one-time logging initialisation.
//!
//! The layout created by [`TemplateTree`] mirrors a deployment repository:
//!
//! ```text
//! <tmp>/
//! ├── templates/          template_dir
//! │   └── partials/       first search directory
//! └── partials/           shared partials, second search directory
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::DeploySummary;
use crate::templating::{Bindings, Renderer, RendererOptions};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Respects `RUST_LOG` when set, otherwise uses `level`; does nothing when
/// neither is provided.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// A temporary template directory with local and shared partial directories.
pub struct TemplateTree {
    _temp: TempDir,
    root: PathBuf,
}

impl TemplateTree {
    /// Create the directory layout.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp dir")?;
        let root = crate::utils::absolutize(temp.path())?;
        std::fs::create_dir_all(root.join("templates/partials"))?;
        std::fs::create_dir_all(root.join("partials"))?;
        Ok(Self {
            _temp: temp,
            root,
        })
    }

    pub fn template_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    pub fn shared_partials_dir(&self) -> PathBuf {
        self.root.join("partials")
    }

    /// Write a top-level template; returns its path.
    pub fn write_template(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.template_dir(), file_name, content)
    }

    /// Write a partial into `<template_dir>/partials`.
    pub fn write_partial(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.template_dir().join("partials"), file_name, content)
    }

    /// Write a partial into the shared `<template_dir>/../partials`.
    pub fn write_shared_partial(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.shared_partials_dir(), file_name, content)
    }

    /// Build a renderer for this tree with a fixed SHA and the given bindings.
    pub fn renderer(&self, bindings: Value) -> Result<(Renderer, Arc<DeploySummary>)> {
        let summary = Arc::new(DeploySummary::new());
        let options = RendererOptions::new(self.template_dir())
            .with_current_sha("1234567890abcdef")
            .with_bindings(to_bindings(bindings)?)
            .with_summary(summary.clone());
        Ok((Renderer::new(options)?, summary))
    }
}

/// Convert a JSON object literal into [`Bindings`].
pub fn to_bindings(value: Value) -> Result<Bindings> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Bindings::new()),
        other => anyhow::bail!("bindings must be a JSON object, got {other}"),
    }
}

fn write_file(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
