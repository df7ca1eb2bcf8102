//! Command-line interface for krender.
//!
//! `krender` renders the manifest templates of a deployment repository to
//! stdout, ready to be piped into `kubectl apply -f -`.
//!
//! # Usage
//!
//! ```bash
//! # Render every manifest directly inside the template directory
//! krender --template-dir deploy/production --current-sha "$(git rev-parse HEAD)"
//!
//! # Render selected files with extra variables
//! krender --template-dir deploy/staging \
//!     --bindings environment=staging,image.tag=1.25 \
//!     --bindings @deploy/staging/values.yaml \
//!     web.yaml.tera worker.yaml.tera
//! ```
//!
//! # Options
//!
//! - `--template-dir <DIR>` - Template directory (env `KRENDER_TEMPLATE_DIR`)
//! - `--current-sha <SHA>` - Commit being deployed (env `REVISION`)
//! - `--bindings <BINDINGS>` - Template variables, repeatable
//! - `--max-partial-depth <N>` - Partial nesting limit
//! - `-c, --config <FILE>` - Configuration file (default `./krender.toml`)
//! - `-v, --verbose` / `-q, --quiet` - Log level
//!
//! # Output
//!
//! Rendered documents go to stdout. Logs and the failure summary go to
//! stderr, so a failed render never produces a partial manifest stream on
//! stdout without a non-zero exit status.

pub mod bindings;

#[cfg(test)]
mod tests;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use walkdir::WalkDir;

use crate::config::RenderConfig;
use crate::constants::{DEFAULT_MAX_PARTIAL_DEPTH, RENDERABLE_SUFFIXES};
use crate::core::{DeploySummary, KrenderError, SummarySink};
use crate::templating::{Renderer, RendererOptions, parse_document_stream};
use crate::utils::expand_path;

/// Main CLI structure for krender.
#[derive(Parser, Debug)]
#[command(
    name = "krender",
    about = "Render Kubernetes manifest templates with recursive partials",
    version,
    long_about = "krender evaluates Tera manifest templates, expanding partials from \
                  <template-dir>/partials and <template-dir>/../partials, and writes the \
                  resulting YAML documents to stdout."
)]
pub struct Cli {
    /// Files to render, relative to the template directory.
    ///
    /// Defaults to every .yml, .yaml, .yml.tera and .yaml.tera file directly
    /// inside the template directory.
    #[arg(value_name = "FILENAMES")]
    filenames: Vec<String>,

    /// Directory holding the templates
    #[arg(long, env = "KRENDER_TEMPLATE_DIR", value_name = "DIR")]
    template_dir: Option<String>,

    /// Commit SHA of the revision being deployed
    #[arg(long, env = "REVISION", value_name = "SHA")]
    current_sha: Option<String>,

    /// Template variables: key=value[,key=value], a JSON object, or @file
    #[arg(long = "bindings", value_name = "BINDINGS")]
    bindings: Vec<String>,

    /// Maximum partial nesting depth
    #[arg(long, value_name = "N", value_parser = parse_depth)]
    max_partial_depth: Option<usize>,

    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// The log level requested on the command line, if any.
    ///
    /// `None` leaves the choice to `RUST_LOG`.
    #[must_use]
    pub fn log_level(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }

    /// Render the requested templates to stdout.
    ///
    /// Every file is attempted even after a failure.
    ///
    /// # Errors
    ///
    /// Returns [`KrenderError::RenderFailed`] after printing the summary if any
    /// file failed, or an error if the configuration, bindings or template
    /// directory are unusable.
    pub async fn execute(self) -> Result<()> {
        let config = RenderConfig::load_with_optional(self.config.clone()).await?;

        let template_dir = self.resolve_template_dir(&config)?;
        let current_sha = self.current_sha.clone().or_else(|| config.current_sha.clone());
        let max_partial_depth = self
            .max_partial_depth
            .or(config.max_partial_depth)
            .unwrap_or(DEFAULT_MAX_PARTIAL_DEPTH);

        let mut binding_sets = vec![config.bindings.clone()];
        for input in &self.bindings {
            binding_sets.push(bindings::parse_bindings(input).await?);
        }
        let bindings = bindings::merge_all(binding_sets);

        let summary = Arc::new(DeploySummary::new());
        let mut options = RendererOptions::new(&template_dir)
            .with_summary(summary.clone())
            .with_bindings(bindings)
            .with_max_partial_depth(max_partial_depth);
        if let Some(sha) = current_sha {
            options = options.with_current_sha(sha);
        }
        let renderer = Renderer::new(options)?;

        let filenames = if self.filenames.is_empty() {
            list_templates(&template_dir)?
        } else {
            self.filenames.clone()
        };

        if filenames.is_empty() {
            tracing::warn!("No templates found in {}", template_dir.display());
            return Ok(());
        }

        let total = filenames.len();
        let mut failed = 0;
        let mut stdout = std::io::stdout();

        for filename in &filenames {
            match render_file(&renderer, &template_dir, filename, summary.as_ref()).await {
                Some(rendered) => write_documents(&mut stdout, &rendered)?,
                None => failed += 1,
            }
        }
        stdout.flush().context("Failed to flush stdout")?;

        tracing::info!("Rendered {} of {} template(s)", total - failed, total);

        if failed > 0 {
            eprintln!("\n{}\n{}", "Render summary".red().bold(), summary.render());
            return Err(KrenderError::RenderFailed {
                failed,
                total,
            }
            .into());
        }
        Ok(())
    }

    fn resolve_template_dir(&self, config: &RenderConfig) -> Result<PathBuf> {
        let dir = match &self.template_dir {
            Some(raw) => expand_path(raw)?,
            None => config.template_dir()?.ok_or(KrenderError::TemplateDirMissing)?,
        };

        if !dir.is_dir() {
            return Err(KrenderError::TemplateDirNotFound {
                path: dir.display().to_string(),
            }
            .into());
        }
        Ok(dir)
    }
}

/// Read, render and validate one file.
///
/// Failures are recorded in `summary` and yield `None`.
async fn render_file(
    renderer: &Renderer,
    template_dir: &Path,
    filename: &str,
    summary: &dyn SummarySink,
) -> Option<String> {
    let path = template_dir.join(filename);
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) => {
            summary.add_paragraph(&format!("Could not read {}: {e}", path.display()));
            return None;
        }
    };

    // The renderer records its own failures in the summary.
    let rendered = match renderer.render_template(filename, &raw) {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::error!("{}", e);
            return None;
        }
    };

    if let Err(e) = parse_document_stream(&rendered) {
        let error = KrenderError::InvalidRenderedYaml {
            filename: filename.to_string(),
            reason: e.to_string(),
        };
        tracing::error!("{}", error);
        summary.add_paragraph(&error.to_string());
        return None;
    }

    tracing::debug!("Rendered {}", filename);
    Some(rendered)
}

/// Write one file's documents so consecutive files form a single stream.
fn write_documents(out: &mut impl Write, rendered: &str) -> Result<()> {
    let separator = if rendered.starts_with("---") { "" } else { "---\n" };
    let terminator = if rendered.ends_with('\n') { "" } else { "\n" };
    write!(out, "{separator}{rendered}{terminator}").context("Failed to write to stdout")
}

/// File names directly inside `dir` with a renderable suffix, sorted.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn list_templates(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to list templates in {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if RENDERABLE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            names.push(name.to_string());
        }
    }

    Ok(names)
}

fn parse_depth(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(depth) => Ok(depth),
        Err(e) => Err(e.to_string()),
    }
}
