//! Template rendering engine with Tera.
//!
//! This module provides the [`Renderer`] that evaluates manifest templates,
//! exposes the render's variables to them, and wires up the `partial`
//! function for recursive partial rendering.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use regex::Regex;
use strsim::levenshtein;
use tera::Tera;

use super::error::{RenderError, TemplateError};
use super::normalize::normalize;
use super::partial::{PARTIAL_FUNCTION, PartialFunction};
use super::resolver::PartialResolver;
use super::scope::{Bindings, Scope, build_scope, generate_deployment_id};
use crate::constants::{DEFAULT_MAX_PARTIAL_DEPTH, TEMPLATE_EXTENSION};
use crate::core::{DeploySummary, SummarySink};

/// Maximum allowed Levenshtein distance as a percentage of target length for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Configuration of a [`Renderer`].
#[derive(Clone)]
pub struct RendererOptions {
    /// Commit SHA of the revision being deployed.
    pub current_sha: Option<String>,
    /// Root directory of the templates; partials are searched relative to it.
    pub template_dir: PathBuf,
    /// Receives a paragraph describing each render failure.
    pub summary: Arc<dyn SummarySink>,
    /// Caller-supplied template variables.
    pub bindings: Bindings,
    pub max_partial_depth: usize,
}

impl RendererOptions {
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_sha: None,
            template_dir: template_dir.into(),
            summary: Arc::new(DeploySummary::new()),
            bindings: Bindings::new(),
            max_partial_depth: DEFAULT_MAX_PARTIAL_DEPTH,
        }
    }

    pub fn with_current_sha(mut self, sha: impl Into<String>) -> Self {
        self.current_sha = Some(sha.into());
        self
    }

    pub fn with_summary(mut self, summary: Arc<dyn SummarySink>) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_bindings(mut self, bindings: Bindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_max_partial_depth(mut self, depth: usize) -> Self {
        self.max_partial_depth = depth;
        self
    }
}

struct RendererState {
    current_sha: Option<String>,
    deployment_id: Option<String>,
    template_dir: PathBuf,
    resolver: PartialResolver,
    summary: Arc<dyn SummarySink>,
    bindings: Bindings,
    max_partial_depth: usize,
}

/// Renders manifest templates and their partials.
///
/// A renderer is built once per deployment and reused for every file: the
/// commit SHA, deployment id, search directories and bindings are fixed at
/// construction. Cloning is cheap and clones share that configuration.
///
/// # Template syntax
///
/// Templates use Tera syntax. Every binding, plus `current_sha` and
/// `deployment_id`, is a top-level variable, and `partial()` includes a
/// partial:
///
/// ```text
/// ---
/// apiVersion: apps/v1
/// kind: Deployment
/// metadata:
///   name: web-{{ deployment_id }}
/// spec:
///   template:
///     spec:
///       containers:
///         - {{ partial(name="container", image="nginx:1.25") }}
/// ```
#[derive(Clone)]
pub struct Renderer {
    inner: Arc<RendererState>,
}

impl Renderer {
    /// Create a renderer.
    ///
    /// The deployment id is generated here, once, from the commit SHA.
    ///
    /// # Errors
    ///
    /// Returns an error if the partial search directories cannot be made
    /// absolute.
    pub fn new(options: RendererOptions) -> Result<Self> {
        let resolver = PartialResolver::new(&options.template_dir)?;
        let deployment_id = options.current_sha.as_deref().map(generate_deployment_id);

        tracing::debug!(
            "Renderer created for {} (deployment id: {})",
            options.template_dir.display(),
            deployment_id.as_deref().unwrap_or("none")
        );

        Ok(Self {
            inner: Arc::new(RendererState {
                current_sha: options.current_sha,
                deployment_id,
                template_dir: options.template_dir,
                resolver,
                summary: options.summary,
                bindings: options.bindings,
                max_partial_depth: options.max_partial_depth,
            }),
        })
    }

    pub fn current_sha(&self) -> Option<&str> {
        self.inner.current_sha.as_deref()
    }

    pub fn deployment_id(&self) -> Option<&str> {
        self.inner.deployment_id.as_deref()
    }

    pub fn template_dir(&self) -> &Path {
        &self.inner.template_dir
    }

    pub fn resolver(&self) -> &PartialResolver {
        &self.inner.resolver
    }

    /// The top-level scope: system variables with the bindings merged over them.
    pub fn template_variables(&self) -> Scope {
        let system = Scope::system(self.current_sha(), self.deployment_id());
        build_scope(&system, &self.inner.bindings)
    }

    /// Render a file.
    ///
    /// Files without the `.tera` extension are returned unchanged. Templates
    /// are evaluated with [`Renderer::template_variables`].
    ///
    /// # Errors
    ///
    /// Any failure, in the template or in any nested partial, is recorded as a
    /// paragraph in the summary and returned as a [`RenderError`] naming
    /// `filename`.
    pub fn render_template(
        &self,
        filename: &str,
        raw_template: &str,
    ) -> Result<String, RenderError> {
        if !is_template_file(filename) {
            tracing::debug!("{} is not a template, passing through", filename);
            return Ok(raw_template.to_string());
        }

        tracing::debug!("Rendering template {}", filename);
        let scope = self.template_variables();
        self.evaluate(filename, raw_template, &scope, 0).map_err(|cause| {
            tracing::debug!("{}", cause.format_with_context());
            self.inner.summary.add_paragraph(&format!(
                "Error from renderer:\n  {}",
                cause.to_string().replace('\n', " ")
            ));
            RenderError {
                filename: filename.to_string(),
                cause,
            }
        })
    }

    /// Evaluate `raw_template` against `scope`.
    ///
    /// `source` names the template in error messages. `depth` is the nesting
    /// depth of this evaluation; partials it includes render at `depth + 1`.
    pub(crate) fn evaluate(
        &self,
        source: &str,
        raw_template: &str,
        scope: &Scope,
        depth: usize,
    ) -> Result<String, TemplateError> {
        // A fresh Tera instance per evaluation binds `partial` to this scope.
        let mut tera = Tera::default();
        tera.register_function(
            PARTIAL_FUNCTION,
            PartialFunction::new(self.clone(), scope.clone(), depth),
        );

        let context = scope.to_context().map_err(|e| TemplateError::Evaluation {
            template: source.to_string(),
            message: format_tera_error(&e),
            line: None,
            suggestions: Vec::new(),
        })?;

        tera.render_str(raw_template, &context)
            .map_err(|e| classify_tera_error(&e, source, scope))
    }

    /// Resolve, evaluate and normalize a partial.
    ///
    /// Called by the `partial` template function with the invoking scope.
    pub(crate) fn render_partial(
        &self,
        name: &str,
        scope: &Scope,
        locals: &Bindings,
        depth: usize,
    ) -> Result<String, TemplateError> {
        let max = self.inner.max_partial_depth;
        if depth > max {
            return Err(TemplateError::PartialTooDeep {
                name: name.to_string(),
                depth,
                max,
            });
        }

        let partial = self.inner.resolver.resolve(name)?;
        tracing::debug!(
            "Rendering partial '{}' at depth {} with {} local(s)",
            name,
            depth,
            locals.len()
        );

        let partial_scope = scope.with_locals(locals);
        let expanded =
            self.evaluate(&format!("partial '{name}'"), &partial.content, &partial_scope, depth)?;
        normalize(name, &expanded)
    }
}

/// Whether `filename` carries the template marker extension.
pub fn is_template_file(filename: &str) -> bool {
    Path::new(filename).extension().and_then(|ext| ext.to_str()) == Some(TEMPLATE_EXTENSION)
}

/// Turn a Tera error into a [`TemplateError`].
///
/// A failure inside a nested partial travels through Tera as the source of a
/// function-call error; it is recovered and forwarded unchanged so the caller
/// sees the innermost cause.
fn classify_tera_error(error: &tera::Error, source: &str, scope: &Scope) -> TemplateError {
    if let Some(nested) = find_template_error(error) {
        return nested.clone();
    }

    let message = format_tera_error(error);
    let suggestions = extract_variable_name(&message)
        .map(|name| find_similar_variables(&name, &scope.names()))
        .unwrap_or_default();

    TemplateError::Evaluation {
        template: source.to_string(),
        line: extract_line_from_tera_error(error),
        message,
        suggestions,
    }
}

fn find_template_error(error: &tera::Error) -> Option<&TemplateError> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = current {
        if let Some(template_error) = err.downcast_ref::<TemplateError>() {
            return Some(template_error);
        }
        current = err.source();
    }
    None
}

/// Extract variable name from "Variable `foo` not found" message
fn extract_variable_name(error_msg: &str) -> Option<String> {
    let re = Regex::new(r"Variable `([^`]+)` not found").ok()?;
    re.captures(error_msg).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

/// Find similar variable names using Levenshtein distance
fn find_similar_variables(target: &str, available: &[String]) -> Vec<String> {
    // Only the first path segment is a scope name: `app.nmae` is looked up as `app`.
    let root = target.split('.').next().unwrap_or(target);

    let mut scored: Vec<_> =
        available.iter().map(|var| (var.clone(), levenshtein(root, var))).collect();
    scored.sort_by_key(|(_, dist)| *dist);

    scored
        .into_iter()
        .filter(|(_, dist)| *dist > 0 && *dist <= root.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(var, _)| var)
        .collect()
}

/// Extract line number from Tera error message
///
/// Tera includes line:column information in parse error messages, e.g. `--> 3:7`.
fn extract_line_from_tera_error(error: &tera::Error) -> Option<usize> {
    let error_msg = format!("{:?}", error);
    let re = Regex::new(r"(\d+):(\d+)").ok()?;
    re.captures(&error_msg)?.get(1)?.as_str().parse::<usize>().ok()
}

/// Format a Tera error chain into a single readable message.
///
/// Internal template names like '__tera_one_off' are filtered out, and the
/// wrapper messages Tera adds around function calls are skipped.
pub fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut all_messages = vec![error.to_string()];
    let mut current_error: Option<&dyn Error> = error.source();
    while let Some(err) = current_error {
        all_messages.push(err.to_string());
        current_error = err.source();
    }

    let messages: Vec<String> = all_messages
        .into_iter()
        .map(|msg| {
            msg.replace("while rendering '__tera_one_off'", "")
                .replace("Failed to render '__tera_one_off'", "Template rendering failed")
                .replace("Failed to parse '__tera_one_off'", "Template syntax error")
                .replace("'__tera_one_off'", "template")
                .trim()
                .to_string()
        })
        .filter(|msg| {
            !msg.is_empty() && msg != "Template rendering failed" && msg != "Template syntax error"
        })
        .collect();

    if messages.is_empty() {
        "Template syntax error (see details above)".to_string()
    } else {
        messages.join("\n  → ")
    }
}
