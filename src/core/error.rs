//! Error handling for krender
//!
//! Two layers of errors exist:
//! - [`TemplateError`] / [`RenderError`] (in [`crate::templating`]) describe
//!   why a template could not be rendered.
//! - [`KrenderError`] covers everything around rendering: configuration,
//!   bindings, template discovery and output validation.
//!
//! The command line converts any [`anyhow::Error`] into an [`ErrorContext`]
//! with [`user_friendly_error`], which prints a colored error, optional
//! details, and an actionable suggestion.
//!
//! # Examples
//!
//! ```rust,no_run
//! use krender::core::{ErrorContext, KrenderError};
//!
//! let context = ErrorContext::new(KrenderError::TemplateDirNotFound {
//!     path: "deploy/production".to_string(),
//! })
//! .with_suggestion("Pass --template-dir pointing at your templates");
//!
//! context.display();
//! ```
//!
//! [`TemplateError`]: crate::templating::TemplateError
//! [`RenderError`]: crate::templating::RenderError

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::templating::{RenderError, TemplateError};

/// Errors raised outside the template evaluator itself.
#[derive(Error, Debug, Clone)]
pub enum KrenderError {
    /// No template directory was configured.
    #[error("No template directory specified")]
    TemplateDirMissing,

    #[error("Template directory not found: {path}")]
    TemplateDirNotFound { path: String },

    /// A `--bindings` argument could not be parsed.
    #[error("Invalid bindings '{input}': {reason}")]
    InvalidBindings { input: String, reason: String },

    #[error("Invalid configuration in {file}: {reason}")]
    ConfigError { file: String, reason: String },

    /// The rendered output of a file is not a valid YAML stream.
    #[error("Rendered output of '{filename}' is not valid YAML: {reason}")]
    InvalidRenderedYaml { filename: String, reason: String },

    /// One or more templates failed; details are in the summary.
    #[error("{failed} of {total} template(s) failed to render")]
    RenderFailed { failed: usize, total: usize },
}

/// An error with user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error message
    pub error: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from any displayable error.
    #[must_use]
    pub fn new(error: impl fmt::Display) -> Self {
        Self {
            error: error.to_string(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(render_error) = error.downcast_ref::<RenderError>() {
        return render_error_context(render_error);
    }

    if let Some(krender_error) = error.downcast_ref::<KrenderError>() {
        return create_error_context(krender_error);
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(format!("Invalid configuration: {toml_error}"))
            .with_suggestion("Check the TOML syntax in krender.toml. Verify quotes and brackets");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    ErrorContext::new(message)
}

fn render_error_context(error: &RenderError) -> ErrorContext {
    let context = ErrorContext::new(error).with_details(error.cause.to_string());
    match &error.cause {
        TemplateError::PartialNotFound { .. } => context.with_suggestion(
            "Create the partial under <template-dir>/partials or <template-dir>/../partials",
        ),
        TemplateError::Evaluation { suggestions, .. } if !suggestions.is_empty() => {
            context.with_suggestion(format!("Did you mean: {}?", suggestions.join(", ")))
        }
        TemplateError::Evaluation { .. } => context.with_suggestion(
            "Check template syntax and pass missing variables with --bindings",
        ),
        TemplateError::Normalization { .. } => context.with_suggestion(
            "Make the partial expand to valid YAML, \
             or start it with '---' if it renders whole documents",
        ),
        TemplateError::PartialTooDeep { .. } => context.with_suggestion(
            "Look for a partial that includes itself without a terminating condition, \
             or raise --max-partial-depth",
        ),
        TemplateError::InvalidPartialName { .. } | TemplateError::PartialUnreadable { .. } => {
            context
        }
    }
}

fn create_error_context(error: &KrenderError) -> ErrorContext {
    let context = ErrorContext::new(error);
    match error {
        KrenderError::TemplateDirMissing => context.with_suggestion(
            "Pass --template-dir, set KRENDER_TEMPLATE_DIR, or set template_dir in krender.toml",
        ),
        KrenderError::TemplateDirNotFound { .. } => context.with_suggestion(
            "Check that the template directory exists and the path is correct",
        ),
        KrenderError::InvalidBindings { .. } => context.with_suggestion(
            "Use key=value[,key=value], a JSON object, or @file.json / @file.yaml",
        ),
        KrenderError::ConfigError { .. } => {
            context.with_suggestion("Check the values in your krender.toml file")
        }
        KrenderError::InvalidRenderedYaml { .. } => context.with_details(
            "The template rendered, but its output does not parse as a YAML document stream",
        ),
        KrenderError::RenderFailed { .. } => {
            context.with_details("See the error summary above for each failing template")
        }
    }
}
