//! Template error handling for krender
//!
//! This module provides structured error types for template rendering with
//! enough context to diagnose a failure deep inside a chain of partials, and
//! user-friendly formatting for the command line.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while evaluating a template or one of its partials.
///
/// Errors from nested partials are forwarded unchanged, so the variant always
/// describes the innermost failure.
#[derive(Debug, Clone, Error)]
pub enum TemplateError {
    /// No candidate file existed for the partial.
    #[error("Partial '{name}' not found. Looked for: {}", join_paths(attempted))]
    PartialNotFound {
        name: String,
        /// Every path that was tried, in search order.
        attempted: Vec<PathBuf>,
    },

    #[error("Invalid partial name '{name}': {reason}")]
    InvalidPartialName { name: String, reason: String },

    #[error("Failed to read partial '{name}' from {}: {message}", path.display())]
    PartialUnreadable {
        name: String,
        path: PathBuf,
        message: String,
    },

    /// The expression evaluator raised an error.
    #[error("Error evaluating {template}: {message}")]
    Evaluation {
        /// Filename of the template, or `partial '<name>'`.
        template: String,
        message: String,
        /// Line reported by Tera, 1-indexed.
        line: Option<usize>,
        /// Similar variable names when a variable was undefined.
        suggestions: Vec<String>,
    },

    /// An embedded fragment did not parse as structured data.
    #[error(
        "Partial '{partial}' did not produce valid YAML: {reason}\nExpanded content:\n{fragment}"
    )]
    Normalization {
        partial: String,
        reason: String,
        fragment: String,
    },

    #[error("Partial nesting too deep: '{name}' would render at depth {depth} (max {max})")]
    PartialTooDeep { name: String, depth: usize, max: usize },
}

/// The single error surfaced by [`Renderer::render_template`].
///
/// Whether the failure happened in the top-level template or in a nested
/// partial, the caller sees "template cannot be rendered" for the file it
/// asked for; [`RenderError::cause`] holds the underlying [`TemplateError`].
///
/// [`Renderer::render_template`]: super::Renderer::render_template
#[derive(Debug, Error)]
#[error("Template '{filename}' cannot be rendered")]
pub struct RenderError {
    pub filename: String,
    #[source]
    pub cause: TemplateError,
}

impl RenderError {
    /// The underlying template error.
    #[must_use]
    pub fn cause(&self) -> &TemplateError {
        &self.cause
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}

impl TemplateError {
    /// Generate a user-friendly error message with context and suggestions
    pub fn format_with_context(&self) -> String {
        match self {
            TemplateError::PartialNotFound {
                name,
                attempted,
            } => format_partial_not_found(name, attempted),
            TemplateError::InvalidPartialName {
                name,
                reason,
            } => {
                format!(
                    "ERROR: Invalid Partial Name\n\nPartial: {name}\nReason: {reason}\n\n\
                     SUGGESTION: Partial names are relative names without extension, e.g. \
                     partial(name=\"deployment\").\n"
                )
            }
            TemplateError::PartialUnreadable {
                name,
                path,
                message,
            } => {
                format!(
                    "ERROR: Partial Unreadable\n\nPartial: {name}\nPath: {}\nError: {message}\n\n\
                     SUGGESTION: Check the file permissions and that it contains valid UTF-8.\n",
                    path.display()
                )
            }
            TemplateError::Evaluation {
                template,
                message,
                line,
                suggestions,
            } => format_evaluation_error(template, message, *line, suggestions),
            TemplateError::Normalization {
                partial,
                reason,
                fragment,
            } => format_normalization_error(partial, reason, fragment),
            TemplateError::PartialTooDeep {
                name,
                depth,
                max,
            } => {
                format!(
                    "ERROR: Partial Nesting Too Deep\n\n\
                     Partial: {name}\nDepth: {depth} (max {max})\n\n\
                     SUGGESTION: Check for a partial that includes itself, directly or through \
                     other partials, without a terminating condition.\n"
                )
            }
        }
    }
}

fn format_partial_not_found(name: &str, attempted: &[PathBuf]) -> String {
    let mut msg = String::new();

    msg.push_str("ERROR: Partial Not Found\n\n");
    msg.push_str(&format!("Partial: {}\n\n", name));

    msg.push_str("Looked for:\n");
    for path in attempted {
        msg.push_str(&format!("  {}\n", path.display()));
    }

    msg.push_str("\nSUGGESTION: Create one of the files above, or fix the partial name.\n");
    msg
}

fn format_evaluation_error(
    template: &str,
    message: &str,
    line: Option<usize>,
    suggestions: &[String],
) -> String {
    let mut msg = String::new();

    msg.push_str("ERROR: Template Evaluation Failed\n\n");
    msg.push_str(&format!("Template: {}\n", template));
    if let Some(line) = line {
        msg.push_str(&format!("Line: {}\n", line));
    }
    msg.push_str(&format!("Error: {}\n\n", message));

    if !suggestions.is_empty() {
        msg.push_str("Did you mean one of these?\n");
        for suggestion in suggestions {
            msg.push_str(&format!("  - {}\n", suggestion));
        }
        msg.push('\n');
    }

    msg.push_str("SUGGESTION: Check template syntax and that every variable is bound.\n");
    msg.push_str("Common issues:\n");
    msg.push_str("  - Unclosed {{ }} or {% %} delimiters\n");
    msg.push_str("  - Variables missing from --bindings\n");
    msg.push_str("  - Locals not passed to partial(...)\n");
    msg
}

fn format_normalization_error(partial: &str, reason: &str, fragment: &str) -> String {
    let mut msg = String::new();

    msg.push_str("ERROR: Partial Output Is Not Valid YAML\n\n");
    msg.push_str(&format!("Partial: {}\n", partial));
    msg.push_str(&format!("Error: {}\n\n", reason));
    msg.push_str("Expanded content:\n");
    for line in fragment.lines() {
        msg.push_str(&format!("  | {}\n", line));
    }

    msg.push_str(
        "\nSUGGESTION: Partials embedded in another document must expand to a single YAML value.\n",
    );
    msg.push_str("Start the partial with a '---' line if it renders complete documents.\n");
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_not_found_lists_every_path() {
        let error = TemplateError::PartialNotFound {
            name: "web".to_string(),
            attempted: vec![
                PathBuf::from("/t/partials/web.yaml.tera"),
                PathBuf::from("/partials/web.yml.tera"),
            ],
        };

        assert_eq!(
            error.to_string(),
            "Partial 'web' not found. Looked for: /t/partials/web.yaml.tera, /partials/web.yml.tera"
        );
        let detailed = error.format_with_context();
        assert!(detailed.contains("  /t/partials/web.yaml.tera\n"));
        assert!(detailed.contains("  /partials/web.yml.tera\n"));
    }

    #[test]
    fn test_render_error_wraps_cause() {
        use std::error::Error as _;

        let error = RenderError {
            filename: "web.yaml.tera".to_string(),
            cause: TemplateError::PartialTooDeep {
                name: "loop".to_string(),
                depth: 17,
                max: 16,
            },
        };

        assert_eq!(error.to_string(), "Template 'web.yaml.tera' cannot be rendered");
        let source = error.source().map(ToString::to_string).unwrap_or_default();
        assert!(source.contains("nesting too deep"));
    }

    #[test]
    fn test_evaluation_error_includes_suggestions() {
        let error = TemplateError::Evaluation {
            template: "web.yaml.tera".to_string(),
            message: "Variable `imgae` not found".to_string(),
            line: Some(3),
            suggestions: vec!["image".to_string()],
        };

        let detailed = error.format_with_context();
        assert!(detailed.contains("Line: 3"));
        assert!(detailed.contains("  - image"));
    }
}
