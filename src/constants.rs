//! Global constants used throughout the krender codebase.
//!
//! File naming conventions, search layout and limits that are shared between
//! the renderer, the resolver and the command-line front end live here so the
//! conventions are discoverable in one place.

/// File extension that marks a file as a template.
///
/// Only files whose final extension is this marker are evaluated; every other
/// file passes through the renderer untouched.
pub const TEMPLATE_EXTENSION: &str = "tera";

/// Name of the directory that holds partials, relative to each search root.
pub const PARTIALS_DIR: &str = "partials";

/// Accepted partial file suffixes, in priority order.
///
/// A partial named `foo` resolves to `foo.yaml.tera` before `foo.yml.tera`.
pub const PARTIAL_SUFFIXES: &[&str] = &["yaml.tera", "yml.tera"];

/// Default maximum partial nesting depth.
///
/// The top-level template renders at depth 0 and each nested `partial()` call
/// adds one. Exceeding the limit fails with a "partial nesting too deep" error.
pub const DEFAULT_MAX_PARTIAL_DEPTH: usize = 16;

/// Number of leading commit SHA characters kept in the deployment id.
///
/// Pod names are limited to 63 characters, so the SHA is truncated to leave
/// room for the resource name.
pub const DEPLOYMENT_ID_SHA_LEN: usize = 8;

/// Number of random bytes appended (hex encoded) to the deployment id.
pub const DEPLOYMENT_ID_ENTROPY_BYTES: usize = 4;

/// Name of the variable holding the commit SHA inside templates.
pub const CURRENT_SHA_VAR: &str = "current_sha";

/// Name of the variable holding the deployment id inside templates.
pub const DEPLOYMENT_ID_VAR: &str = "deployment_id";

/// Name of the variable exposing a partial's own locals mapping.
pub const LOCALS_VAR: &str = "locals";

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "krender.toml";

/// File name suffixes rendered by the CLI when no filenames are given.
pub const RENDERABLE_SUFFIXES: &[&str] = &[".yml", ".yaml", ".yml.tera", ".yaml.tera"];
