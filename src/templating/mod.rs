//! Manifest templating engine for krender.
//!
//! This module renders deployment manifest templates written in Tera syntax
//! into plain YAML. Templates can include named partials, which are looked
//! up on disk, rendered recursively and spliced back into the including
//! document in a form that is safe at any indentation.
//!
//! # Overview
//!
//! - [`Scope`] holds the variables visible to one template or partial.
//! - [`PartialResolver`] finds a partial's file by name.
//! - [`Renderer`] evaluates templates and registers the `partial` function.
//! - [`normalize`] turns embedded partial output into single-line JSON.
//!
//! # Template Variables
//!
//! Every template sees:
//! - `current_sha`: the commit SHA being deployed (or null)
//! - `deployment_id`: the first 8 characters of the SHA plus 8 random hex
//!   characters, fixed for the whole renderer
//! - every caller binding, which may override the two above
//!
//! A partial additionally sees the locals it was called with, both as
//! top-level variables and as the `locals` mapping.
//!
//! # Partials
//!
//! `{{ partial(name="labels", tier="backend") }}` searches, in order:
//!
//! 1. `<template_dir>/partials/labels.yaml.tera`
//! 2. `<template_dir>/partials/labels.yml.tera`
//! 3. `<template_dir>/../partials/labels.yaml.tera`
//! 4. `<template_dir>/../partials/labels.yml.tera`
//!
//! ## Embedding
//!
//! Partial output is spliced as text, so a multi-line YAML fragment would
//! break as soon as it is included at a different indentation than it was
//! written for. Unless the output contains a bare `---` line (a complete
//! document stream, spliced as-is), it is parsed and re-emitted as compact
//! JSON:
//!
//! ```text
//! # partials/container.yaml.tera
//! name: app
//! image: {{ image }}
//! ports:
//!   - containerPort: 8080
//!
//! # web.yaml.tera
//! spec:
//!   containers:
//!     - {{ partial(name="container", image="nginx:1.25") }}
//!
//! # rendered
//! spec:
//!   containers:
//!     - {"image":"nginx:1.25","name":"app","ports":[{"containerPort":8080}]}
//! ```
//!
//! ## Recursion
//!
//! Partials may include partials. Nesting is bounded by
//! [`RendererOptions::max_partial_depth`]; exceeding it fails with
//! [`TemplateError::PartialTooDeep`] instead of exhausting the stack.
//!
//! # Whitespace
//!
//! Use Tera's trim markers (`{%-`, `-%}`, `{{-`, `-}}`) to keep control-flow
//! tags from leaving blank lines behind.

pub mod error;
pub mod normalize;
pub mod partial;
pub mod renderer;
pub mod resolver;
pub mod scope;
pub mod utils;


pub use error::{RenderError, TemplateError};
pub use normalize::{FragmentKind, classify, normalize, parse_document_stream};
pub use partial::PartialFunction;
pub use renderer::{Renderer, RendererOptions, is_template_file};
pub use resolver::{PartialResolver, ResolvedPartial};
pub use scope::{Bindings, Scope, build_scope, generate_deployment_id};
pub use utils::{deep_merge_json, merge_bindings};
