//! Cross-platform utilities and helpers
//!
//! # Modules
//!
//! - [`paths`] - Lexical path normalization and shell-style path expansion

pub mod paths;

pub use paths::{absolutize, expand_path, normalize_path};
