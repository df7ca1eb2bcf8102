//! Core types for krender
//!
//! - [`error`] - CLI-level error types and user-friendly error reporting
//! - [`summary`] - The summary sink that collects human-readable failure paragraphs

pub mod error;
pub mod summary;

pub use error::{ErrorContext, KrenderError, user_friendly_error};
pub use summary::{DeploySummary, SummarySink};
