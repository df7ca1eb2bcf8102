//! Partial lookup across the configured search directories.
//!
//! A partial name is tried against every search directory in order and,
//! within each directory, against every accepted suffix in order. The first
//! file that exists wins; lower-priority candidates are never read. Nothing is
//! cached, so every resolution sees the current state of the filesystem.

use std::path::{Component, Path, PathBuf};

use anyhow::Result;

use super::error::TemplateError;
use crate::constants::{PARTIALS_DIR, PARTIAL_SUFFIXES};
use crate::utils::absolutize;

/// A partial located on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPartial {
    pub name: String,
    pub path: PathBuf,
    pub content: String,
}

/// Finds partial files by name.
#[derive(Debug, Clone)]
pub struct PartialResolver {
    search_dirs: Vec<PathBuf>,
    suffixes: Vec<String>,
}

impl PartialResolver {
    /// Create a resolver for templates under `template_dir`.
    ///
    /// Searches `<template_dir>/partials` and then `<template_dir>/../partials`,
    /// both made absolute now so later changes of the working directory do not
    /// affect resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if `template_dir` is relative and the current
    /// directory cannot be determined.
    pub fn new(template_dir: &Path) -> Result<Self> {
        let root = absolutize(template_dir)?;
        let search_dirs = vec![
            root.join(PARTIALS_DIR),
            absolutize(&root.join("..").join(PARTIALS_DIR))?,
        ];
        Ok(Self::with_search_dirs(search_dirs, PARTIAL_SUFFIXES.iter().map(ToString::to_string)))
    }

    /// Create a resolver with an explicit search order.
    pub fn with_search_dirs(
        search_dirs: Vec<PathBuf>,
        suffixes: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            search_dirs,
            suffixes: suffixes.into_iter().collect(),
        }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Every candidate path for `name`, in priority order.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        self.search_dirs
            .iter()
            .flat_map(|dir| {
                self.suffixes.iter().map(move |suffix| dir.join(format!("{name}.{suffix}")))
            })
            .collect()
    }

    /// Locate and read the partial called `name`.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::InvalidPartialName`] for empty or absolute names, and
    ///   names with `..` components
    /// - [`TemplateError::PartialNotFound`] when no candidate exists; the error
    ///   lists every candidate path once, in search order
    /// - [`TemplateError::PartialUnreadable`] when the winning file cannot be read
    pub fn resolve(&self, name: &str) -> Result<ResolvedPartial, TemplateError> {
        validate_partial_name(name)?;

        let candidates = self.candidates(name);
        let Some(path) = candidates.iter().find(|path| path.is_file()).cloned() else {
            tracing::debug!("Partial '{}' not found in {} candidate(s)", name, candidates.len());
            return Err(TemplateError::PartialNotFound {
                name: name.to_string(),
                attempted: candidates,
            });
        };

        tracing::debug!("Resolved partial '{}' to {}", name, path.display());
        let content =
            std::fs::read_to_string(&path).map_err(|e| TemplateError::PartialUnreadable {
                name: name.to_string(),
                path: path.clone(),
                message: e.to_string(),
            })?;

        Ok(ResolvedPartial {
            name: name.to_string(),
            path,
            content,
        })
    }
}

fn validate_partial_name(name: &str) -> Result<(), TemplateError> {
    let reason = if name.trim().is_empty() {
        "name is empty"
    } else if Path::new(name).is_absolute() || name.starts_with('/') {
        "absolute paths are not allowed"
    } else if Path::new(name).components().any(|c| matches!(c, Component::ParentDir)) {
        "'..' would leave the partials directories"
    } else {
        return Ok(());
    };

    Err(TemplateError::InvalidPartialName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}
