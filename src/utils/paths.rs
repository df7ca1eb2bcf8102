//! Path utilities for normalization and expansion.
//!
//! The renderer fixes its partial search directories once, at construction
//! time, as absolute and lexically normalized paths. Nothing here touches the
//! filesystem, so directories that do not exist yet (a missing shared
//! `../partials`, for instance) are still representable.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Normalizes a path by resolving `.` and `..` components.
///
/// This performs logical resolution only: symbolic links are not followed and
/// the path does not have to exist. A `..` at the root of an absolute path is
/// dropped, matching how the operating system treats `/..`.
///
/// # Examples
///
/// ```rust,no_run
/// use krender::utils::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// let normalized = normalize_path(Path::new("/deploy/templates/../partials"));
/// assert_eq!(normalized, PathBuf::from("/deploy/partials"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Turns `path` into an absolute, normalized path.
///
/// Relative paths are joined onto the current working directory first.
///
/// # Errors
///
/// Returns an error if the path is relative and the current directory cannot
/// be determined.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Ok(normalize_path(&cwd.join(path)))
}

/// Expands `~` and environment variables in a user-supplied path.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is undefined.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand path '{path}'"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
