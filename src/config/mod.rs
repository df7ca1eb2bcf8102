//! Configuration file support for krender.
//!
//! Settings that rarely change between runs of the same deployment repository
//! can live in a `krender.toml` file instead of being repeated on every
//! invocation. Command-line flags and environment variables always win over
//! the file.
//!
//! ```toml
//! template_dir = "deploy/templates"
//! max_partial_depth = 8
//!
//! [bindings]
//! environment = "staging"
//! replicas = 2
//!
//! [bindings.image]
//! repository = "registry.example.com/web"
//! ```
//!
//! # Location
//!
//! 1. The path given with `-c/--config` (must exist)
//! 2. `./krender.toml` when present
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::constants::DEFAULT_CONFIG_FILE;
use crate::core::KrenderError;
use crate::templating::Bindings;
use crate::utils::expand_path;

/// Contents of a `krender.toml` file.
///
/// Every field is optional; an absent file is equivalent to
/// `RenderConfig::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Directory holding the templates. `~` and `$VAR` are expanded; relative
    /// paths are taken relative to the directory containing the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<String>,

    /// Commit SHA of the revision being deployed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_sha: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_partial_depth: Option<usize>,

    /// Template variables merged beneath command-line bindings.
    #[serde(default, skip_serializing_if = "Bindings::is_empty")]
    pub bindings: Bindings,

    /// Directory of the file this configuration was loaded from.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl RenderConfig {
    /// Load configuration from an optional explicit path.
    ///
    /// An explicit path must exist. Without one, `./krender.toml` is used when
    /// present and defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid
    /// configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(&path).await,
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fs::try_exists(&default).await.unwrap_or(false) {
                    Self::load_from(&default).await
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// sets `max_partial_depth` to zero.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        if config.max_partial_depth == Some(0) {
            return Err(KrenderError::ConfigError {
                file: path.display().to_string(),
                reason: "max_partial_depth must be at least 1".to_string(),
            }
            .into());
        }

        config.base_dir = path.parent().map(Path::to_path_buf);
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// The configured template directory, expanded and anchored at the
    /// config file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path references an undefined environment
    /// variable.
    pub fn template_dir(&self) -> Result<Option<PathBuf>> {
        let Some(raw) = &self.template_dir else {
            return Ok(None);
        };

        let expanded = expand_path(raw)?;
        if expanded.is_absolute() {
            return Ok(Some(expanded));
        }

        Ok(Some(match &self.base_dir {
            Some(base) if !base.as_os_str().is_empty() => base.join(expanded),
            _ => expanded,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_full_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("krender.toml");
        fs::write(
            &path,
            r#"
template_dir = "templates"
current_sha = "abc123"
max_partial_depth = 4

[bindings]
environment = "staging"
replicas = 2

[bindings.image]
repository = "web"
"#,
        )
        .await
        .unwrap();

        let config = RenderConfig::load_from(&path).await.unwrap();
        assert_eq!(config.current_sha.as_deref(), Some("abc123"));
        assert_eq!(config.max_partial_depth, Some(4));
        assert_eq!(
            serde_json::Value::Object(config.bindings.clone()),
            json!({"environment": "staging", "replicas": 2, "image": {"repository": "web"}})
        );
        assert_eq!(config.template_dir().unwrap(), Some(temp.path().join("templates")));
    }

    #[tokio::test]
    async fn test_absolute_template_dir_is_kept() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("krender.toml");
        fs::write(&path, "template_dir = \"/srv/templates\"\n").await.unwrap();

        let config = RenderConfig::load_from(&path).await.unwrap();
        assert_eq!(config.template_dir().unwrap(), Some(PathBuf::from("/srv/templates")));
    }

    #[tokio::test]
    async fn test_empty_config_is_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("krender.toml");
        fs::write(&path, "").await.unwrap();

        let config = RenderConfig::load_from(&path).await.unwrap();
        assert_eq!(config.template_dir().unwrap(), None);
        assert!(config.bindings.is_empty());
        assert_eq!(config.max_partial_depth, None);
    }

    #[tokio::test]
    async fn test_explicit_missing_config_fails() {
        let temp = TempDir::new().unwrap();
        let result = RenderConfig::load_with_optional(Some(temp.path().join("nope.toml"))).await;
        assert!(result.unwrap_err().to_string().contains("Failed to read config"));
    }

    #[tokio::test]
    async fn test_unknown_keys_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("krender.toml");
        fs::write(&path, "templates_dir = \"x\"\n").await.unwrap();

        let error = RenderConfig::load_from(&path).await.unwrap_err();
        assert!(error.downcast_ref::<toml::de::Error>().is_some());
    }

    #[tokio::test]
    async fn test_zero_depth_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("krender.toml");
        fs::write(&path, "max_partial_depth = 0\n").await.unwrap();

        let error = RenderConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<KrenderError>(),
            Some(KrenderError::ConfigError { .. })
        ));
    }
}
