//! Platform configuration.
//!
//! Read from JSON with camelCase keys; every field has a default so an
//! empty object is a valid configuration:
//!
//! ```json
//! {
//!   "stringRequire": { "enabled": true, "globalName": "shared", "publishing": "lazy" },
//!   "solver": "incremental"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("`{0}` cannot be used as the string require global")]
    InvalidGlobalName(String),
}

/// How the string-require function type is constructed for a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishingStrategy {
    /// Build the function type on first request.
    #[default]
    Eager,
    /// Publish a lazy placeholder, built on first use.
    Lazy,
}

/// Which checking backend analyzes scripts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    #[default]
    Eager,
    Incremental,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StringRequireConfig {
    pub enabled: bool,
    /// Name of the global called with a module name, e.g. `shared("Module")`.
    pub global_name: String,
    pub publishing: PublishingStrategy,
}

impl Default for StringRequireConfig {
    fn default() -> Self {
        StringRequireConfig {
            enabled: true,
            global_name: "shared".to_string(),
            publishing: PublishingStrategy::Eager,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformConfig {
    pub string_require: StringRequireConfig,
    pub solver: SolverKind,
}

/// Globals the platform defines itself.
const RESERVED_GLOBALS: &[&str] = &["require", "game", "script"];

impl PlatformConfig {
    pub fn from_json(json: &str) -> Result<PlatformConfig, ConfigError> {
        let config: PlatformConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<PlatformConfig, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        PlatformConfig::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.string_require.global_name;
        let is_identifier = name
            .chars()
            .next()
            .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
            && name.chars().all(|c| c == '_' || c.is_ascii_alphanumeric());
        if !is_identifier || RESERVED_GLOBALS.contains(&name.as_str()) {
            return Err(ConfigError::InvalidGlobalName(name.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod tests;
