//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/bomtree/bomtree.toml`
//! 3. Local config: `<project_dir>/.bomtree.toml`
//! 4. Environment variables: `BOMTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

/// Default definition file name.
pub const DEFAULT_DEFINITIONS_FILE: &str = "definitions.txt";
/// Default query file name.
pub const DEFAULT_QUERIES_FILE: &str = "queries.txt";
/// Line printed between query answers and the part listing.
pub const DEFAULT_SEPARATOR: &str = "---------------";

/// Unified configuration for bomtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Definition file (`<parent> <quantity> <child>` per line)
    pub definitions_file: PathBuf,
    /// Query file (`whatis` / `howmany` per line)
    pub queries_file: PathBuf,
    /// Separator line used by `run`
    pub separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            definitions_file: PathBuf::from(DEFAULT_DEFINITIONS_FILE),
            queries_file: PathBuf::from(DEFAULT_QUERIES_FILE),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub definitions_file: Option<PathBuf>,
    pub queries_file: Option<PathBuf>,
    pub separator: Option<String>,
}

/// Get the XDG config directory for bomtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bomtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("bomtree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".bomtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the path as is.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(raw.as_ref()) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            debug!("cannot expand {}: {}", raw, e);
            path.to_path_buf()
        }
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            definitions_file: overlay
                .definitions_file
                .clone()
                .unwrap_or_else(|| self.definitions_file.clone()),
            queries_file: overlay
                .queries_file
                .clone()
                .unwrap_or_else(|| self.queries_file.clone()),
            separator: overlay
                .separator
                .clone()
                .unwrap_or_else(|| self.separator.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory: holds the local config and
    ///   anchors relative input paths
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Project-local config
        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        if let Some(dir) = project_dir {
            current.anchor_paths(dir);
        }

        Ok(current)
    }

    /// Apply BOMTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("BOMTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("definitions_file") {
            settings.definitions_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("queries_file") {
            settings.queries_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("separator") {
            settings.separator = val;
        }

        Ok(settings)
    }

    fn expand_paths(&mut self) {
        self.definitions_file = expand_path(&self.definitions_file);
        self.queries_file = expand_path(&self.queries_file);
    }

    /// Resolve relative input paths against `dir`.
    fn anchor_paths(&mut self, dir: &Path) {
        if self.definitions_file.is_relative() {
            self.definitions_file = dir.join(&self.definitions_file);
        }
        if self.queries_file.is_relative() {
            self.queries_file = dir.join(&self.queries_file);
        }
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_with_keeps_unspecified_fields() {
        let base = Settings::default();
        let overlay = RawSettings {
            separator: Some("===".into()),
            ..RawSettings::default()
        };
        let merged = base.merge_with(&overlay);
        assert_eq!(merged.separator, "===");
        assert_eq!(merged.definitions_file, PathBuf::from(DEFAULT_DEFINITIONS_FILE));
    }

    #[test]
    fn test_anchor_paths_leaves_absolute_paths() {
        let mut settings = Settings {
            definitions_file: PathBuf::from("/abs/defs.txt"),
            ..Settings::default()
        };
        settings.anchor_paths(Path::new("/project"));
        assert_eq!(settings.definitions_file, PathBuf::from("/abs/defs.txt"));
        assert_eq!(settings.queries_file, PathBuf::from("/project/queries.txt"));
    }

    #[test]
    fn test_to_toml_contains_fields() {
        let rendered = Settings::default().to_toml().unwrap();
        assert!(rendered.contains("definitions_file = \"definitions.txt\""));
        assert!(rendered.contains("separator"));
    }
}
