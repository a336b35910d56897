//! Project configuration.
//!
//! A project carries one configuration file in its root directory, in any
//! of the recognized formats. The loaded [`Config`] is constructed once per
//! command and passed by reference into everything that needs it — there is
//! no process-wide configuration state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Recognized configuration file names, in search order.
pub const CONFIG_NAMES: &[&str] = &["sable.yaml", "sable.yml", "sable.json", "sable.toml"];

/// Output directory name used when the config does not set one.
pub const DEFAULT_OUTPUT: &str = "build";

/// Fixed layout for front matter `date` values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("configuration file sable.[yaml|yml|json|toml] missing: {0}")]
    NotFound(PathBuf),

    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("configuration file `{path}` is malformed: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// Options that may appear in a project configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output directory name, relative to the project root.
    pub output: Option<String>,

    /// Output-root entries that `clean` leaves in place.
    pub preserve: Vec<String>,

    /// Verbose diagnostics. Set from the CLI, never from the file.
    #[serde(skip)]
    pub verbose: bool,
}

impl Config {
    /// Find the configuration file in a project directory.
    pub fn search(dir: &Path) -> Result<PathBuf, ConfigError> {
        for name in CONFIG_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        Err(ConfigError::NotFound(dir.to_path_buf()))
    }

    /// Load a configuration file, dispatching on its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let malformed = |message: String| ConfigError::Malformed {
            path: path.to_path_buf(),
            message,
        };

        // An empty file is a valid, all-defaults configuration.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&text).map_err(|e| malformed(e.to_string())),
            "json" => serde_json::from_str(&text).map_err(|e| malformed(e.to_string())),
            "toml" => toml::from_str(&text).map_err(|e| malformed(e.to_string())),
            other => Err(malformed(format!("unsupported format: {other}"))),
        }
    }

    /// Find and load the configuration for a project directory.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::search(dir)?;
        Self::load(&path)
    }

    /// The configured output directory name, or the default.
    pub fn output_dir(&self) -> &str {
        self.output.as_deref().unwrap_or(DEFAULT_OUTPUT)
    }
}
