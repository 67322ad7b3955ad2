//! Application configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! name: train
//! about: Train a model
//! version: "1.2.0"
//! keep_extras: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings shared by every command an [`App`](crate::App) registers.
///
/// Missing keys take their [`Default`] values.
///
/// # Examples
///
/// ```
/// use argslot::AppConfig;
///
/// let config: AppConfig = serde_yaml::from_str("name: train\n").unwrap();
/// assert_eq!(config.name, "train");
/// assert!(!config.keep_extras);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Program name shown in usage and help.
    pub name: String,
    /// One-line description shown in help.
    pub about: Option<String>,
    /// Enables `--version` when set.
    pub version: Option<String>,
    /// Pass the full flat argument bag to every top-level function.
    pub keep_extras: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            about: None,
            version: None,
            keep_extras: false,
        }
    }
}

impl AppConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read, or
    /// [`ConfigError::YamlError`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be written, or
    /// [`ConfigError::YamlError`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
