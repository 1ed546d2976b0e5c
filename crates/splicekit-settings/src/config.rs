//! Configuration for the SpliceKit post-processing pipeline.
//!
//! Supports JSON and TOML files, dispatched on extension, with defaults that
//! match the pipeline's built-in parameters. A config file supplies defaults
//! only; command-line flags always win.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult};

/// Segment processing defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSettings {
    /// Segments shorter than this are merged into a neighbor; `<= 0`
    /// disables merging.
    pub min_segment_length_mm: f64,
    /// Extra purge length added at each color boundary.
    pub transition_length_mm: f64,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            min_segment_length_mm: 10.0,
            transition_length_mm: 0.0,
        }
    }
}

/// Output and rewriting defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Insert a spool-loading pause after the start sequence.
    pub add_pause_at_start: bool,
    /// Directive used for the pause (`M0` or `M600`).
    pub pause_command: String,
    /// Where artifacts are written; `None` means next to the input file.
    pub output_directory: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            add_pause_at_start: true,
            pause_command: "M0".to_string(),
            output_directory: None,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub processing: ProcessingSettings,
    #[serde(default)]
    pub output: OutputSettings,
    /// Color names by tool index, in order (index 0 first).
    #[serde(default)]
    pub color_names: Vec<String>,
}

impl Config {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a `.json` or `.toml` file.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::UnsupportedFormat(
                path.display().to_string(),
            ));
        };

        config.validate()?;
        Ok(config)
    }

    /// Save the config to a `.json` or `.toml` file.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(e.to_string()))?
        } else {
            return Err(SettingsError::UnsupportedFormat(
                path.display().to_string(),
            ));
        };

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.processing.transition_length_mm < 0.0 {
            return Err(SettingsError::InvalidSetting {
                key: "processing.transition_length_mm".to_string(),
                reason: "must be >= 0".to_string(),
            });
        }
        if self.output.pause_command.trim().is_empty() {
            return Err(SettingsError::InvalidSetting {
                key: "output.pause_command".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Default location of the user config file.
    pub fn default_path() -> SettingsResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| SettingsError::ConfigDirectory("no platform config dir".to_string()))?;
        Ok(base.join("splicekit").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_defaults() {
        let config = Config::new();
        assert_eq!(config.processing.min_segment_length_mm, 10.0);
        assert_eq!(config.processing.transition_length_mm, 0.0);
        assert!(config.output.add_pause_at_start);
        assert_eq!(config.output.pause_command, "M0");
        assert!(config.output.output_directory.is_none());
        assert!(config.color_names.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::new();
        config.processing.transition_length_mm = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.output.pause_command = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [processing]
            min_segment_length_mm = 25.0
            transition_length_mm = 5.0
            "#,
        )
        .expect("partial config parses");
        assert_eq!(config.processing.min_segment_length_mm, 25.0);
        assert_eq!(config.output.pause_command, "M0");
    }
}
