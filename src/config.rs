//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.orderstat.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Task name shown in the report header.
    #[serde(default = "default_task")]
    pub task: String,

    /// Fixed run identifier; a timestamp is generated when absent.
    #[serde(default)]
    pub run_id: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            task: default_task(),
            run_id: None,
            verbose: false,
        }
    }
}

fn default_task() -> String {
    "conversion".to_string()
}

/// Order file scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// File extensions to include.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory or file names to exclude.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,

    /// Maximum file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Maximum number of files per scanned directory.
    #[serde(default)]
    pub max_files: Option<usize>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            excludes: default_excludes(),
            max_file_size: default_max_file_size(),
            max_files: None,
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["xml".to_string()]
}

fn default_excludes() -> Vec<String> {
    vec!["archive", "tmp", "logs"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_file_size() -> u64 {
    1024 * 1024 // 1MB
}

/// Report generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Report destination; stdout when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but
    /// can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".orderstat.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings; options the
    /// caller did not pass leave the config values in place.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref task) = args.task {
            self.general.task = task.clone();
        }
        if let Some(ref run_id) = args.run_id {
            self.general.run_id = Some(run_id.clone());
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(ref output) = args.output {
            self.report.output = Some(output.clone());
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.task, "conversion");
        assert_eq!(config.scanner.extensions, vec!["xml".to_string()]);
        assert_eq!(config.report.format, OutputFormat::Text);
        assert!(config.report.output.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
task = "import"
run_id = "nightly-7"
verbose = true

[scanner]
extensions = ["xml", "ord"]
max_files = 500

[report]
format = "json"
output = "stats.json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.task, "import");
        assert_eq!(config.general.run_id.as_deref(), Some("nightly-7"));
        assert!(config.general.verbose);
        assert_eq!(config.scanner.extensions, vec!["xml", "ord"]);
        assert_eq!(config.scanner.max_files, Some(500));
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.report.output, Some(PathBuf::from("stats.json")));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[scanner]"));
        assert!(toml_str.contains("[report]"));
    }
}
