//! Configuration file handling

use std::path::Path;

use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::args::OutputFormat;

pub const CONFIG_FILE_NAME: &str = "sqlimpact.toml";

/// Configuration for sqlimpact
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Output format (json, ndjson, human)
    #[serde(default)]
    pub format: Option<OutputFormat>,

    /// Table name globs whose modification records are dropped
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Drop modification records of #temporary tables
    #[serde(default)]
    pub skip_temp_tables: bool,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents).wrap_err_with(|| format!("invalid configuration in {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).into_diagnostic()
    }

    /// Try to find and load sqlimpact.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let mut current_dir = std::env::current_dir().into_diagnostic()?;

        loop {
            let config_path = current_dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                tracing::debug!(path = %config_path.display(), "loading configuration");
                return Ok(Some(Self::from_file(&config_path)?));
            }

            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// The given file, or the nearest sqlimpact.toml, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::find_and_load()?.unwrap_or_default()),
        }
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        format: Option<OutputFormat>,
        exclude: &[String],
        skip_temp_tables: bool,
    ) -> Self {
        if format.is_some() {
            self.format = format;
        }

        if !exclude.is_empty() {
            self.exclude = exclude.to_vec();
        }

        if skip_temp_tables {
            self.skip_temp_tables = true;
        }

        self
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}
