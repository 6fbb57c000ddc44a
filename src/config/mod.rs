#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::time::Duration;
use toml_config::DcubeConfig;

pub const DEFAULT_OUTPUT_PATH: &str = ".";

/// Values given on the command line. `None` means "not given", so the config
/// file (if any) gets a say.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub output_path: Option<String>,
}

/// Fully resolved connection and output settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub api_key: String,
    pub output_path: String,
    pub timeout_seconds: Option<u64>,
}

impl Settings {
    /// Merges command-line values over the config file. The base URL and the
    /// API key are required; a missing one is reported by name.
    pub fn resolve(overrides: SettingsOverrides, file: Option<&DcubeConfig>) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();

        let base_url = overrides.base_url.or(file.api.base_url);
        let api_key = overrides.api_key.or(file.api.key);

        let settings = Self {
            base_url: validation::validate_required_field("api.base_url", &base_url)?.clone(),
            api_key: validation::validate_required_field("api.key", &api_key)?.clone(),
            output_path: overrides
                .output_path
                .or(file.output.directory)
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
            timeout_seconds: file.api.timeout_seconds,
        };

        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.base_url)?;
        validation::validate_non_empty_string("api.key", &self.api_key)?;
        validation::validate_path("output.directory", &self.output_path)?;
        if let Some(timeout) = self.timeout_seconds {
            validation::validate_positive_number("api.timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}
