//! Service configuration
//!
//! Loads and validates YAML configuration for [`CommandService`](crate::CommandService).
//! Every field has a default, so an empty file (or no file at all) is valid.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "CMDROUTE_CONFIG";

/// Dispatcher behaviour switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Send failures to the evaluating sender as well as the log
    pub report_to_sender: bool,
    /// Reject registrations whose types have no parser
    pub strict_type_checks: bool,
    /// Convert handler panics into execution errors
    pub catch_panics: bool,
    /// Upper bound on "did you mean" suggestions
    pub max_suggestions: usize,
    /// Minimum Jaro-Winkler similarity for a suggestion, in `0.0..=1.0`
    pub suggestion_threshold: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            report_to_sender: true,
            strict_type_checks: true,
            catch_panics: true,
            max_suggestions: 3,
            suggestion_threshold: 0.8,
        }
    }
}

impl ServiceConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: ServiceConfig = if content.trim().is_empty() {
            ServiceConfig::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse service config")?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.suggestion_threshold) {
            return Err(anyhow!(
                "suggestion_threshold must be between 0.0 and 1.0, got {}",
                self.suggestion_threshold
            ));
        }
        Ok(())
    }
}

/// Locates and reads the service config file
pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Use the file named by `CMDROUTE_CONFIG`, or defaults when it is unset
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> Result<ServiceConfig> {
        let Some(path) = &self.path else {
            info!("No service config given, using defaults");
            return Ok(ServiceConfig::default());
        };

        info!("Loading service configuration from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        ServiceConfig::from_yaml_str(&content)
            .with_context(|| format!("Invalid service config in {}", path.display()))
    }
}
