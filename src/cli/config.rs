//! File-based configuration for a [`crate::cli::Cli`]
//!
//! ```toml
//! timeout_ms = 30000
//! env_prefix = "APP"
//! env_file = ".env"
//!
//! [options]
//! configfile = "/etc/app.toml"
//! workers = 8
//! timeout = "1m30s"
//! ```
//!
//! Keys under `[options]` are flag names. They feed every field that is not
//! flag-only, as do `<ENV_PREFIX>_<FLAGNAME>` environment variables.

use crate::cli::error::{CliError, CliResult};
use crate::cli::options::{Sources, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level CLI configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    /// Deadline for each invocation, in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Prefix of environment variables feeding option fields
    #[serde(default)]
    pub env_prefix: Option<String>,
    /// `.env` file loaded before options are resolved
    #[serde(default)]
    pub env_file: Option<PathBuf>,
    /// Option values keyed by flag name
    #[serde(default)]
    pub options: toml::Table,
}

impl CliConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> CliResult<Self> {
        toml::from_str(content)
            .map_err(|e| CliError::ConfigError(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&content)?;

        // env_file is relative to the config file
        if let (Some(env_file), Some(dir)) = (&config.env_file, path.parent()) {
            if env_file.is_relative() {
                config.env_file = Some(dir.join(env_file));
            }
        }
        Ok(config)
    }

    /// Invocation deadline, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Load the env file, if any, and collect the configured option sources
    pub fn sources(&self) -> CliResult<Sources> {
        if let Some(env_file) = &self.env_file {
            dotenv::from_path(env_file).map_err(|e| {
                CliError::ConfigError(format!(
                    "Failed to load env file {}: {}",
                    env_file.display(),
                    e
                ))
            })?;
            tracing::debug!(path = %env_file.display(), "loaded env file");
        }

        let mut sources = Sources::new();
        if let Some(prefix) = &self.env_prefix {
            sources = sources.with_env_prefix(prefix.clone());
        }
        for (flag, value) in &self.options {
            sources = match value {
                toml::Value::String(raw) => sources.with_text(flag.clone(), raw.clone()),
                toml::Value::Integer(n) => sources.with_value(flag.clone(), Value::Int(*n)),
                toml::Value::Boolean(b) => sources.with_value(flag.clone(), Value::Bool(*b)),
                other => {
                    return Err(CliError::ConfigError(format!(
                        "option {}: unsupported value type {}",
                        flag,
                        other.type_str()
                    )))
                }
            };
        }
        Ok(sources)
    }
}
