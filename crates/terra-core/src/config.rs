//! Configuration loading and typed config structures for the Terra simulation.
//!
//! The canonical configuration lives in `terra-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty file is a valid configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::catalog::DEFAULT_MODEL;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from the configuration file.
    File,
    /// The file was missing; built-in defaults were used.
    Defaults,
}

/// Top-level configuration.
///
/// Mirrors the structure of `terra-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TerraConfig {
    /// Engine timing.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Analysis service connection.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Control API listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TerraConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `TERRA_ANALYSIS_URL` overrides `analysis.api_url`
    /// - `TERRA_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if an override or value is unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    ///
    /// Env overrides apply in both cases. The returned [`ConfigSource`]
    /// says which happened, so the caller can report it once logging is up.
    ///
    /// # Errors
    ///
    /// Same as [`TerraConfig::from_file`].
    pub fn load_or_default(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        if path.exists() {
            Ok((Self::from_file(path)?, ConfigSource::File))
        } else {
            Ok((Self::parse("")?, ConfigSource::Defaults))
        }
    }

    /// Parse configuration from a YAML string, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var("TERRA_ANALYSIS_URL") {
            self.analysis.api_url = url;
        }
        if let Ok(port) = std::env::var("TERRA_PORT") {
            self.server.port = port.parse().map_err(|e| ConfigError::Invalid {
                reason: format!("TERRA_PORT is not a port number: {e}"),
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.decay_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "simulation.decay_interval_ms must be at least 1".to_owned(),
            });
        }
        if self.analysis.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "analysis.model must not be empty".to_owned(),
            });
        }
        Ok(())
    }
}

/// Engine timing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Period of the passive decay timer in milliseconds.
    #[serde(default = "default_decay_interval_ms")]
    pub decay_interval_ms: u64,

    /// Pause between cosmetic thinking steps in milliseconds (0 disables pacing).
    #[serde(default = "default_thinking_step_ms")]
    pub thinking_step_ms: u64,

    /// Start the decay ticker as soon as the engine is up.
    #[serde(default)]
    pub autostart: bool,
}

impl SimulationConfig {
    /// Decay period as a [`Duration`].
    pub const fn decay_interval(&self) -> Duration {
        Duration::from_millis(self.decay_interval_ms)
    }

    /// Thinking step pause as a [`Duration`].
    pub const fn thinking_step(&self) -> Duration {
        Duration::from_millis(self.thinking_step_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            decay_interval_ms: default_decay_interval_ms(),
            thinking_step_ms: default_thinking_step_ms(),
            autostart: false,
        }
    }
}

/// Which analysis backend the engine talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisBackendKind {
    /// The HTTP analysis service at `api_url`.
    #[default]
    Http,
    /// Built-in stub that echoes the current state back (offline use).
    Stub,
}

/// Analysis service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: AnalysisBackendKind,

    /// Full URL commands are posted to.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier sent with each request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout in milliseconds (0 = wait forever).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl AnalysisConfig {
    /// Request timeout, or `None` when disabled.
    pub const fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.request_timeout_ms))
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            backend: AnalysisBackendKind::default(),
            api_url: default_api_url(),
            model: default_model(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Control API listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_decay_interval_ms() -> u64 {
    5_000
}

const fn default_thinking_step_ms() -> u64 {
    200
}

fn default_api_url() -> String {
    "http://localhost:3000/api/process-command".to_owned()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}

const fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TerraConfig::default();
        assert_eq!(config.simulation.decay_interval_ms, 5_000);
        assert_eq!(config.simulation.thinking_step_ms, 200);
        assert!(!config.simulation.autostart);
        assert_eq!(config.analysis.backend, AnalysisBackendKind::Http);
        assert_eq!(config.analysis.model, "llama3.2:1b");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
simulation:
  decay_interval_ms: 1000
  thinking_step_ms: 0
  autostart: true

analysis:
  backend: stub
  api_url: "http://analysis:3000/api/process-command"
  model: "qwen3:8b"
  request_timeout_ms: 0

server:
  host: "127.0.0.1"
  port: 9090

logging:
  level: "debug"
"#;
        let config = TerraConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.simulation.decay_interval(), Duration::from_secs(1));
        assert_eq!(config.simulation.thinking_step(), Duration::ZERO);
        assert!(config.simulation.autostart);
        assert_eq!(config.analysis.backend, AnalysisBackendKind::Stub);
        assert_eq!(config.analysis.model, "qwen3:8b");
        assert_eq!(config.analysis.request_timeout(), None);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = TerraConfig::parse("simulation:\n  decay_interval_ms: 250\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.simulation.decay_interval_ms, 250);
        assert_eq!(config.simulation.thinking_step_ms, 200);
        assert_eq!(
            config.analysis.request_timeout(),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(TerraConfig::parse("").is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let (config, source) =
            TerraConfig::load_or_default(Path::new("does/not/exist.yaml")).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config.simulation.decay_interval_ms, 5_000);
    }

    #[test]
    fn existing_file_is_reported_as_file() {
        let path = std::env::temp_dir().join(format!("terra-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "simulation:\n  decay_interval_ms: 250\n").unwrap();
        let loaded = TerraConfig::load_or_default(&path);
        std::fs::remove_file(&path).unwrap();

        let (config, source) = loaded.unwrap();
        assert_eq!(source, ConfigSource::File);
        assert_eq!(config.simulation.decay_interval_ms, 250);
    }

    #[test]
    fn zero_decay_interval_is_rejected() {
        let result = TerraConfig::parse("simulation:\n  decay_interval_ms: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn unknown_backend_is_a_yaml_error() {
        let result = TerraConfig::parse("analysis:\n  backend: carrier-pigeon\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("terra-config.yaml");
        if path.exists() {
            let config = TerraConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
