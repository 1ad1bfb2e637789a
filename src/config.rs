//! Configuration Module
//!
//! This module defines all configuration structures for the aggregator host.
//! Configuration is loaded from TOML files and parsed using serde.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main configuration structure
///
/// # Example TOML
/// ```toml
/// [aggregator]
/// capacity = 100
/// tick_interval_ms = 500
///
/// [channels]
/// input_buffer = 1024
/// output_buffer = 16
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub channels: ChannelConfig,
}

/// Batch flushing configuration
///
/// # Fields
/// - `capacity`: Number of items that triggers an immediate flush
/// - `tick_interval_ms`: Period of the flush timer. When absent the aggregator
///   runs in plain mode and only flushes on a full batch or stream end.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AggregatorConfig {
    pub capacity: usize,
    #[serde(default)]
    pub tick_interval_ms: Option<u64>,
}

impl AggregatorConfig {
    pub fn tick_interval(&self) -> Option<Duration> {
        self.tick_interval_ms.map(Duration::from_millis)
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            tick_interval_ms: Some(500),
        }
    }
}

/// Bounded channel sizes
///
/// `output_buffer` is the only backpressure knob: once that many batches are
/// waiting for the consumer, the worker suspends on its next flush.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_input_buffer")]
    pub input_buffer: usize,
    #[serde(default = "default_output_buffer")]
    pub output_buffer: usize,
}

fn default_input_buffer() -> usize {
    1024
}

fn default_output_buffer() -> usize {
    16
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            input_buffer: default_input_buffer(),
            output_buffer: default_output_buffer(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was read, parsed and validated
    /// * `Err(ConfigError)` otherwise
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Like [`Config::load`], but a missing file yields the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aggregator.capacity == 0 {
            return Err(ConfigError::Invalid(
                "aggregator.capacity must be at least 1".to_string(),
            ));
        }
        if self.aggregator.tick_interval_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "aggregator.tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        // tokio::sync::mpsc::channel panics on a zero buffer
        if self.channels.input_buffer == 0 || self.channels.output_buffer == 0 {
            return Err(ConfigError::Invalid(
                "channel buffers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml_str(
            r#"
            [aggregator]
            capacity = 10
            tick_interval_ms = 250

            [channels]
            input_buffer = 8
            output_buffer = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.aggregator.capacity, 10);
        assert_eq!(config.aggregator.tick_interval(), Some(Duration::from_millis(250)));
        assert_eq!(config.channels.input_buffer, 8);
        assert_eq!(config.channels.output_buffer, 2);
    }

    #[test]
    fn test_missing_tick_interval_means_plain_mode() {
        let config = Config::from_toml_str("[aggregator]\ncapacity = 3\n").unwrap();

        assert_eq!(config.aggregator.tick_interval(), None);
        assert_eq!(config.channels, ChannelConfig::default());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = Config::from_toml_str("[aggregator]\ncapacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let err = Config::from_toml_str("[aggregator]\ncapacity = 1\ntick_interval_ms = 0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_output_buffer_rejected() {
        let err = Config::from_toml_str(
            "[aggregator]\ncapacity = 1\n[channels]\noutput_buffer = 0\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml_str("[aggregator\ncapacity = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = Config::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
