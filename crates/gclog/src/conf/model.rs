//! Model: ParserConfig and related structs.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::decorator;
use crate::parser::model::CollectorKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Collector reported for shapes every collector prints the same way.
    pub collector_hint: Option<CollectorKind>,
    /// JVM start as `YYYY-MM-DDTHH:MM:SS.mmm+ZZZZ`.
    pub jvm_start: Option<String>,
    pub preprocess: PreprocessConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub enabled: bool,
    pub discard_noise: bool,
    pub max_block_lines: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            discard_noise: true,
            max_block_lines: 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("jvm_start '{0}' is not a datestamp")]
    InvalidDatestamp(String),
}

impl ParserConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.preprocess.validate()?;
        self.jvm_start_datetime()?;
        Ok(())
    }

    /// The configured JVM start, parsed.
    pub fn jvm_start_datetime(&self) -> Result<Option<DateTime<FixedOffset>>, ConfigError> {
        self.jvm_start
            .as_deref()
            .map(|text| {
                decorator::parse_datestamp(text.trim())
                    .ok_or_else(|| ConfigError::InvalidDatestamp(text.to_string()))
            })
            .transpose()
    }
}

impl PreprocessConfig {
    /// Validate preprocess configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.max_block_lines == 0 {
            return Err(ConfigError::InvalidValue {
                key: "preprocess.max_block_lines".to_string(),
                message: "must be > 0 when preprocessing is enabled".to_string(),
            });
        }
        Ok(())
    }
}
