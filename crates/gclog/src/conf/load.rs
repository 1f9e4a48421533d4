//! Load: config loading from file and environment variables.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use super::model::{ConfigError, ParserConfig};

pub const CONFIG_FILE_ENV: &str = "GCLOG_CONFIG_FILE";

impl ParserConfig {
    /// Load configuration from file and environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) if Path::new(&path).exists() => {
                tracing::info!("Loading configuration from: {}", path);
                Self::from_file(&path)?
            }
            Ok(path) => {
                tracing::info!("Config file not found at {}, using defaults", path);
                Self::default()
            }
            Err(_) => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load configuration from environment variables over defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(hint) = lookup("GCLOG_COLLECTOR_HINT") {
            self.collector_hint = Some(parse_value("GCLOG_COLLECTOR_HINT", &hint)?);
        }
        if let Some(start) = lookup("GCLOG_JVM_START") {
            self.jvm_start = Some(start);
        }
        if let Some(enabled) = lookup("GCLOG_PREPROCESS_ENABLED") {
            self.preprocess.enabled = parse_value("GCLOG_PREPROCESS_ENABLED", &enabled)?;
        }
        if let Some(discard) = lookup("GCLOG_DISCARD_NOISE") {
            self.preprocess.discard_noise = parse_value("GCLOG_DISCARD_NOISE", &discard)?;
        }
        if let Some(max) = lookup("GCLOG_MAX_BLOCK_LINES") {
            self.preprocess.max_block_lines = parse_value("GCLOG_MAX_BLOCK_LINES", &max)?;
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: err.to_string(),
    })
}
