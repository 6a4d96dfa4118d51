//! Engine configuration.
//!
//! ```
//! use enginemdf::EngineConfig;
//!
//! let config = EngineConfig::default()
//!     .with_cache(false)
//!     .with_default_unit("1");
//! assert!(!config.cache_channels);
//! ```

use std::path::Path;

use crate::{Error, Result};

/// Tunables of [`crate::EngineMdf`] and segment discovery.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Keep materialized channels so repeated requests skip the decoder.
    pub cache_channels: bool,
    /// Character placed between a colliding logical path and its group index.
    pub suffix_separator: char,
    /// Unit given to channels whose file metadata declares none.
    pub default_unit: String,
    /// Measurement key preferred when a channel is requested by name alone.
    pub default_measurement_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cache_channels: true,
            suffix_separator: '#',
            default_unit: "-".to_string(),
            default_measurement_key: "RecResult".to_string(),
        }
    }
}

impl EngineConfig {
    /// Enable or disable the channel cache.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_channels = enabled;
        self
    }

    /// Set the character used to qualify colliding logical paths.
    pub fn with_suffix_separator(mut self, separator: char) -> Self {
        self.suffix_separator = separator;
        self
    }

    /// Set the unit used when a segment declares none.
    pub fn with_default_unit(mut self, unit: impl Into<String>) -> Self {
        self.default_unit = unit.into();
        self
    }

    /// Set the measurement key [`crate::EngineMdf::get_logical`] prefers.
    pub fn with_default_measurement_key(mut self, key: impl Into<String>) -> Self {
        self.default_measurement_key = key.into();
        self
    }

    /// Parse a JSON document; missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values that would break path uniqueness or channel validation.
    pub fn validate(&self) -> Result<()> {
        let sep = self.suffix_separator;
        if sep.is_alphanumeric() || sep.is_whitespace() || sep == '/' {
            return Err(Error::Config(format!(
                "suffix separator {sep:?} must be a punctuation character other than '/'"
            )));
        }
        if self.default_unit.trim().is_empty() {
            return Err(Error::Config("default unit must not be empty".into()));
        }
        if self.default_measurement_key.trim().is_empty() {
            return Err(Error::Config(
                "default measurement key must not be empty".into(),
            ));
        }
        Ok(())
    }
}
