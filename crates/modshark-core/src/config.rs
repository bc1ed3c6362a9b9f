//! Analysis configuration.
//!
//! Every field has a default, so an empty JSON object is a complete
//! configuration. Unknown fields are rejected to surface typos early.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocols::modbus::layout::MODBUS_TCP_PORT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid Modbus port: {port}")]
    InvalidPort { port: u16 },
}

/// Top-level configuration for the analysis pipeline.
///
/// # Examples
/// ```
/// use modshark_core::AnalysisConfig;
///
/// let config = AnalysisConfig::from_json_str(r#"{"modbus": {"port": 5020}}"#)?;
/// assert_eq!(config.modbus.port, 5020);
/// assert!(config.modbus.claim_application_layer);
/// # Ok::<(), modshark_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub modbus: ModbusConfig,
}

/// Registration settings for the MBAP decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModbusConfig {
    /// TCP port the decoder is bound to.
    pub port: u16,
    /// Whether a decoded MBAP layer claims the packet's application layer.
    pub claim_application_layer: bool,
}

impl Default for ModbusConfig {
    fn default() -> Self {
        Self {
            port: MODBUS_TCP_PORT,
            claim_application_layer: true,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.modbus.port == 0 {
            return Err(ConfigError::InvalidPort {
                port: self.modbus.port,
            });
        }
        Ok(())
    }
}
