use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Durable part of a ship's flight state: where it is docked, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipSave {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docked_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docked_at: Option<u32>,
}

impl ShipSave {
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}
