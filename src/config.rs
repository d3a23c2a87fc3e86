use crate::keys::{valid_modifier, valid_speed};
use crate::Vector3d;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Defaults reported by the builtin minecart keys for carts that
/// never had a value set.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CartDefaults {
    #[serde(default = "default_swiftness")]
    pub swiftness: f64,
    #[serde(default = "default_slow_when_empty")]
    pub slow_when_empty: bool,
    #[serde(default = "default_airborne_modifier")]
    pub airborne_velocity_modifier: Vector3d,
    #[serde(default = "default_derailed_modifier")]
    pub derailed_velocity_modifier: Vector3d,
}

fn default_swiftness() -> f64 { 0.4 }
fn default_slow_when_empty() -> bool { true }
fn default_airborne_modifier() -> Vector3d { Vector3d::splat(0.95) }
fn default_derailed_modifier() -> Vector3d { Vector3d::splat(0.5) }

impl Default for CartDefaults {
    fn default() -> Self {
        Self {
            swiftness: default_swiftness(),
            slow_when_empty: default_slow_when_empty(),
            airborne_velocity_modifier: default_airborne_modifier(),
            derailed_velocity_modifier: default_derailed_modifier(),
        }
    }
}

impl CartDefaults {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let defaults: CartDefaults = serde_json::from_str(json)?;
        defaults.validate()?;
        Ok(defaults)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Defaults must pass the same checks as offered values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !valid_speed(&self.swiftness) {
            return Err(ConfigError::Validation(format!(
                "swiftness must be a finite, non-negative number (got {})",
                self.swiftness
            )));
        }
        if !valid_modifier(&self.airborne_velocity_modifier) {
            return Err(ConfigError::Validation(
                "airborne_velocity_modifier must be finite".to_string(),
            ));
        }
        if !valid_modifier(&self.derailed_velocity_modifier) {
            return Err(ConfigError::Validation(
                "derailed_velocity_modifier must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
