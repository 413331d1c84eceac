use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::brush::Falloff;
use crate::error::{ConfigError, ConfigResult};

/// Settings for the spray tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprayConfig {
    /// Maximum jitter of the stamp center, also the largest stamp radius
    pub scatter: f32,
    pub falloff: Falloff,
}

impl Default for SprayConfig {
    fn default() -> Self {
        Self {
            scatter: 50.0,
            falloff: Falloff::Cone,
        }
    }
}

/// Settings for the square (single pixel) tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquareConfig {
    pub weight: u8,
}

impl Default for SquareConfig {
    fn default() -> Self {
        Self { weight: 255 }
    }
}

/// Settings shared by menu controllers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Tag marking nodes whose click closes the open menu
    pub clickout_tag: String,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            clickout_tag: "*clickout".to_owned(),
        }
    }
}

/// Which skin's controllers to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinKind {
    #[default]
    Default,
    Experience,
    Futuretro,
}

/// Everything the scripts can be configured with.
/// Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub skin: SkinKind,
    pub spray: SprayConfig,
    pub square: SquareConfig,
    pub menu: MenuConfig,
}

impl ScriptConfig {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.spray.scatter.is_finite() && self.spray.scatter > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "spray.scatter must be positive, got {}",
                self.spray.scatter
            )));
        }
        if self.square.weight == 0 {
            return Err(ConfigError::Invalid("square.weight must be at least 1".to_owned()));
        }
        if self.menu.clickout_tag.is_empty() {
            return Err(ConfigError::Invalid("menu.clickout_tag must not be empty".to_owned()));
        }
        Ok(())
    }
}
