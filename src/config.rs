//! Declarative device configuration
//!
//! Loads the scan parameters and hardware wiring from a toml file under the
//! user's home directory. A missing file degrades gracefully to defaults
//! written to disk; a file that parses but violates the grid invariants is
//! fatal and the device does not come up.

use crate::matrix::{AxisThresholds, ColumnLayout};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const CONFIG_DIR: &str = ".config/joyscan";
const CONFIG_FILE: &str = "joyscan.toml";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value violates an initialization invariant; fatal
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Scan matrix parameters, fixed for the lifetime of the device.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ScanConfig {
    /// Poll period in milliseconds
    pub poll_period_ms: u64,
    /// Raw sample value at stick rest
    pub center: i32,
    /// Half-width of the no-motion band around center, in sample units
    pub deadzone: i32,
    /// Extra margin an engaged direction must give back, in sample units
    pub hysteresis: i32,
    /// Swap left/right on the X axis
    pub invert_x: bool,
    /// Swap up/down on the Y axis
    pub invert_y: bool,
    /// Number of physical buttons
    pub button_count: u8,
    /// First column assigned to buttons; columns 0-3 carry the directions
    pub button_column_offset: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            poll_period_ms: 20,
            center: 2048, // 12 bit midpoint, matches the gamepad provider scale
            deadzone: 200,
            hysteresis: 50,
            invert_x: false,
            invert_y: false,
            button_count: 2,
            button_column_offset: 4,
        }
    }
}

impl ScanConfig {
    pub fn thresholds(&self) -> AxisThresholds {
        AxisThresholds {
            center: self.center,
            deadzone: self.deadzone,
            hysteresis: self.hysteresis,
        }
    }

    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout {
            button_count: self.button_count,
            button_offset: self.button_column_offset,
        }
    }

    /// Validates the invariants that are fatal at initialization.
    ///
    /// Crossed threshold bands (`hysteresis >= deadzone`) are deliberately
    /// not rejected; the quantizer tolerates them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_period_ms must be at least 1".to_string(),
            ));
        }

        self.layout()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Selects which hardware backend feeds the scanner.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Desktop gamepad through gilrs
    #[default]
    Gamepad,
    /// MCP3008 ADC axes plus GPIO buttons through rppal
    AdcGpio,
}

/// Raspberry Pi wiring for the adc-gpio provider.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct HardwareConfig {
    /// MCP3008 channel carrying the X axis
    pub adc_channel_x: u8,
    /// MCP3008 channel carrying the Y axis
    pub adc_channel_y: u8,
    /// BCM pin numbers of the button inputs, in column order
    pub button_pins: Vec<u8>,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            adc_channel_x: 0,
            adc_channel_y: 1,
            button_pins: vec![17, 27],
        }
    }
}

/// Top-level contents of the configuration file.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct JoyscanConfig {
    pub provider: ProviderKind,
    pub scan: ScanConfig,
    pub hardware: HardwareConfig,
}

impl JoyscanConfig {
    /// Loads the configuration from the default location, writing a default
    /// file when none exists yet.
    pub async fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path()).await
    }

    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if tokio::fs::try_exists(path).await? {
            let content = tokio::fs::read_to_string(path).await?;
            let config: JoyscanConfig = toml::from_str(&content)?;
            config.scan.validate()?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            warn!(
                "Config file {} does not exist, writing defaults",
                path.display()
            );
            let config = JoyscanConfig::default();
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, toml::to_string_pretty(&config)?).await?;
            Ok(config)
        }
    }
}

fn config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    });
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn full_grid_is_accepted_and_one_more_rejected() {
        let mut config = ScanConfig {
            button_count: 28,
            button_column_offset: 4,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_ok());

        config.button_count = 29;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn offset_below_direction_columns_is_rejected() {
        let config = ScanConfig {
            button_column_offset: 3,
            ..ScanConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_poll_period_is_rejected() {
        let config = ScanConfig {
            poll_period_ms: 0,
            ..ScanConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn crossed_bands_are_not_rejected() {
        let config = ScanConfig {
            deadzone: 100,
            hysteresis: 150,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = JoyscanConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: JoyscanConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.provider, config.provider);
        assert_eq!(parsed.scan.center, config.scan.center);
        assert_eq!(parsed.scan.button_count, config.scan.button_count);
        assert_eq!(parsed.hardware.button_pins, config.hardware.button_pins);
    }
}
