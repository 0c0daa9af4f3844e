//! Configuration for biometric-art.
//!
//! Only the runtime plumbing is configurable: canvas size, frame and input
//! cadence, and the random seed. The heart rate cadence belongs to the
//! source. Classification and estimation thresholds are constants.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasConfig,

    /// Period between rendered frames
    #[serde(with = "duration_ms")]
    pub frame_interval: Duration,

    /// Period at which queued input events are drained between frames
    #[serde(with = "duration_ms")]
    pub input_poll_interval: Duration,

    /// Seed for particle jitter and synthetic noise; random when absent
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            frame_interval: Duration::from_millis(16),
            input_poll_interval: Duration::from_millis(4),
            seed: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("biometric-art")
            .join("config.json")
    }

    /// Reject values that would stall or break the session driver.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ConfigError::Invalid("canvas must be at least 1x1".to_string()));
        }
        for (name, interval) in [
            ("frame_interval", self.frame_interval),
            ("input_poll_interval", self.input_poll_interval),
        ] {
            if interval.is_zero() {
                return Err(ConfigError::Invalid(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }
}

/// Size of the visual surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration as whole milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.canvas.width, 800);
        assert_eq!(config.canvas.height, 400);
        assert_eq!(config.input_poll_interval, Duration::from_millis(4));
        assert_eq!(config.frame_interval, Duration::from_millis(16));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"seed": 42, "frame_interval": 33}"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.frame_interval, Duration::from_millis(33));
        assert_eq!(config.canvas, CanvasConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            input_poll_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("biometric-art-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"canvas": {"width": 320, "height": 240}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.canvas.width, 320);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::IoError(_))
        ));
    }
}
