use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logging::{LogConfig, LogFormat, LogLevel};
use crate::rep_detector::RepThresholds;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// General application settings
    pub settings: AppSettings,

    /// Repetition detector thresholds
    pub detector: RepThresholds,

    /// Motion sensor settings
    pub sensor: SensorSettings,

    /// Progress storage settings
    pub storage: StorageSettings,

    /// Logging settings
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Data directory path
    pub data_dir: PathBuf,

    /// Exercise catalog to use instead of the built-in one
    pub catalog_path: Option<PathBuf>,

    /// Ring the terminal bell on each rep
    pub rep_bell: bool,
}

/// Motion sensor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSettings {
    /// Delivery interval in milliseconds
    pub sample_interval_ms: u64,

    /// Use the motion sensor at all; false forces manual mode
    pub enabled: bool,
}

/// Progress storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database holding the streak (relative paths resolve against data_dir)
    pub database_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            settings: AppSettings::default(),
            detector: RepThresholds::default(),
            sensor: SensorSettings::default(),
            storage: StorageSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            data_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("moveability"),
            catalog_path: None,
            rep_bell: false,
        }
    }
}

impl Default for SensorSettings {
    fn default() -> Self {
        SensorSettings {
            sample_interval_ms: 100,
            enabled: true,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            database_path: PathBuf::from("progress.db"),
        }
    }
}

/// Keys understood by `get_value` / `set_value`
pub const CONFIG_KEYS: &[&str] = &[
    "settings.data_dir",
    "settings.catalog_path",
    "settings.rep_bell",
    "detector.rising_deg",
    "detector.falling_deg",
    "sensor.sample_interval_ms",
    "sensor.enabled",
    "storage.database_path",
    "logging.level",
    "logging.format",
    "logging.file_path",
];

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".moveability")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults when the file is missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        self.detector
            .validate()
            .context("Invalid detector thresholds")?;

        if self.sensor.sample_interval_ms == 0 {
            bail!("sensor.sample_interval_ms must be greater than zero");
        }

        Ok(())
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sensor.sample_interval_ms)
    }

    /// Resolved path of the progress database
    pub fn database_path(&self) -> PathBuf {
        if self.storage.database_path.is_absolute() {
            self.storage.database_path.clone()
        } else {
            self.settings.data_dir.join(&self.storage.database_path)
        }
    }

    /// Read a dotted configuration key as a display string
    pub fn get_value(&self, key: &str) -> Result<String> {
        let display_path = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };

        let value = match key {
            "settings.data_dir" => self.settings.data_dir.display().to_string(),
            "settings.catalog_path" => display_path(&self.settings.catalog_path),
            "settings.rep_bell" => self.settings.rep_bell.to_string(),
            "detector.rising_deg" => self.detector.rising_deg.to_string(),
            "detector.falling_deg" => self.detector.falling_deg.to_string(),
            "sensor.sample_interval_ms" => self.sensor.sample_interval_ms.to_string(),
            "sensor.enabled" => self.sensor.enabled.to_string(),
            "storage.database_path" => self.storage.database_path.display().to_string(),
            "logging.level" => self.logging.level.to_filter(),
            "logging.format" => format!("{:?}", self.logging.format).to_lowercase(),
            "logging.file_path" => display_path(&self.logging.file_path),
            _ => bail!("Unknown configuration key: {}", key),
        };

        Ok(value)
    }

    /// Set a dotted configuration key from a string. The result is
    /// validated; on error the configuration is left unchanged.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        let optional_path = |v: &str| {
            if v.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(v))
            }
        };
        let parse_bool = |v: &str| -> Result<bool> {
            v.parse::<bool>()
                .with_context(|| format!("Expected true/false for {}, got {}", key, v))
        };
        let parse_f64 = |v: &str| -> Result<f64> {
            v.parse::<f64>()
                .with_context(|| format!("Expected a number for {}, got {}", key, v))
        };

        match key {
            "settings.data_dir" => updated.settings.data_dir = PathBuf::from(value),
            "settings.catalog_path" => updated.settings.catalog_path = optional_path(value),
            "settings.rep_bell" => updated.settings.rep_bell = parse_bool(value)?,
            "detector.rising_deg" => updated.detector.rising_deg = parse_f64(value)?,
            "detector.falling_deg" => updated.detector.falling_deg = parse_f64(value)?,
            "sensor.sample_interval_ms" => {
                updated.sensor.sample_interval_ms = value
                    .parse()
                    .with_context(|| format!("Expected milliseconds for {}, got {}", key, value))?
            }
            "sensor.enabled" => updated.sensor.enabled = parse_bool(value)?,
            "storage.database_path" => updated.storage.database_path = PathBuf::from(value),
            "logging.level" => {
                updated.logging.level = value.parse::<LogLevel>().map_err(anyhow::Error::msg)?
            }
            "logging.format" => {
                updated.logging.format = value.parse::<LogFormat>().map_err(anyhow::Error::msg)?
            }
            "logging.file_path" => updated.logging.file_path = optional_path(value),
            _ => bail!("Unknown configuration key: {}", key),
        }

        updated.validate()?;
        updated.metadata.updated_at = Utc::now();
        *self = updated;
        Ok(())
    }
}
