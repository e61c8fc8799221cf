//! Configuration management
//!
//! The persisted macro table lives alongside the serial settings in one
//! TOML file under the platform config directory.

use crate::macros::MacroEntry;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Serial port configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Device path, e.g. /dev/ttyUSB0 or COM3
    #[serde(default = "default_port")]
    pub port: String,
    /// Line speed in baud
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Data bits per character (5-8)
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    /// Parity: "none", "odd" or "even"
    #[serde(default = "default_parity")]
    pub parity: String,
    /// Stop bits (1 or 2)
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    /// Flow control: "none", "software" or "hardware"
    #[serde(default = "default_flow_control")]
    pub flow_control: String,
    /// Write timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}
fn default_baud_rate() -> u32 {
    115_200
}
fn default_data_bits() -> u8 {
    8
}
fn default_parity() -> String {
    "none".to_string()
}
fn default_stop_bits() -> u8 {
    1
}
fn default_flow_control() -> String {
    "none".to_string()
}
fn default_timeout() -> u64 {
    500
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            parity: default_parity(),
            stop_bits: default_stop_bits(),
            flow_control: default_flow_control(),
            timeout_ms: default_timeout(),
        }
    }
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// How long fire confirmations stay visible, in milliseconds
    #[serde(default = "default_duration")]
    pub duration_ms: u64,
}

fn default_duration() -> u64 {
    800
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Serial port configuration
    #[serde(default)]
    pub serial: SerialConfig,
    /// Notification configuration
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Persisted macro table, in firing order
    #[serde(default)]
    pub macros: Vec<MacroEntry>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "serialpad", "SerialPad")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}
