//! ==============================================================================
//! config.rs - panel configuration loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `panel.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - DeviceConfig: where the device api lives and how long to wait.
//!     - SimulatorConfig: bind address and gpio pool of the fake device.
//!     - LoggingConfig: default tracing filter.
//!
//! ==============================================================================

use anyhow::Context;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct PanelConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    pub base_url: String,
    /// 0 waits forever
    pub timeout_seconds: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { base_url: "http://192.168.4.1".to_string(), timeout_seconds: 0 }
    }
}

impl DeviceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    pub bind: SocketAddr,
    /// every pin the fake device can assign
    pub pins: Vec<u8>,
}

/// output-capable pins of an esp32 devkit
pub const DEFAULT_PINS: [u8; 19] = [2, 4, 5, 12, 13, 14, 15, 16, 17, 18, 19, 21, 22, 23, 25, 26, 27, 32, 33];

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            pins: DEFAULT_PINS.to_vec(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl PanelConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load with default fallback
    ///
    /// an explicit path is the only candidate when given.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let paths: Vec<PathBuf> = match explicit {
            Some(p) => vec![p.to_path_buf()],
            None => vec![
                PathBuf::from("config").join("panel.toml"),
                PathBuf::from("..").join("config").join("panel.toml"),
            ],
        };

        for path in &paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        eprintln!("[CONFIG] Loaded from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        eprintln!("[CONFIG] Warning: {:#}", e);
                    }
                }
            } else if explicit.is_some() {
                eprintln!("[CONFIG] Warning: {} does not exist", path.display());
            }
        }

        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = PanelConfig::parse(
            r#"
            [device]
            base_url = "http://10.1.1.7"
            "#,
        )
        .unwrap();
        assert_eq!(config.device.base_url, "http://10.1.1.7");
        assert_eq!(config.device.timeout(), None);
        assert_eq!(config.simulator, SimulatorConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_full_file() {
        let config = PanelConfig::parse(
            r#"
            [device]
            base_url = "http://esp.local"
            timeout_seconds = 3

            [simulator]
            bind = "0.0.0.0:9000"
            pins = [4, 5]

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.device.timeout(), Some(Duration::from_secs(3)));
        assert_eq!(config.simulator.bind.port(), 9000);
        assert_eq!(config.simulator.pins, vec![4, 5]);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_file_and_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"warn\"").unwrap();
        let config = PanelConfig::load_or_default(Some(file.path()));
        assert_eq!(config.logging.level, "warn");

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        writeln!(broken, "[device\nbase_url = 1").unwrap();
        assert!(PanelConfig::load(broken.path()).is_err());
        assert_eq!(PanelConfig::load_or_default(Some(broken.path())), PanelConfig::default());
    }
}
