//! Controller configuration, stored as JSON

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::LightOptions;

/// A light to manage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Local name, used in logs and to address the light from the CLI
    pub name: String,
    /// BLE address, or a substring of the advertised name
    pub address: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub devices: Vec<DeviceEntry>,
    /// Seconds between QueryAll refreshes; 0 disables polling
    pub poll_interval_secs: u64,
    /// Deadline for connect and service discovery
    pub timeout_secs: u64,
    /// How long to scan when looking for a light
    pub scan_secs: u64,
    pub characteristic_uuid: String,
    /// Keep a frame split across notifications instead of dropping it
    pub carry_over_partial_frames: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            poll_interval_secs: 30,
            timeout_secs: 10,
            scan_secs: 5,
            characteristic_uuid: blelight_proto::ble::CHARACTERISTIC_UUID.to_string(),
            carry_over_partial_frames: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Config {
    /// Load from `path`; a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn enabled_devices(&self) -> impl Iterator<Item = &DeviceEntry> {
        self.devices.iter().filter(|d| d.enabled)
    }

    /// Find a configured light by name or address
    pub fn find_device(&self, target: &str) -> Option<&DeviceEntry> {
        self.devices
            .iter()
            .find(|d| d.name == target || d.address.eq_ignore_ascii_case(target))
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_secs > 0).then(|| Duration::from_secs(self.poll_interval_secs))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn scan_duration(&self) -> Duration {
        Duration::from_secs(self.scan_secs)
    }

    pub fn light_options(&self) -> LightOptions {
        LightOptions {
            poll_interval: self.poll_interval(),
            carry_over_partial_frames: self.carry_over_partial_frames,
        }
    }
}
