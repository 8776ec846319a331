use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::monitor::settings::{DEFAULT_POLL_INTERVAL, DEFAULT_PROBE_TIMEOUT, DEFAULT_THRESHOLD};
use crate::core::monitor::{Device, DeviceList, RawSettings, RawValue};
use crate::core::notify::{AlertTemplate, SmtpConfig};
use crate::error::MonitorError;

/// How devices are probed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProbeMethod {
    /// System `ping`, one echo request
    #[default]
    Ping,
    /// TCP connect to the given port
    Tcp { port: u16 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub devices: Vec<Device>,
    /// Seconds between poll cycles; kept raw so hand edits can be reported
    #[serde(default = "default_poll_interval")]
    pub poll_interval: RawValue,
    /// Seconds of continuous downtime before an alert
    #[serde(default = "default_threshold")]
    pub threshold: RawValue,
    #[serde(default)]
    pub probe: ProbeMethod,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: f64,
    #[serde(default)]
    pub alert: AlertTemplate,
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Mail server for email alerts
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

fn default_poll_interval() -> RawValue {
    DEFAULT_POLL_INTERVAL.as_secs().into()
}

fn default_threshold() -> RawValue {
    DEFAULT_THRESHOLD.as_secs().into()
}

fn default_probe_timeout() -> f64 {
    DEFAULT_PROBE_TIMEOUT.as_secs_f64()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            poll_interval: default_poll_interval(),
            threshold: default_threshold(),
            probe: ProbeMethod::default(),
            probe_timeout_secs: default_probe_timeout(),
            alert: AlertTemplate::default(),
            webhook_url: None,
            smtp: None,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Ok(Self::load_from(&config_path))
    }

    /// Load from `path`; a missing, empty or corrupted file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }

        match Self::read_from(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Config::default()
            }
        }
    }

    /// Strict read used for live reloads; every problem is an error
    pub fn read_from(path: &Path) -> crate::Result<Self> {
        let data = fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Err(MonitorError::config(format!("{:?} is empty", path)));
        }
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, data)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("uptime-monitor").join("config.json"))
    }

    pub fn raw_settings(&self) -> RawSettings {
        RawSettings {
            poll_interval: self.poll_interval.clone(),
            threshold: self.threshold.clone(),
        }
    }

    pub fn device_list(&self) -> crate::Result<DeviceList> {
        DeviceList::new(self.devices.clone())
    }

    /// Configured probe timeout; invalid values give the default
    pub fn probe_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.probe_timeout_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_PROBE_TIMEOUT)
    }

    /// Add a device, or update the identifier of a known address.
    /// Returns true when a new device was added.
    pub fn add_device(&mut self, device: Device) -> bool {
        if let Some(existing) = self
            .devices
            .iter_mut()
            .find(|d| d.address == device.address)
        {
            existing.identifier = device.identifier;
            return false;
        }
        self.devices.push(device);
        true
    }

    pub fn remove_device(&mut self, address: &str) -> bool {
        let before = self.devices.len();
        self.devices.retain(|d| d.address != address);
        self.devices.len() != before
    }
}
