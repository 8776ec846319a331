//! Monitored devices and device list parsing.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{MonitorError, Result};

/// Identifier used when a device was supplied without one
pub const UNKNOWN_IDENTIFIER: &str = "Unknown";

/// A device to monitor, keyed by its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub address: String,
    #[serde(default = "unknown_identifier")]
    pub identifier: String,
}

fn unknown_identifier() -> String {
    UNKNOWN_IDENTIFIER.to_string()
}

impl Device {
    pub fn new<A: Into<String>>(address: A, identifier: Option<String>) -> Self {
        let identifier = identifier
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(unknown_identifier);

        Self {
            address: address.into().trim().to_string(),
            identifier,
        }
    }

    /// Parse `ADDR` or `ADDR=ID` as given on the command line
    pub fn parse_spec(spec: &str) -> Result<Self> {
        let device = match spec.split_once('=') {
            Some((address, identifier)) => Device::new(address, Some(identifier.to_string())),
            None => Device::new(spec, None),
        };
        device.validate()?;
        Ok(device)
    }

    pub fn validate(&self) -> Result<()> {
        if self.address.is_empty() {
            return Err(MonitorError::invalid_device("address must not be empty"));
        }
        if self.address.chars().any(char::is_whitespace) {
            return Err(MonitorError::invalid_device(format!(
                "address '{}' contains whitespace",
                self.address
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.identifier)
    }
}

/// Ordered, validated list of devices.
///
/// The order is the order the devices were supplied in and is the order
/// the monitor probes them in every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceList {
    devices: Vec<Device>,
}

impl DeviceList {
    /// Build a list, rejecting empty lists, blank addresses and duplicates.
    pub fn new(devices: Vec<Device>) -> Result<Self> {
        if devices.is_empty() {
            return Err(MonitorError::EmptyDeviceList);
        }

        let mut seen = HashSet::with_capacity(devices.len());
        for device in &devices {
            device.validate()?;
            if !seen.insert(device.address.as_str()) {
                return Err(MonitorError::DuplicateDevice(device.address.clone()));
            }
        }

        Ok(Self { devices })
    }

    /// Pair two index-aligned columns of addresses and identifiers.
    ///
    /// Blank lines are dropped from both columns before pairing; addresses
    /// without a matching identifier get [`UNKNOWN_IDENTIFIER`].
    pub fn from_columns<A, I>(addresses: &[A], identifiers: &[I]) -> Result<Self>
    where
        A: AsRef<str>,
        I: AsRef<str>,
    {
        let identifiers: Vec<&str> = identifiers
            .iter()
            .map(|id| id.as_ref().trim())
            .filter(|id| !id.is_empty())
            .collect();

        let devices = addresses
            .iter()
            .map(|a| a.as_ref().trim())
            .filter(|a| !a.is_empty())
            .enumerate()
            .map(|(i, address)| {
                Device::new(address, identifiers.get(i).map(|id| id.to_string()))
            })
            .collect();

        Self::new(devices)
    }

    /// Parse one device per line: `address [identifier]`.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut devices = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let address = parts.next().unwrap_or_default();
            let identifier = parts.next().map(str::to_string);
            if parts.next().is_some() {
                return Err(MonitorError::invalid_device(format!(
                    "line {}: expected 'address [identifier]', got '{}'",
                    line_no + 1,
                    line
                )));
            }

            devices.push(Device::new(address, identifier));
        }

        Self::new(devices)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Device> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn as_slice(&self) -> &[Device] {
        &self.devices
    }
}

impl<'a> IntoIterator for &'a DeviceList {
    type Item = &'a Device;
    type IntoIter = std::slice::Iter<'a, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}
