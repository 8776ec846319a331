//! Per-device monitoring state.

use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use super::device::{Device, DeviceList};
use crate::error::{MonitorError, Result};

/// Mutable record kept for one device during a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub address: String,
    pub identifier: String,
    /// Last successful probe, or session start
    pub last_seen: Instant,
    /// Set once a notification went out for the current outage
    pub notified: bool,
}

impl DeviceState {
    pub fn new(device: &Device, now: Instant) -> Self {
        Self {
            address: device.address.clone(),
            identifier: device.identifier.clone(),
            last_seen: now,
            notified: false,
        }
    }

    /// Time elapsed since the last successful probe
    pub fn unseen_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }
}

/// Read-only copy of a device's state for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    pub address: String,
    pub identifier: String,
    pub unseen_secs: f64,
    pub notified: bool,
}

/// Owns the [`DeviceState`] records of the current session.
///
/// Records keep the order the devices were supplied in.
#[derive(Debug, Default)]
pub struct StateStore {
    states: Vec<DeviceState>,
    index: HashMap<String, usize>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any previous session with fresh records for `devices`.
    pub fn initialize(&mut self, devices: &DeviceList, now: Instant) {
        self.states = devices.iter().map(|d| DeviceState::new(d, now)).collect();
        self.index = self
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.address.clone(), i))
            .collect();
    }

    pub fn get(&self, address: &str) -> Result<&DeviceState> {
        self.index
            .get(address)
            .map(|&i| &self.states[i])
            .ok_or_else(|| MonitorError::DeviceNotFound(address.to_string()))
    }

    /// Partial update; `last_seen` never moves backwards.
    pub fn update(
        &mut self,
        address: &str,
        last_seen: Option<Instant>,
        notified: Option<bool>,
    ) -> Result<()> {
        let i = *self
            .index
            .get(address)
            .ok_or_else(|| MonitorError::DeviceNotFound(address.to_string()))?;
        let state = &mut self.states[i];

        if let Some(seen) = last_seen {
            if seen > state.last_seen {
                state.last_seen = seen;
            }
        }
        if let Some(flag) = notified {
            state.notified = flag;
        }
        Ok(())
    }

    /// Apply a full state as returned by the evaluator
    pub fn apply(&mut self, state: &DeviceState) -> Result<()> {
        self.update(&state.address, Some(state.last_seen), Some(state.notified))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn snapshot(&self, now: Instant) -> Vec<DeviceSnapshot> {
        self.states
            .iter()
            .map(|s| DeviceSnapshot {
                address: s.address.clone(),
                identifier: s.identifier.clone(),
                unseen_secs: s.unseen_for(now).as_secs_f64(),
                notified: s.notified,
            })
            .collect()
    }
}
