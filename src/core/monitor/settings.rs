//! Live poll interval and threshold, re-read once per cycle.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{MonitorError, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_THRESHOLD: Duration = Duration::from_secs(10);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// A setting exactly as entered by the user, number or text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Parse as a positive number of seconds
    pub fn as_duration(&self) -> Option<Duration> {
        let secs = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };

        if secs.is_finite() && secs > 0.0 {
            Duration::try_from_secs_f64(secs).ok()
        } else {
            None
        }
    }
}

impl From<u64> for RawValue {
    fn from(secs: u64) -> Self {
        RawValue::Number(secs as f64)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// Unvalidated interval and threshold as read from a source.
///
/// Deserializes from the config file, ignoring every other field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    pub poll_interval: RawValue,
    pub threshold: RawValue,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL.as_secs().into(),
            threshold: DEFAULT_THRESHOLD.as_secs().into(),
        }
    }
}

/// Validated settings in force for one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub poll_interval: Duration,
    pub threshold: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl PollSettings {
    /// Per-probe timeout, always strictly shorter than the poll interval
    pub fn probe_timeout(&self, configured: Duration) -> Duration {
        if !configured.is_zero() && configured < self.poll_interval {
            configured
        } else {
            self.poll_interval / 2
        }
    }
}

/// Outcome of resolving one read
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub settings: PollSettings,
    /// Set when defaults were substituted, describing why
    pub fallback: Option<String>,
}

/// Validate a read; any malformed value puts both defaults in force.
pub fn resolve(read: Result<RawSettings>) -> Resolved {
    let raw = match read {
        Ok(raw) => raw,
        Err(e) => {
            return Resolved {
                settings: PollSettings::default(),
                fallback: Some(format!("could not read settings: {}", e)),
            }
        }
    };

    let interval = raw.poll_interval.as_duration();
    let threshold = raw.threshold.as_duration();

    match (interval, threshold) {
        (Some(poll_interval), Some(threshold)) => Resolved {
            settings: PollSettings {
                poll_interval,
                threshold,
            },
            fallback: None,
        },
        _ => {
            let mut bad = Vec::new();
            if interval.is_none() {
                bad.push(format!("poll interval {}", raw.poll_interval));
            }
            if threshold.is_none() {
                bad.push(format!("threshold {}", raw.threshold));
            }
            Resolved {
                settings: PollSettings::default(),
                fallback: Some(bad.join(", ")),
            }
        }
    }
}

/// Anything that can report the current interval and threshold.
pub trait SettingsSource: Send + Sync {
    fn read(&self) -> Result<RawSettings>;
}

/// Settings edited in memory, e.g. by a presentation layer.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<RawSettings>>,
}

impl SharedSettings {
    pub fn new(raw: RawSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(raw)),
        }
    }

    pub fn set_poll_interval<V: Into<RawValue>>(&self, value: V) {
        self.inner.write().poll_interval = value.into();
    }

    pub fn set_threshold<V: Into<RawValue>>(&self, value: V) {
        self.inner.write().threshold = value.into();
    }
}

impl SettingsSource for SharedSettings {
    fn read(&self) -> Result<RawSettings> {
        Ok(self.inner.read().clone())
    }
}

/// Settings that never change for the lifetime of the monitor
#[derive(Debug, Clone)]
pub struct FixedSettings(pub RawSettings);

impl SettingsSource for FixedSettings {
    fn read(&self) -> Result<RawSettings> {
        Ok(self.0.clone())
    }
}

/// Re-reads the config file on every cycle so edits apply live.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsSource for FileSettings {
    /// Only the interval and threshold are parsed, so a typo elsewhere in
    /// the file does not knock out valid settings
    fn read(&self) -> Result<RawSettings> {
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Err(MonitorError::config(format!("{:?} is empty", self.path)));
        }
        Ok(serde_json::from_str(&data)?)
    }
}
