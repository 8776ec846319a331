use std::io;
use thiserror::Error;

/// Custom error type for the uptime monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("No devices to monitor")]
    EmptyDeviceList,

    #[error("Invalid device: {0}")]
    InvalidDevice(String),

    #[error("Duplicate device address: {0}")]
    DuplicateDevice(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Monitoring is already running")]
    AlreadyRunning,

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the uptime monitor
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        MonitorError::Config(msg.into())
    }

    /// Create an invalid device error
    pub fn invalid_device<S: Into<String>>(msg: S) -> Self {
        MonitorError::InvalidDevice(msg.into())
    }

    pub fn probe<S: Into<String>>(msg: S) -> Self {
        MonitorError::Probe(msg.into())
    }

    pub fn notification<S: Into<String>>(msg: S) -> Self {
        MonitorError::Notification(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        MonitorError::Other(msg.into())
    }

    /// True for errors raised by input validation before monitoring starts
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MonitorError::EmptyDeviceList
                | MonitorError::InvalidDevice(_)
                | MonitorError::DuplicateDevice(_)
        )
    }
}
