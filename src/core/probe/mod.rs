//! Reachability probes.
//!
//! A probe answers "is this address reachable right now?" within a timeout.
//! Ordinary network failures are a `false` answer, not an error.

mod ping;
mod tcp;

pub use ping::PingProber;
pub use tcp::TcpProber;

use std::time::Duration;

use crate::error::{MonitorError, Result};

/// Reachability check for one address.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// `Ok(false)` for unreachable, timed out or unresolvable addresses;
    /// `Err` only for conditions that make the probe itself meaningless.
    async fn probe(&self, address: &str, timeout: Duration) -> Result<bool>;
}

/// Reject addresses no probe could ever use
pub(crate) fn check_address(address: &str) -> Result<()> {
    if address.is_empty() {
        return Err(MonitorError::probe("empty address"));
    }
    if address.starts_with('-') {
        return Err(MonitorError::probe(format!(
            "address '{}' looks like a command-line flag",
            address
        )));
    }
    if address.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(MonitorError::probe(format!(
            "address '{}' contains whitespace or control characters",
            address
        )));
    }
    Ok(())
}
