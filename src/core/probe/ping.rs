//! ICMP reachability via the system `ping` utility.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{check_address, Prober};
use crate::error::{MonitorError, Result};

/// Sends a single echo request with the platform's `ping`.
#[derive(Debug, Clone)]
pub struct PingProber {
    binary: PathBuf,
}

impl PingProber {
    /// Locate `ping` on the PATH
    pub fn new() -> Result<Self> {
        let binary = which::which("ping")
            .map_err(|e| MonitorError::probe(format!("ping utility not found: {}", e)))?;
        Ok(Self { binary })
    }

    pub fn with_binary<P: Into<PathBuf>>(binary: P) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments for one echo request waiting at most `timeout`
    fn args(address: &str, timeout: Duration) -> Vec<String> {
        if cfg!(windows) {
            let millis = timeout.as_millis().max(1);
            vec![
                "-n".into(),
                "1".into(),
                "-w".into(),
                millis.to_string(),
                address.into(),
            ]
        } else {
            // -W takes whole seconds on Linux
            let secs = timeout.as_secs().max(1);
            vec![
                "-c".into(),
                "1".into(),
                "-W".into(),
                secs.to_string(),
                address.into(),
            ]
        }
    }
}

#[async_trait::async_trait]
impl Prober for PingProber {
    async fn probe(&self, address: &str, timeout: Duration) -> Result<bool> {
        check_address(address)?;

        let mut cmd = Command::new(&self.binary);
        cmd.args(Self::args(address, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            MonitorError::probe(format!(
                "failed to run {}: {}",
                self.binary.display(),
                e
            ))
        })?;

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => Ok(status.success()),
            Ok(Err(e)) => Err(MonitorError::probe(format!("ping did not finish: {}", e))),
            // Timed out: dropping the child kills it
            Err(_) => Ok(false),
        }
    }
}
