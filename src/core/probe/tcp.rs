//! Reachability via a TCP connect.

use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::{check_address, Prober};
use crate::error::Result;

/// Treats a device as reachable when a TCP port accepts connections.
#[derive(Debug, Clone, Copy)]
pub struct TcpProber {
    port: u16,
}

impl TcpProber {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

#[async_trait::async_trait]
impl Prober for TcpProber {
    async fn probe(&self, address: &str, probe_timeout: Duration) -> Result<bool> {
        check_address(address)?;

        let connect = TcpStream::connect((address, self.port));
        match timeout(probe_timeout, connect).await {
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(e)) => {
                log::debug!("tcp probe {}:{} failed: {}", address, self.port, e);
                Ok(false)
            }
            Err(_) => Ok(false),
        }
    }
}
