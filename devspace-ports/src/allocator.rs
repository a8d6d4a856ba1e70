//! Port allocators.

use anyhow::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};
use tracing::debug;

use crate::range::PortRange;

/// Source of host ports for new workspace containers.
pub trait PortAllocator: Send + Sync {
    /// Returns a port that was free when probed. No reservation is held.
    fn allocate(&self) -> Result<u16>;
}

/// Lets the OS pick a port by binding to port 0.
#[derive(Debug, Clone)]
pub struct EphemeralPortAllocator {
    bind_host: IpAddr,
}

impl EphemeralPortAllocator {
    pub fn new(bind_host: IpAddr) -> Self {
        Self { bind_host }
    }
}

impl Default for EphemeralPortAllocator {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

impl PortAllocator for EphemeralPortAllocator {
    fn allocate(&self) -> Result<u16> {
        let listener = TcpListener::bind(SocketAddr::new(self.bind_host, 0))
            .with_context(|| format!("Failed to bind ephemeral listener on {}", self.bind_host))?;
        let port = listener
            .local_addr()
            .context("Failed to read ephemeral listener address")?
            .port();
        drop(listener);

        debug!(port, "Allocated ephemeral port");
        Ok(port)
    }
}

/// Hands out the first bindable port inside a configured range.
#[derive(Debug, Clone)]
pub struct RangePortAllocator {
    bind_host: IpAddr,
    range: PortRange,
}

impl RangePortAllocator {
    pub fn new(bind_host: IpAddr, range: PortRange) -> Self {
        Self { bind_host, range }
    }
}

impl PortAllocator for RangePortAllocator {
    fn allocate(&self) -> Result<u16> {
        for port in self.range.iter() {
            if TcpListener::bind(SocketAddr::new(self.bind_host, port)).is_ok() {
                debug!(port, range = %self.range, "Allocated port from range");
                return Ok(port);
            }
        }

        anyhow::bail!("No free port left in range {}", self.range)
    }
}
