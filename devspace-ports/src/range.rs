use anyhow::Result;
use std::fmt;

/// Inclusive range of host ports, written as `START-END`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn parse(range_str: &str) -> Result<Self> {
        let (start, end) = range_str.trim().split_once('-').ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid port range format: {} (expected START-END, e.g. 20000-20999)",
                range_str
            )
        })?;

        let start: u16 = start
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid start port: {}", start))?;
        let end: u16 = end
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid end port: {}", end))?;

        Self::new(start, end)
    }

    pub fn new(start: u16, end: u16) -> Result<Self> {
        if start == 0 {
            anyhow::bail!("Invalid range: port 0 is reserved");
        }
        if start >= end {
            anyhow::bail!(
                "Invalid range: start ({}) must be less than end ({})",
                start,
                end
            );
        }
        Ok(PortRange { start, end })
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
