//! CDN IP-range ownership.
//!
//! Answers "does this CDN own this address?" from CIDR lists. The lists ship
//! with the crate under `data/` and can be replaced from files at startup.

use std::fmt;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;

use ipnetwork::IpNetwork;

use crate::error_handling::CdnRangeError;

const CLOUDFLARE_RANGES: &str = include_str!("../../data/cloudflare-ips.txt");
const FASTLY_RANGES: &str = include_str!("../../data/fastly-ips.txt");

/// CDN providers the checks know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cdn {
    /// Reverse proxy commonly placed in front of Pages sites
    Cloudflare,
    /// The platform's own edge
    Fastly,
}

impl fmt::Display for Cdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cdn::Cloudflare => f.write_str("Cloudflare"),
            Cdn::Fastly => f.write_str("Fastly"),
        }
    }
}

/// A set of CIDR ranges.
#[derive(Debug, Clone, Default)]
pub struct IpRanges {
    networks: Vec<IpNetwork>,
}

impl IpRanges {
    /// Parses one range per line. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, CdnRangeError> {
        let mut networks = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let network = IpNetwork::from_str(line).map_err(|_| CdnRangeError::InvalidRange {
                line: index + 1,
                value: line.to_string(),
            })?;
            networks.push(network);
        }
        Ok(Self { networks })
    }

    pub fn load(path: &Path) -> Result<Self, CdnRangeError> {
        let text = std::fs::read_to_string(path).map_err(|source| CdnRangeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.networks.iter().any(|network| network.contains(ip))
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

/// Range tables for every known CDN. Loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct CdnRanges {
    cloudflare: IpRanges,
    fastly: IpRanges,
}

impl CdnRanges {
    pub fn new(cloudflare: IpRanges, fastly: IpRanges) -> Self {
        Self { cloudflare, fastly }
    }

    /// The lists compiled into the binary.
    pub fn builtin() -> Result<Self, CdnRangeError> {
        Ok(Self {
            cloudflare: IpRanges::parse(CLOUDFLARE_RANGES)?,
            fastly: IpRanges::parse(FASTLY_RANGES)?,
        })
    }

    /// Built-in lists, each optionally replaced by a file.
    pub fn load(cloudflare: Option<&Path>, fastly: Option<&Path>) -> Result<Self, CdnRangeError> {
        let cloudflare = match cloudflare {
            Some(path) => IpRanges::load(path)?,
            None => IpRanges::parse(CLOUDFLARE_RANGES)?,
        };
        let fastly = match fastly {
            Some(path) => IpRanges::load(path)?,
            None => IpRanges::parse(FASTLY_RANGES)?,
        };
        Ok(Self { cloudflare, fastly })
    }

    pub fn ranges(&self, cdn: Cdn) -> &IpRanges {
        match cdn {
            Cdn::Cloudflare => &self.cloudflare,
            Cdn::Fastly => &self.fastly,
        }
    }

    pub fn controls_ip(&self, cdn: Cdn, ip: IpAddr) -> bool {
        self.ranges(cdn).contains(ip)
    }
}

#[cfg(test)]
mod tests;
