//! Shared resources for domain checks.
//!
//! This module defines the `CheckContext` struct that groups the DNS and HTTP
//! backends and the CDN range tables every [`Domain`](crate::Domain) consults.

use std::sync::Arc;
use std::time::Duration;

use crate::cdn::CdnRanges;
use crate::config::DNS_RESOLUTION_TIMEOUT_SECS;
use crate::dns::Lookup;
use crate::domain::HttpProbe;

/// Context containing all shared resources needed for checking domains.
///
/// Cloning is cheap; every field is reference counted.
#[derive(Clone)]
pub struct CheckContext {
    /// DNS backend
    pub lookup: Arc<dyn Lookup>,
    /// HTTP backend for the verification request
    pub probe: Arc<dyn HttpProbe>,
    /// Cloudflare and Fastly address ranges
    pub cdn_ranges: Arc<CdnRanges>,
    /// Time each record type may take in a domain's record fetch
    pub resolution_timeout: Duration,
}

impl CheckContext {
    /// Creates a new `CheckContext` with the given resources.
    pub fn new(
        lookup: Arc<dyn Lookup>,
        probe: Arc<dyn HttpProbe>,
        cdn_ranges: Arc<CdnRanges>,
    ) -> Self {
        Self {
            lookup,
            probe,
            cdn_ranges,
            resolution_timeout: Duration::from_secs(DNS_RESOLUTION_TIMEOUT_SECS),
        }
    }

    pub fn with_resolution_timeout(mut self, timeout: Duration) -> Self {
        self.resolution_timeout = timeout;
        self
    }
}
