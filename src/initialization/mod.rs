//! Application initialization and resource setup.
//!
//! This module provides functions to initialize all shared resources:
//! - Logger
//! - HTTP client for the verification request
//! - DNS resolver
//! - CDN address ranges
//! - Check context
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;
mod resolver;

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::cdn::{Cdn, CdnRanges};
use crate::config::Config;
use crate::context::CheckContext;
use crate::error_handling::{CdnRangeError, InitializationError};

// Re-export public API
pub use client::{init_client, init_probe};
pub use logger::init_logger_with;
pub use resolver::{init_lookup, init_resolver, resolver_opts};

/// Loads the Cloudflare and Fastly ranges.
///
/// Files named in the configuration replace the built-in lists.
///
/// # Errors
///
/// Returns a `CdnRangeError` if a file cannot be read or holds a malformed range.
pub fn init_cdn_ranges(config: &Config) -> Result<Arc<CdnRanges>, CdnRangeError> {
    let ranges = CdnRanges::load(
        config.cloudflare_ips.as_deref(),
        config.fastly_ips.as_deref(),
    )?;
    debug!(
        "Loaded {} Cloudflare and {} Fastly ranges",
        ranges.ranges(Cdn::Cloudflare).len(),
        ranges.ranges(Cdn::Fastly).len()
    );
    Ok(Arc::new(ranges))
}

/// Builds the context shared by every check in a run.
///
/// # Errors
///
/// Returns an `InitializationError` if the HTTP client or the CDN ranges
/// cannot be set up.
pub fn init_context(config: &Config) -> Result<CheckContext, InitializationError> {
    let lookup = init_lookup(Duration::from_secs(config.dns_timeout_seconds));
    let probe = init_probe(config)?;
    let cdn_ranges = init_cdn_ranges(config)?;
    Ok(CheckContext::new(lookup, probe, cdn_ranges)
        .with_resolution_timeout(config.resolution_timeout()))
}
