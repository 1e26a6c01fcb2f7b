//! DNS resolver initialization.
//!
//! Builds the system resolver and the [`HickoryLookup`] that every check
//! queries through.

use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use log::warn;

use crate::config::DNS_ATTEMPTS;
use crate::dns::{HickoryLookup, Lookup};

/// Resolver options shared by the system resolver and explicit server sets.
///
/// `ndots` is 0 so names are never expanded with search domains, and the
/// cache is disabled because each run checks a domain once.
pub fn resolver_opts(timeout: Duration) -> ResolverOpts {
    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.attempts = DNS_ATTEMPTS;
    opts.ndots = 0;
    opts.cache_size = 0;
    opts
}

/// Initializes the default DNS resolver.
///
/// Uses the system configuration (`/etc/resolv.conf`), falling back to the
/// library defaults when it cannot be read.
pub fn init_resolver(timeout: Duration) -> Arc<TokioAsyncResolver> {
    let opts = resolver_opts(timeout);
    let config = match hickory_resolver::system_conf::read_system_conf() {
        Ok((config, _)) => config,
        Err(e) => {
            warn!("Failed to read system DNS configuration, using defaults: {e}");
            ResolverConfig::default()
        }
    };
    Arc::new(TokioAsyncResolver::tokio(config, opts))
}

/// Initializes the DNS backend used by the checks.
pub fn init_lookup(timeout: Duration) -> Arc<dyn Lookup> {
    Arc::new(HickoryLookup::new(
        init_resolver(timeout),
        resolver_opts(timeout),
        timeout,
    ))
}
