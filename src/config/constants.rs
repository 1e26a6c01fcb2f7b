//! Configuration constants.
//!
//! This module defines the timeouts, platform addresses, hostname patterns and
//! header names the domain checks are built on.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

// Network operation timeouts
/// Timeout for a single DNS query in seconds.
/// Authoritative servers that do not answer within this window are treated as
/// having returned nothing.
pub const DNS_TIMEOUT_SECS: u64 = 5;
/// Minimum time one record type may take in a domain's record fetch.
pub const DNS_RESOLUTION_TIMEOUT_SECS: u64 = 10;
/// Sequential queries behind one authoritative answer: NS for the host, NS for
/// the registrable domain, the name-server addresses, then the record itself.
pub const DNS_QUERY_CHAIN_LEN: u32 = 4;
/// Timeout for the HTTP verification request in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 10;
/// Number of attempts hickory makes against each name server.
pub const DNS_ATTEMPTS: usize = 2;

/// Default User-Agent string for the verification request.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; Pages Domain Check/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Public resolvers used by the `public` name-server strategy.
pub const PUBLIC_NAMESERVERS: [IpAddr; 2] = [
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
];

// Platform addresses
/// A record targets that used to serve Pages sites and must no longer be used.
pub const LEGACY_IP_ADDRESSES: [Ipv4Addr; 6] = [
    // Legacy GitHub datacenter
    Ipv4Addr::new(207, 97, 227, 245),
    Ipv4Addr::new(204, 232, 175, 78),
    // Aug. 2016 Fastly datacenter deprecation
    Ipv4Addr::new(199, 27, 73, 133),
    Ipv4Addr::new(199, 27, 76, 133),
    // Feb. 2017 Fastly datacenter deprecation
    Ipv4Addr::new(192, 30, 252, 153),
    Ipv4Addr::new(192, 30, 252, 154),
];

/// IPv4 addresses currently serving Pages sites.
pub const CURRENT_IP_ADDRESSES: [Ipv4Addr; 4] = [
    Ipv4Addr::new(185, 199, 108, 153),
    Ipv4Addr::new(185, 199, 109, 153),
    Ipv4Addr::new(185, 199, 110, 153),
    Ipv4Addr::new(185, 199, 111, 153),
];

/// IPv6 addresses currently serving Pages sites.
pub const CURRENT_IPV6_ADDRESSES: [Ipv6Addr; 4] = [
    Ipv6Addr::new(0x2606, 0x50c0, 0x8000, 0, 0, 0, 0, 0x153),
    Ipv6Addr::new(0x2606, 0x50c0, 0x8001, 0, 0, 0, 0, 0x153),
    Ipv6Addr::new(0x2606, 0x50c0, 0x8002, 0, 0, 0, 0, 0x153),
    Ipv6Addr::new(0x2606, 0x50c0, 0x8003, 0, 0, 0, 0, 0x153),
];

// Hostname patterns
/// User and organization sites: `<name>.github.io` or `<name>.github.com`.
pub const USER_SUBDOMAIN_PATTERN: &str = r"(?i)^[\w-]+\.github\.(io|com)\.?$";
/// User and organization sites on the current `github.io` suffix.
pub const USER_IO_SUBDOMAIN_PATTERN: &str = r"(?i)^[\w-]+\.github\.io\.?$";
/// Fastly aliases the platform is served from. Custom domains must not point here directly.
pub const CDN_ALIAS_PATTERN: &str = r"(?i)^(?:sni\.)?github\.map\.fastly\.net\.?$";
/// The platform's own marketing host. Custom domains must not point here.
pub const PLATFORM_APEX_HOST: &str = "pages.github.com";
/// Hosts under this suffix belong to the platform operator.
pub const PLATFORM_DOMAIN_SUFFIX: &str = ".github.com";
/// Suggested CNAME target shown when a subdomain is misconfigured.
pub const RECOMMENDED_CNAME_TARGET: &str = "[YOUR USERNAME].github.io";

// Verification headers
/// Header that identifies the platform's edge.
pub const HEADER_SERVER: &str = "Server";
/// Exact value of [`HEADER_SERVER`] sent by the platform.
pub const PLATFORM_SERVER_VALUE: &str = "GitHub.com";
/// Request identifier header name (matched case-insensitively, as a substring).
pub const REQUEST_ID_HEADER: &str = "x-github-request-id";

/// Certificate authority that issues certificates for custom domains.
pub const LETS_ENCRYPT_CA: &str = "letsencrypt.org";

/// Base URL for failure documentation links.
pub const DOCUMENTATION_BASE: &str = "https://docs.github.com";
