//! Host name normalization and classification.
//!
//! Uses the Public Suffix List (`psl`) to decide whether a host is a real
//! registrable name, and regular expressions for the platform's own host
//! patterns.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{
    CDN_ALIAS_PATTERN, PLATFORM_APEX_HOST, PLATFORM_DOMAIN_SUFFIX, USER_IO_SUBDOMAIN_PATTERN,
    USER_SUBDOMAIN_PATTERN,
};

static USER_SUBDOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(USER_SUBDOMAIN_PATTERN).expect("valid user subdomain pattern"));
static USER_IO_SUBDOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(USER_IO_SUBDOMAIN_PATTERN).expect("valid user subdomain pattern")
});
static CDN_ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CDN_ALIAS_PATTERN).expect("valid CDN alias pattern"));

/// Extracts a lowercase host name from a bare host or a URL.
///
/// Scheme, userinfo, port and path are dropped, internationalized names are
/// converted to ASCII and a trailing dot is removed. Returns `None` when no
/// host can be found.
///
/// # Examples
///
/// ```
/// use pages_domain_check::domain::normalize_host;
///
/// assert_eq!(
///     normalize_host("https://WWW.Example.com:8080/blog/"),
///     Some("www.example.com".to_string())
/// );
/// assert_eq!(normalize_host("   "), None);
/// ```
pub fn normalize_host(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("http://{input}")
    };
    let url = url::Url::parse(&candidate).ok()?;
    let host = url
        .host_str()?
        .trim_end_matches('.')
        .to_ascii_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Whether `host` is a name under a known public suffix.
///
/// A suffix on its own is not a domain, private ones (e.g. `github.io`)
/// included.
pub fn is_valid_domain(host: &str) -> bool {
    let Some(suffix) = psl::suffix(host.as_bytes()) else {
        return false;
    };
    suffix.is_known() && psl::domain(host.as_bytes()).is_some()
}

/// The registrable domain (public suffix plus one label) of `host`.
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    psl::domain_str(&host).map(str::to_string)
}

/// `host` with its first label removed, unless that leaves a single label.
pub fn parent_name(host: &str) -> Option<String> {
    let (_, parent) = host.trim_end_matches('.').split_once('.')?;
    if parent.contains('.') {
        Some(parent.to_string())
    } else {
        None
    }
}

/// `<name>.github.io` or `<name>.github.com`.
pub fn is_user_subdomain(name: &str) -> bool {
    USER_SUBDOMAIN_RE.is_match(name)
}

/// `<name>.github.io`.
pub fn is_user_io_subdomain(name: &str) -> bool {
    USER_IO_SUBDOMAIN_RE.is_match(name)
}

pub fn is_cdn_alias(name: &str) -> bool {
    CDN_ALIAS_RE.is_match(name)
}

/// Hosts operated by the platform itself.
pub fn is_platform_domain(name: &str) -> bool {
    name.trim_end_matches('.')
        .to_ascii_lowercase()
        .ends_with(PLATFORM_DOMAIN_SUFFIX)
}

pub fn is_platform_apex(name: &str) -> bool {
    name.trim_end_matches('.')
        .eq_ignore_ascii_case(PLATFORM_APEX_HOST)
}
