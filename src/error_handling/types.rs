//! Error type definitions.
//!
//! This module defines every error and failure type used throughout the
//! application: check failures reported to users, DNS and HTTP transport errors,
//! and initialization/configuration errors.

use std::path::PathBuf;

use hickory_resolver::proto::rr::RecordType;
use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::config::{DOCUMENTATION_BASE, RECOMMENDED_CNAME_TARGET};

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error loading a CDN range file.
    #[error("CDN range initialization error: {0}")]
    CdnRangeError(#[from] CdnRangeError),
}

/// A configuration value that clap accepted but the checks cannot use.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid value for `{field}`: {message}")]
pub struct ConfigValidationError {
    /// Name of the offending field
    pub field: &'static str,
    /// Human-readable explanation
    pub message: String,
}

impl ConfigValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Errors raised while loading CIDR range lists.
#[derive(Error, Debug)]
pub enum CdnRangeError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line did not parse as a CIDR range or bare address.
    #[error("line {line}: `{value}` is not a valid IP range")]
    InvalidRange { line: usize, value: String },
}

/// Transport-level DNS failure.
///
/// A name that simply does not exist, or exists without records of the asked
/// type, is not an error: lookups return an empty record set for those.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    /// No answer arrived in time.
    #[error("DNS {record_type} lookup for {name} timed out")]
    Timeout {
        name: String,
        record_type: RecordType,
    },

    /// The server answered with a failure code (SERVFAIL, REFUSED, ...).
    #[error("DNS {record_type} lookup for {name} failed: {code}")]
    ServerFailure {
        name: String,
        record_type: RecordType,
        code: String,
    },

    /// Socket, protocol or resolver setup errors.
    #[error("DNS {record_type} lookup for {name} failed: {message}")]
    Transport {
        name: String,
        record_type: RecordType,
        message: String,
    },
}

/// Failure of the HTTP verification request.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The URL could not be built from the host.
    #[error("invalid probe URL {0}")]
    InvalidUrl(String),

    /// The request did not complete.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// No canned response registered (in-memory probe only).
    #[error("no response available for {0}")]
    Unavailable(String),
}

/// Why a domain is not correctly configured.
///
/// Each variant maps to a user-facing message and a documentation link.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckFailure {
    #[error("Domain is not a valid domain")]
    InvalidDomain { host: String },

    #[error("Domain's DNS record could not be retrieved")]
    InvalidDns { host: String },

    #[error("A record points to deprecated IP address")]
    DeprecatedIp { host: String },

    #[error("Should not be an A record")]
    InvalidARecord { host: String },

    #[error(
        "Your site's DNS settings are using a custom subdomain, {host}, that's not set up with \
         a correct CNAME record. We recommend you set this CNAME record to point at \
         {recommended_target}."
    )]
    InvalidCname {
        host: String,
        recommended_target: String,
    },

    #[error("Domain does not resolve to the GitHub Pages server")]
    NotServedByPlatform { host: String },

    #[error("Your site's DNS settings are using AAAA records that do not point to GitHub Pages")]
    InvalidAaaaRecord { host: String },

    #[error(
        "Your site's DNS settings are using addresses other than the GitHub Pages servers \
         ({allowed}); remove the extra A records"
    )]
    ExtraIpsPresent { host: String, allowed: String },

    #[error("{}", caa_message(.records, .resolution_error.as_deref()))]
    CaaIssuanceDenied {
        host: String,
        records: Vec<String>,
        resolution_error: Option<String>,
    },

    #[error("Domain's DNS records are not eligible for HTTPS")]
    RecordsIneligibleForHttps { host: String },
}

fn caa_message(records: &[String], resolution_error: Option<&str>) -> String {
    match resolution_error {
        Some(err) => format!("Could not check CAA records for the domain: {err}"),
        None => format!(
            "Your CAA records prevent Let's Encrypt from issuing a certificate (found: {})",
            records.join(", ")
        ),
    }
}

/// Discriminant of [`CheckFailure`], usable as a stable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureKind {
    InvalidDomain,
    InvalidDns,
    DeprecatedIp,
    InvalidARecord,
    InvalidCname,
    NotServedByPlatform,
    InvalidAaaaRecord,
    ExtraIpsPresent,
    CaaIssuanceDenied,
    RecordsIneligibleForHttps,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidDomain => "invalid_domain",
            FailureKind::InvalidDns => "invalid_dns",
            FailureKind::DeprecatedIp => "deprecated_ip",
            FailureKind::InvalidARecord => "invalid_a_record",
            FailureKind::InvalidCname => "invalid_cname",
            FailureKind::NotServedByPlatform => "not_served_by_platform",
            FailureKind::InvalidAaaaRecord => "invalid_aaaa_record",
            FailureKind::ExtraIpsPresent => "extra_ips_present",
            FailureKind::CaaIssuanceDenied => "caa_issuance_denied",
            FailureKind::RecordsIneligibleForHttps => "records_ineligible_for_https",
        }
    }

    /// Path of the help page under [`DOCUMENTATION_BASE`].
    fn documentation_path(&self) -> &'static str {
        match self {
            FailureKind::InvalidDomain
            | FailureKind::InvalidDns
            | FailureKind::InvalidARecord
            | FailureKind::InvalidCname
            | FailureKind::InvalidAaaaRecord
            | FailureKind::ExtraIpsPresent => {
                "/pages/configuring-a-custom-domain-for-your-github-pages-site/managing-a-custom-domain-for-your-github-pages-site"
            }
            FailureKind::DeprecatedIp | FailureKind::NotServedByPlatform => {
                "/pages/configuring-a-custom-domain-for-your-github-pages-site/troubleshooting-custom-domains-and-github-pages"
            }
            FailureKind::CaaIssuanceDenied | FailureKind::RecordsIneligibleForHttps => {
                "/pages/getting-started-with-github-pages/securing-your-github-pages-site-with-https"
            }
        }
    }
}

impl CheckFailure {
    /// `InvalidCname` with the standard recommendation.
    pub fn invalid_cname(host: impl Into<String>) -> Self {
        CheckFailure::InvalidCname {
            host: host.into(),
            recommended_target: RECOMMENDED_CNAME_TARGET.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            CheckFailure::InvalidDomain { .. } => FailureKind::InvalidDomain,
            CheckFailure::InvalidDns { .. } => FailureKind::InvalidDns,
            CheckFailure::DeprecatedIp { .. } => FailureKind::DeprecatedIp,
            CheckFailure::InvalidARecord { .. } => FailureKind::InvalidARecord,
            CheckFailure::InvalidCname { .. } => FailureKind::InvalidCname,
            CheckFailure::NotServedByPlatform { .. } => FailureKind::NotServedByPlatform,
            CheckFailure::InvalidAaaaRecord { .. } => FailureKind::InvalidAaaaRecord,
            CheckFailure::ExtraIpsPresent { .. } => FailureKind::ExtraIpsPresent,
            CheckFailure::CaaIssuanceDenied { .. } => FailureKind::CaaIssuanceDenied,
            CheckFailure::RecordsIneligibleForHttps { .. } => {
                FailureKind::RecordsIneligibleForHttps
            }
        }
    }

    /// The host the failure was raised for.
    pub fn host(&self) -> &str {
        match self {
            CheckFailure::InvalidDomain { host }
            | CheckFailure::InvalidDns { host }
            | CheckFailure::DeprecatedIp { host }
            | CheckFailure::InvalidARecord { host }
            | CheckFailure::InvalidCname { host, .. }
            | CheckFailure::NotServedByPlatform { host }
            | CheckFailure::InvalidAaaaRecord { host }
            | CheckFailure::ExtraIpsPresent { host, .. }
            | CheckFailure::CaaIssuanceDenied { host, .. }
            | CheckFailure::RecordsIneligibleForHttps { host } => host,
        }
    }

    pub fn documentation_url(&self) -> String {
        format!("{}{}", DOCUMENTATION_BASE, self.kind().documentation_path())
    }

    /// Message followed by the documentation link, as shown to users.
    pub fn message_formatted(&self) -> String {
        format!(
            "{}. For more information, see {}.",
            self.to_string().trim_end_matches('.'),
            self.documentation_url()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_failure_kind_as_str() {
        assert_eq!(FailureKind::InvalidCname.as_str(), "invalid_cname");
        assert_eq!(FailureKind::DeprecatedIp.as_str(), "deprecated_ip");
        assert_eq!(
            FailureKind::RecordsIneligibleForHttps.as_str(),
            "records_ineligible_for_https"
        );
    }

    #[test]
    fn test_all_failure_kinds_have_string_representation() {
        for kind in FailureKind::iter() {
            let str_repr = kind.as_str();
            assert!(!str_repr.is_empty(), "{:?} should have non-empty string", kind);
            assert!(kind.documentation_path().starts_with('/'));
        }
    }

    #[test]
    fn test_invalid_cname_message_names_host_and_target() {
        let failure = CheckFailure::invalid_cname("blog.example.com");
        let message = failure.to_string();
        assert!(message.contains("blog.example.com"));
        assert!(message.contains("[YOUR USERNAME].github.io"));
        assert_eq!(failure.kind(), FailureKind::InvalidCname);
        assert_eq!(failure.host(), "blog.example.com");
    }

    #[test]
    fn test_message_formatted_links_documentation() {
        let failure = CheckFailure::DeprecatedIp {
            host: "example.com".to_string(),
        };
        let formatted = failure.message_formatted();
        assert!(formatted.starts_with("A record points to deprecated IP address."));
        assert!(formatted.contains(DOCUMENTATION_BASE));
        assert!(formatted.ends_with('.'));
    }

    #[test]
    fn test_caa_message_variants() {
        let denied = CheckFailure::CaaIssuanceDenied {
            host: "example.com".to_string(),
            records: vec!["digicert.com".to_string()],
            resolution_error: None,
        };
        assert!(denied.to_string().contains("digicert.com"));

        let errored = CheckFailure::CaaIssuanceDenied {
            host: "example.com".to_string(),
            records: Vec::new(),
            resolution_error: Some("timed out".to_string()),
        };
        assert!(errored.to_string().contains("timed out"));
    }

    #[test]
    fn test_check_failure_serializes_with_kind_tag() {
        let failure = CheckFailure::InvalidDns {
            host: "example.com".to_string(),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "invalid_dns");
        assert_eq!(json["host"], "example.com");
    }

    #[test]
    fn test_dns_error_display() {
        let err = DnsError::Timeout {
            name: "example.com".to_string(),
            record_type: RecordType::A,
        };
        assert_eq!(err.to_string(), "DNS A lookup for example.com timed out");
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = ConfigValidationError::new("hosts", "missing");
        assert_eq!(err.to_string(), "invalid value for `hosts`: missing");
    }
}
