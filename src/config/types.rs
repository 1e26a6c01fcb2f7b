//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_USER_AGENT, DNS_QUERY_CHAIN_LEN, DNS_RESOLUTION_TIMEOUT_SECS, DNS_TIMEOUT_SECS,
    HTTP_TIMEOUT_SECS,
};
use crate::dns::NameserverStrategy;
use crate::error_handling::ConfigValidationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// How check results are written to stdout.
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per host with the verdict and reason
    Plain,
    /// Full reports as a JSON array
    Json,
}

/// Which name servers the checks run against.
///
/// `Redundant` evaluates every strategy and keeps the most favorable verdict;
/// `Single` pins the check to one strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameserverMode {
    /// Default, authoritative and public resolvers, best verdict wins
    Redundant,
    /// One fixed strategy
    Single(NameserverStrategy),
}

impl fmt::Display for NameserverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameserverMode::Redundant => f.write_str("redundant"),
            NameserverMode::Single(strategy) => write!(f, "{strategy}"),
        }
    }
}

impl FromStr for NameserverMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("redundant") {
            return Ok(NameserverMode::Redundant);
        }
        s.parse::<NameserverStrategy>().map(NameserverMode::Single)
    }
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use pages_domain_check::Config;
///
/// let config = Config {
///     hosts: vec!["www.example.com".to_string()],
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Hosts (or URLs) to check
    pub hosts: Vec<String>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Result output format
    pub output: OutputFormat,

    /// Name-server strategy selection
    pub nameservers: NameserverMode,

    /// Timeout for the HTTP verification request in seconds
    pub timeout_seconds: u64,

    /// Timeout for a single DNS query in seconds
    pub dns_timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Replacement Cloudflare CIDR list (one range per line)
    pub cloudflare_ips: Option<PathBuf>,

    /// Replacement Fastly CIDR list (one range per line)
    pub fastly_ips: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            output: OutputFormat::Plain,
            nameservers: NameserverMode::Redundant,
            timeout_seconds: HTTP_TIMEOUT_SECS,
            dns_timeout_seconds: DNS_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cloudflare_ips: None,
            fastly_ips: None,
        }
    }
}

impl Config {
    /// Time each record type may take in a domain's record fetch.
    ///
    /// Long enough for a full authoritative query chain at the configured
    /// per-query timeout, and never below `DNS_RESOLUTION_TIMEOUT_SECS`.
    pub fn resolution_timeout(&self) -> Duration {
        let chain = Duration::from_secs(self.dns_timeout_seconds) * DNS_QUERY_CHAIN_LEN;
        chain.max(Duration::from_secs(DNS_RESOLUTION_TIMEOUT_SECS))
    }

    /// Checks option values that clap cannot constrain on its own.
    ///
    /// # Errors
    ///
    /// Returns the first offending field together with an actionable message.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.hosts.is_empty() {
            return Err(ConfigValidationError::new(
                "hosts",
                "at least one host must be given (e.g. www.example.com)",
            ));
        }
        if let Some(blank) = self.hosts.iter().position(|h| h.trim().is_empty()) {
            return Err(ConfigValidationError::new(
                "hosts",
                format!("host #{} is empty", blank + 1),
            ));
        }
        if self.timeout_seconds == 0 || self.timeout_seconds > 120 {
            return Err(ConfigValidationError::new(
                "timeout_seconds",
                "timeout_seconds must be greater than 0 and at most 120",
            ));
        }
        if self.dns_timeout_seconds == 0 || self.dns_timeout_seconds > 60 {
            return Err(ConfigValidationError::new(
                "dns_timeout_seconds",
                "dns_timeout_seconds must be greater than 0 and at most 60",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigValidationError::new(
                "user_agent",
                "user_agent must not be empty",
            ));
        }
        Ok(())
    }
}

/// Command-line interface.
///
/// Kept in the library so the binary stays a thin wrapper and the parser can
/// be exercised from integration tests.
#[derive(Debug, Parser)]
#[command(
    name = "pages_domain_check",
    version,
    about = "Checks whether custom domains are correctly configured for GitHub Pages"
)]
pub struct Cli {
    /// Hosts or URLs to check
    #[arg(required = true)]
    pub hosts: Vec<String>,

    /// Name servers to query: redundant, default, authoritative, public, or a comma-separated IP list
    #[arg(long, default_value = "redundant", value_parser = NameserverMode::from_str)]
    pub nameservers: NameserverMode,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Timeout for the HTTP verification request in seconds
    #[arg(long, default_value_t = HTTP_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Timeout for a single DNS query in seconds
    #[arg(long, default_value_t = DNS_TIMEOUT_SECS)]
    pub dns_timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// File with Cloudflare CIDR ranges, replacing the built-in list
    #[arg(long)]
    pub cloudflare_ips: Option<PathBuf>,

    /// File with Fastly CIDR ranges, replacing the built-in list
    #[arg(long)]
    pub fastly_ips: Option<PathBuf>,
}

impl Cli {
    /// Converts parsed arguments into the library configuration.
    pub fn into_config(self) -> Config {
        Config {
            hosts: self.hosts,
            log_level: self.log_level,
            log_format: self.log_format,
            output: self.output,
            nameservers: self.nameservers,
            timeout_seconds: self.timeout_seconds,
            dns_timeout_seconds: self.dns_timeout_seconds,
            user_agent: self.user_agent,
            cloudflare_ips: self.cloudflare_ips,
            fastly_ips: self.fastly_ips,
        }
    }
}
