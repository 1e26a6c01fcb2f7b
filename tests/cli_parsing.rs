//! Tests for command-line parsing.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use clap::Parser;
use pages_domain_check::{Cli, NameserverMode, NameserverStrategy, OutputFormat};

#[test]
fn test_defaults() {
    let config = Cli::try_parse_from(["pages_domain_check", "www.example.com"])
        .unwrap()
        .into_config();
    assert_eq!(config.hosts, vec!["www.example.com".to_string()]);
    assert_eq!(config.nameservers, NameserverMode::Redundant);
    assert_eq!(config.output, OutputFormat::Plain);
    assert_eq!(config.timeout_seconds, 10);
    assert_eq!(config.dns_timeout_seconds, 5);
    assert!(config.cloudflare_ips.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_hosts_are_required() {
    assert!(Cli::try_parse_from(["pages_domain_check"]).is_err());
}

#[test]
fn test_multiple_hosts_keep_order() {
    let cli = Cli::try_parse_from([
        "pages_domain_check",
        "b.example.com",
        "https://a.example.com/path",
    ])
    .unwrap();
    assert_eq!(cli.hosts, vec!["b.example.com", "https://a.example.com/path"]);
}

#[test]
fn test_nameserver_strategies() {
    for (arg, expected) in [
        ("default", NameserverMode::Single(NameserverStrategy::Default)),
        (
            "authoritative",
            NameserverMode::Single(NameserverStrategy::Authoritative),
        ),
        ("public", NameserverMode::Single(NameserverStrategy::Public)),
        ("redundant", NameserverMode::Redundant),
    ] {
        let cli =
            Cli::try_parse_from(["pages_domain_check", "--nameservers", arg, "example.com"])
                .unwrap();
        assert_eq!(cli.nameservers, expected, "--nameservers {arg}");
    }
}

#[test]
fn test_explicit_nameserver_addresses() {
    let cli = Cli::try_parse_from([
        "pages_domain_check",
        "--nameservers",
        "192.0.2.1,192.0.2.2",
        "example.com",
    ])
    .unwrap();
    assert_eq!(
        cli.nameservers,
        NameserverMode::Single(NameserverStrategy::Explicit(vec![
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 2)),
        ]))
    );
}

#[test]
fn test_unknown_nameserver_value_is_rejected() {
    assert!(Cli::try_parse_from([
        "pages_domain_check",
        "--nameservers",
        "somewhere",
        "example.com"
    ])
    .is_err());
}

#[test]
fn test_output_and_range_files() {
    let config = Cli::try_parse_from([
        "pages_domain_check",
        "--output",
        "json",
        "--timeout-seconds",
        "3",
        "--cloudflare-ips",
        "/tmp/cf.txt",
        "--fastly-ips",
        "/tmp/fastly.txt",
        "example.com",
    ])
    .unwrap()
    .into_config();
    assert_eq!(config.output, OutputFormat::Json);
    assert_eq!(config.timeout_seconds, 3);
    assert_eq!(config.cloudflare_ips, Some(PathBuf::from("/tmp/cf.txt")));
    assert_eq!(config.fastly_ips, Some(PathBuf::from("/tmp/fastly.txt")));
}

#[test]
fn test_invalid_log_level_is_rejected() {
    assert!(Cli::try_parse_from([
        "pages_domain_check",
        "--log-level",
        "loud",
        "example.com"
    ])
    .is_err());
}
