//! Tests to ensure error messages are actionable and consistent
//!
//! These tests verify that configuration errors name the offending field and
//! that every check failure links to documentation.

use pages_domain_check::{CheckFailure, Config, FailureKind};

#[test]
fn test_config_validation_errors_are_descriptive() {
    let mut config = Config::default();
    let result = config.validate();
    assert!(result.is_err(), "No hosts should fail validation");
    if let Err(e) = result {
        assert_eq!(e.field, "hosts");
        assert!(e.message.contains("at least one host"));
    }

    config = Config {
        hosts: vec!["example.com".to_string(), "  ".to_string()],
        ..Default::default()
    };
    let result = config.validate();
    if let Err(e) = result {
        assert_eq!(e.field, "hosts");
        assert!(e.message.contains("#2"), "Error should name the entry");
    } else {
        panic!("Blank host should fail validation");
    }

    config = Config {
        hosts: vec!["example.com".to_string()],
        timeout_seconds: 0,
        ..Default::default()
    };
    let result = config.validate();
    if let Err(e) = result {
        assert_eq!(e.field, "timeout_seconds");
        assert!(e.message.contains("greater than 0"));
    } else {
        panic!("Zero timeout_seconds should fail validation");
    }

    config = Config {
        hosts: vec!["example.com".to_string()],
        dns_timeout_seconds: 61,
        ..Default::default()
    };
    let result = config.validate();
    if let Err(e) = result {
        assert_eq!(e.field, "dns_timeout_seconds");
        assert!(e.message.contains("at most 60"));
    } else {
        panic!("Oversized dns_timeout_seconds should fail validation");
    }
}

#[test]
fn test_config_validation_error_display() {
    let err = Config {
        hosts: vec!["example.com".to_string()],
        user_agent: String::new(),
        ..Default::default()
    }
    .validate()
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value for `user_agent`: user_agent must not be empty"
    );
}

#[test]
fn test_failure_messages_link_documentation() {
    let failures = [
        CheckFailure::InvalidDomain {
            host: "x".to_string(),
        },
        CheckFailure::DeprecatedIp {
            host: "example.com".to_string(),
        },
        CheckFailure::invalid_cname("www.example.com"),
        CheckFailure::CaaIssuanceDenied {
            host: "example.com".to_string(),
            records: vec!["example.com. IN CAA 0 issue \"digicert.com\"".to_string()],
            resolution_error: None,
        },
    ];
    for failure in failures {
        let formatted = failure.message_formatted();
        assert!(
            formatted.contains("For more information, see https://docs.github.com/"),
            "{formatted}"
        );
        assert!(formatted.ends_with('.'));
        assert!(!formatted.contains(".."), "{formatted}");
    }
}

#[test]
fn test_caa_message_names_blocking_records() {
    let failure = CheckFailure::CaaIssuanceDenied {
        host: "example.com".to_string(),
        records: vec!["example.com. IN CAA 0 issue \"digicert.com\"".to_string()],
        resolution_error: None,
    };
    assert_eq!(failure.kind(), FailureKind::CaaIssuanceDenied);
    assert!(failure.to_string().contains("Let's Encrypt"));
    assert!(failure.to_string().contains("digicert.com"));

    let errored = CheckFailure::CaaIssuanceDenied {
        host: "example.com".to_string(),
        records: Vec::new(),
        resolution_error: Some("DNS CAA lookup for example.com timed out".to_string()),
    };
    assert!(errored.to_string().contains("timed out"));
}

#[test]
fn test_failures_serialize_with_kind_tag() {
    let json = serde_json::to_value(CheckFailure::NotServedByPlatform {
        host: "example.com".to_string(),
    })
    .unwrap();
    assert_eq!(json["kind"], "not_served_by_platform");
    assert_eq!(json["host"], "example.com");
}
