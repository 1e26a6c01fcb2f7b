//! Serializable check results.

use serde::Serialize;

use super::Domain;
use crate::error_handling::CheckFailure;

/// A failure as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    /// Stable snake_case identifier
    pub kind: &'static str,
    pub message: String,
    pub documentation_url: String,
}

impl From<&CheckFailure> for FailureReport {
    fn from(failure: &CheckFailure) -> Self {
        Self {
            kind: failure.kind().as_str(),
            message: failure.to_string(),
            documentation_url: failure.documentation_url(),
        }
    }
}

/// Every fact the verdict was derived from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DomainFacts {
    pub valid_domain: bool,
    pub dns_resolves: bool,
    pub apex_domain: bool,
    pub dns_zone_soa: bool,
    pub dns_zone_ns: bool,
    pub a_record: bool,
    pub cname_record: bool,
    pub a_record_present: bool,
    pub aaaa_record_present: bool,
    pub mx_record_present: bool,
    pub should_be_a_record: bool,
    pub should_be_cname_record: bool,
    pub cname_target: Option<String>,
    pub cname_to_user_subdomain: bool,
    pub cname_to_platform_apex: bool,
    pub cname_to_cdn_alias: bool,
    pub platform_domain: bool,
    pub user_subdomain: bool,
    pub user_io_subdomain: bool,
    pub platform_apex: bool,
    pub cdn_alias: bool,
    pub cloudflare_ip: bool,
    pub fastly_ip: bool,
    pub proxied: bool,
    pub legacy_ip: bool,
    pub deprecated_ip: bool,
    pub current_ip: bool,
    pub non_platform_ip_present: bool,
    pub non_platform_ipv6_present: bool,
    pub invalid_a_record: bool,
    pub invalid_cname: bool,
    pub invalid_aaaa_record: bool,
    pub served_by_platform: bool,
    pub caa_errored: bool,
    pub caa_records_present: bool,
    pub lets_encrypt_allowed: bool,
}

/// Result of checking one domain with one name-server strategy.
#[derive(Debug, Clone, Serialize)]
pub struct DomainReport {
    pub input: String,
    pub host: Option<String>,
    pub nameservers: String,
    pub valid: bool,
    pub reason: Option<FailureReport>,
    pub https_eligible: bool,
    pub https_error: Option<FailureReport>,
    pub records: Vec<String>,
    pub dns_error: Option<String>,
    pub facts: DomainFacts,
}

impl Domain {
    /// Collects the verdicts and every underlying fact.
    ///
    /// Facts that need DNS are skipped for hosts that failed to normalize, so
    /// an invalid input never triggers network I/O.
    pub async fn report(&self) -> DomainReport {
        let reason = self.reason().await;
        let https_error = self.https_eligibility_error().await;
        let facts = if self.host().is_some() {
            self.facts().await
        } else {
            DomainFacts::default()
        };

        DomainReport {
            input: self.input().to_string(),
            host: self.host().map(str::to_string),
            nameservers: self.strategy().to_string(),
            valid: reason.is_none(),
            reason: reason.as_ref().map(FailureReport::from),
            https_eligible: https_error.is_none(),
            https_error: https_error.as_ref().map(FailureReport::from),
            records: self.records().await.iter().map(ToString::to_string).collect(),
            dns_error: self.dns_error().await.map(ToString::to_string),
            facts,
        }
    }

    async fn facts(&self) -> DomainFacts {
        let (caa_errored, caa_records_present, lets_encrypt_allowed) = match self.caa() {
            Some(caa) => (
                caa.errored().await,
                caa.records_present().await,
                caa.lets_encrypt_allowed().await,
            ),
            None => (false, false, false),
        };

        DomainFacts {
            valid_domain: self.is_valid_domain(),
            dns_resolves: self.dns_resolves().await,
            apex_domain: self.is_apex().await,
            dns_zone_soa: self.dns_zone_soa().await,
            dns_zone_ns: self.dns_zone_ns().await,
            a_record: self.is_a_record().await,
            cname_record: self.is_cname_record().await,
            a_record_present: self.a_record_present().await,
            aaaa_record_present: self.aaaa_record_present().await,
            mx_record_present: self.has_mx().await,
            should_be_a_record: self.should_be_a_record().await,
            should_be_cname_record: self.should_be_cname_record().await,
            cname_target: self
                .cname()
                .await
                .and_then(|target| target.host().map(str::to_string)),
            cname_to_user_subdomain: self.cname_targets_user_subdomain().await,
            cname_to_platform_apex: self.cname_targets_platform_apex().await,
            cname_to_cdn_alias: self.cname_targets_cdn_alias().await,
            platform_domain: self.is_platform_domain(),
            user_subdomain: self.is_user_subdomain(),
            user_io_subdomain: self.is_user_io_subdomain(),
            platform_apex: self.is_platform_apex(),
            cdn_alias: self.is_cdn_alias(),
            cloudflare_ip: self.cloudflare_ip().await,
            fastly_ip: self.fastly_ip().await,
            proxied: self.is_proxied().await,
            legacy_ip: self.points_to_legacy_ip().await,
            deprecated_ip: self.deprecated_ip().await,
            current_ip: self.points_to_current_ip().await,
            non_platform_ip_present: self.non_platform_ip_present().await,
            non_platform_ipv6_present: self.non_platform_ipv6_present().await,
            invalid_a_record: self.invalid_a_record().await,
            invalid_cname: self.invalid_cname().await,
            invalid_aaaa_record: self.invalid_aaaa_record().await,
            served_by_platform: self.served_by_platform().await,
            caa_errored,
            caa_records_present,
            lets_encrypt_allowed,
        }
    }
}
