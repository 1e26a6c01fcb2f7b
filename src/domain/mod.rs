//! Custom domain checks.
//!
//! A [`Domain`] resolves a host's DNS records once, derives facts from them
//! (record kinds, addresses, CNAME targets, CDN ownership) and folds those
//! facts into a verdict:
//!
//! - [`Domain::check`] answers "is this domain correctly configured?"
//! - [`Domain::https_check`] answers "can it get a Let's Encrypt certificate?"
//!
//! Every fact is memoized and transport failures degrade to "no records".

mod host;
mod probe;
mod report;

use std::net::IpAddr;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, warn};
use tokio::sync::OnceCell;

use crate::caa::Caa;
use crate::cdn::Cdn;
use crate::config::{CURRENT_IPV6_ADDRESSES, CURRENT_IP_ADDRESSES, LEGACY_IP_ADDRESSES};
use crate::context::CheckContext;
use crate::dns::{NameserverStrategy, Record, RecordData, RecordType, Resolver};
use crate::error_handling::{CheckFailure, DnsError};

// Re-export public API
pub use host::{
    is_cdn_alias, is_platform_apex, is_platform_domain, is_user_io_subdomain, is_user_subdomain,
    is_valid_domain, normalize_host, parent_name, registrable_domain,
};
pub use probe::{
    has_platform_headers, verify_origin, HttpProbe, ProbeResponse, ReqwestProbe, StaticProbe,
};
pub use report::{DomainFacts, DomainReport, FailureReport};

/// Record types fetched for every domain, in answer order.
const RECORD_TYPES: [RecordType; 6] = [
    RecordType::A,
    RecordType::AAAA,
    RecordType::CNAME,
    RecordType::MX,
    RecordType::NS,
    RecordType::SOA,
];

/// Outcome of the record fetch.
#[derive(Debug)]
enum DnsState {
    Resolved(Vec<Record>),
    Failed(DnsError),
}

/// One host under test.
pub struct Domain {
    input: String,
    host: Option<String>,
    strategy: NameserverStrategy,
    context: CheckContext,
    resolver: Option<Resolver>,
    caa: Option<Caa>,
    dns: OnceCell<DnsState>,
    cname: OnceCell<Option<Box<Domain>>>,
    served: OnceCell<bool>,
    outcome: OnceCell<Result<(), CheckFailure>>,
    https: OnceCell<Result<(), CheckFailure>>,
}

impl Domain {
    /// Domain checked through the default resolver.
    pub fn new(input: &str, context: CheckContext) -> Self {
        Self::with_strategy(input, NameserverStrategy::Default, context)
    }

    pub fn with_strategy(
        input: &str,
        strategy: NameserverStrategy,
        context: CheckContext,
    ) -> Self {
        let host = normalize_host(input);
        let resolver = host
            .as_deref()
            .map(|h| Resolver::new(h, strategy.clone(), context.lookup.clone()));
        let caa = host
            .as_deref()
            .map(|h| Caa::new(h, strategy.clone(), context.lookup.clone()));
        Self {
            input: input.to_string(),
            host,
            strategy,
            context,
            resolver,
            caa,
            dns: OnceCell::new(),
            cname: OnceCell::new(),
            served: OnceCell::new(),
            outcome: OnceCell::new(),
            https: OnceCell::new(),
        }
    }

    /// The string the domain was created from.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Normalized host, `None` when the input holds no usable host.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn strategy(&self) -> &NameserverStrategy {
        &self.strategy
    }

    pub fn caa(&self) -> Option<&Caa> {
        self.caa.as_ref()
    }

    fn host_or_input(&self) -> String {
        self.host.clone().unwrap_or_else(|| self.input.clone())
    }

    // --- Records ---

    async fn dns_state(&self) -> Option<&DnsState> {
        let resolver = self.resolver.as_ref()?;
        let bound = self.context.resolution_timeout;
        Some(self.dns.get_or_init(|| fetch_records(resolver, bound)).await)
    }

    /// All records, in fetch order. Empty when resolution failed.
    pub async fn records(&self) -> &[Record] {
        match self.dns_state().await {
            Some(DnsState::Resolved(records)) => records,
            _ => &[],
        }
    }

    /// The error that made every record query fail.
    pub async fn dns_error(&self) -> Option<&DnsError> {
        match self.dns_state().await {
            Some(DnsState::Failed(e)) => Some(e),
            _ => None,
        }
    }

    async fn first_record(&self) -> Option<&Record> {
        self.records().await.first()
    }

    /// Records owned by the host itself (not reached through a CNAME).
    async fn owned_records(&self) -> Vec<&Record> {
        let host = self.host.as_deref().unwrap_or_default();
        self.records()
            .await
            .iter()
            .filter(|record| record.is_owned_by(host))
            .collect()
    }

    async fn addresses(&self) -> Vec<IpAddr> {
        self.records()
            .await
            .iter()
            .filter_map(Record::address)
            .collect()
    }

    // --- DNS facts ---

    pub fn is_valid_domain(&self) -> bool {
        self.host.as_deref().is_some_and(is_valid_domain)
    }

    pub async fn dns_resolves(&self) -> bool {
        !self.records().await.is_empty()
    }

    /// An SOA record owned by the host.
    pub async fn dns_zone_soa(&self) -> bool {
        self.owned_records()
            .await
            .into_iter()
            .any(|r| matches!(r.data, RecordData::Soa { .. }))
    }

    /// An NS record owned by the host.
    pub async fn dns_zone_ns(&self) -> bool {
        self.owned_records()
            .await
            .into_iter()
            .any(|r| matches!(r.data, RecordData::Ns(_)))
    }

    /// Whether the host is the apex of its zone, where a CNAME is not allowed.
    pub async fn is_apex(&self) -> bool {
        self.dns_zone_soa().await || self.dns_zone_ns().await
    }

    pub async fn is_a_record(&self) -> bool {
        self.first_record()
            .await
            .is_some_and(|r| matches!(r.data, RecordData::A(_)))
    }

    pub async fn is_cname_record(&self) -> bool {
        self.first_record()
            .await
            .is_some_and(|r| matches!(r.data, RecordData::Cname(_)))
    }

    pub async fn a_record_present(&self) -> bool {
        self.owned_records()
            .await
            .into_iter()
            .any(|r| matches!(r.data, RecordData::A(_)))
    }

    pub async fn aaaa_record_present(&self) -> bool {
        self.owned_records()
            .await
            .into_iter()
            .any(|r| matches!(r.data, RecordData::Aaaa(_)))
    }

    pub async fn has_mx(&self) -> bool {
        self.records()
            .await
            .iter()
            .any(|r| matches!(r.data, RecordData::Mx { .. }))
    }

    /// Any A record pointing at an address the platform no longer serves from.
    pub async fn points_to_legacy_ip(&self) -> bool {
        self.records().await.iter().any(|r| match r.data {
            RecordData::A(ip) => LEGACY_IP_ADDRESSES.contains(&ip),
            _ => false,
        })
    }

    pub async fn deprecated_ip(&self) -> bool {
        (self.is_a_record().await || self.a_record_present().await)
            && self.points_to_legacy_ip().await
    }

    pub async fn points_to_current_ip(&self) -> bool {
        self.addresses().await.into_iter().any(is_current_ip)
    }

    /// An A record owned by the host outside the current platform addresses.
    pub async fn non_platform_ip_present(&self) -> bool {
        self.owned_records().await.into_iter().any(|r| match r.data {
            RecordData::A(ip) => !CURRENT_IP_ADDRESSES.contains(&ip),
            _ => false,
        })
    }

    /// An AAAA record owned by the host outside the current platform addresses.
    pub async fn non_platform_ipv6_present(&self) -> bool {
        self.owned_records().await.into_iter().any(|r| match r.data {
            RecordData::Aaaa(ip) => !CURRENT_IPV6_ADDRESSES.contains(&ip),
            _ => false,
        })
    }

    // --- Host classification ---

    pub fn is_platform_domain(&self) -> bool {
        self.host.as_deref().is_some_and(is_platform_domain)
    }

    pub fn is_user_subdomain(&self) -> bool {
        self.host.as_deref().is_some_and(is_user_subdomain)
    }

    pub fn is_user_io_subdomain(&self) -> bool {
        self.host.as_deref().is_some_and(is_user_io_subdomain)
    }

    pub fn is_platform_apex(&self) -> bool {
        self.host.as_deref().is_some_and(is_platform_apex)
    }

    pub fn is_cdn_alias(&self) -> bool {
        self.host.as_deref().is_some_and(is_cdn_alias)
    }

    // --- CNAME ---

    /// The domain at the end of the leading CNAME chain.
    pub async fn cname(&self) -> Option<&Domain> {
        self.cname
            .get_or_init(|| async {
                let target = cname_chain_target(self.records().await)?;
                debug!(
                    "{} is a CNAME to {target}",
                    self.host.as_deref().unwrap_or_default()
                );
                Some(Box::new(Domain::with_strategy(
                    &target,
                    self.strategy.clone(),
                    self.context.clone(),
                )))
            })
            .await
            .as_deref()
    }

    pub async fn cname_targets_user_subdomain(&self) -> bool {
        self.cname()
            .await
            .is_some_and(|target| target.is_user_subdomain() && !target.is_platform_apex())
    }

    pub async fn cname_targets_platform_apex(&self) -> bool {
        self.cname()
            .await
            .is_some_and(|target| target.is_platform_apex())
    }

    /// A CNAME straight to the platform's CDN, bypassing user routing.
    pub async fn cname_targets_cdn_alias(&self) -> bool {
        !self.is_user_subdomain()
            && self
                .cname()
                .await
                .is_some_and(|target| target.is_cdn_alias())
    }

    // --- CDN ---

    /// At least one address and every A/AAAA in the answer inside `cdn`'s ranges.
    ///
    /// Other record kinds are skipped, so addresses reached through a CNAME
    /// count too.
    async fn all_addresses_on(&self, cdn: Cdn) -> bool {
        let addresses = self.addresses().await;
        !addresses.is_empty()
            && addresses
                .into_iter()
                .all(|ip| self.context.cdn_ranges.controls_ip(cdn, ip))
    }

    pub async fn cloudflare_ip(&self) -> bool {
        self.all_addresses_on(Cdn::Cloudflare).await
    }

    pub async fn fastly_ip(&self) -> bool {
        self.all_addresses_on(Cdn::Fastly).await
    }

    /// Whether a third-party proxy sits in front of the platform.
    pub async fn is_proxied(&self) -> bool {
        if !self.dns_resolves().await {
            return false;
        }
        if self.cloudflare_ip().await {
            return true;
        }
        !self.points_to_current_ip().await
            && !self.cname_targets_user_subdomain().await
            && self.served_by_platform().await
    }

    // --- Record expectations ---

    pub async fn should_be_a_record(&self) -> bool {
        !self.is_user_io_subdomain() && (self.is_apex().await || self.has_mx().await)
    }

    pub async fn should_be_cname_record(&self) -> bool {
        !self.should_be_a_record().await
    }

    pub async fn invalid_a_record(&self) -> bool {
        self.is_valid_domain() && self.is_a_record().await && !self.should_be_a_record().await
    }

    pub async fn invalid_cname(&self) -> bool {
        if !self.is_valid_domain() || self.is_platform_domain() || self.is_apex().await {
            return false;
        }
        if self.cname_targets_platform_apex().await || self.cname_targets_cdn_alias().await {
            return true;
        }
        !self.cname_targets_user_subdomain().await && self.should_be_cname_record().await
    }

    pub async fn invalid_aaaa_record(&self) -> bool {
        self.non_platform_ipv6_present().await
    }

    // --- HTTP ---

    /// URL of the verification request.
    pub fn uri(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let scheme = if self.is_platform_domain() {
            "https"
        } else {
            "http"
        };
        Some(format!("{scheme}://{host}/"))
    }

    /// Whether the platform answers HTTP requests for the host.
    pub async fn served_by_platform(&self) -> bool {
        *self
            .served
            .get_or_init(|| async {
                match self.uri() {
                    Some(uri) => verify_origin(self.context.probe.as_ref(), &uri).await,
                    None => false,
                }
            })
            .await
    }

    // --- Verdicts ---

    /// Runs the configuration check. The first failing rule is returned.
    pub async fn check(&self) -> Result<(), CheckFailure> {
        self.outcome.get_or_init(|| self.evaluate()).await.clone()
    }

    pub async fn valid(&self) -> bool {
        self.check().await.is_ok()
    }

    pub async fn reason(&self) -> Option<CheckFailure> {
        self.check().await.err()
    }

    async fn evaluate(&self) -> Result<(), CheckFailure> {
        let Some(host) = self.host.clone() else {
            return Err(CheckFailure::InvalidDomain {
                host: self.input.clone(),
            });
        };
        if !self.is_valid_domain() {
            return Err(CheckFailure::InvalidDomain { host });
        }
        if !self.dns_resolves().await {
            return Err(CheckFailure::InvalidDns { host });
        }
        if self.deprecated_ip().await {
            return Err(CheckFailure::DeprecatedIp { host });
        }
        if self.is_proxied().await {
            debug!("{host} is proxied, skipping record checks");
            return Ok(());
        }
        if self.invalid_a_record().await {
            return Err(CheckFailure::InvalidARecord { host });
        }
        if self.invalid_cname().await {
            return Err(CheckFailure::invalid_cname(host));
        }
        if !self.served_by_platform().await {
            return Err(CheckFailure::NotServedByPlatform { host });
        }
        Ok(())
    }

    /// Runs the HTTPS eligibility check on top of [`Domain::check`].
    pub async fn https_check(&self) -> Result<(), CheckFailure> {
        self.https
            .get_or_init(|| self.evaluate_https())
            .await
            .clone()
    }

    pub async fn https_eligible(&self) -> bool {
        self.https_check().await.is_ok()
    }

    pub async fn https_eligibility_error(&self) -> Option<CheckFailure> {
        self.https_check().await.err()
    }

    async fn evaluate_https(&self) -> Result<(), CheckFailure> {
        self.check().await?;
        let host = self.host_or_input();

        if host.contains('_') {
            return Err(CheckFailure::RecordsIneligibleForHttps { host });
        }
        if !self.cname_targets_user_subdomain().await && !self.points_to_current_ip().await {
            return Err(CheckFailure::RecordsIneligibleForHttps { host });
        }
        if self.non_platform_ipv6_present().await {
            return Err(CheckFailure::InvalidAaaaRecord { host });
        }
        if self.non_platform_ip_present().await {
            let allowed: Vec<String> = CURRENT_IP_ADDRESSES
                .iter()
                .map(ToString::to_string)
                .collect();
            return Err(CheckFailure::ExtraIpsPresent {
                host,
                allowed: allowed.join(", "),
            });
        }
        if let Some(caa) = &self.caa {
            if caa.errored().await || !caa.lets_encrypt_allowed().await {
                return Err(CheckFailure::CaaIssuanceDenied {
                    host,
                    records: caa.issuers().await,
                    resolution_error: caa.error().await.map(ToString::to_string),
                });
            }
        }
        Ok(())
    }
}

fn is_current_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => CURRENT_IP_ADDRESSES.contains(&v4),
        IpAddr::V6(v6) => CURRENT_IPV6_ADDRESSES.contains(&v6),
    }
}

/// Follows the CNAME chain that starts with the first record.
fn cname_chain_target(records: &[Record]) -> Option<String> {
    let RecordData::Cname(first) = &records.first()?.data else {
        return None;
    };
    let mut target = first.clone();
    // Bounded by the record count so a CNAME loop terminates
    for _ in 0..records.len() {
        let next = records.iter().find_map(|record| match &record.data {
            RecordData::Cname(next) if record.name == target => Some(next.clone()),
            _ => None,
        });
        match next {
            Some(next) => target = next,
            None => break,
        }
    }
    Some(target)
}

/// Queries every record type concurrently and merges the answers.
///
/// Each record type gets `bound`; one that runs over counts as a failed
/// query and the other answers are kept.
async fn fetch_records(resolver: &Resolver, bound: Duration) -> DnsState {
    let answers = join_all(RECORD_TYPES.iter().map(|&record_type| async move {
        match tokio::time::timeout(bound, resolver.try_query(record_type)).await {
            Ok(answer) => answer,
            Err(_) => Err(DnsError::Timeout {
                name: resolver.target().to_string(),
                record_type,
            }),
        }
    }))
    .await;

    let mut records: Vec<Record> = Vec::new();
    let mut last_error = None;
    let mut any_succeeded = false;
    for answer in answers {
        match answer {
            Ok(answer) => {
                any_succeeded = true;
                for record in answer {
                    if !records.contains(&record) {
                        records.push(record);
                    }
                }
            }
            Err(e) => {
                warn!("{e}");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if !any_succeeded => DnsState::Failed(e),
        _ => {
            debug!(
                "Resolved {} record(s) for {}",
                records.len(),
                resolver.target()
            );
            DnsState::Resolved(records)
        }
    }
}
