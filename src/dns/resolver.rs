//! Per-domain query routing.
//!
//! A [`Resolver`] answers queries about one target name according to a
//! [`NameserverStrategy`]. The authoritative strategy discovers the target's own
//! name servers on first use and sends address, CAA and MX queries to them.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::join_all;
use hickory_resolver::proto::rr::RecordType;
use log::debug;
use tokio::sync::OnceCell;

use super::lookup::{Lookup, Nameservers};
use super::records::{normalize_name, Record, RecordData};
use crate::config::PUBLIC_NAMESERVERS;
use crate::domain::registrable_domain;
use crate::error_handling::DnsError;

/// Which name servers answer a domain's queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameserverStrategy {
    /// The system resolver
    Default,
    /// The target's own authoritative servers, discovered via NS records
    Authoritative,
    /// Well-known public resolvers
    Public,
    /// Caller-supplied server addresses
    Explicit(Vec<IpAddr>),
}

impl fmt::Display for NameserverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameserverStrategy::Default => f.write_str("default"),
            NameserverStrategy::Authoritative => f.write_str("authoritative"),
            NameserverStrategy::Public => f.write_str("public"),
            NameserverStrategy::Explicit(ips) => {
                let ips: Vec<String> = ips.iter().map(ToString::to_string).collect();
                f.write_str(&ips.join(","))
            }
        }
    }
}

impl FromStr for NameserverStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(NameserverStrategy::Default),
            "authoritative" => Ok(NameserverStrategy::Authoritative),
            "public" => Ok(NameserverStrategy::Public),
            other => {
                let ips = other
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| {
                        part.parse::<IpAddr>().map_err(|_| {
                            format!(
                                "`{part}` is neither a name-server strategy \
                                 (default, authoritative, public) nor an IP address"
                            )
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if ips.is_empty() {
                    return Err("no name servers given".to_string());
                }
                Ok(NameserverStrategy::Explicit(ips))
            }
        }
    }
}

/// Answers queries for one target name.
pub struct Resolver {
    target: String,
    strategy: NameserverStrategy,
    lookup: Arc<dyn Lookup>,
    authoritative: OnceCell<Vec<IpAddr>>,
}

impl Resolver {
    pub fn new(target: &str, strategy: NameserverStrategy, lookup: Arc<dyn Lookup>) -> Self {
        Self {
            target: normalize_name(target),
            strategy,
            lookup,
            authoritative: OnceCell::new(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn strategy(&self) -> &NameserverStrategy {
        &self.strategy
    }

    /// Records of `record_type` for the target. Failures yield an empty set.
    pub async fn query(&self, record_type: RecordType) -> Vec<Record> {
        match self.try_query(record_type).await {
            Ok(records) => records,
            Err(e) => {
                debug!("{e}");
                Vec::new()
            }
        }
    }

    /// Records of `record_type` for the target, surfacing transport failures.
    pub async fn try_query(&self, record_type: RecordType) -> Result<Vec<Record>, DnsError> {
        match &self.strategy {
            NameserverStrategy::Default => self.query_default(record_type).await,
            NameserverStrategy::Public => {
                self.query_servers(record_type, PUBLIC_NAMESERVERS.to_vec())
                    .await
            }
            NameserverStrategy::Explicit(ips) => {
                self.query_servers(record_type, ips.clone()).await
            }
            NameserverStrategy::Authoritative => self.query_authoritative(record_type).await,
        }
    }

    /// Addresses of the target's authoritative servers, discovered once.
    pub async fn authoritative_nameservers(&self) -> &[IpAddr] {
        self.authoritative
            .get_or_init(|| discover_nameservers(&self.target, self.lookup.as_ref()))
            .await
    }

    async fn query_default(&self, record_type: RecordType) -> Result<Vec<Record>, DnsError> {
        self.lookup
            .lookup(&self.target, record_type, &Nameservers::Default)
            .await
    }

    async fn query_servers(
        &self,
        record_type: RecordType,
        ips: Vec<IpAddr>,
    ) -> Result<Vec<Record>, DnsError> {
        self.lookup
            .lookup(&self.target, record_type, &Nameservers::Addresses(ips))
            .await
    }

    async fn query_authoritative(&self, record_type: RecordType) -> Result<Vec<Record>, DnsError> {
        if !matches!(
            record_type,
            RecordType::A | RecordType::AAAA | RecordType::CAA | RecordType::MX
        ) {
            return self.query_default(record_type).await;
        }

        let servers = self.authoritative_nameservers().await.to_vec();
        if servers.is_empty() {
            debug!(
                "No authoritative name servers found for {}, using default resolver",
                self.target
            );
            return self.query_default(record_type).await;
        }

        let answer = self.query_servers(record_type, servers).await;
        if matches!(record_type, RecordType::A | RecordType::AAAA) {
            return answer;
        }
        match answer {
            Ok(records) if !records.is_empty() => Ok(records),
            Ok(_) => self.query_default(record_type).await,
            Err(e) => {
                debug!("{e}; retrying with default resolver");
                self.query_default(record_type).await
            }
        }
    }
}

/// NS host names for `name` via the default resolver.
async fn nameserver_hosts(name: &str, lookup: &dyn Lookup) -> Vec<String> {
    match lookup
        .lookup(name, RecordType::NS, &Nameservers::Default)
        .await
    {
        Ok(records) => records
            .into_iter()
            .filter_map(|record| match record.data {
                RecordData::Ns(host) => Some(host),
                _ => None,
            })
            .collect(),
        Err(e) => {
            debug!("{e}");
            Vec::new()
        }
    }
}

/// Finds the addresses of the name servers responsible for `target`.
///
/// Subdomains without their own NS records fall back to the registrable domain.
pub(crate) async fn discover_nameservers(target: &str, lookup: &dyn Lookup) -> Vec<IpAddr> {
    let mut hosts = nameserver_hosts(target, lookup).await;
    if hosts.is_empty() {
        if let Some(zone) = registrable_domain(target).filter(|zone| zone != target) {
            hosts = nameserver_hosts(&zone, lookup).await;
        }
    }

    let answers = join_all(
        hosts
            .iter()
            .map(|host| lookup.lookup(host, RecordType::A, &Nameservers::Default)),
    )
    .await;

    let mut ips = Vec::new();
    for answer in answers {
        match answer {
            Ok(records) => {
                for ip in records.iter().filter_map(Record::address) {
                    if !ips.contains(&ip) {
                        ips.push(ip);
                    }
                }
            }
            Err(e) => debug!("{e}"),
        }
    }
    debug!("Authoritative name servers for {target}: {ips:?}");
    ips
}
