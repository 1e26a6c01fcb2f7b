//! Record lookups against a chosen set of name servers.
//!
//! [`Lookup`] is the seam between the checks and the network. [`HickoryLookup`]
//! talks to real name servers; [`StaticLookup`] serves canned answers.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;
use log::debug;

use super::records::{normalize_name, Record};
use crate::error_handling::DnsError;

/// Name servers a query is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Nameservers {
    /// The system (or library default) resolver
    Default,
    /// Specific servers, queried on port 53
    Addresses(Vec<IpAddr>),
}

/// Performs a single DNS query.
///
/// Implementations return `Ok` with an empty set when the name does not exist
/// or has no records of the requested type, and `Err` only for transport
/// failures.
#[async_trait]
pub trait Lookup: Send + Sync {
    async fn lookup(
        &self,
        name: &str,
        record_type: RecordType,
        nameservers: &Nameservers,
    ) -> Result<Vec<Record>, DnsError>;
}

/// [`Lookup`] backed by `hickory-resolver`.
///
/// Resolvers for explicit server sets are built on first use and cached.
pub struct HickoryLookup {
    default: Arc<TokioAsyncResolver>,
    opts: ResolverOpts,
    explicit: Mutex<HashMap<Vec<IpAddr>, Arc<TokioAsyncResolver>>>,
    timeout: Duration,
}

impl HickoryLookup {
    pub fn new(default: Arc<TokioAsyncResolver>, opts: ResolverOpts, timeout: Duration) -> Self {
        Self {
            default,
            opts,
            explicit: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    fn resolver_for(&self, nameservers: &Nameservers) -> Arc<TokioAsyncResolver> {
        let ips = match nameservers {
            Nameservers::Default => return Arc::clone(&self.default),
            Nameservers::Addresses(ips) => ips,
        };
        let mut cache = self
            .explicit
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let resolver = cache.entry(ips.clone()).or_insert_with(|| {
            let group = NameServerConfigGroup::from_ips_clear(ips, 53, true);
            let config = ResolverConfig::from_parts(None, vec![], group);
            Arc::new(TokioAsyncResolver::tokio(config, self.opts.clone()))
        });
        Arc::clone(resolver)
    }
}

#[async_trait]
impl Lookup for HickoryLookup {
    async fn lookup(
        &self,
        name: &str,
        record_type: RecordType,
        nameservers: &Nameservers,
    ) -> Result<Vec<Record>, DnsError> {
        let name = normalize_name(name);
        let resolver = self.resolver_for(nameservers);
        // Absolute name so no search domain is appended
        let fqdn = format!("{name}.");

        let query = resolver.lookup(fqdn.as_str(), record_type);
        let result = match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => result,
            Err(_) => return Err(DnsError::Timeout { name, record_type }),
        };

        match result {
            Ok(answer) => Ok(answer
                .records()
                .iter()
                .filter_map(Record::from_hickory)
                .collect()),
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
                    ResponseCode::NXDomain | ResponseCode::NoError => {
                        debug!("No {record_type} records for {name}");
                        Ok(Vec::new())
                    }
                    code => Err(DnsError::ServerFailure {
                        name,
                        record_type,
                        code: code.to_string(),
                    }),
                },
                ResolveErrorKind::Timeout => Err(DnsError::Timeout { name, record_type }),
                _ => Err(DnsError::Transport {
                    name,
                    record_type,
                    message: e.to_string(),
                }),
            },
        }
    }
}

type AnswerKey = (Option<Nameservers>, String, RecordType);

/// In-memory [`Lookup`] with canned answers.
///
/// Answers registered without name servers apply to every server set unless a
/// server-specific answer exists. Unknown queries return an empty set. Every
/// query is recorded and can be inspected with [`StaticLookup::queries`].
#[derive(Default)]
pub struct StaticLookup {
    answers: HashMap<AnswerKey, Result<Vec<Record>, DnsError>>,
    queries: Mutex<Vec<(Nameservers, String, RecordType)>>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds records, each answering queries for its own name and type.
    pub fn with_records(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        for record in records {
            let key = (None, record.name.clone(), record.record_type());
            self.push(key, record);
        }
        self
    }

    /// Adds records returned only by the given server set.
    pub fn with_records_from(
        mut self,
        nameservers: Nameservers,
        records: impl IntoIterator<Item = Record>,
    ) -> Self {
        for record in records {
            let key = (
                Some(nameservers.clone()),
                record.name.clone(),
                record.record_type(),
            );
            self.push(key, record);
        }
        self
    }

    /// Sets the full answer for one query, e.g. a CNAME plus the addresses behind it.
    pub fn with_answer(
        mut self,
        name: &str,
        record_type: RecordType,
        records: Vec<Record>,
    ) -> Self {
        self.answers
            .insert((None, normalize_name(name), record_type), Ok(records));
        self
    }

    /// Sets the full answer one server set gives for one query.
    pub fn with_answer_from(
        mut self,
        nameservers: Nameservers,
        name: &str,
        record_type: RecordType,
        records: Vec<Record>,
    ) -> Self {
        self.answers.insert(
            (Some(nameservers), normalize_name(name), record_type),
            Ok(records),
        );
        self
    }

    /// Makes a query fail for every server set.
    pub fn with_error(mut self, name: &str, record_type: RecordType) -> Self {
        let name = normalize_name(name);
        let error = servfail(&name, record_type);
        self.answers.insert((None, name, record_type), Err(error));
        self
    }

    /// Makes a query fail for one server set.
    pub fn with_error_from(
        mut self,
        nameservers: Nameservers,
        name: &str,
        record_type: RecordType,
    ) -> Self {
        let name = normalize_name(name);
        let error = servfail(&name, record_type);
        self.answers
            .insert((Some(nameservers), name, record_type), Err(error));
        self
    }

    /// Queries made so far, in order.
    pub fn queries(&self) -> Vec<(Nameservers, String, RecordType)> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn push(&mut self, key: AnswerKey, record: Record) {
        if let Ok(records) = self.answers.entry(key).or_insert_with(|| Ok(Vec::new())) {
            records.push(record);
        }
    }
}

fn servfail(name: &str, record_type: RecordType) -> DnsError {
    DnsError::ServerFailure {
        name: name.to_string(),
        record_type,
        code: ResponseCode::ServFail.to_string(),
    }
}

#[async_trait]
impl Lookup for StaticLookup {
    async fn lookup(
        &self,
        name: &str,
        record_type: RecordType,
        nameservers: &Nameservers,
    ) -> Result<Vec<Record>, DnsError> {
        let name = normalize_name(name);
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((nameservers.clone(), name.clone(), record_type));

        let specific = (Some(nameservers.clone()), name.clone(), record_type);
        let any = (None, name, record_type);
        match self.answers.get(&specific).or_else(|| self.answers.get(&any)) {
            Some(answer) => answer.clone(),
            None => Ok(Vec::new()),
        }
    }
}
