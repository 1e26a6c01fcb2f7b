//! CAA policy checks.
//!
//! Decides whether a certificate authority may issue for a host, based on the
//! `issue` CAA records of the host or, when it has none, of its parent.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::OnceCell;

use crate::config::LETS_ENCRYPT_CA;
use crate::dns::{
    normalize_name, Lookup, NameserverStrategy, Record, RecordData, RecordType, Resolver,
};
use crate::domain::parent_name;
use crate::error_handling::DnsError;

#[derive(Debug, Default)]
struct CaaRecords {
    issue: Vec<Record>,
    error: Option<DnsError>,
}

/// CAA facts for one host, resolved once on first use.
pub struct Caa {
    host: String,
    strategy: NameserverStrategy,
    lookup: Arc<dyn Lookup>,
    state: OnceCell<CaaRecords>,
}

impl Caa {
    pub fn new(host: &str, strategy: NameserverStrategy, lookup: Arc<dyn Lookup>) -> Self {
        Self {
            host: normalize_name(host),
            strategy,
            lookup,
            state: OnceCell::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// `issue` records for the host, or for its parent when the host has none.
    pub async fn records(&self) -> &[Record] {
        &self.state().await.issue
    }

    /// The last resolution error, if any query failed.
    pub async fn error(&self) -> Option<&DnsError> {
        self.state().await.error.as_ref()
    }

    pub async fn errored(&self) -> bool {
        self.error().await.is_some()
    }

    pub async fn records_present(&self) -> bool {
        !self.errored().await && !self.records().await.is_empty()
    }

    /// Whether `ca` may issue. Any resolution error denies.
    pub async fn allows(&self, ca: &str) -> bool {
        if self.errored().await {
            return false;
        }
        let ca = normalize_name(ca);
        let records = self.records().await;
        records.is_empty()
            || records
                .iter()
                .any(|record| issuer(record).is_some_and(|value| value.eq_ignore_ascii_case(&ca)))
    }

    pub async fn lets_encrypt_allowed(&self) -> bool {
        self.allows(LETS_ENCRYPT_CA).await
    }

    /// Issuer values of the effective records, for reporting.
    pub async fn issuers(&self) -> Vec<String> {
        self.records()
            .await
            .iter()
            .filter_map(issuer)
            .map(str::to_string)
            .collect()
    }

    async fn state(&self) -> &CaaRecords {
        self.state.get_or_init(|| self.resolve()).await
    }

    async fn resolve(&self) -> CaaRecords {
        let mut state = CaaRecords::default();
        state.issue = self.query_issue(&self.host, &mut state.error).await;

        if state.issue.is_empty() {
            if let Some(parent) = parent_name(&self.host) {
                state.issue = self.query_issue(&parent, &mut state.error).await;
            }
        }
        debug!(
            "CAA for {}: {} issue record(s), errored: {}",
            self.host,
            state.issue.len(),
            state.error.is_some()
        );
        state
    }

    async fn query_issue(&self, name: &str, error: &mut Option<DnsError>) -> Vec<Record> {
        let resolver = Resolver::new(name, self.strategy.clone(), Arc::clone(&self.lookup));
        match resolver.try_query(RecordType::CAA).await {
            Ok(records) => records
                .into_iter()
                .filter(|record| {
                    matches!(&record.data, RecordData::Caa { tag, .. } if tag == "issue")
                })
                .collect(),
            Err(e) => {
                warn!("CAA lookup failed: {e}");
                *error = Some(e);
                Vec::new()
            }
        }
    }
}

fn issuer(record: &Record) -> Option<&str> {
    match &record.data {
        RecordData::Caa { value, .. } => Some(value.trim_end_matches('.')),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
